mod app;
mod cli;

use app::PreviewApp;
use clap::Parser;

pub const DEFAULT_SHADERS_DIR: &str = "./shaders";
pub const SHADER_EXTENSION: &str = "fs";
pub const WINDOW_TITLE: &str = "shader";
pub const DEFAULT_WINDOW_WIDTH: f32 = 800.0;
pub const DEFAULT_WINDOW_HEIGHT: f32 = 600.0;
pub const PROGRAM_CAP: usize = 50;
pub const POPUP_CAP: usize = 8;
pub const POPUP_LIFETIME_SECS: f32 = 4.0;
pub const AUTO_RELOAD_POLL_MS: u64 = 250;

fn main() {
    env_logger::init();

    let cli = cli::Cli::parse();
    let settings = cli.into_settings();

    let native_options = eframe::NativeOptions {
        renderer: eframe::Renderer::Glow,
        always_on_top: true,
        multisampling: 4,
        initial_window_size: Some(egui::vec2(settings.window_size[0], settings.window_size[1])),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(|cc| Box::new(PreviewApp::new(cc, settings).expect("Failed to create PreviewApp"))),
    ).expect("Failed to run eframe");
}
