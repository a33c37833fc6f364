mod data;
mod error;
mod file_io;
mod list_view;
mod programs;
mod render_engine;
mod ui;

pub use data::PreviewSettings;

use data::*;
use error::ShaderError;
use file_io::TextureHandle;
use list_view::ScrollState;
use programs::{Program, ProgramList, ReloadEvent};
use render_engine::ShaderRenderer;
use crate::{AUTO_RELOAD_POLL_MS, POPUP_LIFETIME_SECS};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui_glow;
use egui_glow::glow;

pub struct PreviewApp {
    gl: Arc<glow::Context>,
    settings: PreviewSettings,
    programs: ProgramList<ShaderRenderer>,
    selected: Option<usize>,
    passthrough: Option<ShaderRenderer>,
    texture: Option<TextureHandle>,
    mode: Mode,
    scroll: ScrollState,
    popups: PopupQueue,
    time: f32,
    auto_time: bool,
    last_poll: Instant,
}

impl PreviewApp {
    pub fn new<'a>(cc: &'a eframe::CreationContext<'a>, mut settings: PreviewSettings) -> Option<Self> {
        let gl = cc.gl.as_ref()?.clone();

        settings.shaders_dir = file_io::resolve_shaders_dir(&settings.shaders_dir);
        let programs = load_programs(&gl, &settings.shaders_dir, &settings.extension);

        let passthrough = match ShaderRenderer::passthrough(&gl) {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                log::error!("Built-in shader failed to compile: {}", e);
                None
            }
        };

        let texture = create_texture(&gl, &settings);

        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        Some(Self {
            gl,
            settings,
            programs,
            selected: None,
            passthrough,
            texture,
            mode: Mode::Menu,
            scroll: ScrollState::default(),
            popups: PopupQueue::new(POPUP_LIFETIME_SECS),
            time: 0.0,
            auto_time: true,
            last_poll: Instant::now(),
        })
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.next();
        if self.mode == Mode::Menu {
            self.scroll.reset();
        }
    }

    pub fn select(&mut self, index: usize) {
        if let Some(program) = self.programs.get(index) {
            log::info!("path: {}", program.path.display());
            self.selected = Some(index);
        }
    }

    pub fn selected_program(&self) -> Option<&Program<ShaderRenderer>> {
        self.selected.and_then(|i| self.programs.get(i))
    }

    /// The selected program when it compiled, otherwise the pass-through shader.
    pub fn active_renderer(&self) -> Option<ShaderRenderer> {
        self.selected_program()
            .and_then(|p| p.handle)
            .or(self.passthrough)
    }

    pub fn reload_programs(&mut self) {
        let gl = self.gl.clone();
        let events = self.programs.reload(
            |path| compile_program(&gl, path),
            |old| old.destroy(&gl),
        );
        self.last_poll = Instant::now();

        for event in events {
            self.notify(event);
        }
    }

    /// Runs a reload when auto-reload is on and the poll interval elapsed.
    pub fn poll_reload(&mut self) {
        if self.settings.auto_reload
            && self.last_poll.elapsed() >= Duration::from_millis(AUTO_RELOAD_POLL_MS)
        {
            self.reload_programs();
        }
    }

    fn notify(&mut self, event: ReloadEvent) {
        let name = |index: usize| {
            self.programs.get(index)
                .map(|p| p.name.clone())
                .unwrap_or_default()
        };
        let (kind, message) = match event {
            ReloadEvent::Updated { index } => (PopupKind::Info, format!("updated {}", name(index))),
            ReloadEvent::Added { index } => (PopupKind::Info, format!("new shader {}", name(index))),
            ReloadEvent::Missing { index } => (PopupKind::Error, format!("{} is missing", name(index))),
            ReloadEvent::Failed { index, error } => (PopupKind::Error, format!("{}: {}", name(index), error)),
        };
        self.popups.push(kind, message);
    }

    /// Replaces the whole program list with the shaders found in `dir`.
    pub fn open_directory(&mut self, dir: PathBuf) {
        let gl = self.gl.clone();
        self.programs.release_all(|renderer| renderer.destroy(&gl));

        self.programs = load_programs(&gl, &dir, &self.settings.extension);
        self.selected = None;
        self.scroll.reset();
        self.settings.shaders_dir = dir;

        self.popups.push(
            PopupKind::Info,
            format!("{} shader(s) in {}", self.programs.len(), self.settings.shaders_dir.display()),
        );
    }

    pub fn pick_directory(&mut self) {
        if let Some(dir) = rfd::FileDialog::new()
            .set_directory(self.programs.dir())
            .pick_folder()
        {
            self.open_directory(dir);
        }
    }

    pub fn custom_painting(&mut self, ui: &mut egui::Ui) {
        let (screen, _response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());

        let Some(renderer) = self.active_renderer() else {
            return;
        };
        let rect = preview_rect(screen);
        let time = self.time;
        let texture = self.texture.map(|t| t.texture);

        let cb = egui_glow::CallbackFn::new(move |_info, painter| {
            renderer.paint(painter.gl(), time, rect.size(), texture);
        });

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(cb),
        };
        ui.painter().add(callback);
    }

    pub fn destroy_gl_resources(&mut self, gl: &glow::Context) {
        self.programs.release_all(|renderer| renderer.destroy(gl));
        if let Some(renderer) = self.passthrough.take() {
            renderer.destroy(gl);
        }
        if let Some(texture) = self.texture.take() {
            file_io::delete_texture(gl, texture.texture);
        }
    }
}

fn compile_program(gl: &glow::Context, path: &Path) -> Result<ShaderRenderer, ShaderError> {
    let source = file_io::read_shader_source(path)?;
    ShaderRenderer::new(gl, &source)
}

/// Loads every shader in `dir`; an unreadable directory yields an empty list.
fn load_programs(gl: &glow::Context, dir: &Path, extension: &str) -> ProgramList<ShaderRenderer> {
    match ProgramList::load(dir, extension, |path| compile_program(gl, path)) {
        Ok(programs) => programs,
        Err(e) => {
            log::error!("{}", e);
            ProgramList::empty(dir, extension)
        }
    }
}

/// The image from `--texture`, or a white square as tall as the window.
fn create_texture(gl: &glow::Context, settings: &PreviewSettings) -> Option<TextureHandle> {
    if let Some(path) = &settings.texture_path {
        match file_io::load_texture_from_file(gl, path) {
            Ok(texture) => {
                log::info!("Texture loaded: {}x{}", texture.width, texture.height);
                return Some(texture);
            }
            Err(e) => log::warn!("{:?}: {}, falling back to a white texture", path, e),
        }
    }

    let size = settings.window_size[1].round().max(1.0) as u32;
    match file_io::upload_texture(gl, &file_io::white_image(size)) {
        Ok(texture) => Some(texture),
        Err(e) => {
            log::error!("{}", e);
            None
        }
    }
}

/// Square preview area, as tall as `screen` and centred horizontally.
pub fn preview_rect(screen: egui::Rect) -> egui::Rect {
    let side = screen.height().min(screen.width());
    egui::Rect::from_center_size(
        egui::pos2(screen.center().x, screen.top() + side / 2.0),
        egui::vec2(side, side),
    )
}
