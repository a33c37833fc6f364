//! Command-line flags.

use crate::app::PreviewSettings;
use crate::{DEFAULT_SHADERS_DIR, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, SHADER_EXTENSION};

use clap::Parser;
use std::path::PathBuf;

/// Browse a directory of fragment shaders and preview the selected one live.
///
/// Tab toggles the program list, R reloads changed files, O opens another
/// directory and Space pauses the clock.
#[derive(Parser, Debug)]
#[command(name = "shader-preview")]
#[command(author, version, about = "Live preview for a directory of fragment shaders", long_about = None)]
pub struct Cli {
    /// Directory scanned (recursively) for shader files
    #[arg(short, long, default_value = DEFAULT_SHADERS_DIR, env = "SHADER_PREVIEW_DIR")]
    pub dir: PathBuf,

    /// Extension of the shader files to load
    #[arg(short, long, default_value = SHADER_EXTENSION)]
    pub extension: String,

    /// Image bound as `texture0` instead of the plain white texture
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Poll file modification times from the frame loop instead of waiting for R
    #[arg(long)]
    pub auto_reload: bool,

    /// Initial window width
    #[arg(long, default_value_t = DEFAULT_WINDOW_WIDTH)]
    pub width: f32,

    /// Initial window height
    #[arg(long, default_value_t = DEFAULT_WINDOW_HEIGHT)]
    pub height: f32,
}

impl Cli {
    pub fn into_settings(self) -> PreviewSettings {
        PreviewSettings {
            shaders_dir: self.dir,
            extension: self.extension.trim_start_matches('.').to_string(),
            texture_path: self.texture,
            auto_reload: self.auto_reload,
            window_size: [self.width.max(1.0), self.height.max(1.0)],
        }
    }
}
