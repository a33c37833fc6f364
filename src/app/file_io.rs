use super::error::{ScanError, ShaderError, TextureError};

use std::path::{Path, PathBuf};
use std::time::SystemTime;
use glow::HasContext;

// ==========================================
// SHADER FILES
// ==========================================

/// Recursively collects the files under `dir` whose extension matches
/// `extension` (case-insensitive, leading dot optional), sorted by path.
pub fn scan_shader_dir(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, ScanError> {
    let extension = extension.trim_start_matches('.');
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = match std::fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(source) if current == dir => {
                return Err(ScanError::ReadDir { path: current, source });
            }
            Err(e) => {
                log::warn!("Skipping unreadable directory {:?}: {}", current, e);
                continue;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() && has_extension(&path, extension) {
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

/// Display name of a shader: its path relative to the scanned directory.
pub fn program_name(dir: &Path, path: &Path) -> String {
    path.strip_prefix(dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Last modification time, or `None` when the file is gone or unreadable.
pub fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

pub fn read_shader_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Relative shader directories are looked up in the working directory first,
/// then next to the executable.
pub fn resolve_shaders_dir(dir: &Path) -> PathBuf {
    if dir.is_absolute() || dir.exists() {
        return dir.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let candidate = exe_dir.join(dir);
            if candidate.exists() {
                return candidate;
            }
        }
    }

    dir.to_path_buf()
}

// ==========================================
// TEXTURES
// ==========================================

#[derive(Debug, Clone, Copy)]
pub struct TextureHandle {
    pub texture: glow::Texture,
    pub width: u32,
    pub height: u32,
}

/// A square, opaque white image; what the preview shows through a shader
/// when no texture file is given.
pub fn white_image(size: u32) -> image::RgbaImage {
    image::RgbaImage::from_pixel(size, size, image::Rgba([255, 255, 255, 255]))
}

pub fn load_texture_from_file(gl: &glow::Context, path: &Path) -> Result<TextureHandle, TextureError> {
    let img = image::open(path)?.to_rgba8();
    upload_texture(gl, &img)
}

/// Uploads `img` with its first row at texture coordinate `v = 0`, which is
/// the top edge of the preview quad.
pub fn upload_texture(gl: &glow::Context, img: &image::RgbaImage) -> Result<TextureHandle, TextureError> {
    let (width, height) = img.dimensions();

    // SAFETY: Uploading pixel data with a valid OpenGL context; the slice
    // holds exactly width * height RGBA texels.
    unsafe {
        let texture = gl.create_texture().map_err(TextureError::Resource)?;

        gl.bind_texture(glow::TEXTURE_2D, Some(texture));
        gl.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            glow::RGBA as i32,
            width as i32,
            height as i32,
            0,
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            Some(img.as_raw().as_slice()),
        );
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
        gl.bind_texture(glow::TEXTURE_2D, None);

        Ok(TextureHandle { texture, width, height })
    }
}

pub fn delete_texture(gl: &glow::Context, texture: glow::Texture) {
    unsafe {
        gl.delete_texture(texture);
    }
}
