use std::path::PathBuf;
use thiserror::Error;

/// Errors from reading, compiling or linking a shader program.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader compilation failed: {0}")]
    Compile(String),

    #[error("program link failed: {0}")]
    Link(String),

    /// The GL driver refused to hand out an object (program, shader, vertex array).
    #[error("GL resource allocation failed: {0}")]
    Resource(String),
}

impl ShaderError {
    /// Short form for on-screen notifications.
    pub fn summary(&self) -> String {
        match self {
            ShaderError::Compile(log) | ShaderError::Link(log) => summarize_info_log(log),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read shader directory `{}`: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to create texture: {0}")]
    Resource(String),
}

/// One-line summary of a driver info log: the first error with its line
/// number, or the first non-empty line when no error line is recognised.
pub fn summarize_info_log(log: &str) -> String {
    use regex::Regex;

    // Mesa `0:12(5): error:`, NVIDIA `0(12) : error C0000:`, ANGLE `ERROR: 0:12:`.
    let re = Regex::new(
        r"(?m)^\s*(?:ERROR:\s*\d+:(\d+):|\d+:(\d+)\(\d+\):\s*error:|\d+\((\d+)\)\s*:\s*error\s*\w*:)\s*(.+?)\s*$",
    )
    .expect("Invalid regex pattern");

    if let Some(cap) = re.captures(log) {
        let line = cap.get(1)
            .or_else(|| cap.get(2))
            .or_else(|| cap.get(3))
            .map(|m| m.as_str())
            .unwrap_or("?");
        let message = cap.get(4).map(|m| m.as_str()).unwrap_or("");
        return format!("line {}: {}", line, message);
    }

    log.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("unknown error")
        .to_string()
}
