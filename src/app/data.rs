use crate::POPUP_CAP;

use std::collections::VecDeque;
use std::path::PathBuf;

/// Startup options, built from the command line.
#[derive(Debug, Clone)]
pub struct PreviewSettings {
    pub shaders_dir: PathBuf,
    pub extension: String,
    pub texture_path: Option<PathBuf>,
    pub auto_reload: bool,
    pub window_size: [f32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Render,
    Menu,
}

impl Mode {
    pub fn next(self) -> Self {
        match self {
            Mode::Render => Mode::Menu,
            Mode::Menu => Mode::Render,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Popup {
    pub kind: PopupKind,
    pub message: String,
    /// Seconds left before the popup disappears.
    pub remaining: f32,
}

impl Popup {
    /// Opacity in `0.0..=1.0`; popups fade out over their last second.
    pub fn opacity(&self) -> f32 {
        self.remaining.clamp(0.0, 1.0)
    }
}

/// Bounded queue of transient notifications, oldest first.
#[derive(Debug)]
pub struct PopupQueue {
    popups: VecDeque<Popup>,
    lifetime: f32,
}

impl PopupQueue {
    pub fn new(lifetime: f32) -> Self {
        Self {
            popups: VecDeque::with_capacity(POPUP_CAP),
            lifetime,
        }
    }

    /// Adds a popup; when the queue is full the oldest one is evicted.
    pub fn push(&mut self, kind: PopupKind, message: impl Into<String>) {
        if self.popups.len() == POPUP_CAP {
            self.popups.pop_front();
        }
        self.popups.push_back(Popup {
            kind,
            message: message.into(),
            remaining: self.lifetime,
        });
    }

    /// Ages every popup by `dt` seconds and drops the expired ones.
    pub fn tick(&mut self, dt: f32) {
        for popup in &mut self.popups {
            popup.remaining -= dt;
        }
        self.popups.retain(|p| p.remaining > 0.0);
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Popup> {
        self.popups.iter()
    }

    pub fn len(&self) -> usize {
        self.popups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.popups.is_empty()
    }
}
