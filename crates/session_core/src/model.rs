use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fs::defaults::default_file_system;
use crate::fs::node::FsNode;

/// Lowest z-index assigned to an open window.
pub const BASE_Z_INDEX: u32 = 10;
pub const DEFAULT_WINDOW_WIDTH: i32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 600;
/// Viewports narrower than this open windows maximized.
pub const MOBILE_BREAKPOINT: i32 = 768;
pub const CASCADE_ORIGIN_X: i32 = 100;
pub const CASCADE_ORIGIN_Y: i32 = 60;
pub const CASCADE_STEP: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootState {
    Off,
    Booting,
    Login,
    Desktop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppKind {
    Cv,
    Terminal,
    Settings,
    Browser,
    Explorer,
    Mail,
    Minesweeper,
    Sudoku,
    Htop,
    About,
    Projects,
    Editor,
}

impl AppKind {
    /// Editor windows are per-file; every other app is single-instance.
    pub fn is_multi_instance(self) -> bool {
        matches!(self, Self::Editor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WindowId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: i32,
    pub height: i32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub app: AppKind,
    pub title: String,
    pub is_minimized: bool,
    pub is_maximized: bool,
    pub z_index: u32,
    pub position: Position,
    pub size: WindowSize,
    pub params: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub boot_state: BootState,
    pub next_window_id: u64,
    pub windows: Vec<WindowRecord>,
    pub active_window_id: Option<WindowId>,
    pub file_system: Rc<FsNode>,
    pub cookie_consent: Option<bool>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            boot_state: BootState::Off,
            next_window_id: 1,
            windows: Vec::new(),
            active_window_id: None,
            file_system: default_file_system(),
            cookie_consent: None,
        }
    }
}

impl SessionState {
    pub fn window(&self, id: WindowId) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Highest z-index currently assigned, never below the base.
    pub fn top_z_index(&self) -> u32 {
        self.windows
            .iter()
            .map(|w| w.z_index)
            .max()
            .unwrap_or(BASE_Z_INDEX)
    }
}
