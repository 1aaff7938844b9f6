use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use std::ops::BitOrAssign;
use std::sync::Arc;

use crate::options::RosterOptions;
use crate::theme::ColorTheme;

/// Result of rendering a RosterWidget
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterRender {
    /// Whether the materialized window changed since the last frame
    pub window_changed: bool,
}

impl BitOrAssign for RosterRender {
    fn bitor_assign(&mut self, rhs: Self) {
        self.window_changed |= rhs.window_changed;
    }
}

/// Trait for roster TUI widgets
///
/// Widgets own their presentation state only; the data they show is pushed
/// into them by the app before each frame.
pub trait RosterWidget: Sized {
    /// Create a widget from options and theme
    fn from_options(options: &RosterOptions, theme: Arc<ColorTheme>) -> Self;

    /// Render the widget to the buffer
    fn render(&mut self, area: Rect, buf: &mut Buffer) -> RosterRender;
}
