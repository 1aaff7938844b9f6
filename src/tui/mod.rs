//! Terminal UI components and rendering.
//!
//! This module provides the terminal front-end of roster: the application
//! state, event handling, the windowed record grid, the search input and
//! the footer.

use std::num::ParseIntError;

pub use app::App;
pub use event::Event;
use thiserror::Error;
pub use widget::{RosterRender, RosterWidget};
mod app;
mod backend;
pub use backend::Tui;
/// Event handling and action definitions
pub mod event;
/// Windowed record grid
pub mod grid;
mod input;
/// Footer line
pub mod statusline;
/// Widget rendering utilities
pub mod widget;

/// Represents a size value, either as a percentage or fixed value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Size {
    /// Size as a percentage (0-100)
    Percent(u16),
    /// Fixed size in terminal cells
    Fixed(u16),
}

/// Error type for parsing size values
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SizeParseError {
    /// Error parsing the size string
    #[error("Error parsing {0}: {1:?}")]
    ParseError(String, ParseIntError),
    /// Percentage value exceeds 100
    #[error("Invalid percentage {0}")]
    InvalidPercent(u16),
}

impl TryFrom<&str> for Size {
    type Error = SizeParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if let Some(percent) = value.strip_suffix('%') {
            let percent = percent
                .parse::<u16>()
                .map_err(|e| SizeParseError::ParseError(value.to_string(), e))?;
            if percent > 100 {
                return Err(SizeParseError::InvalidPercent(percent));
            }
            Ok(Self::Percent(percent))
        } else {
            Ok(Self::Fixed(
                value
                    .parse::<u16>()
                    .map_err(|e| SizeParseError::ParseError(value.to_string(), e))?,
            ))
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::Percent(100)
    }
}

#[cfg(test)]
mod size_test {
    use super::*;
    use std::num::IntErrorKind;
    #[test]
    fn fixed_success() {
        assert_eq!(Size::try_from("10"), Ok(Size::Fixed(10u16)));
    }
    #[test]
    fn percent_success() {
        assert_eq!(Size::try_from("10%"), Ok(Size::Percent(10u16)));
    }
    #[test]
    fn fixed_neg() {
        let Err(SizeParseError::ParseError(err_value, internal_error)) = Size::try_from("-10") else {
            panic!("expected a parse error");
        };
        assert_eq!(internal_error.kind(), &IntErrorKind::InvalidDigit);
        assert_eq!(err_value, String::from("-10"));
    }
    #[test]
    fn percent_over_100() {
        assert_eq!(Size::try_from("110%"), Err(SizeParseError::InvalidPercent(110)));
    }
    #[test]
    fn percent_empty() {
        let Err(SizeParseError::ParseError(value, internal_error)) = Size::try_from("%") else {
            panic!("expected a parse error");
        };
        assert_eq!(internal_error.kind(), &IntErrorKind::Empty);
        assert_eq!(value, String::from("%"));
    }
}
