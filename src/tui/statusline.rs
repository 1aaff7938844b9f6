use std::sync::Arc;
use std::time::Instant;

use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Widget};

use crate::options::RosterOptions;
use crate::theme::{ColorTheme, DEFAULT_THEME};
use crate::tui::widget::{RosterRender, RosterWidget};

const SPINNER_DURATION: u32 = 200;
const SPINNERS_UNICODE: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Numbers shown in the footer, pushed by the app before each frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FooterInfo {
    /// One-based index of the first visible row, 0 when nothing is visible
    pub first: usize,
    /// One-based index of the last visible row, 0 when nothing is visible
    pub last: usize,
    /// Rows in the derived view
    pub shown: usize,
    /// Records in the collection
    pub total: usize,
    /// Whether a bulk update is in flight
    pub mutating: bool,
}

impl FooterInfo {
    /// "Showing A to B of N rows", with the unfiltered total when filtering hides rows
    pub fn summary(&self) -> String {
        let mut res = format!("Showing {} to {} of {} rows", self.first, self.last, self.shown);
        if self.shown < self.total {
            res.push_str(&format!(" (filtered from {} total)", self.total));
        }
        res
    }
}

/// Footer: row range summary, in-flight indicator and last failure
pub struct Footer {
    /// Row range and status numbers
    pub info: FooterInfo,
    /// Last failure, shown on the right
    pub error: Option<String>,
    /// Color theme
    pub theme: Arc<ColorTheme>,
    start: Instant,
}

impl Default for Footer {
    fn default() -> Self {
        Self {
            info: FooterInfo::default(),
            error: None,
            theme: Arc::new(*DEFAULT_THEME),
            start: Instant::now(),
        }
    }
}

impl Footer {
    fn spinner(&self) -> char {
        let elapsed = self.start.elapsed().as_millis();
        let index = (elapsed / SPINNER_DURATION as u128) % SPINNERS_UNICODE.len() as u128;
        SPINNERS_UNICODE[index as usize]
    }
}

impl RosterWidget for Footer {
    fn from_options(_options: &RosterOptions, theme: Arc<ColorTheme>) -> Self {
        Self {
            theme,
            ..Default::default()
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) -> RosterRender {
        let mut spans = vec![Span::styled(self.info.summary(), self.theme.info)];
        if self.info.mutating {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(format!("{} updating", self.spinner()), self.theme.spinner));
        }
        if let Some(error) = &self.error {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(error.as_str(), self.theme.error));
        }
        Paragraph::new(Line::from(spans))
            .style(self.theme.normal)
            .render(area, buf);
        RosterRender::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_total_only_when_filtered() {
        let info = FooterInfo {
            first: 1,
            last: 2,
            shown: 2,
            total: 2,
            mutating: false,
        };
        insta::assert_snapshot!(info.summary(), @"Showing 1 to 2 of 2 rows");

        let info = FooterInfo { shown: 1, last: 1, ..info };
        insta::assert_snapshot!(info.summary(), @"Showing 1 to 1 of 1 rows (filtered from 2 total)");

        insta::assert_snapshot!(FooterInfo::default().summary(), @"Showing 0 to 0 of 0 rows");
    }
}
