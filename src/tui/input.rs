use std::ops::Deref;
use std::sync::Arc;

use ratatui::layout::Alignment;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, Widget};

use crate::options::RosterOptions;
use crate::theme::{ColorTheme, DEFAULT_THEME};
use crate::tui::widget::{RosterRender, RosterWidget};

/// Toolbar: search query editor plus the selection counter
pub struct Input {
    /// Text drawn before the query
    pub prompt: String,
    /// Current query
    pub value: String,
    /// Byte offset of the edit cursor, always on a char boundary
    pub cursor_pos: usize,
    /// Color theme
    pub theme: Arc<ColorTheme>,
    /// Number of selected records, pushed by the app before each frame
    pub selected: usize,
}

impl Default for Input {
    fn default() -> Self {
        Self {
            prompt: String::from("> "),
            value: String::default(),
            cursor_pos: 0,
            theme: Arc::new(*DEFAULT_THEME),
            selected: 0,
        }
    }
}

impl Input {
    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor_pos, c);
        self.cursor_pos += c.len_utf8();
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor_pos = self.value.len();
    }

    /// Deletes the char before (`backward`) or under the cursor
    pub fn delete(&mut self, backward: bool) -> Option<char> {
        let pos = if backward {
            if self.cursor_pos == 0 {
                return None;
            }
            self.value.floor_char_boundary(self.cursor_pos - 1)
        } else {
            if self.cursor_pos >= self.value.len() {
                return None;
            }
            self.cursor_pos
        };
        let ch = self.value.remove(pos);
        self.cursor_pos = pos;
        Some(ch)
    }

    pub fn move_cursor(&mut self, offset: i32) {
        let target = self.cursor_pos as i64 + offset as i64;
        self.cursor_pos = if target <= 0 {
            0
        } else if offset < 0 {
            self.value.floor_char_boundary(target as usize)
        } else {
            self.value.ceil_char_boundary(target as usize)
        };
    }

    pub fn move_to_start(&mut self) {
        self.cursor_pos = 0;
    }

    pub fn move_to_end(&mut self) {
        self.cursor_pos = self.value.len();
    }

    /// Start of the word before the cursor (alphanumeric boundaries)
    fn prev_word_start(&self) -> usize {
        let before = &self.value[..self.cursor_pos];
        let trimmed = before.trim_end_matches(|c: char| !c.is_alphanumeric());
        trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| !c.is_alphanumeric())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0)
    }

    /// End of the word after the cursor (whitespace boundaries)
    fn next_word_end(&self) -> usize {
        let after = &self.value[self.cursor_pos..];
        let skipped = after.len() - after.trim_start().len();
        let rest = &after[skipped..];
        let word = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.cursor_pos + skipped + word
    }

    pub fn delete_backward_word(&mut self) -> String {
        let start = self.prev_word_start();
        let deleted: String = self.value.drain(start..self.cursor_pos).collect();
        self.cursor_pos = start;
        deleted
    }

    pub fn move_cursor_forward_word(&mut self) {
        self.cursor_pos = self.next_word_end();
    }

    pub fn move_cursor_backward_word(&mut self) {
        self.cursor_pos = self.prev_word_start();
    }

    pub fn delete_to_beginning(&mut self) -> String {
        let deleted: String = self.value.drain(..self.cursor_pos).collect();
        self.cursor_pos = 0;
        deleted
    }

    /// Display column of the edit cursor, relative to the widget
    pub fn cursor_column(&self) -> u16 {
        let width =
            unicode_display_width::width(&self.prompt) + unicode_display_width::width(&self.value[..self.cursor_pos]);
        u16::try_from(width).unwrap_or(u16::MAX)
    }
}

impl RosterWidget for Input {
    fn from_options(options: &RosterOptions, theme: Arc<ColorTheme>) -> Self {
        let mut res = Self {
            theme,
            prompt: options.prompt.clone(),
            ..Default::default()
        };
        res.set(options.query.as_deref().unwrap_or_default());
        res
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) -> RosterRender {
        let line = Line::from(vec![
            Span::styled(&self.prompt, self.theme.prompt),
            Span::styled(&self.value, self.theme.query),
        ]);
        Paragraph::new(line).style(self.theme.normal).render(area, buf);
        if self.selected > 0 {
            Line::from(format!("[{} selected]", self.selected))
                .style(self.theme.info)
                .alignment(Alignment::Right)
                .render(area, buf);
        }
        RosterRender::default()
    }
}

impl Deref for Input {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(value: &str) -> Input {
        let mut input = Input::default();
        input.set(value);
        input
    }

    #[test]
    fn insert_and_delete_multibyte() {
        let mut input = input("ナルト");
        input.move_cursor(-1);
        input.insert('x');
        assert_eq!(input.value, "ナルxト");
        assert_eq!(input.delete(true), Some('x'));
        assert_eq!(input.delete(false), Some('ト'));
        assert_eq!(input.value, "ナル");
        assert_eq!(input.delete(false), None);
    }

    #[test]
    fn word_motions() {
        let mut input = input("hidden leaf  village");
        input.move_cursor_backward_word();
        assert_eq!(&input.value[input.cursor_pos..], "village");
        assert_eq!(input.delete_backward_word(), "leaf  ");
        assert_eq!(input.value, "hidden village");
        input.move_to_start();
        input.move_cursor_forward_word();
        assert_eq!(input.cursor_pos, "hidden".len());
        assert_eq!(input.delete_to_beginning(), "hidden");
        assert_eq!(input.value, " village");
    }

    #[test]
    fn cursor_column_counts_display_width() {
        let input = input("ナ");
        assert_eq!(input.cursor_column(), 4);
    }
}
