//! The record grid: a header row over a windowed body.
//!
//! The grid never sees the whole derived view. Before each frame the app
//! pushes the [`Window`] and exactly the rows inside `window.range()`; rows
//! of the window that fall outside the viewport (overscan) are kept but not
//! drawn.

use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Widget, Wrap};

use crate::criteria::SortState;
use crate::options::RosterOptions;
use crate::record::{Health, Location, Record};
use crate::theme::{ColorTheme, DEFAULT_THEME};
use crate::tui::widget::{RosterRender, RosterWidget};
use crate::window::Window;

const EMPTY_MESSAGE: &str = "No results found.";
const LOADING_MESSAGE: &str = "Loading records...";
const PLACEHOLDER_ROWS: u16 = 10;
const CURSOR_ICON: &str = ">";
const VIEWED_ICON: &str = "●";

const COLUMN_TITLES: [&str; 5] = ["Name", "Location", "Health", "Power", "Viewed"];

/// Display copy of a materialized record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridRow {
    /// Record id
    pub id: String,
    /// Display name
    pub name: String,
    /// Village
    pub location: Location,
    /// Health, drives the cell colour
    pub health: Health,
    /// Power level, right-aligned
    pub power: u32,
    /// Whether the viewed marker is drawn
    pub viewed: bool,
    /// Whether the row checkbox is ticked
    pub selected: bool,
}

impl GridRow {
    /// Copies the displayed fields of `record`; `viewed` comes from the store's cache
    pub fn new(record: &Record, viewed: bool, selected: bool) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            location: record.location,
            health: record.health,
            power: record.power,
            viewed,
            selected,
        }
    }
}

/// State of the select-all checkbox over the visible rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectAll {
    /// No visible row selected
    #[default]
    None,
    /// Some visible rows selected
    Some,
    /// Every visible row selected
    All,
}

impl SelectAll {
    fn checkbox(&self) -> &'static str {
        match self {
            SelectAll::None => "[ ]",
            SelectAll::Some => "[-]",
            SelectAll::All => "[x]",
        }
    }
}

/// What the body shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GridBody {
    /// A load is in flight
    Loading,
    /// The last load failed
    Failed(String),
    /// Rows of the current window
    #[default]
    Rows,
}

/// Column header state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridHeader {
    /// Select-all checkbox
    pub select_all: SelectAll,
    /// Active health filters, as initials in the column title
    pub health_filters: BTreeSet<Health>,
    /// Power sort indicator
    pub sort: SortState,
}

impl GridHeader {
    fn health_title(&self) -> String {
        if self.health_filters.is_empty() {
            return String::from(COLUMN_TITLES[2]);
        }
        let initials: Vec<&str> = self.health_filters.iter().map(|h| &h.as_str()[..1]).collect();
        format!("{} ({})", COLUMN_TITLES[2], initials.join(","))
    }

    fn power_title(&self) -> String {
        format!("{} {}", COLUMN_TITLES[3], self.sort.indicator())
    }
}

/// Widget for the windowed record grid
pub struct Grid {
    /// What the body shows
    pub body: GridBody,
    /// Column header state
    pub header: GridHeader,
    /// Window the rows were materialized for
    pub window: Window,
    /// Rows for `window.range()`, in display order
    pub rows: Vec<GridRow>,
    /// View index of the row cursor
    pub cursor: Option<usize>,
    /// Color theme
    pub theme: Arc<ColorTheme>,
    last_window: Window,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            body: GridBody::default(),
            header: GridHeader::default(),
            window: Window::default(),
            rows: Vec::new(),
            cursor: None,
            theme: Arc::new(*DEFAULT_THEME),
            last_window: Window::default(),
        }
    }
}

impl Grid {
    /// Replaces the materialized slice
    pub fn set_window(&mut self, window: Window, rows: Vec<GridRow>) {
        debug_assert_eq!(rows.len(), window.end - window.start);
        self.window = window;
        self.rows = rows;
    }

    fn columns(area: Rect) -> Rc<[Rect]> {
        Layout::horizontal([
            Constraint::Length(CURSOR_ICON.len() as u16),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(7),
            Constraint::Length(6),
        ])
        .spacing(1)
        .split(area)
    }

    fn render_header(&self, columns: &[Rect], buf: &mut Buffer) {
        let style = self.theme.header;
        let titles = [
            (1, String::from(self.header.select_all.checkbox())),
            (2, String::from(COLUMN_TITLES[0])),
            (3, String::from(COLUMN_TITLES[1])),
            (4, self.header.health_title()),
            (5, self.header.power_title()),
            (6, String::from(COLUMN_TITLES[4])),
        ];
        for (col, title) in titles {
            let rect = columns[col];
            buf.set_stringn(rect.x, rect.y, title, rect.width as usize, style);
        }
    }

    fn render_row(&self, row: &GridRow, current: bool, columns: &[Rect], y: u16, buf: &mut Buffer) {
        let theme = &self.theme;
        let base = if current {
            theme.normal.patch(theme.current)
        } else {
            theme.normal
        };
        let Some(first) = columns.first() else {
            return;
        };
        let width = columns.last().map_or(0, |c| c.right()) - first.x;
        buf.set_style(Rect::new(first.x, y, width, 1), base);

        let mut cell = |col: usize, text: &str, style: Style| {
            let rect = columns[col];
            buf.set_stringn(rect.x, y, text, rect.width as usize, base.patch(style));
        };
        if current {
            cell(0, CURSOR_ICON, theme.cursor);
        }
        let (checkbox, checkbox_style) = if row.selected {
            ("[x]", theme.selected)
        } else {
            ("[ ]", Style::default())
        };
        cell(1, checkbox, checkbox_style);
        cell(2, &row.name, Style::default());
        cell(3, row.location.as_str(), Style::default());
        cell(4, row.health.as_str(), theme.health(row.health));
        let power_width = columns[5].width as usize;
        cell(5, &format!("{:>power_width$}", row.power), Style::default());
        if row.viewed {
            cell(6, VIEWED_ICON, theme.viewed);
        }
    }

    fn render_message(&self, area: Rect, buf: &mut Buffer, message: &str, style: Style) {
        Paragraph::new(Line::styled(message, style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

impl RosterWidget for Grid {
    fn from_options(_options: &RosterOptions, theme: Arc<ColorTheme>) -> Self {
        Self {
            theme,
            ..Default::default()
        }
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer) -> RosterRender {
        let res = RosterRender {
            window_changed: self.window != self.last_window,
        };
        self.last_window = self.window;
        if area.height == 0 {
            return res;
        }

        let [header_area, body] = Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
        let columns = Self::columns(header_area);
        self.render_header(&columns, buf);

        match &self.body {
            GridBody::Loading => {
                self.render_message(Rect { height: 1, ..body }, buf, LOADING_MESSAGE, self.theme.info);
                for y in 1..body.height.min(PLACEHOLDER_ROWS) {
                    let line = "░".repeat(body.width as usize);
                    buf.set_stringn(body.x, body.y + y, line, body.width as usize, self.theme.info);
                }
            }
            GridBody::Failed(message) => {
                self.render_message(body, buf, &format!("Error: {message}"), self.theme.error);
            }
            GridBody::Rows if self.rows.is_empty() => {
                self.render_message(body, buf, EMPTY_MESSAGE, self.theme.info);
            }
            GridBody::Rows => {
                for (offset, row) in self.rows.iter().enumerate() {
                    let index = self.window.start + offset;
                    let top = self.window.row_top(index);
                    let bottom = top + self.window.row_height as i64;
                    // overscan rows are materialized but clipped
                    if bottom <= 0 || top >= body.height as i64 {
                        continue;
                    }
                    // a row cut by the top edge draws on its first visible line
                    let y = body.y + top.max(0) as u16;
                    let row_columns: Vec<Rect> = columns.iter().map(|c| Rect { y, ..*c }).collect();
                    self.render_row(row, self.cursor == Some(index), &row_columns, y, buf);
                }
            }
        }
        res
    }
}
