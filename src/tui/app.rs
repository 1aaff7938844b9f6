use std::sync::Arc;

use color_eyre::eyre::{Result, bail};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::prelude::Backend;
use ratatui::widgets::Widget;
use tokio::sync::mpsc::UnboundedSender;

use crate::mutation::PendingMutation;
use crate::options::RosterOptions;
use crate::pipeline::derive_indices;
use crate::record::Record;
use crate::remote::RemoteStore;
use crate::store::RecordStore;
use crate::theme::ColorTheme;
use crate::window::Virtualizer;

use super::Event;
use super::Tui;
use super::event::Action;
use super::grid::{Grid, GridBody, GridHeader, GridRow, SelectAll};
use super::input::Input;
use super::statusline::{Footer, FooterInfo};
use super::widget::{RosterRender, RosterWidget};

/// Application state for roster's TUI
pub struct App {
    /// Records, criteria, selection and async status
    pub store: RecordStore,
    /// Where records are loaded from and patched to
    pub remote: Arc<dyn RemoteStore>,
    /// Whether the application should quit
    pub should_quit: bool,
    /// View index of the row cursor
    pub cursor: usize,
    /// Terminal cursor position (x, y), inside the search input
    pub cursor_pos: (u16, u16),
    /// Window over the derived view
    pub virtualizer: Virtualizer,

    /// Search input widget
    pub input: Input,
    /// Record grid widget
    pub grid: Grid,
    /// Footer widget
    pub footer: Footer,
    /// Color theme
    pub theme: Arc<ColorTheme>,
    /// roster configuration options
    pub options: RosterOptions,
    view: ViewCache,
    event_tx: UnboundedSender<Event>,
}

/// The derived view as positions into the store's records
///
/// Rebuilt when the records or the criteria change, so that scrolling and
/// drawing only touch the rows of the current window.
#[derive(Debug, Default)]
struct ViewCache {
    indices: Vec<usize>,
    /// Visible rows that are selected
    selected: usize,
    generation: u64,
}

impl ViewCache {
    fn len(&self) -> usize {
        self.indices.len()
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let [input_area, grid_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        // the grid header takes one row
        self.sync_widgets(grid_area.height.saturating_sub(1));

        let mut res = RosterRender::default();
        res |= self.input.render(input_area, buf);
        res |= self.grid.render(grid_area, buf);
        res |= self.footer.render(footer_area, buf);
        if res.window_changed {
            trace!("window now {:?}", self.virtualizer.window().range());
        }
        self.cursor_pos = (input_area.x + self.input.cursor_column(), input_area.y);
    }
}

impl App {
    /// Creates the app; remote results are delivered through `event_tx`
    pub fn from_options(
        options: RosterOptions,
        theme: Arc<ColorTheme>,
        remote: Arc<dyn RemoteStore>,
        event_tx: UnboundedSender<Event>,
    ) -> Self {
        let input = Input::from_options(&options, theme.clone());
        let mut store = RecordStore::new();
        store.set_search(input.value.clone());
        Self {
            store,
            remote,
            should_quit: false,
            cursor: 0,
            cursor_pos: (0, 0),
            virtualizer: Virtualizer::new(options.row_height, options.overscan),
            input,
            grid: Grid::from_options(&options, theme.clone()),
            footer: Footer::from_options(&options, theme.clone()),
            theme,
            options,
            view: ViewCache::default(),
            event_tx,
        }
    }

    /// Starts fetching the records; a previous load still in flight is superseded
    pub fn reload(&mut self) {
        let ticket = self.store.begin_load();
        let remote = self.remote.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = remote.fetch_all().await;
            _ = tx.send(Event::Loaded { ticket, result });
        });
    }

    fn send_patch(&self, pending: PendingMutation) {
        let remote = self.remote.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            let result = remote.patch_viewed(pending.request().clone()).await;
            _ = tx.send(Event::Patched { pending, result });
        });
    }

    /// Copies what the next frame shows into the widgets
    fn sync_widgets(&mut self, viewport_height: u16) {
        let len = self.view.len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
        self.virtualizer.set_viewport_height(viewport_height as u64);
        self.virtualizer.set_row_count(len);
        let window = self.virtualizer.scroll_to_index(self.cursor);

        let rows = window
            .range()
            .filter_map(|i| self.row(i))
            .map(|r| GridRow::new(r, self.store.is_viewed(&r.id), self.store.is_selected(&r.id)))
            .collect();
        self.grid.set_window(window, rows);
        self.grid.cursor = (len > 0).then_some(self.cursor);

        self.grid.header = GridHeader {
            select_all: match self.view.selected {
                0 => SelectAll::None,
                n if n == len => SelectAll::All,
                _ => SelectAll::Some,
            },
            health_filters: self.store.criteria().health_filters.clone(),
            sort: self.store.criteria().sort,
        };
        self.grid.body = match self.store.error() {
            _ if self.store.is_loading() => GridBody::Loading,
            Some(message) if self.store.load_failed() => GridBody::Failed(message.to_string()),
            _ => GridBody::Rows,
        };

        let visible = window.visible_range();
        let (first, last) = if visible.is_empty() {
            (0, 0)
        } else {
            (visible.start + 1, visible.end)
        };
        self.footer.info = FooterInfo {
            first,
            last,
            shown: len,
            total: self.store.records().len(),
            mutating: self.store.is_mutating(),
        };
        self.footer.error = if self.store.load_failed() {
            None
        } else {
            self.store.error().map(String::from)
        };
        self.input.selected = self.store.selection().len();
    }

    /// Handles a TUI event and updates application state
    pub fn handle_event<B: Backend>(&mut self, tui: &mut Tui<B>, event: Event) -> Result<()>
    where
        B::Error: Send + Sync + 'static,
    {
        match event {
            Event::Render => {
                tui.draw(|f| {
                    f.render_widget(&mut *self, f.area());
                    f.set_cursor_position(Position::from(self.cursor_pos));
                })?;
            }
            Event::Clear => {
                tui.clear()?;
            }
            Event::Quit => {
                self.should_quit = true;
            }
            Event::Error(msg) => {
                tui.exit()?;
                bail!(msg);
            }
            event => {
                for evt in self.process(event) {
                    tui.event_tx.send(evt)?;
                }
            }
        };

        Ok(())
    }

    /// Applies a non-terminal event, returning the follow-up events
    pub fn process(&mut self, event: Event) -> Vec<Event> {
        match event {
            Event::Key(key) => self.handle_key(&key),
            Event::Action(act) => self.handle_action(&act),
            Event::Mouse(mouse) => self.handle_mouse(&mouse),
            Event::Loaded { ticket, result } => {
                self.store.finish_load(ticket, result);
                self.on_view_changed();
                vec![Event::Render]
            }
            Event::Patched { pending, result } => {
                if let Some(outcome) = self.store.settle_bulk_viewed(&pending, result) {
                    debug!("bulk update #{} settled: {outcome:?}", pending.token());
                }
                vec![Event::Render]
            }
            Event::Quit => {
                self.should_quit = true;
                vec![]
            }
            _ => vec![],
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Vec<Event> {
        debug!("key event: {:?}", key);

        if let Some(act) = self.options.keymap.get(key) {
            debug!("{act:?}");
            return act.iter().map(|a| Event::Action(a.clone())).collect();
        }
        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char(c)) => vec![Event::Action(Action::AddChar(c))],
            (KeyModifiers::SHIFT, KeyCode::Char(c)) => c
                .to_uppercase()
                .next()
                .map(|c| vec![Event::Action(Action::AddChar(c))])
                .unwrap_or_default(),
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> Vec<Event> {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.handle_action(&Action::Down(1)),
            MouseEventKind::ScrollUp => self.handle_action(&Action::Up(1)),
            _ => vec![],
        }
    }

    fn handle_action(&mut self, act: &Action) -> Vec<Event> {
        use Action::*;
        match act {
            Abort => {
                if self.store.is_mutating() {
                    warn!("exiting with a bulk update in flight");
                }
                self.should_quit = true;
            }
            AddChar(c) => {
                self.input.insert(*c);
                self.on_query_changed();
            }
            BackwardChar => {
                self.input.move_cursor(-1);
            }
            BackwardDeleteChar => {
                if self.input.delete(true).is_some() {
                    self.on_query_changed();
                }
            }
            BackwardKillWord => {
                if !self.input.delete_backward_word().is_empty() {
                    self.on_query_changed();
                }
            }
            BackwardWord => {
                self.input.move_cursor_backward_word();
            }
            BeginningOfLine => {
                self.input.move_to_start();
            }
            ClearFilters => {
                self.store.clear_health_filters();
                self.on_criteria_changed();
            }
            ClearQuery => {
                self.input.set("");
                self.on_query_changed();
            }
            ClearScreen => {
                return vec![Event::Clear];
            }
            CycleSort => {
                self.store.cycle_sort();
                self.on_criteria_changed();
            }
            DeleteChar => {
                if self.input.delete(false).is_some() {
                    self.on_query_changed();
                }
            }
            DeselectAll => {
                self.store.clear_selection();
                self.view.selected = 0;
            }
            DismissError => {
                self.store.clear_error();
            }
            Down(n) => {
                self.move_cursor(*n as i64);
            }
            EndOfLine => {
                self.input.move_to_end();
            }
            First => {
                self.cursor = 0;
            }
            ForwardChar => {
                self.input.move_cursor(1);
            }
            ForwardWord => {
                self.input.move_cursor_forward_word();
            }
            Ignore => (),
            Last => {
                self.cursor = self.view.len().saturating_sub(1);
            }
            MarkViewed | MarkUnviewed => {
                let viewed = *act == MarkViewed;
                if self.store.is_mutating() {
                    debug!("{act:?} ignored: a bulk update is in flight");
                } else if self.store.selection().is_empty() {
                    debug!("{act:?} ignored: nothing selected");
                } else {
                    match self.store.mark_selected_viewed(viewed) {
                        Ok(pending) => {
                            self.view.selected = 0;
                            self.send_patch(pending);
                        }
                        Err(e) => debug!("{act:?} rejected: {e}"),
                    }
                }
            }
            PageDown(n) => {
                let page = self.virtualizer.page_size() as i64;
                self.move_cursor(page * *n as i64);
            }
            PageUp(n) => {
                let page = self.virtualizer.page_size() as i64;
                self.move_cursor(-page * *n as i64);
            }
            Reload => {
                self.reload();
            }
            SetQuery(q) => {
                self.input.set(q);
                self.on_query_changed();
            }
            Toggle => {
                let id = self.row(self.cursor).map(|r| r.id.clone());
                if let Some(id) = id
                    && self.store.toggle_select(&id)
                {
                    if self.store.is_selected(&id) {
                        self.view.selected += 1;
                    } else {
                        self.view.selected = self.view.selected.saturating_sub(1);
                    }
                }
            }
            ToggleAll => {
                let all_selected = self.view.selected == self.view.len();
                let ids = self.visible_ids();
                self.store.toggle_select_all(&ids);
                self.view.selected = if all_selected { 0 } else { self.view.len() };
            }
            ToggleHealth(health) => {
                self.store.toggle_health_filter(*health);
                self.on_criteria_changed();
            }
            UnixLineDiscard => {
                if !self.input.delete_to_beginning().is_empty() {
                    self.on_query_changed();
                }
            }
            Up(n) => {
                self.move_cursor(-(*n as i64));
            }
        }
        vec![]
    }

    fn move_cursor(&mut self, delta: i64) {
        let last = self.view.len().saturating_sub(1) as i64;
        self.cursor = (self.cursor as i64 + delta).clamp(0, last) as usize;
    }

    fn on_query_changed(&mut self) {
        self.store.set_search(self.input.value.clone());
        self.on_criteria_changed();
    }

    fn on_criteria_changed(&mut self) {
        self.cursor = 0;
        self.on_view_changed();
    }

    fn on_view_changed(&mut self) {
        self.refresh_view();
        let len = self.view.len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
        self.virtualizer.set_row_count(len);
        self.virtualizer.scroll_to_index(self.cursor);
    }

    /// Re-derives the cached view from the store
    ///
    /// Call after changing the store's records, criteria or selection
    /// without going through [`App::process`].
    pub fn refresh_view(&mut self) {
        let records = self.store.records();
        let indices = derive_indices(records, self.store.criteria());
        self.view.selected = indices
            .iter()
            .filter(|&&i| self.store.is_selected(&records[i].id))
            .count();
        self.view.indices = indices;
        self.view.generation += 1;
        trace!("view #{}: {} rows", self.view.generation, self.view.len());
    }

    /// Bumped on each re-derivation of the view
    pub fn view_generation(&self) -> u64 {
        self.view.generation
    }

    /// Record at view position `index`
    fn row(&self, index: usize) -> Option<&Record> {
        let position = *self.view.indices.get(index)?;
        self.store.records().get(position)
    }

    /// Ids of the current view, in display order
    pub fn visible_ids(&self) -> Vec<String> {
        self.view
            .indices
            .iter()
            .filter_map(|&i| self.store.records().get(i))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Ids of the selected records, in selection order
    pub fn selected_ids(&self) -> Vec<String> {
        self.store.selection().iter().cloned().collect()
    }
}
