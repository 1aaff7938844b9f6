use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::bail;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use roster::prelude::*;
use roster::theme::ColorTheme;
use roster::tui::{App, Size, Tui};

const WAIT_STEP: Duration = Duration::from_millis(5);
const WAIT_STEPS: usize = 400;

/// `count` records named `ninja-<i>` with power `100 + i`, cycling through health values
pub fn records(count: usize) -> Vec<Record> {
    const HEALTH: [Health; 3] = [Health::Healthy, Health::Injured, Health::Critical];
    (0..count)
        .map(|i| {
            Record::new(
                i.to_string(),
                format!("ninja-{i}"),
                Location::Konoha,
                HEALTH[i % 3],
                100 + i as u32,
            )
        })
        .collect()
}

/// Drives an [`App`] over a [`TestBackend`] the way the event loop in `lib.rs` does
///
/// Remote calls run on `runtime`; [`TestHarness::wait_until`] lets them complete
/// and feeds their results back through the event channel.
pub struct TestHarness {
    pub app: App,
    pub tui: Tui<TestBackend>,
    pub remote: Arc<LocalRemote>,
    pub runtime: tokio::runtime::Runtime,
}

impl TestHarness {
    pub fn new(records: Vec<Record>, width: u16, height: u16) -> Result<Self> {
        Self::with_options(records, RosterOptions::default().build(), width, height)
    }

    pub fn with_options(records: Vec<Record>, options: RosterOptions, width: u16, height: u16) -> Result<Self> {
        Self::with_remote(LocalRemote::new(records), options, width, height)
    }

    pub fn with_remote(remote: LocalRemote, options: RosterOptions, width: u16, height: u16) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let remote = Arc::new(remote);
        let tui = {
            let _guard = runtime.enter();
            Tui::new_with_height(TestBackend::new(width, height), Size::Percent(100))?
        };
        let theme = Arc::new(ColorTheme::init_from_options(&options));
        let app = App::from_options(options, theme, remote.clone(), tui.event_tx.clone());
        Ok(Self {
            app,
            tui,
            remote,
            runtime,
        })
    }

    /// Creates the harness and waits for the first load to finish
    pub fn loaded(records: Vec<Record>, width: u16, height: u16) -> Result<Self> {
        let mut h = Self::new(records, width, height)?;
        h.reload()?;
        Ok(h)
    }

    /// Processes every queued event, including the ones queued while processing
    pub fn tick(&mut self) -> Result<()> {
        let _guard = self.runtime.enter();
        while let Ok(event) = self.tui.event_rx.try_recv() {
            self.app.handle_event(&mut self.tui, event)?;
        }
        Ok(())
    }

    /// Lets spawned remote calls run until `done` holds
    pub fn wait_until(&mut self, done: impl Fn(&App) -> bool) -> Result<()> {
        for _ in 0..WAIT_STEPS {
            self.tick()?;
            if done(&self.app) {
                return Ok(());
            }
            self.runtime.block_on(async { tokio::time::sleep(WAIT_STEP).await });
        }
        bail!("condition not reached in time")
    }

    pub fn reload(&mut self) -> Result<()> {
        self.action(Action::Reload)?;
        self.wait_until(|app| !app.store.is_loading())
    }

    pub fn send(&mut self, event: Event) -> Result<()> {
        self.tui.event_tx.send(event)?;
        self.tick()
    }

    pub fn action(&mut self, action: Action) -> Result<()> {
        self.send(Event::Action(action))
    }

    pub fn key(&mut self, key: KeyEvent) -> Result<()> {
        self.send(Event::Key(key))
    }

    pub fn ctrl(&mut self, c: char) -> Result<()> {
        self.key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    pub fn type_str(&mut self, s: &str) -> Result<()> {
        for c in s.chars() {
            self.key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))?;
        }
        Ok(())
    }

    /// Ids of the derived view, in display order
    pub fn view_ids(&self) -> Vec<String> {
        self.app.store.visible_ids()
    }

    /// Draws a frame and returns the screen, one trimmed string per row
    pub fn render(&mut self) -> Result<Vec<String>> {
        let app = &mut self.app;
        self.tui.draw(|f| f.render_widget(&mut *app, f.area()))?;
        let buf = self.tui.backend().buffer();
        let area = buf.area;
        Ok((area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect())
    }
}
