//! Roster is a terminal browser for a collection of character records.
//!
//! It loads the records from a remote collaborator, derives a searched,
//! filtered and sorted view of them, renders only the window of that view
//! that fits the terminal, and applies bulk "viewed" updates optimistically,
//! rolling them back when the collaborator reports a failure.
//!
//! # Examples
//!
//! ```no_run
//! use roster::prelude::*;
//!
//! let options = RosterOptionsBuilder::default()
//!     .data("characters.json")
//!     .height("50%")
//!     .build()
//!     .unwrap();
//!
//! let output = Roster::run_with(options).unwrap();
//! println!("{:?}", output.selected);
//! ```

#![warn(missing_docs)]

#[macro_use]
extern crate log;

use std::sync::Arc;

use color_eyre::eyre::{self, OptionExt, Result};
use ratatui::prelude::CrosstermBackend;

pub use crate::options::{RosterOptions, RosterOptionsBuilder};
pub use crate::record::{Health, Location, Record};
pub use crate::store::RecordStore;
use crate::remote::{HttpRemote, LocalRemote, RemoteStore};
use crate::tui::{App, Tui};

pub mod binds;
pub mod criteria;
pub mod mutation;
pub mod options;
pub mod pipeline;
pub mod prelude;
pub mod record;
pub mod remote;
pub mod store;
pub mod theme;
pub mod tui;
pub mod window;

/// What the user left roster with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterOutput {
    /// Search query at exit
    pub query: String,
    /// Ids of the selected records, in selection order
    pub selected: Vec<String>,
    /// Ids of the records flagged as viewed at exit
    pub viewed: Vec<String>,
}

/// Main entry point for running roster
pub struct Roster;

impl Roster {
    /// Connects to the source named by `options` and runs the TUI until aborted
    pub fn run_with(options: RosterOptions) -> Result<RosterOutput> {
        options.validate()?;
        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(async {
            let remote = Self::connect(&options).await?;
            Self::run_with_remote(options, remote).await
        })
    }

    /// Builds the collaborator described by `--url` or `--data`
    pub async fn connect(options: &RosterOptions) -> Result<Arc<dyn RemoteStore>> {
        options.validate()?;
        if let Some(url) = &options.url {
            info!("using records server at {url}");
            return Ok(Arc::new(HttpRemote::new(url, options.timeout())?));
        }
        let path = options.data.as_ref().ok_or_eyre("no record source")?;
        info!("using records file {}", path.display());
        let latency = options.latency();
        let local = LocalRemote::from_file(path).await?.with_latency(latency, latency);
        Ok(Arc::new(local))
    }

    /// Runs the TUI against an already built collaborator
    ///
    /// Must be called from within a tokio runtime.
    pub async fn run_with_remote(options: RosterOptions, remote: Arc<dyn RemoteStore>) -> Result<RosterOutput> {
        let height = options.size()?;
        let backend = CrosstermBackend::new(std::io::stderr());
        let mut tui = Tui::new_with_height(backend, height)?;

        let theme = Arc::new(crate::theme::ColorTheme::init_from_options(&options));
        let mut app = App::from_options(options, theme, remote, tui.event_tx.clone());

        tui.enter()?;
        app.reload();
        let res: Result<()> = async {
            loop {
                let event = tui.next().await?;
                app.handle_event(&mut tui, event)?;
                if app.should_quit {
                    break;
                }
            }
            eyre::Ok(())
        }
        .await;
        tui.exit()?;
        res?;

        let mut viewed: Vec<String> = app.store.viewed_ids().iter().cloned().collect();
        viewed.sort();
        Ok(RosterOutput {
            query: app.input.to_string(),
            selected: app.selected_ids(),
            viewed,
        })
    }
}
