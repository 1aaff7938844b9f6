//! Configuration options for roster.
//!
//! [`RosterOptions`] is built with a builder when used as a library and parsed
//! from the command line (feature `cli`) by the `roster` binary.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use thiserror::Error;

use crate::binds::KeyMap;
use crate::tui::{Size, SizeParseError};
use crate::window::DEFAULT_OVERSCAN;

/// Invalid configuration
#[derive(Error, Debug)]
pub enum OptionsError {
    /// Neither `--url` nor `--data` was given
    #[error("no record source: pass --url or --data")]
    NoSource,
    /// Both `--url` and `--data` were given
    #[error("--url and --data are mutually exclusive")]
    ConflictingSources,
    /// Bad `--height`
    #[error("invalid height: {0}")]
    Height(#[from] SizeParseError),
    /// Row height must be at least one terminal row
    #[error("row height must be at least 1")]
    RowHeight,
}

/// roster - browse and bulk-flag a collection of character records
///
/// Records are fetched from an HTTP server (`--url`) or from a local JSON
/// file (`--data`). The list can be searched, filtered by health, sorted by
/// power and multi-selected; selected records can be marked as viewed or
/// unviewed in one go.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(name = "final_build"))]
#[builder(default)]
#[cfg_attr(feature = "cli", derive(clap::Parser))]
#[cfg_attr(
    feature = "cli",
    command(name = "roster", args_override_self = true, verbatim_doc_comment, version, about)
)]
pub struct RosterOptions {
    //  --- Source ---
    /// Base url of the records server
    ///
    /// Records are read from `GET <url>/api/characters` and bulk updates are
    /// sent with `PATCH <url>/api/characters`.
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Source"))]
    #[builder(setter(into, strip_option))]
    pub url: Option<String>,

    /// JSON file holding the records
    ///
    /// Bulk updates are written back to the file.
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Source"))]
    #[builder(setter(into, strip_option))]
    pub data: Option<PathBuf>,

    /// Simulated latency of the local source, in milliseconds
    #[cfg_attr(feature = "cli", arg(long, default_value = "0", help_heading = "Source"))]
    pub latency_ms: u64,

    /// Request timeout of the HTTP source, in seconds
    #[cfg_attr(feature = "cli", arg(long, default_value = "10", help_heading = "Source"))]
    pub timeout_secs: u64,

    //  --- Layout ---
    /// Height of roster's window
    ///
    /// Can either be a row count or a percentage.
    #[cfg_attr(feature = "cli", arg(long, default_value = "100%", help_heading = "Layout"))]
    #[builder(setter(into))]
    pub height: String,

    /// Rows rendered beyond the visible area on each side
    #[cfg_attr(feature = "cli", arg(long, default_value = "10", help_heading = "Layout"))]
    pub overscan: usize,

    /// Terminal rows per record
    #[cfg_attr(feature = "cli", arg(long, default_value = "1", help_heading = "Layout"))]
    pub row_height: u64,

    //  --- Interface ---
    /// Comma separated list of bindings
    ///
    /// Each binding follows the format `<key>:<action>`; several actions can
    /// be chained with `+`.
    ///
    /// **Example**: `roster --bind 'ctrl-v:mark-viewed,ctrl-a:toggle-all+mark-viewed'`
    #[cfg_attr(
        feature = "cli",
        arg(short, long, help_heading = "Interface", verbatim_doc_comment, num_args=0..)
    )]
    pub bind: Vec<String>,

    /// Color theme, followed by optional per-component overrides
    ///
    /// Base themes: dark, light, 16, bw, none.
    ///
    /// **Example**: `roster --color 'light,critical:#ff0000:bold'`
    #[cfg_attr(feature = "cli", arg(long, help_heading = "Interface", verbatim_doc_comment))]
    #[builder(setter(into, strip_option))]
    pub color: Option<String>,

    /// Initial search query
    #[cfg_attr(feature = "cli", arg(short, long, help_heading = "Interface"))]
    #[builder(setter(into, strip_option))]
    pub query: Option<String>,

    /// Search prompt
    #[cfg_attr(feature = "cli", arg(long, default_value = "> ", help_heading = "Interface"))]
    #[builder(setter(into))]
    pub prompt: String,

    /// The internal (parsed) keymap
    #[cfg_attr(feature = "cli", clap(skip))]
    pub keymap: KeyMap,
}

impl Default for RosterOptions {
    fn default() -> Self {
        Self {
            url: None,
            data: None,
            latency_ms: 0,
            timeout_secs: 10,
            height: String::from("100%"),
            overscan: DEFAULT_OVERSCAN,
            row_height: 1,
            bind: Vec::new(),
            color: None,
            query: None,
            prompt: String::from("> "),
            keymap: KeyMap::default(),
        }
    }
}

impl RosterOptionsBuilder {
    /// Builds the RosterOptions from the builder
    pub fn build(&mut self) -> Result<RosterOptions, RosterOptionsBuilderError> {
        self.final_build().map(|opts| opts.build())
    }
}

impl RosterOptions {
    /// Finalizes the options by parsing the key bindings
    pub fn build(mut self) -> Self {
        self.keymap = self.bind.iter().fold(KeyMap::default(), |mut res, part| {
            res.add_keymaps(part.split(','));
            res
        });
        self
    }

    /// Checks the combinations clap cannot express
    pub fn validate(&self) -> Result<(), OptionsError> {
        match (&self.url, &self.data) {
            (None, None) => return Err(OptionsError::NoSource),
            (Some(_), Some(_)) => return Err(OptionsError::ConflictingSources),
            _ => (),
        }
        if self.row_height == 0 {
            return Err(OptionsError::RowHeight);
        }
        self.size()?;
        Ok(())
    }

    /// Parsed `height`
    pub fn size(&self) -> Result<Size, OptionsError> {
        Ok(Size::try_from(self.height.as_str())?)
    }

    /// Simulated latency of the local source
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Request timeout of the HTTP source
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::event::Action;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn builder_defaults() {
        let opts = RosterOptionsBuilder::default().url("http://localhost:3000").build().unwrap();
        assert_eq!(opts.overscan, DEFAULT_OVERSCAN);
        assert_eq!(opts.row_height, 1);
        assert_eq!(opts.size().unwrap(), Size::Percent(100));
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn source_is_required_and_exclusive() {
        let opts = RosterOptions::default();
        assert!(matches!(opts.validate(), Err(OptionsError::NoSource)));

        let opts = RosterOptionsBuilder::default()
            .url("http://localhost:3000")
            .data("records.json")
            .build()
            .unwrap();
        assert!(matches!(opts.validate(), Err(OptionsError::ConflictingSources)));
    }

    #[test]
    fn bad_height_and_row_height() {
        let opts = RosterOptionsBuilder::default()
            .data("records.json")
            .height("120%")
            .build()
            .unwrap();
        assert!(matches!(opts.validate(), Err(OptionsError::Height(_))));

        let opts = RosterOptionsBuilder::default()
            .data("records.json")
            .row_height(0)
            .build()
            .unwrap();
        assert!(matches!(opts.validate(), Err(OptionsError::RowHeight)));
    }

    #[test]
    fn binds_override_defaults() {
        let opts = RosterOptionsBuilder::default()
            .bind(vec![String::from("ctrl-v:mark-viewed+first")])
            .build()
            .unwrap();
        assert_eq!(
            opts.keymap.get(&KeyEvent::new(KeyCode::Char('v'), KeyModifiers::CONTROL)),
            Some(&vec![Action::MarkViewed, Action::First])
        );
    }
}
