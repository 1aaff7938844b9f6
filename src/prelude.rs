//! Convenience re-exports of commonly used types.
//!
//! `use roster::prelude::*;` brings in the options, the store and its
//! collaborators in one statement.

pub use crate::criteria::{Criteria, SortState};
pub use crate::mutation::{MutationState, PendingMutation, ValidationError};
pub use crate::options::{RosterOptions, RosterOptionsBuilder};
pub use crate::pipeline::{DerivedView, derive_indices, derive_view};
pub use crate::record::{Health, Location, Record, RecordCollection, RecordError};
pub use crate::remote::{HttpRemote, LocalRemote, PatchRequest, PatchResponse, RemoteError, RemoteStore};
pub use crate::store::{LoadOutcome, LoadTicket, RecordStore};
pub use crate::tui::{Event, event::Action};
pub use crate::window::{Virtualizer, Window, WindowParams, compute_window};
pub use crate::{Roster, RosterOutput};
pub use std::sync::Arc;
