//! The record store: single source of truth for records, criteria, selection
//! and async status.
//!
//! All commands are synchronous. The two remote legs (loading and the bulk
//! patch) are split into a `begin_*` step that returns a ticket and a
//! `finish_*`/`settle_*` step that consumes the remote result, so that an
//! event loop can run the remote call elsewhere and resume on its own task.
//! Failures never escape the store: they land in [`RecordStore::error`].

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::criteria::Criteria;
use crate::mutation::{BoolFieldPatch, BulkMutationCoordinator, MutationState, PendingMutation, ValidationError, Viewed};
use crate::pipeline::{DerivedView, derive_view};
use crate::record::{Health, Record, RecordCollection};
use crate::remote::{PatchResponse, RemoteError, RemoteStore};

/// Identifies one load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// What happened to a load completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The collection was replaced
    Applied,
    /// The load failed, collection unchanged
    Failed,
    /// A newer load was issued since, response discarded
    Stale,
}

/// Records, criteria, selection and status
#[derive(Default)]
pub struct RecordStore {
    records: RecordCollection,
    criteria: Criteria,
    selection: IndexSet<String>,
    viewed: HashSet<String>,
    is_loading: bool,
    load_failed: bool,
    error: Option<String>,
    load_token: u64,
    mutations: BulkMutationCoordinator<Viewed>,
}

impl RecordStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns to the initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    //--------------------------------------------------------------------------
    // Read access

    /// Full collection, in collection order
    pub fn records(&self) -> &[Record] {
        self.records.as_slice()
    }

    /// Record by id
    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.get(id)
    }

    /// Current criteria
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    /// Selected ids, in selection order
    pub fn selection(&self) -> &IndexSet<String> {
        &self.selection
    }

    /// Whether `id` is selected
    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Ids whose `viewed` flag is set
    pub fn viewed_ids(&self) -> &HashSet<String> {
        &self.viewed
    }

    /// Whether `id` is viewed
    pub fn is_viewed(&self, id: &str) -> bool {
        self.viewed.contains(id)
    }

    /// A load is in flight
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// A bulk mutation is in flight
    pub fn is_mutating(&self) -> bool {
        self.mutations.is_pending()
    }

    /// `Idle` or `Pending`
    pub fn mutation_state(&self) -> MutationState {
        self.mutations.state()
    }

    /// Outcome of the last settled bulk mutation
    pub fn last_mutation_outcome(&self) -> Option<MutationState> {
        self.mutations.last_outcome()
    }

    /// Last failure, human readable
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the last finished load failed
    ///
    /// The failure message is in [`error`](Self::error) until dismissed.
    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    /// Dismisses the last failure
    pub fn clear_error(&mut self) {
        self.error = None;
        self.load_failed = false;
    }

    /// Ordered rows for the current criteria
    pub fn view(&self) -> DerivedView<'_> {
        derive_view(self.records.as_slice(), &self.criteria)
    }

    /// Ids of the current view, in display order
    pub fn visible_ids(&self) -> Vec<String> {
        self.view().ids()
    }

    //--------------------------------------------------------------------------
    // Loading

    /// Marks a load as started and returns its ticket
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_token += 1;
        self.is_loading = true;
        self.load_failed = false;
        self.error = None;
        debug!("load #{} started", self.load_token);
        LoadTicket(self.load_token)
    }

    /// Consumes the result of the load identified by `ticket`
    ///
    /// Only the latest ticket is honoured. On success the collection is
    /// replaced and the viewed cache rebuilt from scratch; on failure nothing
    /// but the status changes.
    pub fn finish_load(&mut self, ticket: LoadTicket, result: Result<Vec<Record>, RemoteError>) -> LoadOutcome {
        if ticket.0 != self.load_token {
            debug!("load #{} superseded by #{}, discarding", ticket.0, self.load_token);
            return LoadOutcome::Stale;
        }
        self.is_loading = false;

        let collection = result.and_then(|records| RecordCollection::new(records).map_err(RemoteError::from));
        match collection {
            Ok(collection) => {
                info!("load #{}: {} records", ticket.0, collection.len());
                self.load_failed = false;
                self.records = collection;
                self.rebuild_viewed();
                let before = self.selection.len();
                self.selection.retain(|id| self.records.contains(id));
                if before != self.selection.len() {
                    debug!("load dropped {} stale selections", before - self.selection.len());
                }
                LoadOutcome::Applied
            }
            Err(e) => {
                error!("load #{} failed: {e}", ticket.0);
                self.error = Some(format!("Failed to load records: {e}"));
                self.load_failed = true;
                LoadOutcome::Failed
            }
        }
    }

    /// Fetches the collection from `remote`
    pub async fn load(&mut self, remote: &dyn RemoteStore) -> LoadOutcome {
        let ticket = self.begin_load();
        let result = remote.fetch_all().await;
        self.finish_load(ticket, result)
    }

    fn rebuild_viewed(&mut self) {
        self.viewed = self
            .records
            .iter()
            .filter(|r| r.viewed)
            .map(|r| r.id.clone())
            .collect();
    }

    //--------------------------------------------------------------------------
    // Criteria

    /// Sets the search query
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.criteria.search_query = query.into();
    }

    /// Adds or removes a health filter
    pub fn toggle_health_filter(&mut self, health: Health) {
        self.criteria.toggle_health(health);
    }

    /// Removes every health filter
    pub fn clear_health_filters(&mut self) {
        self.criteria.health_filters.clear();
    }

    /// Advances the power sort: unsorted, ascending, descending, unsorted...
    pub fn cycle_sort(&mut self) {
        self.criteria.sort = self.criteria.sort.next();
        trace!("sort is now {:?}", self.criteria.sort);
    }

    //--------------------------------------------------------------------------
    // Selection

    /// Selects or deselects one record; unknown ids are ignored
    ///
    /// Returns whether the selection changed.
    pub fn toggle_select(&mut self, id: &str) -> bool {
        if !self.records.contains(id) {
            warn!("cannot select unknown record {id}");
            return false;
        }
        if !self.selection.shift_remove(id) {
            self.selection.insert(id.to_string());
        }
        true
    }

    /// Select-all over `visible_ids`
    ///
    /// If every given id is selected, deselects exactly those; otherwise
    /// selects the missing ones. Selections outside the given ids are kept.
    pub fn toggle_select_all(&mut self, visible_ids: &[String]) {
        let known: Vec<&String> = visible_ids.iter().filter(|id| self.records.contains(id)).collect();
        if known.iter().all(|id| self.selection.contains(id.as_str())) {
            for id in known {
                self.selection.shift_remove(id.as_str());
            }
        } else {
            for id in known {
                self.selection.insert(id.clone());
            }
        }
    }

    /// Deselects everything
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    //--------------------------------------------------------------------------
    // Bulk viewed changes

    /// Applies `viewed` to `ids` locally and consumes the selection
    ///
    /// The returned handle carries the request to send to the remote; its
    /// result must be passed to [`settle_bulk_viewed`](Self::settle_bulk_viewed).
    pub fn begin_bulk_viewed(&mut self, ids: Vec<String>, viewed: bool) -> Result<PendingMutation, ValidationError> {
        let patch = BoolFieldPatch::<Viewed>::new(ids, viewed);
        match self.mutations.begin(&mut self.records, patch) {
            Ok(pending) => {
                for id in &pending.request().ids {
                    if viewed {
                        self.viewed.insert(id.clone());
                    } else {
                        self.viewed.remove(id);
                    }
                }
                self.selection.clear();
                self.clear_error();
                Ok(pending)
            }
            Err(e) => {
                warn!("bulk viewed change rejected: {e}");
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Same as [`begin_bulk_viewed`](Self::begin_bulk_viewed) over the current selection
    pub fn mark_selected_viewed(&mut self, viewed: bool) -> Result<PendingMutation, ValidationError> {
        let ids = self.selection.iter().cloned().collect();
        self.begin_bulk_viewed(ids, viewed)
    }

    /// Commits or rolls back a pending mutation
    pub fn settle_bulk_viewed(
        &mut self,
        pending: &PendingMutation,
        result: Result<PatchResponse, RemoteError>,
    ) -> Option<MutationState> {
        let outcome = self.mutations.settle(&mut self.records, pending, &result)?;
        if outcome == MutationState::RolledBack {
            self.rebuild_viewed();
            self.error = Some(match result {
                Err(e) => format!("Failed to update records: {e}"),
                Ok(_) => String::from("Failed to update records: rejected by server"),
            });
        }
        Some(outcome)
    }

    /// Optimistically sets `viewed` on `ids` and persists it through `remote`
    pub async fn apply_bulk_viewed_change(
        &mut self,
        remote: &dyn RemoteStore,
        ids: Vec<String>,
        viewed: bool,
    ) -> Result<MutationState, ValidationError> {
        let pending = self.begin_bulk_viewed(ids, viewed)?;
        let result = remote.patch_viewed(pending.request().clone()).await;
        Ok(self
            .settle_bulk_viewed(&pending, result)
            .unwrap_or(MutationState::Idle))
    }
}
