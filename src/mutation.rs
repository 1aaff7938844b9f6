//! Optimistic bulk mutation of a boolean record field.
//!
//! A mutation captures the inverse patch, applies the forward patch locally
//! right away, and hands a [`PendingMutation`] to the caller which performs the
//! remote call. Settling the mutation either keeps the optimistic state
//! (commit) or applies the inverse patch (rollback). Only one mutation may be
//! in flight at a time.

use std::marker::PhantomData;

use thiserror::Error;

use crate::record::{Record, RecordCollection};
use crate::remote::{PatchRequest, PatchResponse, RemoteError};

/// A boolean field of [`Record`] that bulk mutations can target
pub trait BoolField {
    /// Field name, for logging
    const NAME: &'static str;
    /// Reads the field
    fn get(record: &Record) -> bool;
    /// Writes the field
    fn set(record: &mut Record, value: bool);
}

/// The `viewed` flag
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewed;

impl BoolField for Viewed {
    const NAME: &'static str = "viewed";

    fn get(record: &Record) -> bool {
        record.viewed
    }

    fn set(record: &mut Record, value: bool) {
        record.viewed = value;
    }
}

/// Malformed commands, rejected before any state change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No ids given
    #[error("no records to update")]
    EmptyBatch,
    /// An id does not exist in the collection
    #[error("unknown record id {0}")]
    UnknownId(String),
    /// Another bulk mutation has not settled yet
    #[error("an update is already in progress")]
    MutationInFlight,
}

/// Sets one boolean field to `value` on every listed record
#[derive(Debug, Clone)]
pub struct BoolFieldPatch<F> {
    ids: Vec<String>,
    value: bool,
    field: PhantomData<F>,
}

/// Previous values captured before a [`BoolFieldPatch`] was applied
#[derive(Debug, Clone)]
pub struct InversePatch<F> {
    previous: Vec<(String, bool)>,
    field: PhantomData<F>,
}

impl<F: BoolField> BoolFieldPatch<F> {
    /// Creates a patch, dropping repeated ids while keeping the first occurrence order
    pub fn new(ids: impl IntoIterator<Item = String>, value: bool) -> Self {
        let mut seen = std::collections::HashSet::new();
        let ids = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
        Self {
            ids,
            value,
            field: PhantomData,
        }
    }

    /// Target ids
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Target value
    pub fn value(&self) -> bool {
        self.value
    }

    /// Checks that every id exists and that there is something to do
    pub fn validate(&self, records: &RecordCollection) -> Result<(), ValidationError> {
        if self.ids.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }
        if let Some(unknown) = self.ids.iter().find(|id| !records.contains(id)) {
            return Err(ValidationError::UnknownId(unknown.clone()));
        }
        Ok(())
    }

    /// Captures the current values, then applies the patch
    pub fn apply(&self, records: &mut RecordCollection) -> InversePatch<F> {
        let mut previous = Vec::with_capacity(self.ids.len());
        for id in &self.ids {
            if let Some(record) = records.get_mut(id) {
                previous.push((id.clone(), F::get(record)));
                F::set(record, self.value);
            }
        }
        InversePatch {
            previous,
            field: PhantomData,
        }
    }
}

impl<F: BoolField> InversePatch<F> {
    /// Restores every captured value
    ///
    /// Records that disappeared since (collection replaced) are skipped.
    pub fn apply(&self, records: &mut RecordCollection) {
        for (id, value) in &self.previous {
            match records.get_mut(id) {
                Some(record) => F::set(record, *value),
                None => debug!("rollback: record {id} no longer exists"),
            }
        }
    }

    /// Captured `(id, previous value)` pairs
    pub fn previous(&self) -> &[(String, bool)] {
        &self.previous
    }
}

/// Lifecycle of a bulk mutation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationState {
    /// Nothing in flight
    #[default]
    Idle,
    /// Applied locally, waiting for the remote
    Pending,
    /// The remote accepted the change
    Committed,
    /// The remote failed, local change reverted
    RolledBack,
}

/// Handle for an applied-but-unconfirmed mutation, to be settled with the remote result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMutation {
    token: u64,
    request: PatchRequest,
}

impl PendingMutation {
    /// Body of the remote bulk-patch call
    pub fn request(&self) -> &PatchRequest {
        &self.request
    }

    /// Mutation sequence number
    pub fn token(&self) -> u64 {
        self.token
    }
}

struct InFlight<F> {
    token: u64,
    inverse: InversePatch<F>,
}

/// Drives optimistic apply, commit and rollback for one boolean field
pub struct BulkMutationCoordinator<F> {
    state: MutationState,
    last_outcome: Option<MutationState>,
    next_token: u64,
    in_flight: Option<InFlight<F>>,
}

impl<F> Default for BulkMutationCoordinator<F> {
    fn default() -> Self {
        Self {
            state: MutationState::Idle,
            last_outcome: None,
            next_token: 0,
            in_flight: None,
        }
    }
}

impl<F: BoolField> BulkMutationCoordinator<F> {
    /// `Idle` or `Pending`
    pub fn state(&self) -> MutationState {
        self.state
    }

    /// `Committed` or `RolledBack` for the last settled mutation
    pub fn last_outcome(&self) -> Option<MutationState> {
        self.last_outcome
    }

    /// Whether a mutation awaits its remote result
    pub fn is_pending(&self) -> bool {
        self.state == MutationState::Pending
    }

    /// Validates and applies the patch locally, moving to `Pending`
    pub fn begin(
        &mut self,
        records: &mut RecordCollection,
        patch: BoolFieldPatch<F>,
    ) -> Result<PendingMutation, ValidationError> {
        if self.is_pending() {
            return Err(ValidationError::MutationInFlight);
        }
        patch.validate(records)?;

        let inverse = patch.apply(records);
        self.next_token += 1;
        let token = self.next_token;
        debug!(
            "mutation #{token}: set {} = {} on {} records",
            F::NAME,
            patch.value(),
            patch.ids().len()
        );
        self.in_flight = Some(InFlight { token, inverse });
        self.state = MutationState::Pending;

        Ok(PendingMutation {
            token,
            request: PatchRequest {
                ids: patch.ids,
                viewed: patch.value,
            },
        })
    }

    /// Commits or rolls back according to the remote result, back to `Idle`
    ///
    /// Returns `None` when `pending` is not the mutation in flight.
    pub fn settle(
        &mut self,
        records: &mut RecordCollection,
        pending: &PendingMutation,
        result: &Result<PatchResponse, RemoteError>,
    ) -> Option<MutationState> {
        let Some(in_flight) = self.in_flight.take_if(|f| f.token == pending.token) else {
            warn!("mutation #{}: settled but not in flight, ignoring", pending.token);
            return None;
        };

        let outcome = match result {
            Ok(response) if response.success => {
                debug!(
                    "mutation #{}: committed, {} updated remotely",
                    in_flight.token, response.updated_count
                );
                MutationState::Committed
            }
            Ok(_) => {
                warn!("mutation #{}: remote reported failure, rolling back", in_flight.token);
                in_flight.inverse.apply(records);
                MutationState::RolledBack
            }
            Err(e) => {
                warn!("mutation #{}: {e}, rolling back", in_flight.token);
                in_flight.inverse.apply(records);
                MutationState::RolledBack
            }
        };
        self.state = MutationState::Idle;
        self.last_outcome = Some(outcome);
        Some(outcome)
    }
}
