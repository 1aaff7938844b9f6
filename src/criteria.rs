//! Search, filter and sort criteria driving the derived view.

use std::collections::BTreeSet;

use crate::record::Health;

/// Sort state of the power column
///
/// Cycles `Unsorted -> Ascending -> Descending -> Unsorted`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortState {
    /// Collection order
    #[default]
    Unsorted,
    /// Lowest power first
    Ascending,
    /// Highest power first
    Descending,
}

impl SortState {
    /// The state that follows `self` in the toggle cycle
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            SortState::Unsorted => SortState::Ascending,
            SortState::Ascending => SortState::Descending,
            SortState::Descending => SortState::Unsorted,
        }
    }

    /// Column header indicator
    pub fn indicator(&self) -> &'static str {
        match self {
            SortState::Unsorted => "↕",
            SortState::Ascending => "↑",
            SortState::Descending => "↓",
        }
    }
}

/// Criteria owned by the store, never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    /// Case-insensitive substring matched against name and location
    pub search_query: String,
    /// Health values to keep; empty keeps everything
    pub health_filters: BTreeSet<Health>,
    /// Power sort
    pub sort: SortState,
}

impl Criteria {
    /// Adds the value to the filters, or removes it if already present
    pub fn toggle_health(&mut self, health: Health) {
        if !self.health_filters.remove(&health) {
            self.health_filters.insert(health);
        }
    }

    /// Whether search or category filtering may hide records
    pub fn is_filtering(&self) -> bool {
        !self.search_query.is_empty() || !self.health_filters.is_empty()
    }
}
