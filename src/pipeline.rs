//! Derives the ordered row set from records and criteria.
//!
//! The view is `sort(filter(search(records)))`. It borrows the records, never
//! copies them, and is recomputed from scratch whenever an input changes.

use crate::criteria::{Criteria, SortState};
use crate::record::Record;

/// Ordered rows to display
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DerivedView<'a> {
    rows: Vec<&'a Record>,
}

impl<'a> DerivedView<'a> {
    /// Rows in display order
    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    /// Row at `index` in display order
    pub fn get(&self, index: usize) -> Option<&'a Record> {
        self.rows.get(index).copied()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the view is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ids in display order, the "visible ids" for select-all
    pub fn ids(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.id.clone()).collect()
    }
}

fn matches_query(record: &Record, lowered_query: &str) -> bool {
    lowered_query.is_empty()
        || record.name.to_lowercase().contains(lowered_query)
        || record.location.as_str().to_lowercase().contains(lowered_query)
}

/// Positions in `records` of the rows for the given criteria, in display order
///
/// This is the whole derivation; [`derive_view`] only resolves the positions.
/// Callers that keep the result across frames must rebuild it when the
/// records or the criteria change.
pub fn derive_indices(records: &[Record], criteria: &Criteria) -> Vec<usize> {
    let query = criteria.search_query.to_lowercase();
    let mut indices: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches_query(r, &query))
        .filter(|(_, r)| criteria.health_filters.is_empty() || criteria.health_filters.contains(&r.health))
        .map(|(i, _)| i)
        .collect();

    // sort_by_key is stable: equal powers keep collection order
    match criteria.sort {
        SortState::Unsorted => (),
        SortState::Ascending => indices.sort_by_key(|&i| records[i].power),
        SortState::Descending => indices.sort_by_key(|&i| std::cmp::Reverse(records[i].power)),
    }
    trace!("derived view: {} of {} records", indices.len(), records.len());
    indices
}

/// Builds the view for the given criteria
pub fn derive_view<'a>(records: &'a [Record], criteria: &Criteria) -> DerivedView<'a> {
    let rows = derive_indices(records, criteria)
        .into_iter()
        .map(|i| &records[i])
        .collect();
    DerivedView { rows }
}
