//! Records displayed in the grid and their closed value sets.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest power a record may carry
pub const MIN_POWER: u32 = 100;
/// Highest power a record may carry
pub const MAX_POWER: u32 = 10_000;

/// Where a record belongs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// Konoha
    Konoha,
    /// Suna
    Suna,
    /// Kiri
    Kiri,
    /// Iwa
    Iwa,
    /// Kumo
    Kumo,
}

impl Location {
    /// Every location, in declaration order
    pub const ALL: [Location; 5] = [
        Location::Konoha,
        Location::Suna,
        Location::Kiri,
        Location::Iwa,
        Location::Kumo,
    ];

    /// Display name, also used for search matching
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Konoha => "Konoha",
            Location::Suna => "Suna",
            Location::Kiri => "Kiri",
            Location::Iwa => "Iwa",
            Location::Kumo => "Kumo",
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Health status, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Health {
    /// No injuries
    Healthy,
    /// Injured, still active
    Injured,
    /// Critical condition
    Critical,
}

impl Health {
    /// Every health status, from least to most severe
    pub const ALL: [Health; 3] = [Health::Healthy, Health::Injured, Health::Critical];

    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Health::Healthy => "Healthy",
            Health::Injured => "Injured",
            Health::Critical => "Critical",
        }
    }
}

impl Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Health {
    type Error = RecordError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "healthy" => Ok(Self::Healthy),
            "injured" => Ok(Self::Injured),
            "critical" => Ok(Self::Critical),
            _ => Err(RecordError::UnknownHealth(value.to_string())),
        }
    }
}

/// Errors raised while validating records
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RecordError {
    /// A record has an empty id
    #[error("record has an empty id")]
    EmptyId,
    /// Power outside of the allowed range
    #[error("record {id}: power {power} outside of {MIN_POWER}..={MAX_POWER}")]
    PowerOutOfRange {
        /// Offending record
        id: String,
        /// Offending value
        power: u32,
    },
    /// The same id appears twice in a collection
    #[error("duplicate record id {0}")]
    DuplicateId(String),
    /// Unparseable health status
    #[error("unknown health status {0:?}")]
    UnknownHealth(String),
}

/// A single row of data
///
/// Only `viewed` ever changes during a record's lifetime, and only through
/// [`RecordStore`](crate::store::RecordStore) bulk mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable unique identity
    pub id: String,
    /// Display name
    pub name: String,
    /// Location
    pub location: Location,
    /// Health status
    pub health: Health,
    /// Power level, within `MIN_POWER..=MAX_POWER`
    pub power: u32,
    /// Whether the record was marked as viewed
    #[serde(default)]
    pub viewed: bool,
}

impl Record {
    /// Creates an unviewed record
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: Location, health: Health, power: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            health,
            power,
            viewed: false,
        }
    }

    /// Checks the invariants of a single record
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.id.is_empty() {
            return Err(RecordError::EmptyId);
        }
        if !(MIN_POWER..=MAX_POWER).contains(&self.power) {
            return Err(RecordError::PowerOutOfRange {
                id: self.id.clone(),
                power: self.power,
            });
        }
        Ok(())
    }
}

/// Validates a whole collection: every record, and id uniqueness across them
pub fn validate_collection(records: &[Record]) -> Result<(), RecordError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        record.validate()?;
        if !seen.insert(record.id.as_str()) {
            return Err(RecordError::DuplicateId(record.id.clone()));
        }
    }
    Ok(())
}

/// Records in collection order, indexed by id
#[derive(Debug, Clone, Default)]
pub struct RecordCollection {
    records: Vec<Record>,
    positions: HashMap<String, usize>,
}

impl RecordCollection {
    /// Builds a collection after validating it
    pub fn new(records: Vec<Record>) -> Result<Self, RecordError> {
        validate_collection(&records)?;
        let positions = records
            .iter()
            .enumerate()
            .map(|(pos, r)| (r.id.clone(), pos))
            .collect();
        Ok(Self { records, positions })
    }

    /// Records in collection order
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Record by id
    pub fn get(&self, id: &str) -> Option<&Record> {
        self.positions.get(id).map(|&pos| &self.records[pos])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Record> {
        self.positions.get(id).map(|&pos| &mut self.records[pos])
    }

    /// Iterates in collection order
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}
