//! Location values flowing between extraction, resolution and writing

use crate::hierarchy::HierarchyLevel;
use std::collections::BTreeMap;
use std::fmt;

/// One result row as an ordered column-name to value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Option<String>)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: Option<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<String>) {
        self.fields.push((name.into(), value));
    }

    /// `None` when the column is absent or its value is null.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A distinct combination of values for the active levels.
///
/// Equality and hashing are exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LocationTuple {
    values: BTreeMap<HierarchyLevel, Option<String>>,
}

impl LocationTuple {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, level: HierarchyLevel, value: Option<&str>) -> Self {
        self.set(level, value.map(str::to_string));
        self
    }

    pub fn set(&mut self, level: HierarchyLevel, value: Option<String>) {
        self.values.insert(level, value);
    }

    pub fn get(&self, level: HierarchyLevel) -> Option<&str> {
        self.values.get(&level).and_then(|value| value.as_deref())
    }

    pub fn levels(&self) -> impl Iterator<Item = HierarchyLevel> + '_ {
        self.values.keys().copied()
    }

    /// Levels carrying a non-null value, in significance order.
    pub fn present(&self) -> impl Iterator<Item = (HierarchyLevel, &str)> {
        self.values
            .iter()
            .filter_map(|(level, value)| value.as_deref().map(|v| (*level, v)))
    }

    pub fn has_values(&self) -> bool {
        self.present().next().is_some()
    }
}

impl fmt::Display for LocationTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (level, value)) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match value {
                Some(value) => write!(f, "{}: {:?}", level, value)?,
                None => write!(f, "{}: null", level)?,
            }
        }
        write!(f, "}}")
    }
}

/// Outcome of one master-table lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLocation {
    Matched {
        location_id: String,
        /// The tuple as extracted from the fact table.
        source: LocationTuple,
        /// Active-level values as returned by the master table, falling back
        /// to the source value for levels the lookup did not project.
        resolved: LocationTuple,
    },
    Miss(LocationTuple),
}

impl ResolvedLocation {
    pub fn is_match(&self) -> bool {
        matches!(self, ResolvedLocation::Matched { .. })
    }

    pub fn location_id(&self) -> Option<&str> {
        match self {
            ResolvedLocation::Matched { location_id, .. } => Some(location_id),
            ResolvedLocation::Miss(_) => None,
        }
    }

    pub fn source(&self) -> &LocationTuple {
        match self {
            ResolvedLocation::Matched { source, .. } => source,
            ResolvedLocation::Miss(source) => source,
        }
    }
}
