//! Location hierarchy model
//!
//! Four fixed levels ordered from most to least significant, and the per-level
//! input state requested by the user.

use crate::error::ValidationError;
use crate::identifier::SqlIdentifier;
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// One level of the administrative hierarchy.
///
/// Declaration order is significance order, so the derived `Ord` places
/// `Province` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyLevel {
    Province,
    City,
    District,
    SubDistrict,
}

impl HierarchyLevel {
    pub const ALL: [HierarchyLevel; 4] = [
        HierarchyLevel::Province,
        HierarchyLevel::City,
        HierarchyLevel::District,
        HierarchyLevel::SubDistrict,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Level name, also used as the result alias in fact-table queries and as
    /// the reference column name for static levels.
    pub fn as_str(self) -> &'static str {
        match self {
            HierarchyLevel::Province => "province",
            HierarchyLevel::City => "city",
            HierarchyLevel::District => "district",
            HierarchyLevel::SubDistrict => "sub_district",
        }
    }

    /// Column holding this level in `indonesia_boundaries`.
    pub fn master_column(self) -> &'static str {
        match self {
            HierarchyLevel::Province => "provinsi",
            HierarchyLevel::City => "kota_kabupaten",
            HierarchyLevel::District => "kecamatan",
            HierarchyLevel::SubDistrict => "kelurahan_desa",
        }
    }

    /// Levels more significant than this one.
    pub fn uppers(self) -> &'static [HierarchyLevel] {
        &Self::ALL[..self.index()]
    }
}

impl fmt::Display for HierarchyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a level's value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelSpec {
    Unused,
    /// Per-row values read from a fact-table column.
    Column(SqlIdentifier),
    /// One fixed value applied to every row.
    StaticValue(String),
}

impl LevelSpec {
    /// Build a level from the raw command-line pair.
    ///
    /// Empty strings count as absent. When both are supplied the column wins
    /// and the conflict is logged.
    pub fn from_inputs(
        level: HierarchyLevel,
        column: Option<&str>,
        value: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let column = column.map(str::trim).filter(|c| !c.is_empty());
        let value = value.filter(|v| !v.trim().is_empty());

        match (column, value) {
            (Some(column), Some(value)) => {
                warn!(
                    "Both a column ('{}') and a static value ('{}') were given for {}; using the column",
                    column, value, level
                );
                Ok(LevelSpec::Column(SqlIdentifier::column(column)?))
            }
            (Some(column), None) => Ok(LevelSpec::Column(SqlIdentifier::column(column)?)),
            (None, Some(value)) => Ok(LevelSpec::StaticValue(value.to_string())),
            (None, None) => Ok(LevelSpec::Unused),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, LevelSpec::Unused)
    }

    pub fn column(&self) -> Option<&SqlIdentifier> {
        match self {
            LevelSpec::Column(column) => Some(column),
            _ => None,
        }
    }

    pub fn static_value(&self) -> Option<&str> {
        match self {
            LevelSpec::StaticValue(value) => Some(value),
            _ => None,
        }
    }
}

/// The requested reconciliation: which fact table, and how each level is fed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    fact_table: SqlIdentifier,
    levels: [LevelSpec; 4],
}

impl Configuration {
    /// A configuration with every level unused.
    pub fn new(fact_table: SqlIdentifier) -> Self {
        Self {
            fact_table,
            levels: [
                LevelSpec::Unused,
                LevelSpec::Unused,
                LevelSpec::Unused,
                LevelSpec::Unused,
            ],
        }
    }

    pub fn with_level(mut self, level: HierarchyLevel, spec: LevelSpec) -> Self {
        self.levels[level.index()] = spec;
        self
    }

    pub fn fact_table(&self) -> &SqlIdentifier {
        &self.fact_table
    }

    pub fn spec(&self, level: HierarchyLevel) -> &LevelSpec {
        &self.levels[level.index()]
    }

    /// All four levels in significance order.
    pub fn levels(&self) -> impl Iterator<Item = (HierarchyLevel, &LevelSpec)> {
        HierarchyLevel::ALL.into_iter().zip(self.levels.iter())
    }

    /// Levels fed by a column or a static value, in significance order.
    pub fn active_levels(&self) -> Vec<HierarchyLevel> {
        self.levels()
            .filter(|(_, spec)| spec.is_active())
            .map(|(level, _)| level)
            .collect()
    }

    /// Levels read from the fact table, with their source columns.
    pub fn column_levels(&self) -> Vec<(HierarchyLevel, &SqlIdentifier)> {
        self.levels()
            .filter_map(|(level, spec)| spec.column().map(|column| (level, column)))
            .collect()
    }
}
