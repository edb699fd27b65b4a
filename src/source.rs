//! Collaborator contracts
//!
//! The core never talks to a database directly. It hands typed query values to
//! these traits; `crate::db` implements them over Postgres and the tests
//! implement them in memory.

use crate::error::Result;
use crate::hierarchy::HierarchyLevel;
use crate::identifier::SqlIdentifier;
use crate::location::Record;
use async_trait::async_trait;
use itertools::Itertools;

/// Fixed master boundary table.
pub const MASTER_TABLE: &str = "indonesia_boundaries";

/// Identifier column of the master boundary table.
pub const MASTER_ID_COLUMN: &str = "objectid";

/// Read-only statement against the fact table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactQuery {
    /// Distinct non-null combinations of the given columns, each aliased to
    /// its level name.
    Distinct {
        table: SqlIdentifier,
        columns: Vec<(HierarchyLevel, SqlIdentifier)>,
    },
    /// Fetch at most one row to prove the table is reachable.
    Probe { table: SqlIdentifier },
}

impl FactQuery {
    pub fn table(&self) -> &SqlIdentifier {
        match self {
            FactQuery::Distinct { table, .. } | FactQuery::Probe { table } => table,
        }
    }

    pub fn to_sql(&self) -> String {
        match self {
            FactQuery::Distinct { table, columns } => {
                let select = columns
                    .iter()
                    .map(|(level, column)| {
                        format!("CAST({} AS TEXT) AS {}", column.folded(), level.as_str())
                    })
                    .join(", ");
                let filter = columns
                    .iter()
                    .map(|(_, column)| format!("{} IS NOT NULL", column.folded()))
                    .join(" AND ");
                format!(
                    "SELECT DISTINCT {} FROM {} WHERE {}",
                    select,
                    table.folded(),
                    filter
                )
            }
            FactQuery::Probe { table } => format!("SELECT 1 FROM {} LIMIT 1", table.folded()),
        }
    }
}

/// Case-insensitive point lookup against [`MASTER_TABLE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterLookup {
    /// Levels whose master columns are projected after the identifier.
    pub projection: Vec<HierarchyLevel>,
    /// Conjunctive `lower(column) = lower(value)` conditions, in bind order.
    pub filters: Vec<(HierarchyLevel, String)>,
}

impl MasterLookup {
    /// SQL text with `$n` placeholders for the filter values.
    pub fn to_sql(&self) -> String {
        let select = std::iter::once(MASTER_ID_COLUMN)
            .chain(self.projection.iter().map(|level| level.master_column()))
            .map(|column| format!("CAST({0} AS TEXT) AS {0}", column))
            .join(", ");
        let filter = self
            .filters
            .iter()
            .enumerate()
            .map(|(i, (level, _))| format!("LOWER({}) = LOWER(${})", level.master_column(), i + 1))
            .join(" AND ");
        format!(
            "SELECT {} FROM {} WHERE {} LIMIT 1",
            select, MASTER_TABLE, filter
        )
    }

    pub fn bind_values(&self) -> Vec<&str> {
        self.filters.iter().map(|(_, value)| value.as_str()).collect()
    }
}

/// Reads location columns from the fact table.
#[async_trait]
pub trait FactTableReader: Send + Sync {
    /// Run the statement; result columns are named after hierarchy levels.
    async fn fetch(&self, query: &FactQuery) -> Result<Vec<Record>>;
}

/// Looks up canonical identifiers in the master boundary table.
#[async_trait]
pub trait MasterTableReader: Send + Sync {
    /// First matching row, with `objectid` plus the projected master columns.
    async fn lookup(&self, lookup: &MasterLookup) -> Result<Option<Record>>;
}

/// Writes the reference table.
#[async_trait]
pub trait DestinationWriter: Send + Sync {
    /// Execute a DDL statement and commit it.
    async fn execute_ddl(&self, sql: &str) -> Result<()>;

    /// Insert every row with the parameterized statement inside a single
    /// transaction. Any failure rolls back all rows and is returned as
    /// `GeoRefError::Write`.
    async fn insert_all(&self, sql: &str, rows: &[Vec<Option<String>>]) -> Result<u64>;
}
