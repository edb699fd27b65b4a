//! Reference table writing

use crate::error::{Result, ValidationError};
use crate::hierarchy::{Configuration, HierarchyLevel, LevelSpec};
use crate::location::ResolvedLocation;
use crate::source::DestinationWriter;
use itertools::Itertools;
use std::collections::HashSet;
use tracing::{debug, info};

/// Fixed destination table.
pub const REFERENCE_TABLE: &str = "geo_ref";

pub const LOCATION_ID_COLUMN: &str = "location_id";
pub const CREATED_AT_COLUMN: &str = "created_at";

/// One level column of the reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceColumn {
    pub level: HierarchyLevel,
    pub name: String,
    /// Set for static levels; written verbatim on every row.
    pub static_value: Option<String>,
}

/// Shape of the reference table for one configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLayout {
    pub columns: Vec<ReferenceColumn>,
}

impl ReferenceLayout {
    /// Column levels keep the user's column name; static levels use the
    /// level name.
    pub fn from_configuration(config: &Configuration) -> Self {
        let columns = config
            .levels()
            .filter_map(|(level, spec)| match spec {
                LevelSpec::Unused => None,
                LevelSpec::Column(column) => Some(ReferenceColumn {
                    level,
                    name: column.name(),
                    static_value: None,
                }),
                LevelSpec::StaticValue(value) => Some(ReferenceColumn {
                    level,
                    name: level.as_str().to_string(),
                    static_value: Some(value.clone()),
                }),
            })
            .collect();
        Self { columns }
    }

    pub fn active_levels(&self) -> Vec<HierarchyLevel> {
        self.columns.iter().map(|c| c.level).collect()
    }

    /// Every column name of the table, fixed columns included.
    pub fn column_names(&self) -> Vec<String> {
        std::iter::once(LOCATION_ID_COLUMN.to_string())
            .chain(self.columns.iter().map(|c| c.name.clone()))
            .chain(std::iter::once(CREATED_AT_COLUMN.to_string()))
            .collect()
    }

    /// Reject layouts that would name the same column twice. Level columns
    /// are quoted and keep their case; the fixed columns are lowercase.
    pub fn check_columns(&self) -> std::result::Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for name in self.column_names() {
            if !seen.insert(name.clone()) {
                return Err(ValidationError::DuplicateReferenceColumn(name));
            }
        }
        Ok(())
    }

    pub fn create_table_sql(&self) -> String {
        let definitions = std::iter::once(format!("{} VARCHAR(255) NOT NULL", LOCATION_ID_COLUMN))
            .chain(
                self.columns
                    .iter()
                    .map(|c| format!("\"{}\" VARCHAR(255)", c.name)),
            )
            .chain(std::iter::once(format!(
                "{} TIMESTAMP DEFAULT CURRENT_TIMESTAMP",
                CREATED_AT_COLUMN
            )))
            .join(", ");
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            REFERENCE_TABLE, definitions
        )
    }

    pub fn insert_sql(&self) -> String {
        let columns = std::iter::once(LOCATION_ID_COLUMN.to_string())
            .chain(self.columns.iter().map(|c| format!("\"{}\"", c.name)))
            .join(", ");
        let placeholders = (1..=self.columns.len() + 1)
            .map(|i| format!("${}", i))
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            REFERENCE_TABLE, columns, placeholders
        )
    }

    /// Bind values for one matched location; `None` for a miss.
    pub fn row_values(&self, location: &ResolvedLocation) -> Option<Vec<Option<String>>> {
        let ResolvedLocation::Matched {
            location_id,
            resolved,
            ..
        } = location
        else {
            return None;
        };

        let mut values = vec![Some(location_id.clone())];
        for column in &self.columns {
            let value = match &column.static_value {
                Some(value) => Some(value.clone()),
                None => resolved.get(column.level).map(str::to_string),
            };
            values.push(value);
        }
        Some(values)
    }
}

pub struct ReferenceTableWriter<'a, W: DestinationWriter + ?Sized> {
    destination: &'a W,
    layout: ReferenceLayout,
}

impl<'a, W: DestinationWriter + ?Sized> ReferenceTableWriter<'a, W> {
    pub fn new(destination: &'a W, layout: ReferenceLayout) -> Self {
        Self {
            destination,
            layout,
        }
    }

    pub fn layout(&self) -> &ReferenceLayout {
        &self.layout
    }

    /// Create the table if absent. An existing table is never altered.
    pub async fn ensure_schema(&self) -> Result<()> {
        let sql = self.layout.create_table_sql();
        debug!("Reference table DDL: {}", sql);
        self.destination.execute_ddl(&sql).await?;
        info!("Geo reference table created or already exists");
        Ok(())
    }

    /// Insert every matched location in one transaction. Misses are skipped.
    pub async fn write(&self, locations: &[ResolvedLocation]) -> Result<u64> {
        let rows: Vec<Vec<Option<String>>> = locations
            .iter()
            .filter_map(|location| self.layout.row_values(location))
            .collect();

        if rows.is_empty() {
            info!("No locations to insert");
            return Ok(0);
        }

        let sql = self.layout.insert_sql();
        debug!("Reference table insert: {}", sql);
        let inserted = self.destination.insert_all(&sql, &rows).await?;
        info!(
            "Successfully inserted {} locations into {} table",
            inserted, REFERENCE_TABLE
        );
        Ok(inserted)
    }
}
