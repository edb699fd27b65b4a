//! In-memory collaborators for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use geo_ref::error::{GeoRefError, Result};
use geo_ref::hierarchy::HierarchyLevel;
use geo_ref::location::Record;
use geo_ref::source::{
    DestinationWriter, FactQuery, FactTableReader, MasterLookup, MasterTableReader,
    MASTER_ID_COLUMN,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Fact table held as rows of column -> value.
#[derive(Default)]
pub struct InMemoryFactTable {
    pub rows: Vec<HashMap<String, Option<String>>>,
    pub queries: Mutex<Vec<FactQuery>>,
    pub unreachable: bool,
}

impl InMemoryFactTable {
    pub fn new(rows: Vec<Vec<(&str, Option<&str>)>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
                        .collect()
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Default::default()
        }
    }

    pub fn issued(&self) -> Vec<FactQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl FactTableReader for InMemoryFactTable {
    async fn fetch(&self, query: &FactQuery) -> Result<Vec<Record>> {
        self.queries.lock().unwrap().push(query.clone());
        if self.unreachable {
            return Err(GeoRefError::query(
                "relation does not exist",
                query.to_sql(),
            ));
        }

        match query {
            FactQuery::Probe { .. } => Ok(self.rows.iter().take(1).map(|_| Record::new()).collect()),
            FactQuery::Distinct { columns, .. } => {
                let mut seen = HashSet::new();
                let mut records = Vec::new();
                for row in &self.rows {
                    let values: Vec<Option<String>> = columns
                        .iter()
                        .map(|(_, column)| row.get(&column.name()).cloned().flatten())
                        .collect();
                    if values.iter().any(Option::is_none) || !seen.insert(values.clone()) {
                        continue;
                    }
                    let mut record = Record::new();
                    for ((level, _), value) in columns.iter().zip(values) {
                        record.push(level.as_str(), value);
                    }
                    records.push(record);
                }
                Ok(records)
            }
        }
    }
}

/// Fact reader that hands back fixed result rows untouched, duplicates
/// included, whatever the statement.
pub struct VerbatimFactTable {
    pub records: Vec<Record>,
}

impl VerbatimFactTable {
    pub fn new(rows: Vec<Vec<(&str, Option<&str>)>>) -> Self {
        Self {
            records: rows
                .into_iter()
                .map(|row| {
                    row.into_iter().fold(Record::new(), |record, (k, v)| {
                        record.with(k, v.map(str::to_string))
                    })
                })
                .collect(),
        }
    }
}

#[async_trait]
impl FactTableReader for VerbatimFactTable {
    async fn fetch(&self, _query: &FactQuery) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}

/// One row of `indonesia_boundaries`.
#[derive(Clone, Default)]
pub struct Boundary {
    pub objectid: &'static str,
    pub provinsi: &'static str,
    pub kota_kabupaten: &'static str,
    pub kecamatan: &'static str,
    pub kelurahan_desa: &'static str,
}

impl Boundary {
    fn column(&self, level: HierarchyLevel) -> &'static str {
        match level {
            HierarchyLevel::Province => self.provinsi,
            HierarchyLevel::City => self.kota_kabupaten,
            HierarchyLevel::District => self.kecamatan,
            HierarchyLevel::SubDistrict => self.kelurahan_desa,
        }
    }
}

/// Master table doing the same case-insensitive equality Postgres would.
#[derive(Default)]
pub struct InMemoryBoundaries {
    pub rows: Vec<Boundary>,
    /// Lookups carrying this value fail with a query error.
    pub failing_value: Option<String>,
    /// Projected levels left out of returned rows.
    pub omit_levels: Vec<HierarchyLevel>,
    /// Return rows without `objectid`.
    pub omit_objectid: bool,
    pub lookups: Mutex<Vec<MasterLookup>>,
}

impl InMemoryBoundaries {
    pub fn new(rows: Vec<Boundary>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl MasterTableReader for InMemoryBoundaries {
    async fn lookup(&self, lookup: &MasterLookup) -> Result<Option<Record>> {
        self.lookups.lock().unwrap().push(lookup.clone());

        if let Some(failing) = &self.failing_value {
            if lookup.filters.iter().any(|(_, value)| value == failing) {
                return Err(GeoRefError::query("connection reset", lookup.to_sql()));
            }
        }

        let found = self.rows.iter().find(|row| {
            lookup
                .filters
                .iter()
                .all(|(level, value)| row.column(*level).to_lowercase() == value.to_lowercase())
        });

        Ok(found.map(|row| {
            let mut record = Record::new();
            if !self.omit_objectid {
                record.push(MASTER_ID_COLUMN, Some(row.objectid.to_string()));
            }
            for level in &lookup.projection {
                if self.omit_levels.contains(level) {
                    continue;
                }
                record.push(level.master_column(), Some(row.column(*level).to_string()));
            }
            record
        }))
    }
}

/// Destination table with all-or-nothing inserts.
#[derive(Default)]
pub struct InMemoryReferenceTable {
    pub ddl: Mutex<Vec<String>>,
    pub rows: Mutex<Vec<Vec<Option<String>>>>,
    /// Zero-based row index whose insert fails.
    pub fail_at_row: Option<usize>,
}

impl InMemoryReferenceTable {
    pub fn failing_at(row: usize) -> Self {
        Self {
            fail_at_row: Some(row),
            ..Default::default()
        }
    }

    pub fn committed(&self) -> Vec<Vec<Option<String>>> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl DestinationWriter for InMemoryReferenceTable {
    async fn execute_ddl(&self, sql: &str) -> Result<()> {
        self.ddl.lock().unwrap().push(sql.to_string());
        Ok(())
    }

    async fn insert_all(&self, sql: &str, rows: &[Vec<Option<String>>]) -> Result<u64> {
        let mut staged = Vec::new();
        for (i, values) in rows.iter().enumerate() {
            if self.fail_at_row == Some(i) {
                return Err(GeoRefError::Write {
                    message: "value too long for type character varying(255)".to_string(),
                    sql: sql.to_string(),
                    values: values.clone(),
                });
            }
            staged.push(values.clone());
        }
        let inserted = staged.len() as u64;
        self.rows.lock().unwrap().extend(staged);
        Ok(inserted)
    }
}

pub fn some(value: &str) -> Option<String> {
    Some(value.to_string())
}
