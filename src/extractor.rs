//! Distinct location extraction from the fact table

use crate::error::Result;
use crate::hierarchy::{Configuration, HierarchyLevel, LevelSpec};
use crate::location::LocationTuple;
use crate::source::{FactQuery, FactTableReader};
use std::collections::HashSet;
use tracing::{debug, info};

/// Distinct tuples to resolve plus the levels they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLocations {
    pub tuples: Vec<LocationTuple>,
    pub active_levels: Vec<HierarchyLevel>,
}

pub struct DistinctLocationExtractor<'a, R: FactTableReader + ?Sized> {
    reader: &'a R,
}

impl<'a, R: FactTableReader + ?Sized> DistinctLocationExtractor<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Query the fact table for distinct location combinations and backfill
    /// static levels.
    ///
    /// Any query failure here is fatal and propagated.
    pub async fn extract(&self, config: &Configuration) -> Result<ExtractedLocations> {
        let column_levels: Vec<_> = config
            .column_levels()
            .into_iter()
            .map(|(level, column)| (level, column.clone()))
            .collect();
        let active_levels = config.active_levels();

        info!("Fetching distinct locations from {}...", config.fact_table());

        let mut rows: Vec<LocationTuple> = if column_levels.is_empty() {
            let query = FactQuery::Probe {
                table: config.fact_table().clone(),
            };
            debug!("Fact table probe: {}", query.to_sql());
            // Content is irrelevant; the probe only proves the table is readable.
            self.reader.fetch(&query).await?;
            vec![LocationTuple::new()]
        } else {
            let query = FactQuery::Distinct {
                table: config.fact_table().clone(),
                columns: column_levels.clone(),
            };
            debug!("Fact table query: {}", query.to_sql());
            self.reader
                .fetch(&query)
                .await?
                .into_iter()
                .map(|record| {
                    let mut tuple = LocationTuple::new();
                    for (level, _) in &column_levels {
                        tuple.set(*level, record.get(level.as_str()).map(str::to_string));
                    }
                    tuple
                })
                .collect()
        };

        for (level, spec) in config.levels() {
            if let LevelSpec::StaticValue(value) = spec {
                for tuple in rows.iter_mut() {
                    tuple.set(level, Some(value.clone()));
                }
            }
        }

        let mut seen = HashSet::new();
        rows.retain(|tuple| seen.insert(tuple.clone()));

        info!("Found {} distinct location combinations", rows.len());

        Ok(ExtractedLocations {
            tuples: rows,
            active_levels,
        })
    }
}
