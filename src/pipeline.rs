//! One-shot reconciliation run
//!
//! validate -> extract -> resolve -> ensure schema -> write, strictly in
//! sequence. Validation runs before anything touches a collaborator.

use crate::error::Result;
use crate::extractor::DistinctLocationExtractor;
use crate::hierarchy::{Configuration, HierarchyLevel};
use crate::identifier::SqlIdentifier;
use crate::resolver::LocationResolver;
use crate::source::{DestinationWriter, FactTableReader, MasterTableReader};
use crate::validator::HierarchyValidator;
use crate::writer::{ReferenceLayout, ReferenceTableWriter};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub fact_table: SqlIdentifier,
    pub active_levels: Vec<HierarchyLevel>,
    pub distinct_locations: usize,
    pub matched: usize,
    pub missed: usize,
    pub skipped: usize,
    pub failed_lookups: usize,
    pub rows_inserted: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct GeoRefJob {
    config: Configuration,
}

impl GeoRefJob {
    /// Validates up front so no job exists for an inconsistent configuration
    /// or a reference table that would repeat a column.
    pub fn new(config: Configuration) -> Result<Self> {
        HierarchyValidator::validate(&config)?;
        ReferenceLayout::from_configuration(&config).check_columns()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub async fn run<F, M, D>(&self, fact: &F, master: &M, destination: &D) -> Result<RunReport>
    where
        F: FactTableReader + ?Sized,
        M: MasterTableReader + ?Sized,
        D: DestinationWriter + ?Sized,
    {
        let started_at = Utc::now();

        let extracted = DistinctLocationExtractor::new(fact)
            .extract(&self.config)
            .await?;

        let resolution = LocationResolver::new(master)
            .resolve(&extracted.tuples, &extracted.active_levels)
            .await;

        let writer =
            ReferenceTableWriter::new(destination, ReferenceLayout::from_configuration(&self.config));
        writer.ensure_schema().await?;
        let rows_inserted = writer.write(&resolution.locations).await?;

        let report = RunReport {
            fact_table: self.config.fact_table().clone(),
            active_levels: extracted.active_levels,
            distinct_locations: extracted.tuples.len(),
            matched: resolution.matched(),
            missed: resolution.missed(),
            skipped: resolution.skipped,
            failed_lookups: resolution.failed,
            rows_inserted,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            "Migration completed successfully: {} distinct, {} matched, {} missed, {} failed, {} inserted",
            report.distinct_locations,
            report.matched,
            report.missed,
            report.failed_lookups,
            report.rows_inserted
        );

        Ok(report)
    }
}
