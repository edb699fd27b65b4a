//! Fact table reads

use crate::error::{GeoRefError, Result};
use crate::location::Record;
use crate::source::{FactQuery, FactTableReader};
use async_trait::async_trait;
use sqlx::{Column, PgPool, Row};

pub struct PgFactTable {
    pool: PgPool,
}

impl PgFactTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FactTableReader for PgFactTable {
    async fn fetch(&self, query: &FactQuery) -> Result<Vec<Record>> {
        let sql = query.to_sql();
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GeoRefError::query(e, sql.as_str()))?;

        // Probe rows carry a constant; only their count matters.
        if let FactQuery::Probe { .. } = query {
            return Ok(rows.iter().map(|_| Record::new()).collect());
        }

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = Record::new();
            for (i, column) in row.columns().iter().enumerate() {
                let value: Option<String> = row
                    .try_get(i)
                    .map_err(|e| GeoRefError::query(e, sql.as_str()))?;
                record.push(column.name(), value);
            }
            records.push(record);
        }
        Ok(records)
    }
}
