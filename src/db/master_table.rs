//! Master boundary table lookups

use crate::error::{GeoRefError, Result};
use crate::location::Record;
use crate::source::{MasterLookup, MasterTableReader};
use async_trait::async_trait;
use sqlx::{Column, PgPool, Row};

pub struct PgMasterTable {
    pool: PgPool,
}

impl PgMasterTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MasterTableReader for PgMasterTable {
    async fn lookup(&self, lookup: &MasterLookup) -> Result<Option<Record>> {
        let sql = lookup.to_sql();
        let mut query = sqlx::query(&sql);
        for value in lookup.bind_values() {
            query = query.bind(value);
        }

        let Some(row) = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GeoRefError::query(e, sql.as_str()))?
        else {
            return Ok(None);
        };

        let mut record = Record::new();
        for (i, column) in row.columns().iter().enumerate() {
            let value: Option<String> = row
                .try_get(i)
                .map_err(|e| GeoRefError::query(e, sql.as_str()))?;
            record.push(column.name(), value);
        }
        Ok(Some(record))
    }
}
