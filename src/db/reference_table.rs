//! Reference table DDL and transactional inserts

use crate::error::{GeoRefError, Result};
use crate::source::DestinationWriter;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

pub struct PgReferenceTable {
    pool: PgPool,
}

impl PgReferenceTable {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DestinationWriter for PgReferenceTable {
    async fn execute_ddl(&self, sql: &str) -> Result<()> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map_err(|e| GeoRefError::Write {
                message: format!("Error creating reference table: {}", e),
                sql: sql.to_string(),
                values: Vec::new(),
            })?;
        Ok(())
    }

    async fn insert_all(&self, sql: &str, rows: &[Vec<Option<String>>]) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(|e| GeoRefError::Write {
            message: format!("Error starting transaction: {}", e),
            sql: sql.to_string(),
            values: Vec::new(),
        })?;

        let mut inserted = 0u64;
        for values in rows {
            let mut query = sqlx::query(sql);
            for value in values {
                query = query.bind(value.as_deref());
            }

            if let Err(e) = query.execute(&mut *tx).await {
                if let Err(rollback_err) = tx.rollback().await {
                    error!("Rollback failed: {}", rollback_err);
                }
                return Err(GeoRefError::Write {
                    message: format!("Error inserting into reference table: {}", e),
                    sql: sql.to_string(),
                    values: values.clone(),
                });
            }
            inserted += 1;
        }

        tx.commit().await.map_err(|e| GeoRefError::Write {
            message: format!("Error committing inserts: {}", e),
            sql: sql.to_string(),
            values: Vec::new(),
        })?;

        Ok(inserted)
    }
}
