use crate::hierarchy::HierarchyLevel;
use thiserror::Error;

/// Configuration problems detected before any connection is opened.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("You must provide at least one column from the fact table or one static value")]
    NoLocationInput,

    #[error("{level} column provided but missing {missing_upper} column or value")]
    MissingUpperLevel {
        level: HierarchyLevel,
        missing_upper: HierarchyLevel,
    },

    #[error("invalid SQL identifier '{name}': {reason}")]
    InvalidIdentifier { name: String, reason: String },

    #[error("reference column '{0}' is used more than once")]
    DuplicateReferenceColumn(String),
}

#[derive(Error, Debug)]
pub enum GeoRefError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Error connecting to {target} database: {message}")]
    Connection { target: String, message: String },

    #[error("Query error: {message}\nSQL query: {sql}")]
    Query { message: String, sql: String },

    #[error("Write error: {message}\nFailed SQL: {sql}\nValues: {values:?}")]
    Write {
        message: String,
        sql: String,
        values: Vec<Option<String>>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GeoRefError {
    pub fn query(err: impl std::fmt::Display, sql: impl Into<String>) -> Self {
        GeoRefError::Query {
            message: err.to_string(),
            sql: sql.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoRefError>;
