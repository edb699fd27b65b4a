//! SQL identifier allowlisting
//!
//! Table and column names arrive from the command line and are interpolated
//! into generated SQL, so they are checked against a strict pattern and always
//! emitted double-quoted. Fact-table references use the lowercased form so
//! `Sales` names the same relation Postgres would fold it to. Values never go
//! through this path; they are bound.

use crate::error::ValidationError;
use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;

lazy_static! {
    static ref IDENTIFIER_PATTERN: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$")
        .expect("identifier pattern is valid");
}

/// A table or column name that is safe to interpolate into SQL.
///
/// Tables may carry one `schema.` qualifier; columns may not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlIdentifier {
    parts: Vec<String>,
}

impl SqlIdentifier {
    /// Parse a plain column name.
    pub fn column(name: &str) -> Result<Self, ValidationError> {
        check_part(name, name)?;
        Ok(Self {
            parts: vec![name.to_string()],
        })
    }

    /// Parse a table name, optionally qualified as `schema.table`.
    pub fn table(name: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = name.split('.').collect();
        if parts.len() > 2 {
            return Err(ValidationError::InvalidIdentifier {
                name: name.to_string(),
                reason: "at most one schema qualifier is allowed".to_string(),
            });
        }
        for part in &parts {
            check_part(name, part)?;
        }
        Ok(Self {
            parts: parts.into_iter().map(str::to_string).collect(),
        })
    }

    /// Unquoted name as the user supplied it.
    pub fn name(&self) -> String {
        self.parts.join(".")
    }

    /// Double-quoted and lowercased, the relation Postgres resolves for the
    /// bare identifier.
    pub fn folded(&self) -> String {
        self.parts
            .iter()
            .map(|p| format!("\"{}\"", p.to_lowercase()))
            .join(".")
    }
}

impl fmt::Display for SqlIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for SqlIdentifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

fn check_part(full: &str, part: &str) -> Result<(), ValidationError> {
    if IDENTIFIER_PATTERN.is_match(part) {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier {
            name: full.to_string(),
            reason: "expected letters, digits and underscores, not starting with a digit"
                .to_string(),
        })
    }
}
