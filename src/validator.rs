//! Hierarchy validation
//!
//! Pure checks over a [`Configuration`]; run before any connection is opened.

use crate::error::ValidationError;
use crate::hierarchy::{Configuration, HierarchyLevel, LevelSpec};

pub struct HierarchyValidator;

impl HierarchyValidator {
    /// Decide whether the requested per-level inputs are self-consistent.
    ///
    /// A column level needs every coarser level to be active. Static levels
    /// and unused finer levels impose nothing.
    pub fn validate(config: &Configuration) -> Result<(), ValidationError> {
        if config.active_levels().is_empty() {
            return Err(ValidationError::NoLocationInput);
        }

        for (level, spec) in config.levels() {
            if !matches!(spec, LevelSpec::Column(_)) {
                continue;
            }
            if let Some(missing_upper) = first_unused_upper(config, level) {
                return Err(ValidationError::MissingUpperLevel {
                    level,
                    missing_upper,
                });
            }
        }

        Ok(())
    }
}

fn first_unused_upper(config: &Configuration, level: HierarchyLevel) -> Option<HierarchyLevel> {
    level
        .uppers()
        .iter()
        .copied()
        .find(|upper| !config.spec(*upper).is_active())
}
