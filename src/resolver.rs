//! Location resolution against the master boundary table
//!
//! Each tuple is looked up on its own. A miss or a failing query for one tuple
//! is logged and skipped; it never stops the pass.

use crate::hierarchy::HierarchyLevel;
use crate::location::{LocationTuple, ResolvedLocation};
use crate::source::{MasterLookup, MasterTableReader, MASTER_ID_COLUMN};
use tracing::{error, info, warn};

/// Everything the resolution pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// One entry per looked-up tuple, in input order.
    pub locations: Vec<ResolvedLocation>,
    /// Tuples with no non-null value; no lookup was issued.
    pub skipped: usize,
    /// Tuples whose lookup query failed.
    pub failed: usize,
}

impl Resolution {
    pub fn matched(&self) -> usize {
        self.locations.iter().filter(|l| l.is_match()).count()
    }

    pub fn missed(&self) -> usize {
        self.locations.len() - self.matched()
    }
}

pub struct LocationResolver<'a, M: MasterTableReader + ?Sized> {
    master: &'a M,
}

impl<'a, M: MasterTableReader + ?Sized> LocationResolver<'a, M> {
    pub fn new(master: &'a M) -> Self {
        Self { master }
    }

    pub async fn resolve(
        &self,
        tuples: &[LocationTuple],
        active_levels: &[HierarchyLevel],
    ) -> Resolution {
        info!("Looking up location IDs from {}...", crate::source::MASTER_TABLE);

        let mut resolution = Resolution::default();

        for tuple in tuples {
            let Some(lookup) = build_lookup(tuple, active_levels) else {
                resolution.skipped += 1;
                continue;
            };

            match self.master.lookup(&lookup).await {
                Ok(Some(row)) => {
                    let location_id = row.get(MASTER_ID_COLUMN).map(str::to_string);
                    let Some(location_id) = location_id else {
                        warn!("Master row without {} for {}", MASTER_ID_COLUMN, tuple);
                        resolution.locations.push(ResolvedLocation::Miss(tuple.clone()));
                        continue;
                    };

                    let mut resolved = LocationTuple::new();
                    for level in active_levels {
                        let value = if row.contains(level.master_column()) {
                            row.get(level.master_column())
                        } else {
                            tuple.get(*level)
                        };
                        resolved.set(*level, value.map(str::to_string));
                    }

                    resolution.locations.push(ResolvedLocation::Matched {
                        location_id,
                        source: tuple.clone(),
                        resolved,
                    });
                }
                Ok(None) => {
                    warn!("No location found for {}", tuple);
                    resolution.locations.push(ResolvedLocation::Miss(tuple.clone()));
                }
                Err(e) => {
                    error!(
                        "Error looking up location ID for {}: {}\nSQL query: {}\nValues: {:?}",
                        tuple,
                        e,
                        lookup.to_sql(),
                        lookup.bind_values()
                    );
                    resolution.failed += 1;
                }
            }
        }

        info!("Found {} matching location IDs", resolution.matched());

        resolution
    }
}

/// Filter on the non-null levels only; `None` when there is nothing to match.
fn build_lookup(tuple: &LocationTuple, active_levels: &[HierarchyLevel]) -> Option<MasterLookup> {
    let filters: Vec<(HierarchyLevel, String)> = active_levels
        .iter()
        .filter_map(|level| tuple.get(*level).map(|value| (*level, value.to_string())))
        .collect();

    if filters.is_empty() {
        return None;
    }

    Some(MasterLookup {
        projection: active_levels.to_vec(),
        filters,
    })
}
