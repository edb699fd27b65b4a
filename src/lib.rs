//! Geolocation reference table builder
//!
//! Resolves the province / city / district / sub-district attributes of a fact
//! table against the `indonesia_boundaries` master table and writes the
//! resolved identifiers into `geo_ref`.

pub mod cli;
pub mod db;
pub mod error;
pub mod extractor;
pub mod hierarchy;
pub mod identifier;
pub mod location;
pub mod pipeline;
pub mod resolver;
pub mod source;
pub mod validator;
pub mod writer;

pub use error::{GeoRefError, Result, ValidationError};
pub use hierarchy::{Configuration, HierarchyLevel, LevelSpec};
pub use location::{LocationTuple, Record, ResolvedLocation};
pub use pipeline::{GeoRefJob, RunReport};
