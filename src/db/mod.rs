//! Database module for PostgreSQL connection and operations
//!
//! sqlx implementations of the fact, master and destination collaborators.

pub mod connection;
pub mod fact_table;
pub mod master_table;
pub mod reference_table;

pub use connection::{close_pool, open_pool, DbPool};
pub use fact_table::PgFactTable;
pub use master_table::PgMasterTable;
pub use reference_table::PgReferenceTable;
