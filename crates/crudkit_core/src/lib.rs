//! Generic CRUD data access over SQLite.
//!
//! One stateless [`EntityStore`] runs a scoped round trip per operation;
//! everything entity-specific (SQL text, parameter binding, row mapping)
//! comes from a per-entity [`EntityAdapter`].

pub mod db;
pub mod logging;
pub mod model;
pub mod store;

pub use db::{
    ConnectionSource, DbError, DbResult, FileConnectionSource, MemoryConnectionSource,
    ScopedConnection,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::Person;
pub use store::{
    EntityAdapter, EntityId, EntityStore, PersonAdapter, QuerySet, StoreError, StoreResult,
    PERSON_BOOTSTRAP_SQL, PERSON_QUERIES,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
