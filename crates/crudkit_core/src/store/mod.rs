//! Generic CRUD store over a relational connection.
//!
//! # Responsibility
//! - Run one scoped SQL round trip per operation: acquire, prepare, bind,
//!   execute, map, release.
//! - Delegate all entity knowledge (SQL text, binding, row mapping) to a
//!   per-entity [`EntityAdapter`].
//!
//! # Invariants
//! - Connection, statement and row cursor are released in reverse order of
//!   acquisition on every exit path, including unwinds.
//! - The store holds no connection and no entity state across calls; every
//!   operation is an independent round trip.
//! - Identifiers are assigned once, at create, and never change.

mod person;

pub use person::{PersonAdapter, PERSON_BOOTSTRAP_SQL, PERSON_QUERIES};

use crate::db::{ConnectionSource, DbError, ScopedConnection};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Row identifier assigned by the database at create.
///
/// SQLite rowids are 64-bit, so the alias follows suit.
pub type EntityId = i64;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure taxonomy for store operations.
///
/// Execution failures are surfaced as distinct values rather than being
/// logged and collapsed into an absent result, so callers can tell
/// "not found" from "the database call failed".
#[derive(Debug)]
pub enum StoreError {
    /// The underlying database call failed.
    Db(DbError),
    /// A mutation keyed on an identifier matched zero rows.
    NotFound(EntityId),
    /// Update or delete was called with an entity that has no identifier yet.
    MissingId,
    /// Create executed but produced no generated identifier.
    NoGeneratedId,
    /// A persisted row could not be mapped back into an entity.
    InvalidRow(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "entity not found: {id}"),
            Self::MissingId => write!(f, "entity has no identifier; it was never created"),
            Self::NoGeneratedId => write!(f, "create did not yield a generated identifier"),
            Self::InvalidRow(message) => write!(f, "invalid persisted row: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// The five statement templates backing one entity type.
///
/// Placeholders are positional (`?1`, `?2`, ...). `insert` must target a
/// rowid table so the generated key is observable through
/// `last_insert_rowid`. `select_by_id` and `delete` take the identifier as
/// their single parameter.
#[derive(Debug, Clone, Copy)]
pub struct QuerySet {
    pub insert: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
    pub select_by_id: &'static str,
    pub select_all: &'static str,
}

/// Per-entity plugin contract: SQL text plus mapping in both directions.
///
/// Adapters are plain values handed to [`EntityStore::new`]; they carry no
/// connection state and their methods must stay pure so a store can be
/// shared freely.
pub trait EntityAdapter {
    type Entity;

    /// Short lowercase name used in diagnostics (`person`, `order`, ...).
    fn entity_name(&self) -> &'static str;

    fn queries(&self) -> &QuerySet;

    /// The assigned identifier, or `None` for an entity not yet created.
    fn entity_id(&self, entity: &Self::Entity) -> Option<EntityId>;

    /// Positional parameters for `QuerySet::insert`, in placeholder order.
    fn insert_params(&self, entity: &Self::Entity) -> Vec<Value>;

    /// Positional parameters for `QuerySet::update`, in placeholder order.
    /// The identifier is part of these; the store does not append it.
    fn update_params(&self, entity: &Self::Entity) -> Vec<Value>;

    /// Maps one result row back into an entity.
    fn map_row(&self, row: &Row<'_>) -> StoreResult<Self::Entity>;
}

/// Generic entity store: one adapter, one connection source, no state.
///
/// Safe to share across threads when `S` and `A` are; each call borrows a
/// fresh connection and releases it before returning.
pub struct EntityStore<S, A> {
    source: S,
    adapter: A,
}

impl<S, A> EntityStore<S, A>
where
    S: ConnectionSource,
    A: EntityAdapter,
{
    /// Builds a store from an injected connection source and adapter.
    pub fn new(source: S, adapter: A) -> Self {
        Self { source, adapter }
    }

    /// Inserts the entity and returns the stored row, freshly fetched under
    /// its generated identifier.
    ///
    /// # Errors
    /// - [`StoreError::NoGeneratedId`] when the insert matched zero rows.
    /// - [`StoreError::NotFound`] when the follow-up fetch misses, which
    ///   indicates the insert and select statements disagree.
    pub fn create(&self, entity: A::Entity) -> StoreResult<A::Entity> {
        let conn = ScopedConnection::acquire(&self.source)?;
        let changed = {
            let mut stmt = conn.prepare(self.adapter.queries().insert)?;
            stmt.execute(params_from_iter(self.adapter.insert_params(&entity)))?
        };
        if changed == 0 {
            return Err(StoreError::NoGeneratedId);
        }

        let id = conn.last_insert_rowid();
        debug!(
            "event=store_create module=store entity={} id={id}",
            self.adapter.entity_name()
        );
        self.fetch_by_id(&conn, id)?.ok_or(StoreError::NotFound(id))
    }

    /// Writes the entity's fields under its existing identifier and hands
    /// the input back unchanged. No re-fetch.
    ///
    /// # Errors
    /// - [`StoreError::MissingId`] when the entity was never created.
    /// - [`StoreError::NotFound`] when no row carries the identifier.
    pub fn update(&self, entity: A::Entity) -> StoreResult<A::Entity> {
        let id = self
            .adapter
            .entity_id(&entity)
            .ok_or(StoreError::MissingId)?;
        let conn = ScopedConnection::acquire(&self.source)?;
        let changed = {
            let mut stmt = conn.prepare(self.adapter.queries().update)?;
            stmt.execute(params_from_iter(self.adapter.update_params(&entity)))?
        };
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        debug!(
            "event=store_update module=store entity={} id={id}",
            self.adapter.entity_name()
        );
        Ok(entity)
    }

    /// Removes the row keyed by the entity's identifier.
    ///
    /// # Errors
    /// - [`StoreError::MissingId`] when the entity was never created.
    /// - [`StoreError::NotFound`] when no row carries the identifier.
    pub fn delete(&self, entity: &A::Entity) -> StoreResult<()> {
        let id = self
            .adapter
            .entity_id(entity)
            .ok_or(StoreError::MissingId)?;
        let conn = ScopedConnection::acquire(&self.source)?;
        let changed = {
            let mut stmt = conn.prepare(self.adapter.queries().delete)?;
            stmt.execute([id])?
        };
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }

        debug!(
            "event=store_delete module=store entity={} id={id}",
            self.adapter.entity_name()
        );
        Ok(())
    }

    /// Fetches the entity under `id`, or `None` when absent.
    pub fn get_by_id(&self, id: EntityId) -> StoreResult<Option<A::Entity>> {
        let conn = ScopedConnection::acquire(&self.source)?;
        self.fetch_by_id(&conn, id)
    }

    /// Fetches every row in statement order; empty when the table is empty.
    pub fn get_all(&self) -> StoreResult<Vec<A::Entity>> {
        let conn = ScopedConnection::acquire(&self.source)?;
        let mut stmt = conn.prepare(self.adapter.queries().select_all)?;
        let mut rows = stmt.query([])?;
        let mut entities = Vec::new();

        while let Some(row) = rows.next()? {
            entities.push(self.adapter.map_row(row)?);
        }

        Ok(entities)
    }

    fn fetch_by_id(&self, conn: &Connection, id: EntityId) -> StoreResult<Option<A::Entity>> {
        let mut stmt = conn.prepare(self.adapter.queries().select_by_id)?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(self.adapter.map_row(row)?));
        }

        Ok(None)
    }
}
