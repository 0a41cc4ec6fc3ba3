//! Connection sourcing for SQLite-backed stores.
//!
//! # Responsibility
//! - Define the contract a store uses to borrow and return connections.
//! - Guarantee every acquired connection is returned, on every exit path.
//!
//! # Invariants
//! - `acquire`/`release` calls are balanced per operation; `ScopedConnection`
//!   enforces this even across unwinds.
//! - Sources hand out configured connections; store code never opens one.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::Deref;

mod source;

pub use source::{FileConnectionSource, MemoryConnectionSource};

pub type DbResult<T> = Result<T, DbError>;

/// Connection-level failure: opening, configuring, or bootstrapping.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    Bootstrap {
        source: rusqlite::Error,
        context: &'static str,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Bootstrap { source, context } => {
                write!(f, "connection bootstrap failed during {context}: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Bootstrap { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// External collaborator supplying and reclaiming database connections.
///
/// The store holds no connection across calls; each operation borrows one
/// through [`ScopedConnection`] and returns it before the call completes.
/// Thread safety of concurrent `acquire` calls is the implementor's contract.
pub trait ConnectionSource {
    fn acquire(&self) -> DbResult<Connection>;
    fn release(&self, conn: Connection);
}

impl<S: ConnectionSource + ?Sized> ConnectionSource for &S {
    fn acquire(&self) -> DbResult<Connection> {
        (**self).acquire()
    }

    fn release(&self, conn: Connection) {
        (**self).release(conn);
    }
}

// One source commonly feeds several entity stores.
impl<S: ConnectionSource + ?Sized> ConnectionSource for std::sync::Arc<S> {
    fn acquire(&self) -> DbResult<Connection> {
        (**self).acquire()
    }

    fn release(&self, conn: Connection) {
        (**self).release(conn);
    }
}

/// Drop-guard pairing one `acquire` with exactly one `release`.
///
/// # Invariants
/// - The connection is released when the guard leaves scope, whether the
///   operation returned, errored, or panicked.
/// - Statements and row cursors derived from the guard must drop before it,
///   which scoping inside a single store operation guarantees.
pub struct ScopedConnection<'src, S: ConnectionSource + ?Sized> {
    source: &'src S,
    conn: Option<Connection>,
}

impl<'src, S: ConnectionSource + ?Sized> ScopedConnection<'src, S> {
    pub fn acquire(source: &'src S) -> DbResult<Self> {
        let conn = source.acquire()?;
        Ok(Self {
            source,
            conn: Some(conn),
        })
    }
}

impl<S: ConnectionSource + ?Sized> Deref for ScopedConnection<'_, S> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // The option is only vacated inside drop.
        self.conn
            .as_ref()
            .unwrap_or_else(|| unreachable!("connection taken before drop"))
    }
}

impl<S: ConnectionSource + ?Sized> Drop for ScopedConnection<'_, S> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.source.release(conn);
        }
    }
}
