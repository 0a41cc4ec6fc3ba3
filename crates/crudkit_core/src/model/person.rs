//! Person reference entity.
//!
//! The store core is entity-agnostic; this model exists as the worked
//! example backing the shipped adapter, the CLI probe and the integration
//! tests.

use crate::store::EntityId;
use serde::{Deserialize, Serialize};

/// A person row: database-assigned id plus opaque attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// `None` until the store creates the row; immutable afterwards.
    #[serde(default)]
    pub id: Option<EntityId>,
    pub name: String,
    pub age: u32,
}

impl Person {
    /// Creates a person not yet persisted (no identifier).
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            age,
        }
    }

    /// Rebuilds a persisted person under a known identifier.
    ///
    /// Row-mapping and test code use this; application code normally
    /// receives identified values from the store itself.
    pub fn with_id(id: EntityId, name: impl Into<String>, age: u32) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            age,
        }
    }
}
