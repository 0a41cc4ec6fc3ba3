//! Entity models shipped with the core.
//!
//! The generic store treats entity attributes as opaque; only the reference
//! entities used by adapters, tests and the CLI probe live here.

pub mod person;
