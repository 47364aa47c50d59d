//! Catalog write-time rules.

pub mod guard;

pub use guard::{ValidationError, derive_requires_shipping, validate_variant};
