//! Core types for Clementine.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod attribute;
pub mod email;
pub mod id;
pub mod money;
pub mod status;

pub use attribute::AttributeValue;
pub use email::{Email, EmailError};
pub use id::*;
pub use money::Cents;
pub use status::*;
