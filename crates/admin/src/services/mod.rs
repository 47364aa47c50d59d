//! Admin services orchestrating repositories and the Stripe catalog sync.

pub mod catalog;

pub use catalog::{CatalogError, CatalogService, DeleteOutcome, ProviderFailure};
