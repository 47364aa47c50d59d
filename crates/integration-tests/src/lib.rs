//! Shared helpers for Clementine integration tests.
//!
//! The tests in `tests/` exercise running storefront and admin binaries
//! over HTTP. They are `#[ignore]`d by default; run them with a database
//! and both servers up:
//!
//! ```bash
//! cargo run -p clementine-cli -- migrate
//! cargo run -p clementine-storefront &
//! cargo run -p clementine-admin &
//! cargo test -p clementine-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL for the admin API (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A unique suffix for test entities, so reruns never collide.
#[must_use]
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().to_string()[..8].to_string()
}
