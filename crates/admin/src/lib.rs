//! Clementine Admin library.
//!
//! This crate provides the admin functionality as a library,
//! allowing it to be tested and reused (the CLI uses its repositories
//! for seeding).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod stripe;
