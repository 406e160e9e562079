//! `LightBnB` Core Library
//!
//! Shared functionality for `LightBnB` components:
//! - `SQLite` pool helpers and the database error taxonomy
//! - Configuration resolution and hierarchy
//! - Tracing initialization
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::Config;
pub use db::DatabaseError;
pub use error::{Error, Result};
