//! `SQLite` storage for `LightBnB`.
//!
//! Provides persistence for users, properties, and reservations, plus the
//! dynamic property search.

mod db;
pub mod money;
mod models;
mod queries;
mod queries_properties;
pub mod search;


pub use db::{DatabaseError, LightbnbDatabase};
pub use models::*;
pub use search::{PropertySearch, PropertySearchBuilder, SearchStatement, SqlParam};
