//! `LightBnB` Server Library
//!
//! Core functionality for the `LightBnB` booking backend:
//! - `SQLite` storage for users, properties, and reservations
//! - Dynamic, parameterized property search
//! - Account signup and login with argon2 password hashing

pub mod accounts;
pub mod storage;
