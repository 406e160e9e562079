//! Database connection and initialization.

pub use lightbnb_core::db::DatabaseError;

lightbnb_core::define_database!(LightbnbDatabase, "LightBnB database migrations complete");
