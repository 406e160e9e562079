//! Data models for `LightBnB` storage.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// A user about to be inserted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// A listing. `cost_per_night` is in minor currency units (cents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Property {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub cover_url: String,
    pub cost_per_night: i64,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub country: String,
    pub parking_spaces: i64,
    pub bathrooms: i64,
    pub bedrooms: i64,
}

/// Host-supplied property. `cost_per_night` is in major currency units.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewProperty {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub cover_url: String,
    pub cost_per_night: f64,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub country: String,
    pub parking_spaces: i64,
    pub bathrooms: i64,
    pub bedrooms: i64,
}

/// A property search hit with its aggregate rating.
///
/// `average_rating` is `None` when the property has no reviews.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PropertyListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub property: Property,
    pub average_rating: Option<f64>,
}

/// A booking of one property by one guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: i64,
    pub property_id: i64,
    pub guest_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A guest's reservation joined with its property and the reservation's
/// aggregate rating.
///
/// Both sides have an `id`, so the query aliases the reservation columns
/// with a `reservation_` prefix and rows are decoded by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationListing {
    pub reservation: Reservation,
    pub property: Property,
    pub average_rating: Option<f64>,
}

impl<'r> FromRow<'r, SqliteRow> for ReservationListing {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            reservation: Reservation {
                id: row.try_get("reservation_id")?,
                property_id: row.try_get("reservation_property_id")?,
                guest_id: row.try_get("reservation_guest_id")?,
                start_date: row.try_get("reservation_start_date")?,
                end_date: row.try_get("reservation_end_date")?,
            },
            property: Property::from_row(row)?,
            average_rating: row.try_get("average_rating")?,
        })
    }
}
