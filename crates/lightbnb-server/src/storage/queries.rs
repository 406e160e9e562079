//! User and reservation queries for `LightBnB`.

use super::db::{DatabaseError, LightbnbDatabase};
use super::models::{NewUser, ReservationListing, User};

impl LightbnbDatabase {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Create a new user. The email must not already be registered.
    pub async fn create_user(&self, user: &NewUser) -> Result<User, DatabaseError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash) VALUES (?1, ?2, ?3) RETURNING *",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(self.pool())
        .await?;

        Ok(created)
    }

    /// Get a user by email.
    pub async fn get_user_with_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get_user_with_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    // =========================================================================
    // Reservation queries
    // =========================================================================

    /// List a guest's reservations, earliest start date first.
    ///
    /// Each row carries the reserved property and the average rating of the
    /// reviews left for that reservation (`None` when unreviewed).
    pub async fn get_all_reservations(
        &self,
        guest_id: i64,
        limit: u32,
    ) -> Result<Vec<ReservationListing>, DatabaseError> {
        if limit == 0 {
            return Err(DatabaseError::InvalidCriteria(
                "limit must be at least 1".to_string(),
            ));
        }

        let rows = sqlx::query_as::<_, ReservationListing>(
            "SELECT reservations.id AS reservation_id, \
                    reservations.property_id AS reservation_property_id, \
                    reservations.guest_id AS reservation_guest_id, \
                    reservations.start_date AS reservation_start_date, \
                    reservations.end_date AS reservation_end_date, \
                    properties.*, \
                    AVG(property_reviews.rating) AS average_rating \
             FROM reservations \
             JOIN properties ON properties.id = reservations.property_id \
             LEFT JOIN property_reviews ON property_reviews.reservation_id = reservations.id \
             WHERE reservations.guest_id = ?1 \
             GROUP BY reservations.id, properties.id \
             ORDER BY reservations.start_date, reservations.id \
             LIMIT ?2",
        )
        .bind(guest_id)
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}
