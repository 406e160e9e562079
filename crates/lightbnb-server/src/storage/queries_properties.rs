//! Property queries for `LightBnB`.

use super::db::{DatabaseError, LightbnbDatabase};
use super::models::{NewProperty, Property, PropertyListing};
use super::money;
use super::search::{PropertySearch, SearchStatement, SqlParam};

impl LightbnbDatabase {
    /// Search properties with whichever filters `search` supplies.
    ///
    /// `default_limit` applies when the search names no limit. Invalid
    /// criteria fail before anything is sent to the database.
    pub async fn get_all_properties(
        &self,
        search: &PropertySearch,
        default_limit: u32,
    ) -> Result<Vec<PropertyListing>, DatabaseError> {
        let statement = search.to_statement(default_limit)?;
        self.run_search(&statement).await
    }

    /// Execute an already rendered search statement.
    pub async fn run_search(
        &self,
        statement: &SearchStatement,
    ) -> Result<Vec<PropertyListing>, DatabaseError> {
        let mut query = sqlx::query_as::<_, PropertyListing>(&statement.sql);
        for param in &statement.params {
            query = match param {
                SqlParam::Integer(v) => query.bind(*v),
                SqlParam::Float(v) => query.bind(*v),
                SqlParam::Text(v) => query.bind(v.as_str()),
            };
        }

        Ok(query.fetch_all(self.pool()).await?)
    }

    /// Get a property by ID.
    pub async fn get_property(&self, id: i64) -> Result<Option<Property>, DatabaseError> {
        let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(property)
    }

    /// Create a property. The price arrives in major units and is stored in
    /// minor units.
    pub async fn create_property(&self, property: &NewProperty) -> Result<Property, DatabaseError> {
        let cost_per_night = money::to_minor_units(property.cost_per_night)?;

        let created = sqlx::query_as::<_, Property>(
            "INSERT INTO properties (owner_id, title, description, thumbnail_url, cover_url, \
                 cost_per_night, street, city, province, post_code, country, \
                 parking_spaces, bathrooms, bedrooms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14) \
             RETURNING *",
        )
        .bind(property.owner_id)
        .bind(&property.title)
        .bind(&property.description)
        .bind(&property.thumbnail_url)
        .bind(&property.cover_url)
        .bind(cost_per_night)
        .bind(&property.street)
        .bind(&property.city)
        .bind(&property.province)
        .bind(&property.post_code)
        .bind(&property.country)
        .bind(property.parking_spaces)
        .bind(property.bathrooms)
        .bind(property.bedrooms)
        .fetch_one(self.pool())
        .await?;

        Ok(created)
    }
}
