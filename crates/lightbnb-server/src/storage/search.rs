//! Dynamic property search.
//!
//! Builds a single parameterized `SELECT` over `properties` joined with the
//! average of their reviews. Only the filters actually supplied contribute a
//! predicate, and every filter value is bound through a numbered positional
//! placeholder (`?1`, `?2`, ...). Placeholders are numbered when the statement
//! is rendered, in render order, so they always run contiguously from 1.

use serde::{Deserialize, Serialize};

use super::db::DatabaseError;
use super::money;

/// Row cap used when a search does not specify one.
pub const DEFAULT_LIMIT: u32 = 10;

const SELECT: &str = "SELECT properties.*, AVG(property_reviews.rating) AS average_rating \
     FROM properties \
     LEFT JOIN property_reviews ON property_reviews.property_id = properties.id";

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// A rendered statement. Placeholder `?k` binds `params[k - 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchStatement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Criteria set for a property search, as handed over by the HTTP layer.
///
/// Prices are in major currency units; ratings are on the review scale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertySearch {
    pub owner_id: Option<i64>,
    pub city: Option<String>,
    pub minimum_price_per_night: Option<f64>,
    pub maximum_price_per_night: Option<f64>,
    pub minimum_rating: Option<f64>,
    pub limit: Option<u32>,
}

impl PropertySearch {
    /// Validate the criteria and render the statement.
    pub fn to_statement(&self, default_limit: u32) -> Result<SearchStatement, DatabaseError> {
        let mut builder = PropertySearchBuilder::new().limit(self.limit.unwrap_or(default_limit))?;

        if let Some(owner_id) = self.owner_id {
            builder = builder.owner_id(owner_id);
        }
        if let Some(city) = &self.city {
            builder = builder.city(city);
        }
        if let Some(min) = self.minimum_price_per_night {
            builder = builder.minimum_price_per_night(min)?;
        }
        if let Some(max) = self.maximum_price_per_night {
            builder = builder.maximum_price_per_night(max)?;
        }
        if let Some(rating) = self.minimum_rating {
            builder = builder.minimum_rating(rating)?;
        }

        Ok(builder.build())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    /// Row filter, applied before grouping.
    Where,
    /// Aggregate filter, applied after grouping.
    Having,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Filter {
    Owner,
    City,
    MinimumPrice,
    MaximumPrice,
    MinimumRating,
}

impl Filter {
    const fn clause(self) -> Clause {
        match self {
            Self::MinimumRating => Clause::Having,
            _ => Clause::Where,
        }
    }

    /// Text before and after the placeholder.
    const fn template(self) -> (&'static str, &'static str) {
        match self {
            Self::Owner => ("properties.owner_id = ", ""),
            Self::City => ("properties.city LIKE ", " ESCAPE '\\'"),
            Self::MinimumPrice => ("properties.cost_per_night >= ", ""),
            Self::MaximumPrice => ("properties.cost_per_night <= ", ""),
            Self::MinimumRating => ("AVG(property_reviews.rating) >= ", ""),
        }
    }
}

#[derive(Debug, Clone)]
struct Predicate {
    filter: Filter,
    value: SqlParam,
}

/// Accumulates search predicates and renders them into a [`SearchStatement`].
///
/// Values are converted when a filter is added, never at render time, so a
/// builder can be rendered any number of times.
#[derive(Debug, Clone)]
pub struct PropertySearchBuilder {
    predicates: Vec<Predicate>,
    limit: u32,
}

impl Default for PropertySearchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertySearchBuilder {
    pub const fn new() -> Self {
        Self {
            predicates: Vec::new(),
            limit: DEFAULT_LIMIT,
        }
    }

    /// Only properties owned by `owner_id`.
    #[must_use]
    pub fn owner_id(self, owner_id: i64) -> Self {
        self.with(Filter::Owner, SqlParam::Integer(owner_id))
    }

    /// Only properties whose city contains `city`.
    ///
    /// `LIKE` wildcards in the input are matched literally. A blank city adds
    /// no predicate.
    #[must_use]
    pub fn city(self, city: &str) -> Self {
        let city = city.trim();
        if city.is_empty() {
            return self;
        }
        let pattern = format!("%{}%", escape_like(city));
        self.with(Filter::City, SqlParam::Text(pattern))
    }

    /// Inclusive lower price bound, in major currency units.
    pub fn minimum_price_per_night(self, major: f64) -> Result<Self, DatabaseError> {
        let cents = money::to_minor_units(major)?;
        Ok(self.with(Filter::MinimumPrice, SqlParam::Integer(cents)))
    }

    /// Inclusive upper price bound, in major currency units.
    pub fn maximum_price_per_night(self, major: f64) -> Result<Self, DatabaseError> {
        let cents = money::to_minor_units(major)?;
        Ok(self.with(Filter::MaximumPrice, SqlParam::Integer(cents)))
    }

    /// Lower bound on the average review rating. Unreviewed properties have
    /// no average and never satisfy it.
    pub fn minimum_rating(self, rating: f64) -> Result<Self, DatabaseError> {
        if !rating.is_finite() || rating < 0.0 {
            return Err(DatabaseError::InvalidCriteria(format!(
                "minimum rating must be a non-negative number, got {rating}"
            )));
        }
        Ok(self.with(Filter::MinimumRating, SqlParam::Float(rating)))
    }

    pub fn limit(mut self, limit: u32) -> Result<Self, DatabaseError> {
        if limit == 0 {
            return Err(DatabaseError::InvalidCriteria(
                "limit must be at least 1".to_string(),
            ));
        }
        self.limit = limit;
        Ok(self)
    }

    /// Number of filters currently applied.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Render the statement. `WHERE` predicates come first, then `HAVING`,
    /// then the limit, and placeholders are numbered in that order.
    pub fn build(&self) -> SearchStatement {
        let mut sql = String::from(SELECT);
        let mut params = Vec::with_capacity(self.predicates.len() + 1);

        self.render_clause(Clause::Where, " WHERE ", &mut sql, &mut params);
        sql.push_str(" GROUP BY properties.id");
        self.render_clause(Clause::Having, " HAVING ", &mut sql, &mut params);

        params.push(SqlParam::Integer(i64::from(self.limit)));
        sql.push_str(" ORDER BY properties.cost_per_night, properties.id LIMIT ?");
        sql.push_str(&params.len().to_string());

        SearchStatement { sql, params }
    }

    fn with(mut self, filter: Filter, value: SqlParam) -> Self {
        self.predicates.retain(|p| p.filter != filter);
        self.predicates.push(Predicate { filter, value });
        self
    }

    fn render_clause(
        &self,
        clause: Clause,
        keyword: &str,
        sql: &mut String,
        params: &mut Vec<SqlParam>,
    ) {
        let mut first = true;
        for predicate in self
            .predicates
            .iter()
            .filter(|p| p.filter.clause() == clause)
        {
            sql.push_str(if first { keyword } else { " AND " });
            first = false;

            params.push(predicate.value.clone());
            let (before, after) = predicate.filter.template();
            sql.push_str(before);
            sql.push('?');
            sql.push_str(&params.len().to_string());
            sql.push_str(after);
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Placeholder numbers in the order they appear in `sql`.
    fn placeholders(sql: &str) -> Vec<usize> {
        let mut found = Vec::new();
        let mut rest = sql;
        while let Some(pos) = rest.find('?') {
            rest = &rest[pos + 1..];
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            found.push(digits.parse().unwrap());
        }
        found
    }

    fn full_builder() -> PropertySearchBuilder {
        PropertySearchBuilder::new()
            .owner_id(7)
            .city("Van")
            .minimum_price_per_night(100.0)
            .unwrap()
            .maximum_price_per_night(200.0)
            .unwrap()
            .minimum_rating(4.0)
            .unwrap()
    }

    #[test]
    fn no_criteria_only_binds_limit() {
        let stmt = PropertySearchBuilder::new().limit(5).unwrap().build();

        assert!(!stmt.sql.contains("WHERE"));
        assert!(!stmt.sql.contains("HAVING"));
        assert!(stmt.sql.contains("LEFT JOIN property_reviews"));
        assert!(
            stmt.sql
                .ends_with("ORDER BY properties.cost_per_night, properties.id LIMIT ?1")
        );
        assert_eq!(stmt.params, vec![SqlParam::Integer(5)]);
    }

    #[test]
    fn default_limit_is_ten() {
        let stmt = PropertySearchBuilder::new().build();
        assert_eq!(stmt.params, vec![SqlParam::Integer(10)]);
    }

    #[test]
    fn argument_count_matches_every_criteria_subset() {
        for mask in 0u8..32 {
            let mut builder = PropertySearchBuilder::new();
            let mut supplied = 0;
            if mask & 1 != 0 {
                builder = builder.owner_id(1);
                supplied += 1;
            }
            if mask & 2 != 0 {
                builder = builder.city("van");
                supplied += 1;
            }
            if mask & 4 != 0 {
                builder = builder.minimum_price_per_night(50.0).unwrap();
                supplied += 1;
            }
            if mask & 8 != 0 {
                builder = builder.maximum_price_per_night(500.0).unwrap();
                supplied += 1;
            }
            if mask & 16 != 0 {
                builder = builder.minimum_rating(3.5).unwrap();
                supplied += 1;
            }

            let stmt = builder.build();
            assert_eq!(stmt.params.len(), supplied + 1, "mask {mask}");
            let expected: Vec<usize> = (1..=supplied + 1).collect();
            assert_eq!(placeholders(&stmt.sql), expected, "mask {mask}: {}", stmt.sql);
        }
    }

    #[test]
    fn price_bounds_are_bound_in_cents() {
        let stmt = PropertySearchBuilder::new()
            .minimum_price_per_night(100.0)
            .unwrap()
            .maximum_price_per_night(200.0)
            .unwrap()
            .build();

        assert!(stmt.sql.contains("properties.cost_per_night >= ?1"));
        assert!(stmt.sql.contains("properties.cost_per_night <= ?2"));
        assert_eq!(
            stmt.params,
            vec![
                SqlParam::Integer(10_000),
                SqlParam::Integer(20_000),
                SqlParam::Integer(10),
            ]
        );
    }

    #[test]
    fn rendering_twice_does_not_convert_twice() {
        let builder = PropertySearchBuilder::new()
            .minimum_price_per_night(150.0)
            .unwrap();
        let first = builder.build();
        let second = builder.build();
        assert_eq!(first, second);
        assert_eq!(first.params[0], SqlParam::Integer(15_000));
    }

    #[test]
    fn rating_filters_the_aggregate_after_row_filters() {
        let stmt = PropertySearchBuilder::new()
            .minimum_rating(4.0)
            .unwrap()
            .owner_id(3)
            .build();

        let where_at = stmt.sql.find("WHERE properties.owner_id = ?1").unwrap();
        let group_at = stmt.sql.find("GROUP BY properties.id").unwrap();
        let having_at = stmt
            .sql
            .find("HAVING AVG(property_reviews.rating) >= ?2")
            .unwrap();
        assert!(where_at < group_at && group_at < having_at);
        assert_eq!(
            stmt.params,
            vec![
                SqlParam::Integer(3),
                SqlParam::Float(4.0),
                SqlParam::Integer(10),
            ]
        );
    }

    #[test]
    fn all_filters_are_conjoined() {
        let stmt = full_builder().build();
        assert!(stmt.sql.contains(
            "WHERE properties.owner_id = ?1 AND properties.city LIKE ?2 ESCAPE '\\' \
             AND properties.cost_per_night >= ?3 AND properties.cost_per_night <= ?4"
        ));
        assert!(stmt.sql.contains("HAVING AVG(property_reviews.rating) >= ?5"));
        assert!(stmt.sql.ends_with("LIMIT ?6"));
    }

    #[test]
    fn city_is_a_bound_substring_pattern() {
        let stmt = PropertySearchBuilder::new()
            .city("x' OR 1=1 --")
            .build();
        assert!(!stmt.sql.contains("OR 1=1"));
        assert_eq!(stmt.params[0], SqlParam::Text("%x' OR 1=1 --%".to_string()));
    }

    #[test]
    fn city_wildcards_are_escaped() {
        let stmt = PropertySearchBuilder::new().city("50%_off\\").build();
        assert_eq!(
            stmt.params[0],
            SqlParam::Text("%50\\%\\_off\\\\%".to_string())
        );
    }

    #[test]
    fn blank_city_adds_nothing() {
        let builder = PropertySearchBuilder::new().city("   ");
        assert!(builder.is_empty());
        assert!(!builder.build().sql.contains("WHERE"));
    }

    #[test]
    fn repeating_a_filter_replaces_it() {
        let builder = PropertySearchBuilder::new().owner_id(1).owner_id(2);
        assert_eq!(builder.len(), 1);
        assert_eq!(builder.build().params[0], SqlParam::Integer(2));
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        assert!(matches!(
            PropertySearchBuilder::new().minimum_price_per_night(-1.0),
            Err(DatabaseError::InvalidCriteria(_))
        ));
        assert!(matches!(
            PropertySearchBuilder::new().maximum_price_per_night(f64::NAN),
            Err(DatabaseError::InvalidCriteria(_))
        ));
        assert!(matches!(
            PropertySearchBuilder::new().minimum_rating(-0.5),
            Err(DatabaseError::InvalidCriteria(_))
        ));
        assert!(matches!(
            PropertySearchBuilder::new().limit(0),
            Err(DatabaseError::InvalidCriteria(_))
        ));
    }

    #[test]
    fn criteria_set_uses_default_limit_when_unset() {
        let search = PropertySearch {
            city: Some("van".to_string()),
            ..Default::default()
        };
        let stmt = search.to_statement(25).unwrap();
        assert_eq!(
            stmt.params,
            vec![SqlParam::Text("%van%".to_string()), SqlParam::Integer(25)]
        );

        let limited = PropertySearch {
            limit: Some(3),
            ..search
        };
        assert_eq!(
            limited.to_statement(25).unwrap().params.last(),
            Some(&SqlParam::Integer(3))
        );
    }

    #[test]
    fn criteria_set_fails_fast_on_bad_input() {
        let search = PropertySearch {
            minimum_price_per_night: Some(-5.0),
            ..Default::default()
        };
        assert!(matches!(
            search.to_statement(DEFAULT_LIMIT),
            Err(DatabaseError::InvalidCriteria(_))
        ));
    }

    #[test]
    fn criteria_deserialize_from_partial_json() {
        let search: PropertySearch =
            serde_json::from_str(r#"{"city": "Toronto", "minimum_rating": 4}"#).unwrap();
        assert_eq!(search.city.as_deref(), Some("Toronto"));
        assert_eq!(search.minimum_rating, Some(4.0));
        assert!(search.owner_id.is_none());
        assert!(search.limit.is_none());
    }
}
