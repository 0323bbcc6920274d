//! Dish records, write payloads and listing parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// A persisted dish. Read-only once loaded; writes go through [`NewDish`]
/// and [`DishPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Validate)]
pub struct NewDish {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl NewDish {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Partial update: only fields that are `Some` are written.
///
/// A JSON `null` is treated the same as an absent field, so a patch can
/// never clear `description`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct DishPatch {
    #[serde(default)]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

impl DishPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Sortable columns. Anything else falls back to `Id`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Id,
    Name,
    CreatedAt,
}

impl SortField {
    /// Parse a requested sort key; unknown keys normalize to `Id`.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("name") => Self::Name,
            Some("created_at") => Self::CreatedAt,
            _ => Self::Id,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.trim().eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Query-string shape of `GET /dishes`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct DishListQuery {
    pub search: Option<String>,
    pub order_by: Option<String>,
    #[validate(custom(function = "validate_direction"))]
    pub direction: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

fn validate_direction(direction: &str) -> Result<(), validator::ValidationError> {
    if direction.eq_ignore_ascii_case("asc") || direction.eq_ignore_ascii_case("desc") {
        Ok(())
    } else {
        Err(validator::ValidationError::new("direction must be 'asc' or 'desc'"))
    }
}

/// Normalized listing parameters handed to the store.
///
/// Construction never fails: out-of-range paging values are clamped and an
/// unknown sort key becomes `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DishFilter {
    pub search: Option<String>,
    pub order_by: SortField,
    pub direction: SortDirection,
    pub limit: i64,
    pub offset: i64,
}

impl Default for DishFilter {
    fn default() -> Self {
        Self {
            search: None,
            order_by: SortField::Id,
            direction: SortDirection::Asc,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl DishFilter {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into()).filter(|s: &String| !s.is_empty());
        self
    }

    pub fn order_by(mut self, field: SortField, direction: SortDirection) -> Self {
        self.order_by = field;
        self.direction = direction;
        self
    }

    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = limit;
        self.offset = offset;
        (self.limit, self.offset) = self.bounded_page();
        self
    }

    /// `(limit, offset)` forced into `1..=MAX_LIMIT` and `0..`. Stores page
    /// with these, so a filter built as a struct literal is clamped too.
    pub fn bounded_page(&self) -> (i64, i64) {
        (self.limit.clamp(1, MAX_LIMIT), self.offset.max(0))
    }
}

impl From<DishListQuery> for DishFilter {
    fn from(query: DishListQuery) -> Self {
        Self {
            search: query.search.filter(|s| !s.is_empty()),
            order_by: SortField::parse_lenient(query.order_by.as_deref()),
            direction: SortDirection::parse_lenient(query.direction.as_deref()),
            limit: query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: query.offset.unwrap_or(0).max(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_sort_key_normalizes_to_id() {
        assert_eq!(SortField::parse_lenient(Some("description")), SortField::Id);
        assert_eq!(SortField::parse_lenient(None), SortField::Id);
        assert_eq!(SortField::parse_lenient(Some("name")), SortField::Name);
        assert_eq!(
            SortField::parse_lenient(Some("created_at")),
            SortField::CreatedAt
        );
    }

    #[test]
    fn paging_is_clamped() {
        let filter = DishFilter::from(DishListQuery {
            limit: Some(1000),
            offset: Some(-5),
            ..Default::default()
        });
        assert_eq!(filter.limit, MAX_LIMIT);
        assert_eq!(filter.offset, 0);

        let filter = DishFilter::default().page(0, 3);
        assert_eq!(filter.limit, 1);
        assert_eq!(filter.offset, 3);

        let literal = DishFilter {
            limit: -1,
            offset: -10,
            ..Default::default()
        };
        assert_eq!(literal.bounded_page(), (1, 0));
        let literal = DishFilter {
            limit: 1000,
            ..Default::default()
        };
        assert_eq!(literal.bounded_page(), (MAX_LIMIT, 0));
    }

    #[test]
    fn empty_search_means_no_filter() {
        let filter = DishFilter::from(DishListQuery {
            search: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(filter.search, None);
        assert_eq!(DishFilter::default().search("").search, None);
    }

    #[test]
    fn name_length_counts_characters() {
        let name: String = "菜".repeat(100);
        assert!(NewDish::new(name.clone()).validate().is_ok());
        assert!(NewDish::new(format!("{name}菜")).validate().is_err());
        assert!(NewDish::new("").validate().is_err());
        assert!(NewDish::new("汤")
            .with_description("x".repeat(501))
            .validate()
            .is_err());
    }

    #[test]
    fn list_query_rejects_bad_direction_and_limit() {
        let query = DishListQuery {
            direction: Some("sideways".to_string()),
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = DishListQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = DishListQuery {
            direction: Some("DESC".to_string()),
            limit: Some(100),
            offset: Some(0),
            ..Default::default()
        };
        assert!(query.validate().is_ok());
    }

    #[test]
    fn patch_builder_sets_only_given_fields() {
        assert!(DishPatch::new().is_empty());
        let patch = DishPatch::new().description("new");
        assert_eq!(patch.name, None);
        assert_eq!(patch.description.as_deref(), Some("new"));
    }
}
