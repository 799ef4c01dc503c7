use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

pub const NAME_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
/// Largest value a DECIMAL(10,2) column holds
pub const PRICE_MAX: f64 = 99_999_999.99;

pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 1000;

const RETURNING_COLUMNS: &str =
    " RETURNING id, name, description, price::float8 AS price, COALESCE(is_active, TRUE) AS is_active, created_at, updated_at";

/// A field that failed its bounds check
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Row of the demo `items` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Item {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

/// Body of `PUT /items/{id}`; absent (or null) fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Query string of `GET /items`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListItemsQuery {
    /// Rows to skip, at least 0
    #[serde(default)]
    pub skip: i64,
    /// Page size, between 1 and 1000
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    /// Only return active items
    #[serde(default)]
    pub active_only: bool,
}

fn default_list_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

impl Default for ListItemsQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
            active_only: false,
        }
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    let chars = name.chars().count();
    if chars == 0 {
        return Err(ValidationError::new("name", "must not be empty"));
    }
    if chars > NAME_MAX_CHARS {
        return Err(ValidationError::new(
            "name",
            format!("must be at most {NAME_MAX_CHARS} characters"),
        ));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), ValidationError> {
    match description {
        Some(text) if text.chars().count() > DESCRIPTION_MAX_CHARS => Err(ValidationError::new(
            "description",
            format!("must be at most {DESCRIPTION_MAX_CHARS} characters"),
        )),
        _ => Ok(()),
    }
}

fn validate_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::new(
            "price",
            "must be a number greater than or equal to 0",
        ));
    }
    if price > PRICE_MAX {
        return Err(ValidationError::new(
            "price",
            format!("must be at most {PRICE_MAX}"),
        ));
    }
    Ok(())
}

impl NewItem {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        validate_description(self.description.as_deref())?;
        validate_price(self.price)
    }
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.is_active.is_none()
    }

    /// Checks only the fields that are present
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        validate_description(self.description.as_deref())?;
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        Ok(())
    }

    /// Parameterised UPDATE listing only the present fields plus `updated_at`
    ///
    /// Returns `None` for an empty patch.
    pub fn update_statement(&self, id: i32) -> Option<QueryBuilder<'static, Postgres>> {
        if self.is_empty() {
            return None;
        }

        let mut builder = QueryBuilder::new("UPDATE items SET ");
        {
            let mut assignments = builder.separated(", ");
            if let Some(name) = &self.name {
                assignments.push("name = ");
                assignments.push_bind_unseparated(name.clone());
            }
            if let Some(description) = &self.description {
                assignments.push("description = ");
                assignments.push_bind_unseparated(description.clone());
            }
            if let Some(price) = self.price {
                assignments.push("price = ");
                assignments.push_bind_unseparated(price);
            }
            if let Some(is_active) = self.is_active {
                assignments.push("is_active = ");
                assignments.push_bind_unseparated(is_active);
            }
            assignments.push("updated_at = NOW()");
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(RETURNING_COLUMNS);

        Some(builder)
    }
}

impl ListItemsQuery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.skip < 0 {
            return Err(ValidationError::new(
                "skip",
                "must be greater than or equal to 0",
            ));
        }
        if !(1..=MAX_LIST_LIMIT).contains(&self.limit) {
            return Err(ValidationError::new(
                "limit",
                format!("must be between 1 and {MAX_LIST_LIMIT}"),
            ));
        }
        Ok(())
    }
}

impl Item {
    pub async fn create(pool: &PgPool, new_item: &NewItem) -> Result<Item, sqlx::Error> {
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, description, price, is_active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, price::float8 AS price,
                      COALESCE(is_active, TRUE) AS is_active, created_at, updated_at
            "#,
        )
        .bind(&new_item.name)
        .bind(&new_item.description)
        .bind(new_item.price)
        .bind(new_item.is_active)
        .fetch_one(pool)
        .await
    }

    /// Page of items ordered by id
    pub async fn list(pool: &PgPool, query: &ListItemsQuery) -> Result<Vec<Item>, sqlx::Error> {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, price::float8 AS price,
                   COALESCE(is_active, TRUE) AS is_active, created_at, updated_at
            FROM items
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY id
            OFFSET $2 LIMIT $3
            "#,
        )
        .bind(query.active_only)
        .bind(query.skip)
        .bind(query.limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Item>, sqlx::Error> {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, description, price::float8 AS price,
                   COALESCE(is_active, TRUE) AS is_active, created_at, updated_at
            FROM items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Apply a non-empty patch; `Ok(None)` when the row does not exist
    pub async fn update(
        pool: &PgPool,
        id: i32,
        patch: &ItemPatch,
    ) -> Result<Option<Item>, sqlx::Error> {
        let Some(mut statement) = patch.update_statement(id) else {
            return Item::find_by_id(pool, id).await;
        };
        statement
            .build_query_as::<Item>()
            .fetch_optional(pool)
            .await
    }

    /// Returns whether a row was removed
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
