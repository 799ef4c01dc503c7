//! # Items Handlers
//!
//! CRUD over the demo `items` table. The table is created on demand before
//! every operation.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use crate::database::ensure_items_table;
use crate::error::{ApiError, ApiResult};
use crate::logging::log_database_operation;
use crate::models::item::{Item, ItemPatch, ListItemsQuery, NewItem};
use crate::web::extractors::{ValidatedJson, ValidatedPath, ValidatedQuery};
use crate::web::state::AppState;

const ITEMS_TABLE: &str = "items";

fn item_not_found(id: i32) -> ApiError {
    ApiError::not_found(format!("Item {id} not found"))
}

/// Decode a PUT body; an empty body is an empty patch
pub fn parse_patch(body: &[u8]) -> ApiResult<ItemPatch> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ItemPatch::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::validation(format!("Failed to deserialize the JSON body: {e}")))
}

/// Create an item: POST /items
#[utoipa::path(
    post,
    path = "/items",
    request_body = NewItem,
    responses(
        (status = 201, description = "Item created", body = Item),
        (status = 422, description = "Invalid item", body = crate::error::ErrorBody),
        (status = 500, description = "Database failure", body = crate::error::ErrorBody)
    ),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<AppState>,
    ValidatedJson(new_item): ValidatedJson<NewItem>,
) -> ApiResult<(StatusCode, Json<Item>)> {
    new_item
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    ensure_items_table(&state.db_pool).await?;
    let item = Item::create(&state.db_pool, &new_item).await?;

    log_database_operation("create", Some(ITEMS_TABLE), Some(i64::from(item.id)), "success", None);
    Ok((StatusCode::CREATED, Json(item)))
}

/// List items: GET /items
#[utoipa::path(
    get,
    path = "/items",
    params(ListItemsQuery),
    responses(
        (status = 200, description = "Page of items ordered by id", body = [Item]),
        (status = 422, description = "Out-of-range query parameters", body = crate::error::ErrorBody),
        (status = 500, description = "Database failure", body = crate::error::ErrorBody)
    ),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ListItemsQuery>,
) -> ApiResult<Json<Vec<Item>>> {
    query
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    ensure_items_table(&state.db_pool).await?;
    let items = Item::list(&state.db_pool, &query).await?;

    debug!(
        skip = query.skip,
        limit = query.limit,
        active_only = query.active_only,
        count = items.len(),
        "Listed items"
    );
    Ok(Json(items))
}

/// Fetch one item: GET /items/{id}
#[utoipa::path(
    get,
    path = "/items/{id}",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 200, description = "The item", body = Item),
        (status = 404, description = "No such item", body = crate::error::ErrorBody),
        (status = 422, description = "Id is not a 32-bit integer", body = crate::error::ErrorBody),
        (status = 500, description = "Database failure", body = crate::error::ErrorBody)
    ),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> ApiResult<Json<Item>> {
    ensure_items_table(&state.db_pool).await?;
    Item::find_by_id(&state.db_pool, id)
        .await?
        .map(Json)
        .ok_or_else(|| item_not_found(id))
}

/// Partially update an item: PUT /items/{id}
#[utoipa::path(
    put,
    path = "/items/{id}",
    params(("id" = i32, Path, description = "Item id")),
    request_body = ItemPatch,
    responses(
        (status = 200, description = "Updated item", body = Item),
        (status = 400, description = "No fields to update", body = crate::error::ErrorBody),
        (status = 404, description = "No such item", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid field", body = crate::error::ErrorBody),
        (status = 500, description = "Database failure", body = crate::error::ErrorBody)
    ),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
    body: Bytes,
) -> ApiResult<Json<Item>> {
    let patch = parse_patch(&body)?;
    if patch.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }
    patch
        .validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    ensure_items_table(&state.db_pool).await?;
    let item = Item::update(&state.db_pool, id, &patch)
        .await?
        .ok_or_else(|| item_not_found(id))?;

    log_database_operation("update", Some(ITEMS_TABLE), Some(i64::from(id)), "success", None);
    Ok(Json(item))
}

/// Delete an item: DELETE /items/{id}
#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(("id" = i32, Path, description = "Item id")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "No such item", body = crate::error::ErrorBody),
        (status = 422, description = "Id is not a 32-bit integer", body = crate::error::ErrorBody),
        (status = 500, description = "Database failure", body = crate::error::ErrorBody)
    ),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    ValidatedPath(id): ValidatedPath<i32>,
) -> ApiResult<StatusCode> {
    ensure_items_table(&state.db_pool).await?;
    if !Item::delete(&state.db_pool, id).await? {
        return Err(item_not_found(id));
    }

    log_database_operation("delete", Some(ITEMS_TABLE), Some(i64::from(id)), "success", None);
    Ok(StatusCode::NO_CONTENT)
}
