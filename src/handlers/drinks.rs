use axum::extract::Path;
use axum::http::HeaderMap;
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::database::drinks::DrinkRepository;
use crate::database::manager::DatabaseManager;
use crate::database::models::drink::{Drink, Ingredient};
use crate::error::ApiError;

/// Body of create and partial-update requests. Both fields optional so
/// PATCH can update either independently.
#[derive(Debug, Deserialize)]
pub struct DrinkPayload {
    pub title: Option<String>,
    pub recipe: Option<Value>,
}

async fn repository() -> Result<DrinkRepository, ApiError> {
    Ok(DrinkRepository::new(DatabaseManager::pool().await?))
}

/// Path ids arrive as raw segments so the auth gate runs before id
/// validation; a non-integer id maps to the 404 envelope like any other
/// unknown drink.
fn parse_drink_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

/// The original service answers 404, not 400, to a missing body;
/// preserved for compatibility.
fn require_body(body: Option<Json<DrinkPayload>>) -> Result<DrinkPayload, ApiError> {
    body.map(|Json(payload)| payload).ok_or(ApiError::NotFound)
}

/// Duplicate titles are a client error, checked before persistence.
fn reject_duplicate(existing: Option<&Drink>) -> Result<(), ApiError> {
    match existing {
        Some(_) => Err(ApiError::BadRequest),
        None => Ok(()),
    }
}

fn require_found(drink: Option<Drink>) -> Result<Drink, ApiError> {
    drink.ok_or(ApiError::NotFound)
}

/// Normalize and encode a recipe for persistence. A single object is
/// accepted and wrapped into a one-element array rather than rejected.
fn encode_recipe(recipe: Value) -> Result<String, ApiError> {
    let entries = match recipe {
        Value::Array(entries) => entries,
        single => vec![single],
    };
    let ingredients: Vec<Ingredient> = entries
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<_, _>>()?;
    Ok(serde_json::to_string(&ingredients)?)
}

/// GET /drinks - Public menu listing in the short representation
pub async fn list() -> Result<Json<Value>, ApiError> {
    let drinks = repository().await?.all().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }

    let views: Vec<Value> = drinks
        .iter()
        .map(Drink::short)
        .collect::<Result<_, _>>()?;
    Ok(Json(json!({ "success": true, "drinks": views })))
}

/// GET /drinks-detail - Full listing, requires `get:drinks-detail`
pub async fn list_detail(headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    auth::authorize(&headers, "get:drinks-detail").await?;

    let drinks = repository().await?.all().await?;
    if drinks.is_empty() {
        return Err(ApiError::NotFound);
    }

    let views: Vec<Value> = drinks
        .iter()
        .map(Drink::long)
        .collect::<Result<_, _>>()?;
    Ok(Json(json!({ "success": true, "drinks": views })))
}

/// POST /drinks - Create a drink, requires `post:drinks`
pub async fn create(
    headers: HeaderMap,
    body: Option<Json<DrinkPayload>>,
) -> Result<Json<Value>, ApiError> {
    auth::authorize(&headers, "post:drinks").await?;

    let payload = require_body(body)?;
    let title = payload.title.ok_or(ApiError::Unprocessable)?;
    let recipe = payload.recipe.ok_or(ApiError::Unprocessable)?;

    let repo = repository().await?;
    reject_duplicate(repo.by_title(&title).await?.as_ref())?;

    let encoded = encode_recipe(recipe)?;
    let drink = repo.insert(&title, &encoded).await?;
    Ok(Json(json!({ "success": true, "drinks": [drink.long()?] })))
}

/// PATCH /drinks/:id - Partial update, requires `patch:drinks`
pub async fn update(
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Option<Json<DrinkPayload>>,
) -> Result<Json<Value>, ApiError> {
    auth::authorize(&headers, "patch:drinks").await?;
    let id = parse_drink_id(&id)?;

    let repo = repository().await?;
    let mut drink = require_found(repo.by_id(id).await?)?;

    let payload = require_body(body)?;
    if let Some(title) = payload.title {
        drink.title = title;
    }
    if let Some(recipe) = payload.recipe {
        drink.recipe = encode_recipe(recipe)?;
    }

    repo.update(&drink).await?;
    Ok(Json(json!({ "success": true, "drinks": [drink.long()?] })))
}

/// DELETE /drinks/:id - Delete a drink, requires `delete:drinks`
pub async fn remove(Path(id): Path<String>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    auth::authorize(&headers, "delete:drinks").await?;
    let id = parse_drink_id(&id)?;

    let repo = repository().await?;
    let drink = require_found(repo.by_id(id).await?)?;
    repo.delete(drink.id).await?;

    Ok(Json(json!({ "success": true, "delete": drink.id })))
}
