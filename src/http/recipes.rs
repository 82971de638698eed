//! Recipe endpoints under `/api/v1/recipes`.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::store::{Recipe, RecipeInput};

/// Base path of the recipe collection.
pub const BASE_PATH: &str = "/api/v1/recipes";

/// Query string of the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub tag: Option<String>,
}

/// Recipe routes, relative to the server root.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/recipes", get(list_recipes).post(create_recipe))
        .route("/api/v1/recipes/search", get(search_recipes))
        .route(
            "/api/v1/recipes/{id}",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
}

/// POST /api/v1/recipes
pub async fn create_recipe(
    State(state): State<AppState>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let Json(input) = payload?;
    let recipe = state
        .store
        .insert(input)
        .await
        .map_err(|e| ApiError::store("insert", e))?;

    tracing::info!(id = %recipe.id, name = %recipe.name, "Recipe created");
    Ok(Json(recipe))
}

/// GET /api/v1/recipes
pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state
        .store
        .find_all()
        .await
        .map_err(|e| ApiError::store("find_all", e))?;
    Ok(Json(recipes))
}

/// GET /api/v1/recipes/{id}
pub async fn get_recipe(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let Path(id) = id?;
    let recipe = state
        .store
        .find_by_id(&id)
        .await
        .map_err(|e| ApiError::store("find_by_id", e))?;
    Ok(Json(recipe))
}

/// PUT /api/v1/recipes/{id}
pub async fn update_recipe(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let Path(id) = id?;
    let Json(input) = payload?;
    let recipe = state
        .store
        .update_by_id(&id, input)
        .await
        .map_err(|e| ApiError::store("update_by_id", e))?;

    tracing::info!(id = %recipe.id, "Recipe updated");
    Ok(Json(recipe))
}

/// DELETE /api/v1/recipes/{id}
pub async fn delete_recipe(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let Path(id) = id?;
    let recipe = state
        .store
        .delete_by_id(&id)
        .await
        .map_err(|e| ApiError::store("delete_by_id", e))?;

    tracing::info!(id = %recipe.id, "Recipe deleted");
    Ok(Json(recipe))
}

/// GET /api/v1/recipes/search?tag=X
///
/// No match is an empty array, not a 404.
pub async fn search_recipes(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Recipe>>, ApiError> {
    let Query(params) = params?;
    let tag = params
        .tag
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("tag query parameter is required".to_string()))?;

    let recipes = state
        .store
        .find_by_tag(&tag)
        .await
        .map_err(|e| ApiError::store("find_by_tag", e))?;

    tracing::debug!(tag = %tag, matches = recipes.len(), "Recipe search");
    Ok(Json(recipes))
}
