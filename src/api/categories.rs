use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::category::{CategoryCreate, CategoryResponse, CategoryUpdate};


pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/:category_id", get(get_category).patch(update_category).delete(delete_category))
}

async fn list_categories(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = repositories::categories::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list categories"))?;
    Ok(Json(categories.into_iter().map(CategoryResponse::from_db).collect()))
}

async fn create_category(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Json(payload): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Category name must not be empty".to_string()));
    }

    let existing = repositories::categories::exists_by_name(state.db(), name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check category name"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Category with this name already exists".to_string()));
    }

    let category = repositories::categories::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        name,
        &payload.description,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create category"))?;

    Ok((StatusCode::CREATED, Json(CategoryResponse::from_db(category))))
}

async fn get_category(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(category_id): Path<String>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = fetch_category(&state, &category_id).await?;
    Ok(Json(CategoryResponse::from_db(category)))
}

async fn update_category(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Path(category_id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category = fetch_category(&state, &category_id).await?;

    if let Some(name) = &payload.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::BadRequest("Category name must not be empty".to_string()));
        }
        let existing = repositories::categories::exists_by_name(state.db(), name)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check category name"))?;
        if existing.is_some_and(|id| id != category.id) {
            return Err(ApiError::Conflict("Category with this name already exists".to_string()));
        }
    }

    repositories::categories::update(
        state.db(),
        &category.id,
        repositories::categories::UpdateCategory {
            name: payload.name.map(|n| n.trim().to_string()),
            description: payload.description,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update category"))?;

    let updated = fetch_category(&state, &category_id).await?;
    Ok(Json(CategoryResponse::from_db(updated)))
}

async fn delete_category(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Path(category_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::categories::delete(state.db(), &category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete category"))?;
    if !deleted {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_category(
    state: &AppState,
    category_id: &str,
) -> Result<crate::db::models::CourseCategory, ApiError> {
    repositories::categories::find_by_id(state.db(), category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch category"))?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
}
