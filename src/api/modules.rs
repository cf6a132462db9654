use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, require_enrollment, CurrentTeacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Module;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::lesson::LessonResponse;
use crate::schemas::module::{ModuleCreate, ModuleResponse, ModuleUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_module))
        .route("/course/:course_id", get(list_for_course))
        .route("/:module_id", get(get_module).patch(update_module).delete(delete_module))
        .route("/:module_id/lessons", get(list_lessons))
}

async fn create_module(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Json(payload): Json<ModuleCreate>,
) -> Result<(StatusCode, Json<ModuleResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    require_course_owner(&state, &teacher, &payload.course_id).await?;

    let now = primitive_now_utc();
    let module = repositories::modules::create(
        state.db(),
        repositories::modules::CreateModule {
            id: &Uuid::new_v4().to_string(),
            course_id: &payload.course_id,
            title: &payload.title,
            description: &payload.description,
            order_index: payload.order_index,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create module"))?;

    Ok((StatusCode::CREATED, Json(ModuleResponse::from_db(module))))
}

async fn list_for_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<ModuleResponse>>, ApiError> {
    require_course_access(&state, &user, &course_id).await?;

    let modules = repositories::modules::list_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list modules"))?;

    Ok(Json(modules.into_iter().map(ModuleResponse::from_db).collect()))
}

async fn get_module(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(module_id): Path<String>,
) -> Result<Json<ModuleResponse>, ApiError> {
    let module = fetch_module(&state, &module_id).await?;
    require_course_access(&state, &user, &module.course_id).await?;

    Ok(Json(ModuleResponse::from_db(module)))
}

async fn update_module(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(module_id): Path<String>,
    Json(payload): Json<ModuleUpdate>,
) -> Result<Json<ModuleResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let module = fetch_module(&state, &module_id).await?;
    require_course_owner(&state, &teacher, &module.course_id).await?;

    repositories::modules::update(
        state.db(),
        &module.id,
        repositories::modules::UpdateModule {
            title: payload.title,
            description: payload.description,
            order_index: payload.order_index,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update module"))?;

    let updated = fetch_module(&state, &module_id).await?;
    Ok(Json(ModuleResponse::from_db(updated)))
}

async fn delete_module(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(module_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let module = fetch_module(&state, &module_id).await?;
    require_course_owner(&state, &teacher, &module.course_id).await?;

    let urls = repositories::modules::collect_file_urls(state.db(), &module.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to collect module files"))?;
    crate::services::assets::delete_stored_urls(state.storage(), urls).await;

    repositories::modules::delete(state.db(), &module.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete module"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_lessons(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(module_id): Path<String>,
) -> Result<Json<Vec<LessonResponse>>, ApiError> {
    let module = fetch_module(&state, &module_id).await?;
    require_course_access(&state, &user, &module.course_id).await?;

    let lessons = repositories::lessons::list_for_module(state.db(), &module.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list lessons"))?;

    Ok(Json(lessons.into_iter().map(LessonResponse::from_db).collect()))
}

/// Teachers need ownership, students need an enrollment, admins pass.
pub(crate) async fn require_course_access(
    state: &AppState,
    user: &crate::db::models::User,
    course_id: &str,
) -> Result<(), ApiError> {
    match user.role {
        UserRole::Admin => Ok(()),
        UserRole::Teacher => require_course_owner(state, user, course_id).await.map(|_| ()),
        UserRole::Student => require_enrollment(state, user, course_id).await,
    }
}

pub(crate) async fn fetch_module(state: &AppState, module_id: &str) -> Result<Module, ApiError> {
    repositories::modules::find_by_id(state.db(), module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch module"))?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))
}

#[cfg(test)]
mod tests;
