use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{require_enrollment, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::progress::{
    CourseProgressResponse, LessonCompletionResponse, ModuleProgressResponse,
};
use crate::services;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/lessons/:lesson_id/complete", post(complete_lesson))
        .route("/courses/:course_id", get(course_progress))
}

async fn complete_lesson(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(lesson_id): Path<String>,
) -> Result<Json<LessonCompletionResponse>, ApiError> {
    if user.role != UserRole::Student {
        return Err(ApiError::Forbidden("Only students track lesson progress"));
    }

    let lesson = repositories::lessons::find_by_id(state.db(), &lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))?;
    let module = repositories::modules::find_by_id(state.db(), &lesson.module_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch module"))?
        .ok_or_else(|| ApiError::NotFound("Module not found".to_string()))?;

    require_enrollment(&state, &user, &module.course_id).await?;

    // Idempotent: completing twice is a no-op.
    repositories::progress::complete_lesson(
        state.db(),
        &Uuid::new_v4().to_string(),
        &user.id,
        &lesson.id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to record lesson completion"))?;

    let module_completed =
        services::progress::derive_module_for_student(state.db(), &user.id, &module.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to derive module progress"))?;

    Ok(Json(LessonCompletionResponse {
        lesson_id: lesson.id,
        module_id: module.id,
        module_completed,
    }))
}

async fn course_progress(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<String>,
) -> Result<Json<CourseProgressResponse>, ApiError> {
    if user.role == UserRole::Student {
        require_enrollment(&state, &user, &course_id).await?;
    } else {
        repositories::courses::find_by_id(state.db(), &course_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
            .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;
    }

    let rows = repositories::progress::course_summary(state.db(), &course_id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load course progress"))?;

    let total_modules = rows.len() as i64;
    let completed_modules = rows.iter().filter(|r| r.module_completed).count() as i64;
    let total_lessons: i64 = rows.iter().map(|r| r.total_lessons).sum();
    let completed_lessons: i64 = rows.iter().map(|r| r.completed_lessons).sum();

    Ok(Json(CourseProgressResponse {
        course_id,
        total_modules,
        completed_modules,
        total_lessons,
        completed_lessons,
        modules: rows.into_iter().map(ModuleProgressResponse::from_row).collect(),
    }))
}

#[cfg(test)]
mod tests;
