use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::{CourseStatus, UserRole};
use crate::repositories;
use crate::schemas::progress::EnrollmentCreate;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", post(enroll))
}

async fn enroll(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<EnrollmentCreate>,
) -> Result<StatusCode, ApiError> {
    if user.role != UserRole::Student {
        return Err(ApiError::Forbidden("Only students can enroll"));
    }

    let course = repositories::courses::find_by_id(state.db(), &payload.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    // Premium courses go through the payments endpoint.
    if course.status != CourseStatus::Free {
        return Err(ApiError::BadRequest(
            "This course requires a purchase to enroll".to_string(),
        ));
    }

    let already = repositories::enrollments::exists(state.db(), &course.id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check enrollment"))?;
    if already {
        return Err(ApiError::Conflict("Already enrolled in this course".to_string()));
    }

    repositories::enrollments::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &course.id,
        &user.id,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create enrollment"))?;

    backfill_submissions(state.db(), &course.id, &user.id).await?;

    Ok(StatusCode::CREATED)
}

/// Gives a newly enrolled student an `assigned` placeholder for every
/// existing assignment of the course.
pub(crate) async fn backfill_submissions(
    pool: &PgPool,
    course_id: &str,
    student_id: &str,
) -> Result<(), ApiError> {
    let assignments = repositories::assignments::list_for_course(pool, course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list course assignments"))?;

    let now = primitive_now_utc();
    for assignment in assignments {
        repositories::submissions::create_placeholder(
            pool,
            &Uuid::new_v4().to_string(),
            &assignment.id,
            student_id,
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to back-fill submission"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests;
