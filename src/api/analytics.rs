use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use time::Duration;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, CurrentAdmin, CurrentTeacher};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::analytics::{AdminDashboardResponse, CourseAnalyticsResponse};

const DASHBOARD_CACHE_KEY: &str = "analytics:dashboard";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin_dashboard))
        .route("/courses/:course_id", get(course_analytics))
}

async fn admin_dashboard(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
) -> Result<Json<AdminDashboardResponse>, ApiError> {
    let ttl = state.settings().storage().analytics_cache_ttl_seconds;
    let db = state.db().clone();

    let dashboard = state
        .redis()
        .cache_get_or_compute(DASHBOARD_CACHE_KEY, ttl, || async move {
            let counts = repositories::analytics::platform_counts(&db).await?;
            let average_grade = repositories::analytics::average_grade(&db).await?;
            let since = primitive_now_utc() - Duration::days(30);
            let new_students =
                repositories::analytics::signups_by_role_since(&db, UserRole::Student, since)
                    .await?;

            Ok::<_, sqlx::Error>(AdminDashboardResponse {
                total_users: counts.total_users,
                total_students: counts.total_students,
                total_teachers: counts.total_teachers,
                total_courses: counts.total_courses,
                total_enrollments: counts.total_enrollments,
                total_assignments: counts.total_assignments,
                total_submissions: counts.total_submissions,
                graded_submissions: counts.graded_submissions,
                completed_lessons: counts.completed_lessons,
                completed_modules: counts.completed_modules,
                average_grade,
                new_students_last_30_days: new_students,
            })
        })
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute platform analytics"))?;

    Ok(Json(dashboard))
}

async fn course_analytics(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(course_id): Path<String>,
) -> Result<Json<CourseAnalyticsResponse>, ApiError> {
    let course = require_course_owner(&state, &teacher, &course_id).await?;

    let counts = repositories::analytics::course_counts(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute course analytics"))?;
    let average_grade = repositories::analytics::course_average_grade(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute course average grade"))?;

    Ok(Json(CourseAnalyticsResponse {
        course_id: course.id,
        enrollments: counts.enrollments,
        modules: counts.modules,
        lessons: counts.lessons,
        assignments: counts.assignments,
        submissions_submitted: counts.submissions_submitted,
        submissions_graded: counts.submissions_graded,
        completed_modules: counts.completed_modules,
        average_grade,
    }))
}
