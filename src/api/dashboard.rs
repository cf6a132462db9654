use axum::{extract::State, routing::get, Json, Router};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::dashboard::{
    CourseProgressItem, DeadlineItem, RecentGradeItem, StudentDashboardResponse,
};

const DEADLINE_LIMIT: i64 = 5;
const RECENT_GRADES_LIMIT: i64 = 5;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/", get(student_dashboard))
}

async fn student_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<StudentDashboardResponse>, ApiError> {
    if user.role != UserRole::Student {
        return Err(ApiError::Forbidden("Student access required"));
    }

    let counts = repositories::analytics::student_assignment_counts(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count assignments"))?;

    let deadlines = repositories::analytics::upcoming_deadlines(
        state.db(),
        &user.id,
        primitive_now_utc(),
        DEADLINE_LIMIT,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load upcoming deadlines"))?;

    let enrolled = repositories::enrollments::list_courses_for_student(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrolled courses"))?;

    let mut courses = Vec::with_capacity(enrolled.len());
    for course in enrolled {
        let rows = repositories::progress::course_summary(state.db(), &course.id, &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load course progress"))?;
        let total_lessons: i64 = rows.iter().map(|r| r.total_lessons).sum();
        let completed_lessons: i64 = rows.iter().map(|r| r.completed_lessons).sum();
        courses.push(CourseProgressItem {
            course_id: course.id,
            title: course.title,
            total_lessons,
            completed_lessons,
        });
    }

    let grades =
        repositories::analytics::recent_grades(state.db(), &user.id, RECENT_GRADES_LIMIT)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load recent grades"))?;

    Ok(Json(StudentDashboardResponse {
        pending_assignments: counts.pending,
        submitted_assignments: counts.submitted,
        graded_assignments: counts.graded,
        returned_assignments: counts.returned,
        upcoming_deadlines: deadlines.into_iter().map(DeadlineItem::from_row).collect(),
        courses,
        recent_grades: grades.into_iter().map(RecentGradeItem::from_row).collect(),
    }))
}
