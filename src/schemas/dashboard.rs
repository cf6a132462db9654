use serde::Serialize;

use crate::core::time::format_primitive;
use crate::repositories::analytics::{RecentGrade, UpcomingDeadline};

#[derive(Debug, Serialize)]
pub(crate) struct StudentDashboardResponse {
    pub(crate) pending_assignments: i64,
    pub(crate) submitted_assignments: i64,
    pub(crate) graded_assignments: i64,
    pub(crate) returned_assignments: i64,
    pub(crate) upcoming_deadlines: Vec<DeadlineItem>,
    pub(crate) courses: Vec<CourseProgressItem>,
    pub(crate) recent_grades: Vec<RecentGradeItem>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeadlineItem {
    pub(crate) assignment_id: String,
    pub(crate) title: String,
    pub(crate) course_id: String,
    pub(crate) course_title: String,
    pub(crate) due_date: String,
}

impl DeadlineItem {
    pub(crate) fn from_row(row: UpcomingDeadline) -> Self {
        Self {
            assignment_id: row.assignment_id,
            title: row.title,
            course_id: row.course_id,
            course_title: row.course_title,
            due_date: format_primitive(row.due_date),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseProgressItem {
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) total_lessons: i64,
    pub(crate) completed_lessons: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct RecentGradeItem {
    pub(crate) assignment_id: String,
    pub(crate) title: String,
    pub(crate) grade: Option<f64>,
    pub(crate) updated_at: String,
}

impl RecentGradeItem {
    pub(crate) fn from_row(row: RecentGrade) -> Self {
        Self {
            assignment_id: row.assignment_id,
            title: row.title,
            grade: row.grade,
            updated_at: format_primitive(row.updated_at),
        }
    }
}
