use serde::{Deserialize, Serialize};

/// Cached admin dashboard payload. Serialize and Deserialize because it
/// round-trips through the Redis JSON cache.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AdminDashboardResponse {
    pub(crate) total_users: i64,
    pub(crate) total_students: i64,
    pub(crate) total_teachers: i64,
    pub(crate) total_courses: i64,
    pub(crate) total_enrollments: i64,
    pub(crate) total_assignments: i64,
    pub(crate) total_submissions: i64,
    pub(crate) graded_submissions: i64,
    pub(crate) completed_lessons: i64,
    pub(crate) completed_modules: i64,
    pub(crate) average_grade: Option<f64>,
    pub(crate) new_students_last_30_days: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseAnalyticsResponse {
    pub(crate) course_id: String,
    pub(crate) enrollments: i64,
    pub(crate) modules: i64,
    pub(crate) lessons: i64,
    pub(crate) assignments: i64,
    pub(crate) submissions_submitted: i64,
    pub(crate) submissions_graded: i64,
    pub(crate) completed_modules: i64,
    pub(crate) average_grade: Option<f64>,
}
