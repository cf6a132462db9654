use serde::{Deserialize, Serialize};

use crate::repositories::progress::ModuleProgressSummary;

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollmentCreate {
    #[serde(alias = "courseId")]
    pub(crate) course_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonCompletionResponse {
    pub(crate) lesson_id: String,
    pub(crate) module_id: String,
    pub(crate) module_completed: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModuleProgressResponse {
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) total_lessons: i64,
    pub(crate) completed_lessons: i64,
    pub(crate) completed: bool,
}

impl ModuleProgressResponse {
    pub(crate) fn from_row(row: ModuleProgressSummary) -> Self {
        Self {
            module_id: row.module_id,
            title: row.title,
            total_lessons: row.total_lessons,
            completed_lessons: row.completed_lessons,
            completed: row.module_completed,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseProgressResponse {
    pub(crate) course_id: String,
    pub(crate) total_modules: i64,
    pub(crate) completed_modules: i64,
    pub(crate) total_lessons: i64,
    pub(crate) completed_lessons: i64,
    pub(crate) modules: Vec<ModuleProgressResponse>,
}
