use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Lesson;
use crate::schemas::files::{FileResponse, LinkResponse};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LessonCreate {
    #[serde(alias = "moduleId")]
    pub(crate) module_id: String,
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) content: String,
    #[serde(default = "default_duration_minutes")]
    #[serde(alias = "durationMinutes")]
    pub(crate) duration_minutes: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LessonUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) content: Option<String>,
    #[serde(default)]
    #[serde(alias = "durationMinutes")]
    pub(crate) duration_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonResponse {
    pub(crate) id: String,
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl LessonResponse {
    pub(crate) fn from_db(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            module_id: lesson.module_id,
            title: lesson.title,
            content: lesson.content,
            duration_minutes: lesson.duration_minutes,
            created_at: format_primitive(lesson.created_at),
            updated_at: format_primitive(lesson.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonDetailResponse {
    #[serde(flatten)]
    pub(crate) lesson: LessonResponse,
    pub(crate) files: Vec<FileResponse>,
    pub(crate) links: Vec<LinkResponse>,
}

fn default_duration_minutes() -> i32 {
    60
}
