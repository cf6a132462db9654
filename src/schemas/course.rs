use serde::{Deserialize, Serialize};
use time::Date;
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Course;
use crate::db::types::CourseStatus;
use crate::schemas::category::CategoryResponse;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreate {
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default = "default_status")]
    pub(crate) status: CourseStatus,
    #[serde(default)]
    pub(crate) price: Option<f64>,
    #[serde(alias = "startDate")]
    pub(crate) start_date: Date,
    #[serde(default)]
    #[serde(alias = "endDate")]
    pub(crate) end_date: Option<Date>,
    #[serde(default = "default_duration_weeks")]
    #[serde(alias = "durationWeeks")]
    pub(crate) duration_weeks: i32,
    #[serde(default = "default_batch_number")]
    #[serde(alias = "batchNumber")]
    pub(crate) batch_number: i32,
    #[serde(default)]
    #[serde(alias = "categoryIds")]
    pub(crate) category_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) status: Option<CourseStatus>,
    #[serde(default)]
    pub(crate) price: Option<f64>,
    #[serde(default)]
    #[serde(alias = "startDate")]
    pub(crate) start_date: Option<Date>,
    #[serde(default)]
    #[serde(alias = "endDate")]
    pub(crate) end_date: Option<Date>,
    #[serde(default)]
    #[serde(alias = "durationWeeks")]
    pub(crate) duration_weeks: Option<i32>,
    #[serde(default)]
    #[serde(alias = "batchNumber")]
    pub(crate) batch_number: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseCategoriesUpdate {
    #[serde(alias = "categoryIds")]
    pub(crate) category_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) teacher_id: String,
    pub(crate) status: CourseStatus,
    pub(crate) price: Option<f64>,
    pub(crate) image_url: Option<String>,
    pub(crate) start_date: Date,
    pub(crate) end_date: Option<Date>,
    pub(crate) duration_weeks: i32,
    pub(crate) batch_number: i32,
    pub(crate) categories: Vec<CategoryResponse>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course, categories: Vec<CategoryResponse>) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            teacher_id: course.teacher_id,
            status: course.status,
            price: course.price,
            image_url: course.image_url,
            start_date: course.start_date,
            end_date: course.end_date,
            duration_weeks: course.duration_weeks,
            batch_number: course.batch_number,
            categories,
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }
}

fn default_status() -> CourseStatus {
    CourseStatus::Free
}

fn default_duration_weeks() -> i32 {
    0
}

fn default_batch_number() -> i32 {
    1
}
