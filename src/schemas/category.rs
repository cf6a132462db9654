use serde::{Deserialize, Serialize};

use crate::db::models::CourseCategory;

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryCreate {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CategoryUpdate {
    #[serde(default)]
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) description: String,
}

impl CategoryResponse {
    pub(crate) fn from_db(category: CourseCategory) -> Self {
        Self { id: category.id, name: category.name, description: category.description }
    }
}
