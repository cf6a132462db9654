use std::collections::HashMap;

use serde::Serialize;

pub(crate) mod analytics;
pub(crate) mod assignment;
pub(crate) mod auth;
pub(crate) mod category;
pub(crate) mod course;
pub(crate) mod dashboard;
pub(crate) mod files;
pub(crate) mod lesson;
pub(crate) mod material;
pub(crate) mod module;
pub(crate) mod note;
pub(crate) mod payment;
pub(crate) mod progress;
pub(crate) mod question;
pub(crate) mod user;

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) service: String,
    pub(crate) status: String,
    pub(crate) components: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RootResponse {
    pub(crate) message: String,
    pub(crate) version: String,
    pub(crate) docs_url: String,
}
