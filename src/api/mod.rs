pub(crate) mod analytics;
pub(crate) mod assignments;
pub(crate) mod auth;
pub(crate) mod categories;
pub(crate) mod courses;
pub(crate) mod dashboard;
pub(crate) mod enrollments;
pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod lessons;
pub(crate) mod materials;
pub(crate) mod modules;
pub(crate) mod notes;
pub(crate) mod pagination;
pub(crate) mod payments;
pub(crate) mod progress;
pub(crate) mod questions;
pub(crate) mod router;
pub(crate) mod uploads;
pub(crate) mod users;
pub(crate) mod validation;
