pub(crate) mod analytics;
pub(crate) mod assignments;
pub(crate) mod categories;
pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod lessons;
pub(crate) mod materials;
pub(crate) mod modules;
pub(crate) mod notes;
pub(crate) mod progress;
pub(crate) mod questions;
pub(crate) mod submissions;
pub(crate) mod transactions;
pub(crate) mod users;
