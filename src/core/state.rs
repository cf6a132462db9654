use std::sync::Arc;

use sqlx::PgPool;

use crate::core::{config::Settings, redis::RedisHandle};
use crate::services::storage::StorageService;

/// Shared handler state. Pool and Redis handles are cheap to clone; settings
/// and the optional storage client live behind an Arc.
#[derive(Clone)]
pub(crate) struct AppState {
    settings: Arc<Settings>,
    db: PgPool,
    redis: RedisHandle,
    storage: Option<Arc<StorageService>>,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        redis: RedisHandle,
        storage: Option<StorageService>,
    ) -> Self {
        Self { settings: Arc::new(settings), db, redis, storage: storage.map(Arc::new) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.db
    }

    pub(crate) fn redis(&self) -> &RedisHandle {
        &self.redis
    }

    pub(crate) fn storage(&self) -> Option<&StorageService> {
        self.storage.as_deref()
    }
}
