use crate::services::storage::StorageService;

/// Best-effort removal of stored objects before their rows are deleted.
/// Skipped entirely when object storage is not configured; individual
/// failures are logged inside the storage service and never abort the
/// surrounding delete.
pub(crate) async fn delete_stored_urls(storage: Option<&StorageService>, urls: Vec<String>) {
    let Some(storage) = storage else {
        if !urls.is_empty() {
            tracing::warn!(count = urls.len(), "Object storage not configured; leaving objects");
        }
        return;
    };

    for url in urls {
        storage.delete_by_url(&url).await;
    }
}
