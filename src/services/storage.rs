use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::core::config::Settings;

#[derive(Debug, Clone)]
pub(crate) struct StorageService {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl StorageService {
    pub(crate) async fn from_settings(settings: &Settings) -> anyhow::Result<Option<Self>> {
        if settings.s3().access_key.is_empty() || settings.s3().secret_key.is_empty() {
            return Ok(None);
        }

        let creds = Credentials::new(
            settings.s3().access_key.clone(),
            settings.s3().secret_key.clone(),
            None,
            None,
            "opencourse-static",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(settings.s3().endpoint.clone())
            .region(aws_config::Region::new(settings.s3().region.clone()))
            .credentials_provider(creds)
            .load()
            .await;

        let client = Client::new(&config);

        Ok(Some(Self {
            client,
            bucket: settings.s3().bucket.clone(),
            endpoint: settings.s3().endpoint.trim_end_matches('/').to_string(),
        }))
    }

    /// Public URL of an object; this is what ends up in `file_url` columns.
    pub(crate) fn public_url(&self, key: &str) -> String {
        let encoded: Vec<String> =
            key.split('/').map(|segment| urlencoding::encode(segment).into_owned()).collect();
        format!("{}/{}/{}", self.endpoint, self.bucket, encoded.join("/"))
    }

    /// Recover an object key from a stored public URL. Returns None when the
    /// URL does not point at this bucket.
    pub(crate) fn key_from_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/{}/", self.endpoint, self.bucket);
        let encoded = url.strip_prefix(&prefix)?;
        let decoded: Vec<String> = encoded
            .split('/')
            .map(|segment| {
                urlencoding::decode(segment).map(|value| value.into_owned()).ok()
            })
            .collect::<Option<_>>()?;
        Some(decoded.join("/"))
    }

    pub(crate) async fn presign_get(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(expires_in)?)
            .await?;

        Ok(presigned.uri().to_string())
    }

    /// Uploads and returns the object size together with its sha256 hex digest.
    pub(crate) async fn upload_bytes(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<(i64, String)> {
        let size = bytes.len() as i64;
        let hash = Sha256::digest(&bytes);
        let hash_hex = hex::encode(hash);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await?;

        Ok((size, hash_hex))
    }

    pub(crate) async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client.delete_object().bucket(&self.bucket).key(key).send().await?;
        Ok(())
    }

    /// Best-effort delete keyed by a stored public URL. Failures are logged
    /// and swallowed so row deletion can proceed.
    pub(crate) async fn delete_by_url(&self, url: &str) {
        let Some(key) = self.key_from_url(url) else {
            tracing::warn!(url, "Skipping delete of URL outside the configured bucket");
            return;
        };
        if let Err(err) = self.delete_object(&key).await {
            tracing::warn!(error = %err, key, "Failed to delete stored object");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::StorageService;
    use crate::core::config::Settings;
    use crate::test_support;
    use std::time::Duration;

    #[tokio::test]
    async fn public_url_and_key_roundtrip() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();
        test_support::set_test_storage_env();

        let settings = Settings::load().expect("settings");
        let storage = StorageService::from_settings(&settings)
            .await
            .expect("storage")
            .expect("storage enabled");

        let key = "lessons/lesson-1/notes 2024.pdf";
        let url = storage.public_url(key);
        assert!(url.contains("notes%202024.pdf"));
        assert_eq!(storage.key_from_url(&url).as_deref(), Some(key));
        assert_eq!(storage.key_from_url("https://elsewhere.example/x/y"), None);
    }

    #[tokio::test]
    async fn presign_get_returns_url() {
        let _guard = test_support::env_lock();
        test_support::set_test_env();
        test_support::set_test_storage_env();

        let settings = Settings::load().expect("settings");
        let storage = StorageService::from_settings(&settings)
            .await
            .expect("storage")
            .expect("storage enabled");

        let get_url = storage
            .presign_get("materials/test/file.pdf", Duration::from_secs(300))
            .await
            .expect("presign get");

        assert!(get_url.contains("file.pdf"));
    }
}
