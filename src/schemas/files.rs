use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::core::time::format_primitive;
use crate::db::models::{AttachedLink, StoredFile};
use crate::db::types::FileKind;

#[derive(Debug, Serialize)]
pub(crate) struct FileResponse {
    pub(crate) id: String,
    pub(crate) file_url: String,
    pub(crate) file_type: FileKind,
    pub(crate) file_size: i64,
    pub(crate) created_at: String,
}

impl FileResponse {
    pub(crate) fn from_db(file: StoredFile) -> Self {
        Self {
            id: file.id,
            file_url: file.file_url,
            file_type: file.file_type,
            file_size: file.file_size,
            created_at: format_primitive(file.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkResponse {
    pub(crate) id: String,
    pub(crate) link_url: String,
    pub(crate) description: String,
    pub(crate) created_at: String,
}

impl LinkResponse {
    pub(crate) fn from_db(link: AttachedLink) -> Self {
        Self {
            id: link.id,
            link_url: link.link_url,
            description: link.description,
            created_at: format_primitive(link.created_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LinkCreate {
    #[validate(custom(
        function = http_scheme,
        message = "link_url must start with http:// or https://"
    ))]
    pub(crate) link_url: String,
    #[serde(default)]
    pub(crate) description: String,
}

fn http_scheme(link_url: &str) -> Result<(), ValidationError> {
    if link_url.starts_with("http://") || link_url.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("scheme"))
    }
}
