use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Note, NoteFolder};

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct NoteCreate {
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) content: String,
    #[serde(default)]
    #[serde(alias = "folderId")]
    pub(crate) folder_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct NoteUpdate {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "title must be between 1 and 255 characters"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) content: Option<String>,
    /// Present-and-null moves the note out of its folder; absent leaves it.
    #[serde(default, with = "double_option")]
    #[serde(alias = "folderId")]
    pub(crate) folder_id: Option<Option<String>>,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(
        deserializer: D,
    ) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FolderCreate {
    pub(crate) name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FolderUpdate {
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct NoteResponse {
    pub(crate) id: String,
    pub(crate) folder_id: Option<String>,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl NoteResponse {
    pub(crate) fn from_db(note: Note) -> Self {
        Self {
            id: note.id,
            folder_id: note.folder_id,
            title: note.title,
            content: note.content,
            created_at: format_primitive(note.created_at),
            updated_at: format_primitive(note.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FolderResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl FolderResponse {
    pub(crate) fn from_db(folder: NoteFolder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            created_at: format_primitive(folder.created_at),
            updated_at: format_primitive(folder.updated_at),
        }
    }
}
