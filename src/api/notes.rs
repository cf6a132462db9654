use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Note, NoteFolder, User};
use crate::repositories;
use crate::schemas::note::{
    FolderCreate, FolderResponse, FolderUpdate, NoteCreate, NoteResponse, NoteUpdate,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notes).post(create_note))
        .route("/:note_id", get(get_note).patch(update_note).delete(delete_note))
        .route("/folders", get(list_folders).post(create_folder))
        .route("/folders/:folder_id", post(rename_folder).delete(delete_folder))
}

#[derive(Debug, Deserialize)]
struct NotesQuery {
    #[serde(default)]
    #[serde(alias = "folderId")]
    folder_id: Option<String>,
}

async fn list_notes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<NotesQuery>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    if let Some(folder_id) = &query.folder_id {
        let folder = fetch_folder(&state, folder_id).await?;
        require_owner(&user, &folder.user_id)?;
    }

    let notes =
        repositories::notes::list_for_user(state.db(), &user.id, query.folder_id.as_deref())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list notes"))?;

    Ok(Json(notes.into_iter().map(NoteResponse::from_db).collect()))
}

async fn create_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<NoteCreate>,
) -> Result<(StatusCode, Json<NoteResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if let Some(folder_id) = &payload.folder_id {
        let folder = fetch_folder(&state, folder_id).await?;
        require_owner(&user, &folder.user_id)?;
    }

    let now = primitive_now_utc();
    let note = repositories::notes::create(
        state.db(),
        repositories::notes::CreateNote {
            id: &Uuid::new_v4().to_string(),
            user_id: &user.id,
            folder_id: payload.folder_id.as_deref(),
            title: &payload.title,
            content: &payload.content,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create note"))?;

    Ok((StatusCode::CREATED, Json(NoteResponse::from_db(note))))
}

async fn get_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<String>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = fetch_note(&state, &note_id).await?;
    require_owner(&user, &note.user_id)?;

    Ok(Json(NoteResponse::from_db(note)))
}

async fn update_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<String>,
    Json(payload): Json<NoteUpdate>,
) -> Result<Json<NoteResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let note = fetch_note(&state, &note_id).await?;
    require_owner(&user, &note.user_id)?;

    if let Some(Some(folder_id)) = &payload.folder_id {
        let folder = fetch_folder(&state, folder_id).await?;
        require_owner(&user, &folder.user_id)?;
    }

    repositories::notes::update(
        state.db(),
        &note.id,
        repositories::notes::UpdateNote {
            title: payload.title,
            content: payload.content,
            folder_id: payload.folder_id,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update note"))?;

    let updated = fetch_note(&state, &note_id).await?;
    Ok(Json(NoteResponse::from_db(updated)))
}

async fn delete_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(note_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let note = fetch_note(&state, &note_id).await?;
    require_owner(&user, &note.user_id)?;

    repositories::notes::delete(state.db(), &note.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete note"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_folders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<FolderResponse>>, ApiError> {
    let folders = repositories::notes::list_folders(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list folders"))?;

    Ok(Json(folders.into_iter().map(FolderResponse::from_db).collect()))
}

async fn create_folder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<FolderCreate>,
) -> Result<(StatusCode, Json<FolderResponse>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Folder name must not be empty".to_string()));
    }

    let folder = repositories::notes::create_folder(
        state.db(),
        &Uuid::new_v4().to_string(),
        &user.id,
        name,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create folder"))?;

    Ok((StatusCode::CREATED, Json(FolderResponse::from_db(folder))))
}

async fn rename_folder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(folder_id): Path<String>,
    Json(payload): Json<FolderUpdate>,
) -> Result<Json<FolderResponse>, ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Folder name must not be empty".to_string()));
    }

    let folder = fetch_folder(&state, &folder_id).await?;
    require_owner(&user, &folder.user_id)?;

    repositories::notes::rename_folder(state.db(), &folder.id, name, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to rename folder"))?;

    let updated = fetch_folder(&state, &folder_id).await?;
    Ok(Json(FolderResponse::from_db(updated)))
}

async fn delete_folder(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(folder_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let folder = fetch_folder(&state, &folder_id).await?;
    require_owner(&user, &folder.user_id)?;

    // Notes inside the folder survive; their folder_id is cleared by the
    // ON DELETE SET NULL constraint.
    repositories::notes::delete_folder(state.db(), &folder.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete folder"))?;

    Ok(StatusCode::NO_CONTENT)
}

// Other users' notes and folders are indistinguishable from missing ones.
fn require_owner(user: &User, owner_id: &str) -> Result<(), ApiError> {
    if user.id == owner_id {
        Ok(())
    } else {
        Err(ApiError::NotFound("Not found".to_string()))
    }
}

async fn fetch_note(state: &AppState, id: &str) -> Result<Note, ApiError> {
    repositories::notes::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch note"))?
        .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))
}

async fn fetch_folder(state: &AppState, id: &str) -> Result<NoteFolder, ApiError> {
    repositories::notes::find_folder(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch folder"))?
        .ok_or_else(|| ApiError::NotFound("Folder not found".to_string()))
}

#[cfg(test)]
mod tests;
