use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, CurrentTeacher, CurrentUser};
use crate::api::modules::{fetch_module, require_course_access};
use crate::api::uploads;
use crate::api::validation;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Lesson;
use crate::repositories;
use crate::schemas::files::{FileResponse, LinkCreate, LinkResponse};
use crate::schemas::lesson::{LessonCreate, LessonDetailResponse, LessonResponse, LessonUpdate};
use crate::services;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_lesson))
        .route("/:lesson_id", get(get_lesson).patch(update_lesson).delete(delete_lesson))
        .route("/:lesson_id/files", post(upload_files))
        .route("/:lesson_id/confirm-files", post(confirm_files))
        .route("/:lesson_id/links", post(add_links))
        .route("/files/:file_id", delete(delete_file))
        .route("/links/:link_id", delete(delete_link))
}

async fn create_lesson(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Json(payload): Json<LessonCreate>,
) -> Result<(StatusCode, Json<LessonResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let module = fetch_module(&state, &payload.module_id).await?;
    require_course_owner(&state, &teacher, &module.course_id).await?;

    let now = primitive_now_utc();
    let lesson = repositories::lessons::create(
        state.db(),
        repositories::lessons::CreateLesson {
            id: &Uuid::new_v4().to_string(),
            module_id: &module.id,
            title: &payload.title,
            content: &payload.content,
            duration_minutes: payload.duration_minutes,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create lesson"))?;

    // A new lesson invalidates previously derived module completions.
    services::progress::recompute_module(state.db(), &module.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to recompute module progress"))?;

    Ok((StatusCode::CREATED, Json(LessonResponse::from_db(lesson))))
}

async fn get_lesson(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(lesson_id): Path<String>,
) -> Result<Json<LessonDetailResponse>, ApiError> {
    let lesson = fetch_lesson(&state, &lesson_id).await?;
    let module = fetch_module(&state, &lesson.module_id).await?;
    require_course_access(&state, &user, &module.course_id).await?;

    let files = repositories::lessons::list_files(state.db(), &lesson.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list lesson files"))?;
    let links = repositories::lessons::list_links(state.db(), &lesson.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list lesson links"))?;

    Ok(Json(LessonDetailResponse {
        lesson: LessonResponse::from_db(lesson),
        files: files.into_iter().map(FileResponse::from_db).collect(),
        links: links.into_iter().map(LinkResponse::from_db).collect(),
    }))
}

async fn update_lesson(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(lesson_id): Path<String>,
    Json(payload): Json<LessonUpdate>,
) -> Result<Json<LessonResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let lesson = fetch_lesson(&state, &lesson_id).await?;
    let module = fetch_module(&state, &lesson.module_id).await?;
    require_course_owner(&state, &teacher, &module.course_id).await?;

    repositories::lessons::update(
        state.db(),
        &lesson.id,
        repositories::lessons::UpdateLesson {
            title: payload.title,
            content: payload.content,
            duration_minutes: payload.duration_minutes,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update lesson"))?;

    let updated = fetch_lesson(&state, &lesson_id).await?;
    Ok(Json(LessonResponse::from_db(updated)))
}

async fn delete_lesson(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(lesson_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let lesson = fetch_lesson(&state, &lesson_id).await?;
    let module = fetch_module(&state, &lesson.module_id).await?;
    require_course_owner(&state, &teacher, &module.course_id).await?;

    let urls = repositories::lessons::collect_file_urls(state.db(), &lesson.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to collect lesson files"))?;
    services::assets::delete_stored_urls(state.storage(), urls).await;

    repositories::lessons::delete(state.db(), &lesson.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete lesson"))?;

    // Removing a lesson can complete the module for students who had
    // finished everything else.
    services::progress::recompute_module(state.db(), &module.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to recompute module progress"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn upload_files(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(lesson_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<FileResponse>>), ApiError> {
    let lesson = fetch_lesson(&state, &lesson_id).await?;
    let module = fetch_module(&state, &lesson.module_id).await?;
    require_course_owner(&state, &teacher, &module.course_id).await?;

    let (parts, _fields) = uploads::read_multipart(multipart, &state).await?;
    if parts.is_empty() {
        return Err(ApiError::BadRequest("At least one file is required".to_string()));
    }

    let storage = uploads::require_storage(&state)?;

    let mut responses = Vec::with_capacity(parts.len());
    for part in parts {
        let file_kind = validation::validate_document_upload(&part.filename)?;

        let key = format!(
            "lessons/{}/{}_{}",
            lesson.id,
            Uuid::new_v4(),
            uploads::sanitized_filename(&part.filename)
        );
        let (size, _checksum) = storage
            .upload_bytes(&key, &part.content_type, part.bytes)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to store lesson file"))?;

        let file = repositories::lessons::add_file(
            state.db(),
            &Uuid::new_v4().to_string(),
            &lesson.id,
            &storage.public_url(&key),
            file_kind,
            size,
            primitive_now_utc(),
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save lesson file"))?;

        responses.push(FileResponse::from_db(file));
    }

    Ok((StatusCode::CREATED, Json(responses)))
}

async fn confirm_files(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(lesson_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let lesson = fetch_lesson(&state, &lesson_id).await?;
    let module = fetch_module(&state, &lesson.module_id).await?;
    require_course_owner(&state, &teacher, &module.course_id).await?;

    repositories::lessons::confirm_files(state.db(), &lesson.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to confirm lesson files"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn add_links(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(lesson_id): Path<String>,
    Json(payload): Json<Vec<LinkCreate>>,
) -> Result<(StatusCode, Json<Vec<LinkResponse>>), ApiError> {
    let lesson = fetch_lesson(&state, &lesson_id).await?;
    let module = fetch_module(&state, &lesson.module_id).await?;
    require_course_owner(&state, &teacher, &module.course_id).await?;

    if payload.is_empty() {
        return Err(ApiError::BadRequest("At least one link is required".to_string()));
    }

    let now = primitive_now_utc();
    let mut responses = Vec::with_capacity(payload.len());
    for link in payload {
        link.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let created = repositories::lessons::add_link(
            state.db(),
            &Uuid::new_v4().to_string(),
            &lesson.id,
            &link.link_url,
            &link.description,
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save lesson link"))?;
        responses.push(LinkResponse::from_db(created));
    }

    Ok((StatusCode::CREATED, Json(responses)))
}

async fn delete_file(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(file_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (file, lesson_id) = repositories::lessons::find_file(state.db(), &file_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson file"))?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    let lesson = fetch_lesson(&state, &lesson_id).await?;
    let module = fetch_module(&state, &lesson.module_id).await?;
    require_course_owner(&state, &teacher, &module.course_id).await?;

    services::assets::delete_stored_urls(state.storage(), vec![file.file_url]).await;

    repositories::lessons::delete_file(state.db(), &file_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete lesson file"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_link(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(link_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::lessons::delete_link(state.db(), &link_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete lesson link"))?;
    if !deleted {
        return Err(ApiError::NotFound("Link not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_lesson(state: &AppState, lesson_id: &str) -> Result<Lesson, ApiError> {
    repositories::lessons::find_by_id(state.db(), lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))
}
