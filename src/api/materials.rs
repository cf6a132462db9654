use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, CurrentTeacher, CurrentUser};
use crate::api::modules::require_course_access;
use crate::api::uploads;
use crate::api::validation;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Material;
use crate::repositories;
use crate::schemas::files::FileResponse;
use crate::schemas::material::{MaterialCreate, MaterialResponse, MaterialUpdate};
use crate::services;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_material))
        .route("/course/:course_id", get(list_for_course))
        .route("/:material_id", get(get_material).patch(update_material).delete(delete_material))
        .route("/:material_id/files", post(upload_files))
}

async fn create_material(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Json(payload): Json<MaterialCreate>,
) -> Result<(StatusCode, Json<MaterialResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    require_course_owner(&state, &teacher, &payload.course_id).await?;

    let now = primitive_now_utc();
    let material = repositories::materials::create(
        state.db(),
        repositories::materials::CreateMaterial {
            id: &Uuid::new_v4().to_string(),
            course_id: &payload.course_id,
            title: &payload.title,
            description: &payload.description,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create material"))?;

    Ok((StatusCode::CREATED, Json(MaterialResponse::from_db(material, Vec::new()))))
}

async fn list_for_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<MaterialResponse>>, ApiError> {
    require_course_access(&state, &user, &course_id).await?;

    let materials = repositories::materials::list_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list materials"))?;

    let mut items = Vec::with_capacity(materials.len());
    for material in materials {
        items.push(material_response(&state, material).await?);
    }

    Ok(Json(items))
}

async fn get_material(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(material_id): Path<String>,
) -> Result<Json<MaterialResponse>, ApiError> {
    let material = fetch_material(&state, &material_id).await?;
    require_course_access(&state, &user, &material.course_id).await?;

    Ok(Json(material_response(&state, material).await?))
}

async fn update_material(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(material_id): Path<String>,
    Json(payload): Json<MaterialUpdate>,
) -> Result<Json<MaterialResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let material = fetch_material(&state, &material_id).await?;
    require_course_owner(&state, &teacher, &material.course_id).await?;

    repositories::materials::update(
        state.db(),
        &material.id,
        repositories::materials::UpdateMaterial {
            title: payload.title,
            description: payload.description,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update material"))?;

    let updated = fetch_material(&state, &material_id).await?;
    Ok(Json(material_response(&state, updated).await?))
}

async fn delete_material(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(material_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let material = fetch_material(&state, &material_id).await?;
    require_course_owner(&state, &teacher, &material.course_id).await?;

    let urls = repositories::materials::collect_file_urls(state.db(), &material.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to collect material files"))?;
    services::assets::delete_stored_urls(state.storage(), urls).await;

    repositories::materials::delete(state.db(), &material.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete material"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn upload_files(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(material_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<FileResponse>>), ApiError> {
    let material = fetch_material(&state, &material_id).await?;
    require_course_owner(&state, &teacher, &material.course_id).await?;

    let (parts, _fields) = uploads::read_multipart(multipart, &state).await?;
    if parts.is_empty() {
        return Err(ApiError::BadRequest("At least one file is required".to_string()));
    }

    let storage = uploads::require_storage(&state)?;

    let mut responses = Vec::with_capacity(parts.len());
    for part in parts {
        let file_kind = validation::validate_document_upload(&part.filename)?;

        let key = format!(
            "materials/{}/{}_{}",
            material.id,
            Uuid::new_v4(),
            uploads::sanitized_filename(&part.filename)
        );
        let (size, _checksum) = storage
            .upload_bytes(&key, &part.content_type, part.bytes)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to store material file"))?;

        let file = repositories::materials::add_file(
            state.db(),
            &Uuid::new_v4().to_string(),
            &material.id,
            &storage.public_url(&key),
            file_kind,
            size,
            primitive_now_utc(),
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save material file"))?;

        responses.push(FileResponse::from_db(file));
    }

    Ok((StatusCode::CREATED, Json(responses)))
}

async fn material_response(
    state: &AppState,
    material: Material,
) -> Result<MaterialResponse, ApiError> {
    let files = repositories::materials::list_files(state.db(), &material.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list material files"))?;
    Ok(MaterialResponse::from_db(
        material,
        files.into_iter().map(FileResponse::from_db).collect(),
    ))
}

async fn fetch_material(state: &AppState, id: &str) -> Result<Material, ApiError> {
    repositories::materials::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch material"))?
        .ok_or_else(|| ApiError::NotFound("Material not found".to_string()))
}
