use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, CurrentTeacher, CurrentUser};
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::api::uploads;
use crate::api::validation;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::category::CategoryResponse;
use crate::schemas::course::{
    CourseCategoriesUpdate, CourseCreate, CourseResponse, CourseUpdate,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route("/:course_id", get(get_course).patch(update_course).delete(delete_course))
        .route("/:course_id/categories", put(replace_categories))
        .route("/:course_id/image", post(upload_course_image))
}

async fn list_courses(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<CourseResponse>>, ApiError> {
    let (skip, limit) = page.clamped();

    let courses = repositories::courses::list(state.db(), skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;
    let total_count = repositories::courses::count(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count courses"))?;

    let mut items = Vec::with_capacity(courses.len());
    for course in courses {
        items.push(with_categories(&state, course).await?);
    }

    Ok(Json(PaginatedResponse { items, total_count, skip, limit }))
}

async fn create_course(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Json(payload): Json<CourseCreate>,
) -> Result<(StatusCode, Json<CourseResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_price(payload.status, payload.price)?;
    ensure_categories_exist(&state, &payload.category_ids).await?;

    let now = primitive_now_utc();
    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            title: &payload.title,
            description: &payload.description,
            teacher_id: &teacher.id,
            status: payload.status,
            price: payload.price,
            image_url: None,
            start_date: payload.start_date,
            end_date: payload.end_date,
            duration_weeks: payload.duration_weeks,
            batch_number: payload.batch_number,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create course"))?;

    if !payload.category_ids.is_empty() {
        repositories::categories::replace_for_course(state.db(), &course.id, &payload.category_ids)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to attach categories"))?;
    }

    let response = with_categories(&state, course).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_course(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok(Json(with_categories(&state, course).await?))
}

async fn update_course(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(course_id): Path<String>,
    Json(payload): Json<CourseUpdate>,
) -> Result<Json<CourseResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = require_course_owner(&state, &teacher, &course_id).await?;

    let next_status = payload.status.unwrap_or(course.status);
    let next_price = payload.price.or(course.price);
    validate_price(next_status, next_price)?;

    repositories::courses::update(
        state.db(),
        &course_id,
        repositories::courses::UpdateCourse {
            title: payload.title,
            description: payload.description,
            status: payload.status,
            price: payload.price,
            image_url: None,
            start_date: payload.start_date,
            end_date: payload.end_date,
            duration_weeks: payload.duration_weeks,
            batch_number: payload.batch_number,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update course"))?;

    let updated = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok(Json(with_categories(&state, updated).await?))
}

async fn delete_course(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(course_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let course = require_course_owner(&state, &teacher, &course_id).await?;

    // Stored objects go first; the row cascade takes the metadata with it.
    let mut urls = repositories::courses::collect_file_urls(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to collect course files"))?;
    if let Some(image_url) = &course.image_url {
        urls.push(image_url.clone());
    }
    crate::services::assets::delete_stored_urls(state.storage(), urls).await;

    repositories::courses::delete(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete course"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn replace_categories(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(course_id): Path<String>,
    Json(payload): Json<CourseCategoriesUpdate>,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = require_course_owner(&state, &teacher, &course_id).await?;
    ensure_categories_exist(&state, &payload.category_ids).await?;

    repositories::categories::replace_for_course(state.db(), &course.id, &payload.category_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to replace categories"))?;

    Ok(Json(with_categories(&state, course).await?))
}

async fn upload_course_image(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(course_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<CourseResponse>, ApiError> {
    let course = require_course_owner(&state, &teacher, &course_id).await?;

    let (mut parts, _fields) = uploads::read_multipart(multipart, &state).await?;
    if parts.len() != 1 {
        return Err(ApiError::BadRequest("Exactly one image file is required".to_string()));
    }
    let part = parts.remove(0);

    validation::validate_image_upload(
        &part.filename,
        &part.content_type,
        &state.settings().storage().allowed_image_extensions,
    )?;

    let storage = uploads::require_storage(&state)?;
    let key = format!(
        "courses/{}/{}_{}",
        course.id,
        Uuid::new_v4(),
        uploads::sanitized_filename(&part.filename)
    );
    storage
        .upload_bytes(&key, &part.content_type, part.bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store course image"))?;
    let image_url = storage.public_url(&key);

    if let Some(old_url) = &course.image_url {
        storage.delete_by_url(old_url).await;
    }

    repositories::courses::update(
        state.db(),
        &course.id,
        repositories::courses::UpdateCourse {
            title: None,
            description: None,
            status: None,
            price: None,
            image_url: Some(image_url),
            start_date: None,
            end_date: None,
            duration_weeks: None,
            batch_number: None,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to save course image url"))?;

    let updated = repositories::courses::find_by_id(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    Ok(Json(with_categories(&state, updated).await?))
}

fn validate_price(
    status: crate::db::types::CourseStatus,
    price: Option<f64>,
) -> Result<(), ApiError> {
    match status {
        crate::db::types::CourseStatus::Premium => match price {
            Some(p) if p > 0.0 => Ok(()),
            _ => Err(ApiError::BadRequest(
                "Premium courses require a positive price".to_string(),
            )),
        },
        crate::db::types::CourseStatus::Free => Ok(()),
    }
}

async fn ensure_categories_exist(
    state: &AppState,
    category_ids: &[String],
) -> Result<(), ApiError> {
    if category_ids.is_empty() {
        return Ok(());
    }
    let existing = repositories::categories::count_existing(state.db(), category_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to verify categories"))?;
    if existing as usize != category_ids.len() {
        return Err(ApiError::BadRequest("One or more categories do not exist".to_string()));
    }
    Ok(())
}

async fn with_categories(
    state: &AppState,
    course: crate::db::models::Course,
) -> Result<CourseResponse, ApiError> {
    let categories = repositories::categories::list_for_course(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load course categories"))?;
    Ok(CourseResponse::from_db(
        course,
        categories.into_iter().map(CategoryResponse::from_db).collect(),
    ))
}

#[cfg(test)]
mod tests;
