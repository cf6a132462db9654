use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentAdmin, CurrentUser};
use crate::api::pagination::{PageQuery, PaginatedResponse};
use crate::api::uploads;
use crate::api::validation;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::{ProfileImageResponse, UserResponse, UserUpdate};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/teachers", get(list_teachers))
        .route("/students", get(list_students))
        .route("/:user_id", get(get_user).patch(update_user).delete(delete_user))
        .route("/:user_id/profile-image", post(upload_profile_image))
        .route("/:user_id/courses", get(list_enrolled_courses))
}

async fn list_teachers(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, ApiError> {
    list_by_role(&state, UserRole::Teacher, &page).await
}

async fn list_students(
    State(state): State<AppState>,
    CurrentAdmin(_admin): CurrentAdmin,
    Query(page): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, ApiError> {
    list_by_role(&state, UserRole::Student, &page).await
}

async fn list_by_role(
    state: &AppState,
    role: UserRole,
    page: &PageQuery,
) -> Result<Json<PaginatedResponse<UserResponse>>, ApiError> {
    let (skip, limit) = page.clamped();

    let users = repositories::users::list_by_role(state.db(), role, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;
    let total_count = repositories::users::count_by_role(state.db(), role)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count users"))?;

    Ok(Json(PaginatedResponse {
        items: users.into_iter().map(UserResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn get_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let target = fetch_user(&state, &user_id).await?;

    // Students may only look up themselves or a teacher profile.
    if user.role == UserRole::Student && user.id != target.id && target.role != UserRole::Teacher {
        return Err(ApiError::Forbidden("Not enough permissions"));
    }

    Ok(Json(UserResponse::from_db(target)))
}

async fn update_user(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<UserResponse>, ApiError> {
    let is_admin = user.role == UserRole::Admin;
    if !is_admin && user.id != user_id {
        return Err(ApiError::Forbidden("Not enough permissions"));
    }

    // Role and activation changes are administrative.
    if !is_admin && (payload.role.is_some() || payload.is_active.is_some()) {
        return Err(ApiError::Forbidden("Admin access required"));
    }

    let target = fetch_user(&state, &user_id).await?;

    repositories::users::update(
        state.db(),
        &target.id,
        repositories::users::UpdateUser {
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone_number: payload.phone_number,
            role: payload.role,
            is_active: payload.is_active,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update user"))?;

    let updated = fetch_user(&state, &user_id).await?;
    Ok(Json(UserResponse::from_db(updated)))
}

async fn delete_user(
    State(state): State<AppState>,
    CurrentAdmin(admin): CurrentAdmin,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if admin.id == user_id {
        return Err(ApiError::BadRequest("Cannot delete your own account".to_string()));
    }

    let target = fetch_user(&state, &user_id).await?;

    if let Some(url) = &target.profile_image_url {
        crate::services::assets::delete_stored_urls(state.storage(), vec![url.clone()]).await;
    }

    let deleted = repositories::users::delete(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete user"))?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

async fn upload_profile_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<ProfileImageResponse>, ApiError> {
    if user.role != UserRole::Admin && user.id != user_id {
        return Err(ApiError::Forbidden("Not enough permissions"));
    }
    let target = fetch_user(&state, &user_id).await?;

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
        "profiles/{}/{}_{}",
        target.id,
        Uuid::new_v4(),
        uploads::sanitized_filename(&part.filename)
    );
    storage
        .upload_bytes(&key, &part.content_type, part.bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store profile image"))?;

    let image_url = storage.public_url(&key);

    // Replace the previous image object once the new one is in place.
    if let Some(old_url) = &target.profile_image_url {
        storage.delete_by_url(old_url).await;
    }

    repositories::users::update_profile_image(state.db(), &target.id, &image_url, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save profile image url"))?;

    Ok(Json(ProfileImageResponse { profile_image_url: image_url }))
}

async fn list_enrolled_courses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<crate::schemas::course::CourseResponse>>, ApiError> {
    if user.role == UserRole::Student && user.id != user_id {
        return Err(ApiError::Forbidden("Not enough permissions"));
    }

    let courses = repositories::enrollments::list_courses_for_student(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrolled courses"))?;

    let mut items = Vec::with_capacity(courses.len());
    for course in courses {
        let categories = repositories::categories::list_for_course(state.db(), &course.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load course categories"))?;
        items.push(crate::schemas::course::CourseResponse::from_db(
            course,
            categories
                .into_iter()
                .map(crate::schemas::category::CategoryResponse::from_db)
                .collect(),
        ));
    }

    Ok(Json(items))
}

async fn fetch_user(state: &AppState, user_id: &str) -> Result<User, ApiError> {
    repositories::users::find_by_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}
