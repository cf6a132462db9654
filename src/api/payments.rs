use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::enrollments::backfill_submissions;
use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::{CourseStatus, UserRole};
use crate::repositories;
use crate::schemas::payment::{PurchaseRequest, PurchaseResponse, TransactionResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/purchase", post(purchase))
        .route("/history/:user_id", get(history))
}

async fn purchase(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    if user.role != UserRole::Student {
        return Err(ApiError::Forbidden("Only students can purchase courses"));
    }

    let course = repositories::courses::find_by_id(state.db(), &payload.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    if course.status != CourseStatus::Premium {
        return Err(ApiError::BadRequest(
            "Free courses do not require a purchase".to_string(),
        ));
    }
    let amount = match course.price {
        Some(price) if price > 0.0 => price,
        _ => {
            return Err(ApiError::internal(
                format!("premium course {} has no price", course.id),
                "Course price is not configured",
            ))
        }
    };

    let already = repositories::enrollments::exists(state.db(), &course.id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check enrollment"))?;
    if already {
        return Err(ApiError::Conflict("Already enrolled in this course".to_string()));
    }

    let now = primitive_now_utc();
    let description = format!("Purchase of course '{}'", course.title);
    let transaction = repositories::transactions::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &course.id,
        &user.id,
        amount,
        &description,
        now,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to record transaction"))?;

    let enrollment = repositories::enrollments::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &course.id,
        &user.id,
        now,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create enrollment"))?;

    backfill_submissions(state.db(), &course.id, &user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(PurchaseResponse {
            transaction: TransactionResponse::from_db(transaction),
            enrollment_id: enrollment.id,
        }),
    ))
}

async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<TransactionResponse>>, ApiError> {
    if user.role != UserRole::Admin && user.id != user_id {
        return Err(ApiError::Forbidden("Not enough permissions"));
    }

    let transactions = repositories::transactions::list_for_user(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list transactions"))?;

    Ok(Json(transactions.into_iter().map(TransactionResponse::from_db).collect()))
}

#[cfg(test)]
mod tests;
