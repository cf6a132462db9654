use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{require_course_owner, CurrentTeacher, CurrentUser};
use crate::api::modules::require_course_access;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Question, User};
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::question::{
    AnswerCreate, AnswerResponse, AnswerUpdate, QuestionCreate, QuestionDetailResponse,
    QuestionResponse, QuestionUpdate,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_question))
        .route("/course/:course_id", get(list_for_course))
        .route("/:question_id", get(get_question).patch(update_question).delete(delete_question))
        .route("/:question_id/answers", post(add_answer))
        .route("/answers/:answer_id", post(update_answer).delete(delete_answer))
}

async fn create_question(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Json(payload): Json<QuestionCreate>,
) -> Result<(StatusCode, Json<QuestionResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    require_course_owner(&state, &teacher, &payload.course_id).await?;

    let now = primitive_now_utc();
    let question = repositories::questions::create(
        state.db(),
        repositories::questions::CreateQuestion {
            id: &Uuid::new_v4().to_string(),
            course_id: &payload.course_id,
            author_id: &teacher.id,
            title: &payload.title,
            description: &payload.description,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    Ok((StatusCode::CREATED, Json(QuestionResponse::from_db(question))))
}

async fn list_for_course(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<QuestionResponse>>, ApiError> {
    require_course_access(&state, &user, &course_id).await?;

    let questions = repositories::questions::list_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list questions"))?;

    Ok(Json(questions.into_iter().map(QuestionResponse::from_db).collect()))
}

async fn get_question(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(question_id): Path<String>,
) -> Result<Json<QuestionDetailResponse>, ApiError> {
    let question = fetch_question(&state, &question_id).await?;
    require_course_access(&state, &user, &question.course_id).await?;

    let answers = repositories::questions::list_answers(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list answers"))?;

    Ok(Json(QuestionDetailResponse {
        question: QuestionResponse::from_db(question),
        answers: answers.into_iter().map(AnswerResponse::from_db).collect(),
    }))
}

async fn update_question(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(question_id): Path<String>,
    Json(payload): Json<QuestionUpdate>,
) -> Result<Json<QuestionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let question = fetch_question(&state, &question_id).await?;
    require_author(&user, &question.author_id)?;

    repositories::questions::update(
        state.db(),
        &question.id,
        repositories::questions::UpdateQuestion {
            title: payload.title,
            description: payload.description,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?;

    let updated = fetch_question(&state, &question_id).await?;
    Ok(Json(QuestionResponse::from_db(updated)))
}

async fn delete_question(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(question_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let question = fetch_question(&state, &question_id).await?;
    require_author(&user, &question.author_id)?;

    repositories::questions::delete(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn add_answer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(question_id): Path<String>,
    Json(payload): Json<AnswerCreate>,
) -> Result<(StatusCode, Json<AnswerResponse>), ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Answer content must not be empty".to_string()));
    }

    let question = fetch_question(&state, &question_id).await?;
    require_course_access(&state, &user, &question.course_id).await?;

    let answer = repositories::questions::add_answer(
        state.db(),
        &Uuid::new_v4().to_string(),
        &question.id,
        &user.id,
        &payload.content,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create answer"))?;

    Ok((StatusCode::CREATED, Json(AnswerResponse::from_db(answer))))
}

async fn update_answer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(answer_id): Path<String>,
    Json(payload): Json<AnswerUpdate>,
) -> Result<Json<AnswerResponse>, ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::BadRequest("Answer content must not be empty".to_string()));
    }

    let answer = fetch_answer(&state, &answer_id).await?;
    require_author(&user, &answer.user_id)?;

    repositories::questions::update_answer(
        state.db(),
        &answer.id,
        &payload.content,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update answer"))?;

    let updated = fetch_answer(&state, &answer_id).await?;
    Ok(Json(AnswerResponse::from_db(updated)))
}

async fn delete_answer(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(answer_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let answer = fetch_answer(&state, &answer_id).await?;
    require_author(&user, &answer.user_id)?;

    repositories::questions::delete_answer(state.db(), &answer.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete answer"))?;

    Ok(StatusCode::NO_CONTENT)
}

fn require_author(user: &User, author_id: &str) -> Result<(), ApiError> {
    if user.id == author_id || user.role == UserRole::Admin {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Only the author can modify this"))
    }
}

async fn fetch_question(state: &AppState, id: &str) -> Result<Question, ApiError> {
    repositories::questions::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}

async fn fetch_answer(
    state: &AppState,
    id: &str,
) -> Result<crate::db::models::Answer, ApiError> {
    repositories::questions::find_answer(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch answer"))?
        .ok_or_else(|| ApiError::NotFound("Answer not found".to_string()))
}
