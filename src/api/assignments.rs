use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{
    require_course_owner, require_enrollment, CurrentTeacher, CurrentUser,
};
use crate::api::uploads;
use crate::api::validation;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::{Assignment, Submission, User};
use crate::db::types::{SubmissionStatus, UserRole};
use crate::repositories;
use crate::schemas::assignment::{
    AssignmentCreate, AssignmentResponse, AssignmentUpdate, GradeRequest, ReturnRequest,
    StatusCounts, StudentAssignmentDetail, StudentAssignmentListItem, SubmissionListItem,
    SubmissionResponse, TeacherAssignmentDetail,
};
use crate::schemas::files::{FileResponse, LinkCreate, LinkResponse};
use crate::services;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_assignment))
        .route("/course/:course_id", get(list_for_course))
        .route("/course/:course_id/student", get(list_for_student))
        .route(
            "/:assignment_id",
            get(get_assignment).patch(update_assignment).delete(delete_assignment),
        )
        .route("/:assignment_id/files", post(upload_files))
        .route("/:assignment_id/confirm-files", post(confirm_files))
        .route("/:assignment_id/links", post(add_links))
        .route("/files/:file_id", delete(delete_file))
        .route("/links/:link_id", delete(delete_link))
        .route("/:assignment_id/submit", post(submit))
        .route("/:assignment_id/cancel", post(cancel_submission))
        .route("/:assignment_id/submissions", get(list_submissions))
        .route("/submissions/:submission_id", get(get_submission))
        .route("/submissions/:submission_id/grade", post(grade_submission))
        .route("/submissions/:submission_id/return", post(return_submission))
}

async fn create_assignment(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Json(payload): Json<AssignmentCreate>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let course = require_course_owner(&state, &teacher, &payload.course_id).await?;

    let now = primitive_now_utc();
    let assignment = repositories::assignments::create(
        state.db(),
        repositories::assignments::CreateAssignment {
            id: &Uuid::new_v4().to_string(),
            course_id: &course.id,
            teacher_id: &teacher.id,
            title: &payload.title,
            description: &payload.description,
            due_date: payload.due_date,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create assignment"))?;

    // Every enrolled student gets an `assigned` placeholder immediately.
    let student_ids =
        repositories::enrollments::list_student_ids_for_course(state.db(), &course.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list enrolled students"))?;
    for student_id in &student_ids {
        repositories::submissions::create_placeholder(
            state.db(),
            &Uuid::new_v4().to_string(),
            &assignment.id,
            student_id,
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to create submission placeholder"))?;
    }

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from_db(assignment))))
}

async fn list_for_course(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    require_course_owner(&state, &teacher, &course_id).await?;

    let assignments = repositories::assignments::list_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(assignments.into_iter().map(AssignmentResponse::from_db).collect()))
}

async fn list_for_student(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<StudentAssignmentListItem>>, ApiError> {
    require_enrollment(&state, &user, &course_id).await?;

    let assignments = repositories::assignments::list_for_course(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    let mut items = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let submission =
            repositories::submissions::find_for_student(state.db(), &assignment.id, &user.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?;

        let (status, grade, feedback) = match submission {
            Some(s) => {
                let graded =
                    matches!(s.status, SubmissionStatus::Graded | SubmissionStatus::Returned);
                (s.status, graded.then_some(s.grade).flatten(), graded.then_some(s.feedback))
            }
            None => (SubmissionStatus::Assigned, None, None),
        };

        items.push(StudentAssignmentListItem {
            id: assignment.id,
            title: assignment.title,
            description: assignment.description,
            due_date: assignment.due_date.map(crate::core::time::format_primitive),
            status,
            grade,
            feedback,
        });
    }

    Ok(Json(items))
}

async fn get_assignment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(assignment_id): Path<String>,
) -> Result<Response, ApiError> {
    let assignment = fetch_assignment(&state, &assignment_id).await?;

    let files = repositories::assignments::list_files(state.db(), &assignment.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignment files"))?;
    let links = repositories::assignments::list_links(state.db(), &assignment.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignment links"))?;
    let files: Vec<_> = files.into_iter().map(FileResponse::from_db).collect();
    let links: Vec<_> = links.into_iter().map(LinkResponse::from_db).collect();

    if user.role == UserRole::Student {
        require_enrollment(&state, &user, &assignment.course_id).await?;

        let submission =
            repositories::submissions::find_for_student(state.db(), &assignment.id, &user.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?;
        let submission = match submission {
            Some(s) => Some(submission_response(&state, s).await?),
            None => None,
        };

        return Ok(Json(StudentAssignmentDetail {
            assignment: AssignmentResponse::from_db(assignment),
            files,
            links,
            submission,
        })
        .into_response());
    }

    require_course_owner(&state, &user, &assignment.course_id).await?;

    let counts = repositories::submissions::status_counts(state.db(), &assignment.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count submissions"))?;
    let mut status_counts = StatusCounts::default();
    for row in counts {
        match row.status {
            SubmissionStatus::Assigned => status_counts.assigned = row.count,
            SubmissionStatus::Submitted => status_counts.submitted = row.count,
            SubmissionStatus::Graded => status_counts.graded = row.count,
            SubmissionStatus::Returned => status_counts.returned = row.count,
        }
    }

    Ok(Json(TeacherAssignmentDetail {
        assignment: AssignmentResponse::from_db(assignment),
        files,
        links,
        status_counts,
    })
    .into_response())
}

async fn update_assignment(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(assignment_id): Path<String>,
    Json(payload): Json<AssignmentUpdate>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let assignment = fetch_assignment(&state, &assignment_id).await?;
    require_course_owner(&state, &teacher, &assignment.course_id).await?;

    repositories::assignments::update(
        state.db(),
        &assignment.id,
        repositories::assignments::UpdateAssignment {
            title: payload.title,
            description: payload.description,
            due_date: payload.due_date,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update assignment"))?;

    let updated = fetch_assignment(&state, &assignment_id).await?;
    Ok(Json(AssignmentResponse::from_db(updated)))
}

async fn delete_assignment(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(assignment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let assignment = fetch_assignment(&state, &assignment_id).await?;
    require_course_owner(&state, &teacher, &assignment.course_id).await?;

    let urls = repositories::assignments::collect_file_urls(state.db(), &assignment.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to collect assignment files"))?;
    services::assets::delete_stored_urls(state.storage(), urls).await;

    repositories::assignments::delete(state.db(), &assignment.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete assignment"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn upload_files(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(assignment_id): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vec<FileResponse>>), ApiError> {
    let assignment = fetch_assignment(&state, &assignment_id).await?;
    require_course_owner(&state, &teacher, &assignment.course_id).await?;

    let (parts, _fields) = uploads::read_multipart(multipart, &state).await?;
    if parts.is_empty() {
        return Err(ApiError::BadRequest("At least one file is required".to_string()));
    }

    let storage = uploads::require_storage(&state)?;

    let mut responses = Vec::with_capacity(parts.len());
    for part in parts {
        let file_kind = validation::validate_document_upload(&part.filename)?;

        let key = format!(
            "assignments/{}/{}_{}",
            assignment.id,
            Uuid::new_v4(),
            uploads::sanitized_filename(&part.filename)
        );
        let (size, _checksum) = storage
            .upload_bytes(&key, &part.content_type, part.bytes)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to store assignment file"))?;

        let file = repositories::assignments::add_file(
            state.db(),
            &Uuid::new_v4().to_string(),
            &assignment.id,
            &storage.public_url(&key),
            file_kind,
            size,
            primitive_now_utc(),
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save assignment file"))?;

        responses.push(FileResponse::from_db(file));
    }

    Ok((StatusCode::CREATED, Json(responses)))
}

async fn confirm_files(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(assignment_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let assignment = fetch_assignment(&state, &assignment_id).await?;
    require_course_owner(&state, &teacher, &assignment.course_id).await?;

    repositories::assignments::confirm_files(state.db(), &assignment.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to confirm assignment files"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn add_links(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(assignment_id): Path<String>,
    Json(payload): Json<Vec<LinkCreate>>,
) -> Result<(StatusCode, Json<Vec<LinkResponse>>), ApiError> {
    let assignment = fetch_assignment(&state, &assignment_id).await?;
    require_course_owner(&state, &teacher, &assignment.course_id).await?;

    if payload.is_empty() {
        return Err(ApiError::BadRequest("At least one link is required".to_string()));
    }

    let now = primitive_now_utc();
    let mut responses = Vec::with_capacity(payload.len());
    for link in payload {
        link.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let created = repositories::assignments::add_link(
            state.db(),
            &Uuid::new_v4().to_string(),
            &assignment.id,
            &link.link_url,
            &link.description,
            now,
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to save assignment link"))?;
        responses.push(LinkResponse::from_db(created));
    }

    Ok((StatusCode::CREATED, Json(responses)))
}

async fn delete_file(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(file_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let (file, assignment_id) = repositories::assignments::find_file(state.db(), &file_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assignment file"))?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    let assignment = fetch_assignment(&state, &assignment_id).await?;
    require_course_owner(&state, &teacher, &assignment.course_id).await?;

    services::assets::delete_stored_urls(state.storage(), vec![file.file_url]).await;

    repositories::assignments::delete_file(state.db(), &file_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete assignment file"))?;

    Ok(StatusCode::NO_CONTENT)
}

async fn delete_link(
    State(state): State<AppState>,
    CurrentTeacher(_teacher): CurrentTeacher,
    Path(link_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::assignments::delete_link(state.db(), &link_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete assignment link"))?;
    if !deleted {
        return Err(ApiError::NotFound("Link not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn submit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(assignment_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<SubmissionResponse>, ApiError> {
    if user.role != UserRole::Student {
        return Err(ApiError::Forbidden("Only students can submit work"));
    }

    let assignment = fetch_assignment(&state, &assignment_id).await?;
    require_enrollment(&state, &user, &assignment.course_id).await?;

    let submission =
        repositories::submissions::find_for_student(state.db(), &assignment.id, &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?
            .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    if !matches!(submission.status, SubmissionStatus::Assigned | SubmissionStatus::Returned) {
        return Err(ApiError::Conflict(
            "Submission has already been submitted".to_string(),
        ));
    }

    let (parts, fields) = uploads::read_multipart(multipart, &state).await?;
    let comment = fields.get("comment").cloned().unwrap_or_default();
    if parts.is_empty() && comment.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "A submission needs a comment or at least one file".to_string(),
        ));
    }

    let now = primitive_now_utc();

    if !parts.is_empty() {
        let storage = uploads::require_storage(&state)?;
        for part in &parts {
            let file_kind = validation::validate_document_upload(&part.filename)?;

            let key = format!(
                "submissions/{}/{}_{}",
                submission.id,
                Uuid::new_v4(),
                uploads::sanitized_filename(&part.filename)
            );
            let (size, _checksum) = storage
                .upload_bytes(&key, &part.content_type, part.bytes.clone())
                .await
                .map_err(|e| ApiError::internal(e, "Failed to store submission file"))?;

            repositories::submissions::add_file(
                state.db(),
                &Uuid::new_v4().to_string(),
                &submission.id,
                &storage.public_url(&key),
                file_kind,
                size,
                now,
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to save submission file"))?;
        }
    }

    repositories::submissions::mark_submitted(state.db(), &submission.id, &comment, now)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to submit work"))?;

    let updated = fetch_submission(&state, &submission.id).await?;
    Ok(Json(submission_response(&state, updated).await?))
}

async fn cancel_submission(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(assignment_id): Path<String>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let assignment = fetch_assignment(&state, &assignment_id).await?;

    let submission =
        repositories::submissions::find_for_student(state.db(), &assignment.id, &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?
            .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))?;

    // Graded and returned work is frozen; only a pending submission can be
    // withdrawn.
    if submission.status != SubmissionStatus::Submitted {
        return Err(ApiError::Conflict("Only submitted work can be cancelled".to_string()));
    }

    let urls = repositories::submissions::collect_file_urls(state.db(), &submission.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to collect submission files"))?;
    services::assets::delete_stored_urls(state.storage(), urls).await;

    repositories::submissions::delete_files(state.db(), &submission.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete submission files"))?;
    repositories::submissions::mark_cancelled(state.db(), &submission.id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to cancel submission"))?;

    let updated = fetch_submission(&state, &submission.id).await?;
    Ok(Json(submission_response(&state, updated).await?))
}

async fn list_submissions(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(assignment_id): Path<String>,
) -> Result<Json<Vec<SubmissionListItem>>, ApiError> {
    let assignment = fetch_assignment(&state, &assignment_id).await?;
    require_course_owner(&state, &teacher, &assignment.course_id).await?;

    let submissions =
        repositories::submissions::list_submitted_for_assignment(state.db(), &assignment.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to list submissions"))?;

    let mut items = Vec::with_capacity(submissions.len());
    for submission in submissions {
        let on_time = match (submission.submitted_at, assignment.due_date) {
            (Some(submitted_at), Some(due_date)) => Some(submitted_at <= due_date),
            _ => None,
        };
        items.push(SubmissionListItem {
            submission: submission_response(&state, submission).await?,
            on_time,
        });
    }

    Ok(Json(items))
}

async fn get_submission(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(submission_id): Path<String>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let submission = fetch_submission(&state, &submission_id).await?;
    require_submission_access(&state, &user, &submission).await?;

    Ok(Json(submission_response(&state, submission).await?))
}

async fn grade_submission(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(submission_id): Path<String>,
    Json(payload): Json<GradeRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let submission = fetch_submission(&state, &submission_id).await?;
    let assignment = fetch_assignment(&state, &submission.assignment_id).await?;
    require_course_owner(&state, &teacher, &assignment.course_id).await?;

    if submission.status == SubmissionStatus::Assigned {
        return Err(ApiError::Conflict("Nothing has been submitted yet".to_string()));
    }

    repositories::submissions::mark_graded(
        state.db(),
        &submission.id,
        payload.grade,
        &payload.feedback,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to grade submission"))?;

    let updated = fetch_submission(&state, &submission_id).await?;
    Ok(Json(submission_response(&state, updated).await?))
}

async fn return_submission(
    State(state): State<AppState>,
    CurrentTeacher(teacher): CurrentTeacher,
    Path(submission_id): Path<String>,
    Json(payload): Json<ReturnRequest>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    if payload.feedback.trim().is_empty() {
        return Err(ApiError::BadRequest("Returned work requires feedback".to_string()));
    }

    let submission = fetch_submission(&state, &submission_id).await?;
    let assignment = fetch_assignment(&state, &submission.assignment_id).await?;
    require_course_owner(&state, &teacher, &assignment.course_id).await?;

    if submission.status == SubmissionStatus::Assigned {
        return Err(ApiError::Conflict("Nothing has been submitted yet".to_string()));
    }

    repositories::submissions::mark_returned(
        state.db(),
        &submission.id,
        &payload.feedback,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to return submission"))?;

    let updated = fetch_submission(&state, &submission_id).await?;
    Ok(Json(submission_response(&state, updated).await?))
}

async fn require_submission_access(
    state: &AppState,
    user: &User,
    submission: &Submission,
) -> Result<(), ApiError> {
    if submission.student_id == user.id || user.role == UserRole::Admin {
        return Ok(());
    }
    let assignment = fetch_assignment(state, &submission.assignment_id).await?;
    require_course_owner(state, user, &assignment.course_id).await.map(|_| ())
}

async fn submission_response(
    state: &AppState,
    submission: Submission,
) -> Result<SubmissionResponse, ApiError> {
    let files = repositories::submissions::list_files(state.db(), &submission.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list submission files"))?;
    Ok(SubmissionResponse::from_db(
        submission,
        files.into_iter().map(FileResponse::from_db).collect(),
    ))
}

async fn fetch_assignment(state: &AppState, id: &str) -> Result<Assignment, ApiError> {
    repositories::assignments::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch assignment"))?
        .ok_or_else(|| ApiError::NotFound("Assignment not found".to_string()))
}

async fn fetch_submission(state: &AppState, id: &str) -> Result<Submission, ApiError> {
    repositories::submissions::find_by_id(state.db(), id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch submission"))?
        .ok_or_else(|| ApiError::NotFound("Submission not found".to_string()))
}

#[cfg(test)]
mod tests;
