use sqlx::PgPool;

use crate::db::models::{StoredFile, Submission};
use crate::db::types::{FileKind, SubmissionStatus};

const SUBMISSION_COLUMNS: &str = "\
    id, assignment_id, student_id, comment, status, grade, feedback, \
    submitted_at, returned_at, created_at, updated_at";

const FILE_COLUMNS: &str = "id, file_url, file_type, file_size, created_at";

/// Placeholder row in `assigned` state, back-filled for each enrolled student
/// when an assignment is created or when a student enrolls afterwards.
pub(crate) async fn create_placeholder(
    pool: &PgPool,
    id: &str,
    assignment_id: &str,
    student_id: &str,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO submissions (id, assignment_id, student_id, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5)
         ON CONFLICT (assignment_id, student_id) DO NOTHING",
    )
    .bind(id)
    .bind(assignment_id)
    .bind(student_id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn find_for_student(
    pool: &PgPool,
    assignment_id: &str,
    student_id: &str,
) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions
          WHERE assignment_id = $1 AND student_id = $2"
    ))
    .bind(assignment_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_submitted_for_assignment(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions
          WHERE assignment_id = $1 AND status <> 'assigned'
          ORDER BY submitted_at DESC NULLS LAST"
    ))
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StatusCount {
    pub(crate) status: SubmissionStatus,
    pub(crate) count: i64,
}

pub(crate) async fn status_counts(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<Vec<StatusCount>, sqlx::Error> {
    sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM submissions
          WHERE assignment_id = $1 GROUP BY status",
    )
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn mark_submitted(
    pool: &PgPool,
    id: &str,
    comment: &str,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE submissions SET
            comment = $1,
            status = 'submitted',
            submitted_at = $2,
            updated_at = $2
         WHERE id = $3",
    )
    .bind(comment)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Back to `assigned`: submitted_at cleared, comment wiped. File rows are
/// deleted separately by the handler after object-store cleanup.
pub(crate) async fn mark_cancelled(
    pool: &PgPool,
    id: &str,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE submissions SET
            comment = '',
            status = 'assigned',
            submitted_at = NULL,
            updated_at = $1
         WHERE id = $2",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn mark_graded(
    pool: &PgPool,
    id: &str,
    grade: f64,
    feedback: &str,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE submissions SET
            grade = $1,
            feedback = $2,
            status = 'graded',
            updated_at = $3
         WHERE id = $4",
    )
    .bind(grade)
    .bind(feedback)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn mark_returned(
    pool: &PgPool,
    id: &str,
    feedback: &str,
    now: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE submissions SET
            feedback = $1,
            status = 'returned',
            returned_at = $2,
            updated_at = $2
         WHERE id = $3",
    )
    .bind(feedback)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn add_file(
    pool: &PgPool,
    id: &str,
    submission_id: &str,
    file_url: &str,
    file_type: FileKind,
    file_size: i64,
    created_at: time::PrimitiveDateTime,
) -> Result<StoredFile, sqlx::Error> {
    sqlx::query_as::<_, StoredFile>(&format!(
        "INSERT INTO submission_files (id, submission_id, file_url, file_type, file_size, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {FILE_COLUMNS}",
    ))
    .bind(id)
    .bind(submission_id)
    .bind(file_url)
    .bind(file_type)
    .bind(file_size)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_files(
    pool: &PgPool,
    submission_id: &str,
) -> Result<Vec<StoredFile>, sqlx::Error> {
    sqlx::query_as::<_, StoredFile>(&format!(
        "SELECT {FILE_COLUMNS} FROM submission_files WHERE submission_id = $1 ORDER BY created_at"
    ))
    .bind(submission_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_files(pool: &PgPool, submission_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM submission_files WHERE submission_id = $1")
        .bind(submission_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn collect_file_urls(
    pool: &PgPool,
    submission_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT file_url FROM submission_files WHERE submission_id = $1",
    )
    .bind(submission_id)
    .fetch_all(pool)
    .await
}
