use sqlx::PgPool;

use crate::db::models::{Assignment, AttachedLink, StoredFile};
use crate::db::types::FileKind;

const ASSIGNMENT_COLUMNS: &str =
    "id, course_id, teacher_id, title, description, due_date, created_at, updated_at";

const FILE_COLUMNS: &str = "id, file_url, file_type, file_size, created_at";

const LINK_COLUMNS: &str = "id, link_url, description, created_at";

pub(crate) struct CreateAssignment<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) teacher_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) due_date: Option<time::PrimitiveDateTime>,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateAssignment {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) due_date: Option<time::PrimitiveDateTime>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAssignment<'_>,
) -> Result<Assignment, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "INSERT INTO assignments (
            id, course_id, teacher_id, title, description, due_date, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
         RETURNING {ASSIGNMENT_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.teacher_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.due_date)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE course_id = $1 ORDER BY created_at"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateAssignment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE assignments SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            due_date = COALESCE($3, due_date),
            updated_at = $4
         WHERE id = $5",
    )
    .bind(params.title)
    .bind(params.description)
    .bind(params.due_date)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM assignments WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn add_file(
    pool: &PgPool,
    id: &str,
    assignment_id: &str,
    file_url: &str,
    file_type: FileKind,
    file_size: i64,
    created_at: time::PrimitiveDateTime,
) -> Result<StoredFile, sqlx::Error> {
    sqlx::query_as::<_, StoredFile>(&format!(
        "INSERT INTO assignment_files (id, assignment_id, file_url, file_type, file_size, is_temp, created_at)
         VALUES ($1,$2,$3,$4,$5,TRUE,$6)
         RETURNING {FILE_COLUMNS}",
    ))
    .bind(id)
    .bind(assignment_id)
    .bind(file_url)
    .bind(file_type)
    .bind(file_size)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn confirm_files(pool: &PgPool, assignment_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE assignment_files SET is_temp = FALSE WHERE assignment_id = $1")
        .bind(assignment_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn list_files(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<Vec<StoredFile>, sqlx::Error> {
    sqlx::query_as::<_, StoredFile>(&format!(
        "SELECT {FILE_COLUMNS} FROM assignment_files WHERE assignment_id = $1 ORDER BY created_at"
    ))
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_file(
    pool: &PgPool,
    file_id: &str,
) -> Result<Option<(StoredFile, String)>, sqlx::Error> {
    let row = sqlx::query_as::<_, StoredFileWithAssignment>(&format!(
        "SELECT {FILE_COLUMNS}, assignment_id FROM assignment_files WHERE id = $1"
    ))
    .bind(file_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|row| (row.file, row.assignment_id)))
}

#[derive(sqlx::FromRow)]
struct StoredFileWithAssignment {
    #[sqlx(flatten)]
    file: StoredFile,
    assignment_id: String,
}

pub(crate) async fn delete_file(pool: &PgPool, file_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assignment_files WHERE id = $1")
        .bind(file_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn add_link(
    pool: &PgPool,
    id: &str,
    assignment_id: &str,
    link_url: &str,
    description: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<AttachedLink, sqlx::Error> {
    sqlx::query_as::<_, AttachedLink>(&format!(
        "INSERT INTO assignment_links (id, assignment_id, link_url, description, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {LINK_COLUMNS}",
    ))
    .bind(id)
    .bind(assignment_id)
    .bind(link_url)
    .bind(description)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_links(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<Vec<AttachedLink>, sqlx::Error> {
    sqlx::query_as::<_, AttachedLink>(&format!(
        "SELECT {LINK_COLUMNS} FROM assignment_links WHERE assignment_id = $1 ORDER BY created_at"
    ))
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_link(pool: &PgPool, link_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assignment_links WHERE id = $1")
        .bind(link_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Assignment files plus all submission files under the assignment; used for
/// object-store cleanup before the row cascade.
pub(crate) async fn collect_file_urls(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT file_url FROM assignment_files WHERE assignment_id = $1
         UNION ALL
         SELECT sf.file_url FROM submission_files sf
           JOIN submissions s ON s.id = sf.submission_id
          WHERE s.assignment_id = $1",
    )
    .bind(assignment_id)
    .fetch_all(pool)
    .await
}
