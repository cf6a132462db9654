use sqlx::PgPool;

use crate::db::models::{AttachedLink, Lesson, StoredFile};
use crate::db::types::FileKind;

const LESSON_COLUMNS: &str =
    "id, module_id, title, content, duration_minutes, created_at, updated_at";

const FILE_COLUMNS: &str = "id, file_url, file_type, file_size, created_at";

const LINK_COLUMNS: &str = "id, link_url, description, created_at";

pub(crate) struct CreateLesson<'a> {
    pub(crate) id: &'a str,
    pub(crate) module_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) content: &'a str,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateLesson {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) duration_minutes: Option<i32>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateLesson<'_>) -> Result<Lesson, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "INSERT INTO lessons (id, module_id, title, content, duration_minutes, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {LESSON_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.module_id)
    .bind(params.title)
    .bind(params.content)
    .bind(params.duration_minutes)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_module(
    pool: &PgPool,
    module_id: &str,
) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {LESSON_COLUMNS} FROM lessons WHERE module_id = $1 ORDER BY created_at"
    ))
    .bind(module_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateLesson,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE lessons SET
            title = COALESCE($1, title),
            content = COALESCE($2, content),
            duration_minutes = COALESCE($3, duration_minutes),
            updated_at = $4
         WHERE id = $5",
    )
    .bind(params.title)
    .bind(params.content)
    .bind(params.duration_minutes)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lessons WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn add_file(
    pool: &PgPool,
    id: &str,
    lesson_id: &str,
    file_url: &str,
    file_type: FileKind,
    file_size: i64,
    created_at: time::PrimitiveDateTime,
) -> Result<StoredFile, sqlx::Error> {
    sqlx::query_as::<_, StoredFile>(&format!(
        "INSERT INTO lesson_files (id, lesson_id, file_url, file_type, file_size, is_temp, created_at)
         VALUES ($1,$2,$3,$4,$5,TRUE,$6)
         RETURNING {FILE_COLUMNS}",
    ))
    .bind(id)
    .bind(lesson_id)
    .bind(file_url)
    .bind(file_type)
    .bind(file_size)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn confirm_files(pool: &PgPool, lesson_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE lesson_files SET is_temp = FALSE WHERE lesson_id = $1")
        .bind(lesson_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn list_files(
    pool: &PgPool,
    lesson_id: &str,
) -> Result<Vec<StoredFile>, sqlx::Error> {
    sqlx::query_as::<_, StoredFile>(&format!(
        "SELECT {FILE_COLUMNS} FROM lesson_files WHERE lesson_id = $1 ORDER BY created_at"
    ))
    .bind(lesson_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_file(
    pool: &PgPool,
    file_id: &str,
) -> Result<Option<(StoredFile, String)>, sqlx::Error> {
    let row = sqlx::query_as::<_, StoredFileWithLesson>(&format!(
        "SELECT {FILE_COLUMNS}, lesson_id FROM lesson_files WHERE id = $1"
    ))
    .bind(file_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|row| (row.file, row.lesson_id)))
}

#[derive(sqlx::FromRow)]
struct StoredFileWithLesson {
    #[sqlx(flatten)]
    file: StoredFile,
    lesson_id: String,
}

pub(crate) async fn delete_file(pool: &PgPool, file_id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM lesson_files WHERE id = $1").bind(file_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn add_link(
    pool: &PgPool,
    id: &str,
    lesson_id: &str,
    link_url: &str,
    description: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<AttachedLink, sqlx::Error> {
    sqlx::query_as::<_, AttachedLink>(&format!(
        "INSERT INTO lesson_links (id, lesson_id, link_url, description, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {LINK_COLUMNS}",
    ))
    .bind(id)
    .bind(lesson_id)
    .bind(link_url)
    .bind(description)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_links(
    pool: &PgPool,
    lesson_id: &str,
) -> Result<Vec<AttachedLink>, sqlx::Error> {
    sqlx::query_as::<_, AttachedLink>(&format!(
        "SELECT {LINK_COLUMNS} FROM lesson_links WHERE lesson_id = $1 ORDER BY created_at"
    ))
    .bind(lesson_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_link(pool: &PgPool, link_id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM lesson_links WHERE id = $1").bind(link_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn collect_file_urls(
    pool: &PgPool,
    lesson_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT file_url FROM lesson_files WHERE lesson_id = $1")
        .bind(lesson_id)
        .fetch_all(pool)
        .await
}
