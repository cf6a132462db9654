use sqlx::PgPool;

use crate::db::models::{Material, StoredFile};
use crate::db::types::FileKind;

const MATERIAL_COLUMNS: &str = "id, course_id, title, description, created_at, updated_at";

const FILE_COLUMNS: &str = "id, file_url, file_type, file_size, created_at";

pub(crate) struct CreateMaterial<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateMaterial<'_>,
) -> Result<Material, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "INSERT INTO materials (id, course_id, title, description, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {MATERIAL_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!(
        "SELECT {MATERIAL_COLUMNS} FROM materials WHERE course_id = $1 ORDER BY created_at"
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct UpdateMaterial {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateMaterial,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE materials SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            updated_at = $3
         WHERE id = $4",
    )
    .bind(params.title)
    .bind(params.description)
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM materials WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn add_file(
    pool: &PgPool,
    id: &str,
    material_id: &str,
    file_url: &str,
    file_type: FileKind,
    file_size: i64,
    created_at: time::PrimitiveDateTime,
) -> Result<StoredFile, sqlx::Error> {
    sqlx::query_as::<_, StoredFile>(&format!(
        "INSERT INTO material_files (id, material_id, file_url, file_type, file_size, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {FILE_COLUMNS}",
    ))
    .bind(id)
    .bind(material_id)
    .bind(file_url)
    .bind(file_type)
    .bind(file_size)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_files(
    pool: &PgPool,
    material_id: &str,
) -> Result<Vec<StoredFile>, sqlx::Error> {
    sqlx::query_as::<_, StoredFile>(&format!(
        "SELECT {FILE_COLUMNS} FROM material_files WHERE material_id = $1 ORDER BY created_at"
    ))
    .bind(material_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn collect_file_urls(
    pool: &PgPool,
    material_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT file_url FROM material_files WHERE material_id = $1")
        .bind(material_id)
        .fetch_all(pool)
        .await
}
