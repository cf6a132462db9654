use sqlx::PgPool;

use crate::db::models::{Note, NoteFolder};

const NOTE_COLUMNS: &str = "id, user_id, folder_id, title, content, created_at, updated_at";

const FOLDER_COLUMNS: &str = "id, user_id, name, created_at, updated_at";

pub(crate) struct CreateNote<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) folder_id: Option<&'a str>,
    pub(crate) title: &'a str,
    pub(crate) content: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateNote<'_>) -> Result<Note, sqlx::Error> {
    sqlx::query_as::<_, Note>(&format!(
        "INSERT INTO notes (id, user_id, folder_id, title, content, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {NOTE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.folder_id)
    .bind(params.title)
    .bind(params.content)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Note>, sqlx::Error> {
    sqlx::query_as::<_, Note>(&format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
    folder_id: Option<&str>,
) -> Result<Vec<Note>, sqlx::Error> {
    match folder_id {
        Some(folder_id) => {
            sqlx::query_as::<_, Note>(&format!(
                "SELECT {NOTE_COLUMNS} FROM notes
                  WHERE user_id = $1 AND folder_id = $2 ORDER BY updated_at DESC"
            ))
            .bind(user_id)
            .bind(folder_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, Note>(&format!(
                "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = $1 ORDER BY updated_at DESC"
            ))
            .bind(user_id)
            .fetch_all(pool)
            .await
        }
    }
}

pub(crate) struct UpdateNote {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) folder_id: Option<Option<String>>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(pool: &PgPool, id: &str, params: UpdateNote) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE notes SET
            title = COALESCE($1, title),
            content = COALESCE($2, content),
            folder_id = CASE WHEN $3 THEN $4 ELSE folder_id END,
            updated_at = $5
         WHERE id = $6",
    )
    .bind(params.title)
    .bind(params.content)
    .bind(params.folder_id.is_some())
    .bind(params.folder_id.flatten())
    .bind(params.updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM notes WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn create_folder(
    pool: &PgPool,
    id: &str,
    user_id: &str,
    name: &str,
    now: time::PrimitiveDateTime,
) -> Result<NoteFolder, sqlx::Error> {
    sqlx::query_as::<_, NoteFolder>(&format!(
        "INSERT INTO note_folders (id, user_id, name, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$4)
         RETURNING {FOLDER_COLUMNS}",
    ))
    .bind(id)
    .bind(user_id)
    .bind(name)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_folder(pool: &PgPool, id: &str) -> Result<Option<NoteFolder>, sqlx::Error> {
    sqlx::query_as::<_, NoteFolder>(&format!(
        "SELECT {FOLDER_COLUMNS} FROM note_folders WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_folders(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<NoteFolder>, sqlx::Error> {
    sqlx::query_as::<_, NoteFolder>(&format!(
        "SELECT {FOLDER_COLUMNS} FROM note_folders WHERE user_id = $1 ORDER BY name"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn rename_folder(
    pool: &PgPool,
    id: &str,
    name: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE note_folders SET name = $1, updated_at = $2 WHERE id = $3")
        .bind(name)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn delete_folder(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM note_folders WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
