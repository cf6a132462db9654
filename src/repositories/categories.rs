use sqlx::PgPool;

use crate::db::models::CourseCategory;

const CATEGORY_COLUMNS: &str = "id, name, description";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    name: &str,
    description: &str,
) -> Result<CourseCategory, sqlx::Error> {
    sqlx::query_as::<_, CourseCategory>(&format!(
        "INSERT INTO course_categories (id, name, description)
         VALUES ($1,$2,$3)
         RETURNING {CATEGORY_COLUMNS}",
    ))
    .bind(id)
    .bind(name)
    .bind(description)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<CourseCategory>, sqlx::Error> {
    sqlx::query_as::<_, CourseCategory>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM course_categories WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists_by_name(pool: &PgPool, name: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT id FROM course_categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<CourseCategory>, sqlx::Error> {
    sqlx::query_as::<_, CourseCategory>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM course_categories ORDER BY name"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<CourseCategory>, sqlx::Error> {
    sqlx::query_as::<_, CourseCategory>(
        "SELECT c.id, c.name, c.description
           FROM course_categories c
           JOIN course_category_relations r ON r.category_id = c.id
          WHERE r.course_id = $1
          ORDER BY c.name",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct UpdateCategory {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateCategory,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE course_categories SET
            name = COALESCE($1, name),
            description = COALESCE($2, description)
         WHERE id = $3",
    )
    .bind(params.name)
    .bind(params.description)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM course_categories WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Replaces a course's category set in one pass.
pub(crate) async fn replace_for_course(
    pool: &PgPool,
    course_id: &str,
    category_ids: &[String],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM course_category_relations WHERE course_id = $1")
        .bind(course_id)
        .execute(pool)
        .await?;

    for category_id in category_ids {
        sqlx::query(
            "INSERT INTO course_category_relations (id, course_id, category_id)
             VALUES ($1,$2,$3)
             ON CONFLICT (course_id, category_id) DO NOTHING",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(course_id)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    Ok(())
}

pub(crate) async fn count_existing(
    pool: &PgPool,
    category_ids: &[String],
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM course_categories WHERE id = ANY($1)",
    )
    .bind(category_ids)
    .fetch_one(pool)
    .await
}
