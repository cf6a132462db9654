use sqlx::PgPool;

use crate::db::models::Course;
use crate::db::types::CourseStatus;

const COURSE_COLUMNS: &str = "\
    id, title, description, teacher_id, status, price, image_url, \
    start_date, end_date, duration_weeks, batch_number, created_at, updated_at";

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: &'a str,
    pub(crate) teacher_id: &'a str,
    pub(crate) status: CourseStatus,
    pub(crate) price: Option<f64>,
    pub(crate) image_url: Option<&'a str>,
    pub(crate) start_date: time::Date,
    pub(crate) end_date: Option<time::Date>,
    pub(crate) duration_weeks: i32,
    pub(crate) batch_number: i32,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) struct UpdateCourse {
    pub(crate) title: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) status: Option<CourseStatus>,
    pub(crate) price: Option<f64>,
    pub(crate) image_url: Option<String>,
    pub(crate) start_date: Option<time::Date>,
    pub(crate) end_date: Option<time::Date>,
    pub(crate) duration_weeks: Option<i32>,
    pub(crate) batch_number: Option<i32>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (
            id, title, description, teacher_id, status, price, image_url,
            start_date, end_date, duration_weeks, batch_number, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
         RETURNING {COURSE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.description)
    .bind(params.teacher_id)
    .bind(params.status)
    .bind(params.price)
    .bind(params.image_url)
    .bind(params.start_date)
    .bind(params.end_date)
    .bind(params.duration_weeks)
    .bind(params.batch_number)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC OFFSET $1 LIMIT $2"
    ))
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses").fetch_one(pool).await
}

pub(crate) async fn update(
    pool: &PgPool,
    course_id: &str,
    params: UpdateCourse,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE courses SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            status = COALESCE($3, status),
            price = COALESCE($4, price),
            image_url = COALESCE($5, image_url),
            start_date = COALESCE($6, start_date),
            end_date = COALESCE($7, end_date),
            duration_weeks = COALESCE($8, duration_weeks),
            batch_number = COALESCE($9, batch_number),
            updated_at = $10
         WHERE id = $11",
    )
    .bind(params.title)
    .bind(params.description)
    .bind(params.status)
    .bind(params.price)
    .bind(params.image_url)
    .bind(params.start_date)
    .bind(params.end_date)
    .bind(params.duration_weeks)
    .bind(params.batch_number)
    .bind(params.updated_at)
    .bind(course_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, course_id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM courses WHERE id = $1").bind(course_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Every stored object URL hanging off a course: lesson files, assignment
/// files, submission files and material files. Used for best-effort cleanup
/// before the row cascade.
pub(crate) async fn collect_file_urls(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT lf.file_url FROM lesson_files lf
           JOIN lessons l ON l.id = lf.lesson_id
           JOIN modules m ON m.id = l.module_id
          WHERE m.course_id = $1
         UNION ALL
         SELECT af.file_url FROM assignment_files af
           JOIN assignments a ON a.id = af.assignment_id
          WHERE a.course_id = $1
         UNION ALL
         SELECT sf.file_url FROM submission_files sf
           JOIN submissions s ON s.id = sf.submission_id
           JOIN assignments a ON a.id = s.assignment_id
          WHERE a.course_id = $1
         UNION ALL
         SELECT mf.file_url FROM material_files mf
           JOIN materials mt ON mt.id = mf.material_id
          WHERE mt.course_id = $1",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}
