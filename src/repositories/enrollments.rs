use sqlx::PgPool;

use crate::db::models::{Course, Enrollment};

const ENROLLMENT_COLUMNS: &str = "id, course_id, student_id, enrolled_at";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    course_id: &str,
    student_id: &str,
    enrolled_at: time::PrimitiveDateTime,
) -> Result<Enrollment, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (id, course_id, student_id, enrolled_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {ENROLLMENT_COLUMNS}",
    ))
    .bind(id)
    .bind(course_id)
    .bind(student_id)
    .bind(enrolled_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn exists(
    pool: &PgPool,
    course_id: &str,
    student_id: &str,
) -> Result<bool, sqlx::Error> {
    let id = sqlx::query_scalar::<_, String>(
        "SELECT id FROM enrollments WHERE course_id = $1 AND student_id = $2",
    )
    .bind(course_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await?;
    Ok(id.is_some())
}

pub(crate) async fn list_courses_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(
        "SELECT c.id, c.title, c.description, c.teacher_id, c.status, c.price, c.image_url,
                c.start_date, c.end_date, c.duration_weeks, c.batch_number,
                c.created_at, c.updated_at
           FROM courses c
           JOIN enrollments e ON e.course_id = c.id
          WHERE e.student_id = $1
          ORDER BY e.enrolled_at DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_student_ids_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT student_id FROM enrollments WHERE course_id = $1")
        .bind(course_id)
        .fetch_all(pool)
        .await
}

pub(crate) async fn count_for_course(pool: &PgPool, course_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM enrollments WHERE course_id = $1")
        .bind(course_id)
        .fetch_one(pool)
        .await
}
