use sqlx::PgPool;

pub(crate) async fn complete_lesson(
    pool: &PgPool,
    id: &str,
    student_id: &str,
    lesson_id: &str,
    completed_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO lesson_progress (id, student_id, lesson_id, completed_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (student_id, lesson_id) DO NOTHING",
    )
    .bind(id)
    .bind(student_id)
    .bind(lesson_id)
    .bind(completed_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// True when the student has a progress row for every lesson of the module
/// and the module is not empty.
pub(crate) async fn module_completed_by(
    pool: &PgPool,
    student_id: &str,
    module_id: &str,
) -> Result<bool, sqlx::Error> {
    let (total, done) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*),
                COUNT(*) FILTER (WHERE lp.id IS NOT NULL)
           FROM lessons l
           LEFT JOIN lesson_progress lp ON lp.lesson_id = l.id AND lp.student_id = $1
          WHERE l.module_id = $2",
    )
    .bind(student_id)
    .bind(module_id)
    .fetch_one(pool)
    .await?;
    Ok(total > 0 && total == done)
}

pub(crate) async fn upsert_module_progress(
    pool: &PgPool,
    id: &str,
    student_id: &str,
    module_id: &str,
    completed_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO module_progress (id, student_id, module_id, completed_at)
         VALUES ($1,$2,$3,$4)
         ON CONFLICT (student_id, module_id) DO NOTHING",
    )
    .bind(id)
    .bind(student_id)
    .bind(module_id)
    .bind(completed_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Drops module_progress rows invalidated by a lesson change: any student of
/// this module who no longer has every sibling lesson completed.
pub(crate) async fn prune_stale_module_progress(
    pool: &PgPool,
    module_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM module_progress mp
          WHERE mp.module_id = $1
            AND (
                NOT EXISTS (SELECT 1 FROM lessons l WHERE l.module_id = $1)
                OR EXISTS (
                    SELECT 1 FROM lessons l
                     WHERE l.module_id = $1
                       AND NOT EXISTS (
                           SELECT 1 FROM lesson_progress lp
                            WHERE lp.lesson_id = l.id AND lp.student_id = mp.student_id
                       )
                )
            )",
    )
    .bind(module_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Students who now satisfy module completion but have no module_progress
/// row yet; candidates are drawn from lesson_progress on sibling lessons.
pub(crate) async fn newly_completed_students(
    pool: &PgPool,
    module_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT lp.student_id
           FROM lesson_progress lp
           JOIN lessons l ON l.id = lp.lesson_id
          WHERE l.module_id = $1
          GROUP BY lp.student_id
         HAVING COUNT(*) = (SELECT COUNT(*) FROM lessons WHERE module_id = $1)
            AND lp.student_id NOT IN (
                SELECT student_id FROM module_progress WHERE module_id = $1
            )",
    )
    .bind(module_id)
    .fetch_all(pool)
    .await
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ModuleProgressSummary {
    pub(crate) module_id: String,
    pub(crate) title: String,
    pub(crate) total_lessons: i64,
    pub(crate) completed_lessons: i64,
    pub(crate) module_completed: bool,
}

pub(crate) async fn course_summary(
    pool: &PgPool,
    course_id: &str,
    student_id: &str,
) -> Result<Vec<ModuleProgressSummary>, sqlx::Error> {
    sqlx::query_as::<_, ModuleProgressSummary>(
        "SELECT m.id AS module_id,
                m.title,
                (SELECT COUNT(*) FROM lessons l WHERE l.module_id = m.id) AS total_lessons,
                (SELECT COUNT(*) FROM lesson_progress lp
                   JOIN lessons l ON l.id = lp.lesson_id
                  WHERE l.module_id = m.id AND lp.student_id = $2) AS completed_lessons,
                EXISTS (SELECT 1 FROM module_progress mp
                         WHERE mp.module_id = m.id AND mp.student_id = $2) AS module_completed
           FROM modules m
          WHERE m.course_id = $1
          ORDER BY m.order_index, m.created_at",
    )
    .bind(course_id)
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn lessons_completed_in_course(
    pool: &PgPool,
    course_id: &str,
    student_id: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM lesson_progress lp
           JOIN lessons l ON l.id = lp.lesson_id
           JOIN modules m ON m.id = l.module_id
          WHERE m.course_id = $1 AND lp.student_id = $2",
    )
    .bind(course_id)
    .bind(student_id)
    .fetch_one(pool)
    .await
}
