use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::repositories;

/// Derives module completion for one student after a lesson completion.
/// Returns true when the module is now complete.
pub(crate) async fn derive_module_for_student(
    pool: &PgPool,
    student_id: &str,
    module_id: &str,
) -> Result<bool, sqlx::Error> {
    let completed =
        repositories::progress::module_completed_by(pool, student_id, module_id).await?;

    if completed {
        repositories::progress::upsert_module_progress(
            pool,
            &Uuid::new_v4().to_string(),
            student_id,
            module_id,
            primitive_now_utc(),
        )
        .await?;
    }

    Ok(completed)
}

/// Re-derives module completion for every affected student after a lesson
/// is added to or removed from a module. Adding a lesson invalidates rows;
/// removing one can complete the module for students who had finished the
/// remaining lessons.
pub(crate) async fn recompute_module(pool: &PgPool, module_id: &str) -> Result<(), sqlx::Error> {
    let pruned = repositories::progress::prune_stale_module_progress(pool, module_id).await?;
    if pruned > 0 {
        tracing::debug!(module_id, pruned, "Pruned stale module progress rows");
    }

    let lesson_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lessons WHERE module_id = $1")
            .bind(module_id)
            .fetch_one(pool)
            .await?;
    if lesson_count == 0 {
        return Ok(());
    }

    let now = primitive_now_utc();
    let students = repositories::progress::newly_completed_students(pool, module_id).await?;
    for student_id in students {
        repositories::progress::upsert_module_progress(
            pool,
            &Uuid::new_v4().to_string(),
            &student_id,
            module_id,
            now,
        )
        .await?;
    }

    Ok(())
}
