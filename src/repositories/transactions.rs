use sqlx::PgPool;

use crate::db::models::Transaction;

const TRANSACTION_COLUMNS: &str = "id, course_id, user_id, amount, description, created_at";

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    course_id: &str,
    user_id: &str,
    amount: f64,
    description: &str,
    created_at: time::PrimitiveDateTime,
) -> Result<Transaction, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(&format!(
        "INSERT INTO transactions (id, course_id, user_id, amount, description, created_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {TRANSACTION_COLUMNS}",
    ))
    .bind(id)
    .bind(course_id)
    .bind(user_id)
    .bind(amount)
    .bind(description)
    .bind(created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}
