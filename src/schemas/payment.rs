use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Transaction;

#[derive(Debug, Deserialize)]
pub(crate) struct PurchaseRequest {
    #[serde(alias = "courseId")]
    pub(crate) course_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransactionResponse {
    pub(crate) id: String,
    pub(crate) course_id: String,
    pub(crate) user_id: String,
    pub(crate) amount: f64,
    pub(crate) description: String,
    pub(crate) created_at: String,
}

impl TransactionResponse {
    pub(crate) fn from_db(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            course_id: transaction.course_id,
            user_id: transaction.user_id,
            amount: transaction.amount,
            description: transaction.description,
            created_at: format_primitive(transaction.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct PurchaseResponse {
    pub(crate) transaction: TransactionResponse,
    pub(crate) enrollment_id: String,
}
