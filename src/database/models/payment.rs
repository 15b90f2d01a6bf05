use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PackagePayment {
    pub id: Uuid,
    pub title: String,
    pub duration_months: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistory {
    pub id: Uuid,
    pub package_payment_id: Uuid,
    pub submitter_id: Uuid,
    pub amount: Decimal,
    pub transaction_id: String,
    pub payment_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
}

/// Payment joined with package title and submitter name for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistoryView {
    pub id: Uuid,
    pub package_payment_id: Uuid,
    pub package_title: String,
    pub submitter_id: Uuid,
    pub submitter_name: String,
    pub amount: Decimal,
    pub transaction_id: String,
    pub payment_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
}
