use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::payment::{PackagePayment, PaymentHistory, PaymentHistoryView};
use crate::middleware::response::PageRequest;

const PACKAGE_COLUMNS: &str = "id, title, duration_months, price, description, is_active, created_by, created_at";
const HISTORY_COLUMNS: &str = "id, package_payment_id, submitter_id, amount, transaction_id, payment_date, expiration_date";

/// Revenue of one payment row, used for month grouping in memory
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentAmount {
    pub payment_date: DateTime<Utc>,
    pub amount: Decimal,
}

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PackageUsage {
    pub package_payment_id: Uuid,
    pub title: String,
    pub purchases: i64,
    pub revenue: Decimal,
}

pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_package(
        &self,
        title: &str,
        duration_months: i32,
        price: Decimal,
        description: Option<&str>,
        created_by: Uuid,
    ) -> Result<PackagePayment, DatabaseError> {
        let package = sqlx::query_as::<_, PackagePayment>(&format!(
            "INSERT INTO package_payments (id, title, duration_months, price, description, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            PACKAGE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(title)
        .bind(duration_months)
        .bind(price)
        .bind(description)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(package)
    }

    pub async fn find_package(&self, id: Uuid) -> Result<Option<PackagePayment>, DatabaseError> {
        let package = sqlx::query_as::<_, PackagePayment>(&format!(
            "SELECT {} FROM package_payments WHERE id = $1",
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(package)
    }

    pub async fn list_packages(&self, include_inactive: bool) -> Result<Vec<PackagePayment>, DatabaseError> {
        let packages = sqlx::query_as::<_, PackagePayment>(&format!(
            "SELECT {} FROM package_payments WHERE is_active OR $1 ORDER BY duration_months, price",
            PACKAGE_COLUMNS
        ))
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;
        Ok(packages)
    }

    pub async fn set_package_active(&self, id: Uuid, active: bool) -> Result<PackagePayment, DatabaseError> {
        let package = sqlx::query_as::<_, PackagePayment>(&format!(
            "UPDATE package_payments SET is_active = $2 WHERE id = $1 RETURNING {}",
            PACKAGE_COLUMNS
        ))
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;
        package.ok_or_else(|| DatabaseError::NotFound("Package not found".to_string()))
    }

    /// Record a purchase on top of the submitter's latest expiry.
    ///
    /// The submitter's user row is locked for the whole transaction so two
    /// concurrent purchases stack instead of both starting from the same
    /// expiry. `expiration_for` receives the current latest expiry; `None`
    /// from it aborts without writing and is returned as `Ok(None)`.
    pub async fn record_purchase<F>(
        &self,
        package_payment_id: Uuid,
        submitter_id: Uuid,
        amount: Decimal,
        transaction_id: &str,
        payment_date: DateTime<Utc>,
        expiration_for: F,
    ) -> Result<Option<PaymentHistory>, DatabaseError>
    where
        F: FnOnce(Option<DateTime<Utc>>) -> Option<DateTime<Utc>>,
    {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(submitter_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User not found".to_string()))?;

        let latest: Option<DateTime<Utc>> =
            sqlx::query_scalar("SELECT MAX(expiration_date) FROM payment_histories WHERE submitter_id = $1")
                .bind(submitter_id)
                .fetch_one(&mut *tx)
                .await?;

        let Some(expiration_date) = expiration_for(latest) else {
            return Ok(None);
        };

        let history = sqlx::query_as::<_, PaymentHistory>(&format!(
            "INSERT INTO payment_histories (id, package_payment_id, submitter_id, amount, transaction_id,
                                            payment_date, expiration_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            HISTORY_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(package_payment_id)
        .bind(submitter_id)
        .bind(amount)
        .bind(transaction_id)
        .bind(payment_date)
        .bind(expiration_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DatabaseError::on_unique_violation(e, "Transaction has already been recorded"))?;

        tx.commit().await?;
        Ok(Some(history))
    }

    /// Payment listing; `submitter_id = None` lists everyone's payments
    pub async fn list_history(
        &self,
        submitter_id: Option<Uuid>,
        page: PageRequest,
    ) -> Result<(Vec<PaymentHistoryView>, i64), DatabaseError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM payment_histories WHERE ($1::uuid IS NULL OR submitter_id = $1)")
                .bind(submitter_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, PaymentHistoryView>(
            "SELECT h.id, h.package_payment_id, p.title AS package_title, h.submitter_id,
                    u.full_name AS submitter_name, h.amount, h.transaction_id, h.payment_date, h.expiration_date
             FROM payment_histories h
             JOIN package_payments p ON p.id = h.package_payment_id
             JOIN users u ON u.id = h.submitter_id
             WHERE ($1::uuid IS NULL OR h.submitter_id = $1)
             ORDER BY h.payment_date DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(submitter_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn amounts_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PaymentAmount>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentAmount>(
            "SELECT payment_date, amount FROM payment_histories WHERE payment_date >= $1 AND payment_date < $2",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn package_usage(&self) -> Result<Vec<PackageUsage>, DatabaseError> {
        let rows = sqlx::query_as::<_, PackageUsage>(
            "SELECT p.id AS package_payment_id, p.title, COUNT(h.id) AS purchases,
                    COALESCE(SUM(h.amount), 0) AS revenue
             FROM package_payments p
             LEFT JOIN payment_histories h ON h.package_payment_id = p.id
             GROUP BY p.id
             ORDER BY purchases DESC, p.title",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
