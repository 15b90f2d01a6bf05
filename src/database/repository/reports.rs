use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::report::{ApprovalEffect, NewReport, Report};
use crate::middleware::response::PageRequest;
use crate::types::{ReportType, RequestStatus};

const REPORT_COLUMNS: &str = "id, report_type, status, description, reporter_id, reporter_email, tutor_id, \
     review_id, handled_by, comment, created_at, updated_at";

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFilter {
    pub report_type: Option<ReportType>,
    pub status: Option<RequestStatus>,
    pub reporter_id: Option<Uuid>,
}

pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, report: NewReport) -> Result<Report, DatabaseError> {
        let created = sqlx::query_as::<_, Report>(&format!(
            "INSERT INTO reports (id, report_type, status, description, reporter_id, reporter_email, tutor_id, review_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {}",
            REPORT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(report.report_type)
        .bind(RequestStatus::Pending)
        .bind(&report.description)
        .bind(report.reporter_id)
        .bind(&report.reporter_email)
        .bind(report.tutor_id)
        .bind(report.review_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Report>, DatabaseError> {
        let report = sqlx::query_as::<_, Report>(&format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(report)
    }

    /// Whether an unresolved appeal already exists for this email
    pub async fn has_pending_unlock(&self, email: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM reports
             WHERE report_type = $1 AND status = $2 AND lower(reporter_email) = lower($3))",
        )
        .bind(ReportType::UnlockAccount)
        .bind(RequestStatus::Pending)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Record a decision and apply its side effect in one transaction.
    /// Guarded on `status = Pending` so two moderators cannot both decide
    /// the same report; the loser gets `None` and nothing is written.
    pub async fn decide(
        &self,
        id: Uuid,
        status: RequestStatus,
        handled_by: Uuid,
        comment: Option<&str>,
        effect: &ApprovalEffect,
    ) -> Result<Option<Report>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let report = sqlx::query_as::<_, Report>(&format!(
            "UPDATE reports SET status = $2, handled_by = $3, comment = $4, updated_at = now()
             WHERE id = $1 AND status = $5
             RETURNING {}",
            REPORT_COLUMNS
        ))
        .bind(id)
        .bind(status)
        .bind(handled_by)
        .bind(comment)
        .bind(RequestStatus::Pending)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(report) = report else {
            return Ok(None);
        };

        match effect {
            ApprovalEffect::UnlockUser(email) => {
                sqlx::query("UPDATE users SET is_locked_out = FALSE, updated_at = now() WHERE lower(email) = lower($1)")
                    .bind(email.trim())
                    .execute(&mut *tx)
                    .await?;
            }
            ApprovalEffect::HideReview(review_id) => {
                sqlx::query("UPDATE reviews SET is_hidden = TRUE, updated_at = now() WHERE id = $1")
                    .bind(review_id)
                    .execute(&mut *tx)
                    .await?;
            }
            ApprovalEffect::None => {}
        }

        tx.commit().await?;
        Ok(Some(report))
    }

    pub async fn list(&self, filter: ReportFilter, page: PageRequest) -> Result<(Vec<Report>, i64), DatabaseError> {
        let where_clause = "WHERE ($1::text IS NULL OR report_type = $1)
             AND ($2::text IS NULL OR status = $2)
             AND ($3::uuid IS NULL OR reporter_id = $3)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM reports {}", where_clause))
            .bind(filter.report_type)
            .bind(filter.status)
            .bind(filter.reporter_id)
            .fetch_one(&self.pool)
            .await?;

        let reports = sqlx::query_as::<_, Report>(&format!(
            "SELECT {} FROM reports {} ORDER BY created_at DESC LIMIT $4 OFFSET $5",
            REPORT_COLUMNS, where_clause
        ))
        .bind(filter.report_type)
        .bind(filter.status)
        .bind(filter.reporter_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((reports, total))
    }

    pub async fn count_pending(&self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE status = $1")
            .bind(RequestStatus::Pending)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
