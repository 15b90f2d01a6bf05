use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::tutor::{Tutor, TutorProfileInput, TutorSummary};
use crate::middleware::response::PageRequest;
use crate::types::RequestStatus;

const TUTOR_COLUMNS: &str = "user_id, about_me, date_of_birth, start_age, end_age, price_from, price_end, \
     session_hours, request_status, created_at, updated_at";

const SUMMARY_SELECT: &str = "SELECT t.user_id, u.full_name, u.email, u.address, u.image_url, t.about_me,
        t.start_age, t.end_age, t.price_from, t.price_end, t.session_hours, t.request_status,
        COALESCE(AVG(r.rate_score), 0)::float8 AS review_score,
        COUNT(r.id) AS total_review
     FROM tutors t
     JOIN users u ON u.id = t.user_id
     LEFT JOIN reviews r ON r.tutor_id = t.user_id AND NOT r.is_hidden";

/// Search criteria applied in SQL; score bucketing happens afterwards
#[derive(Debug, Clone, Default)]
pub struct TutorFilter {
    pub search: Option<String>,
    pub age_from: Option<i32>,
    pub age_to: Option<i32>,
}

/// Insert a pending tutor row on an open connection, so registration can
/// create the user and the tutor in one transaction
pub(super) async fn insert_pending(
    conn: &mut PgConnection,
    user_id: Uuid,
    input: &TutorProfileInput,
) -> Result<Tutor, DatabaseError> {
    let tutor = sqlx::query_as::<_, Tutor>(&format!(
        "INSERT INTO tutors (user_id, about_me, date_of_birth, start_age, end_age, price_from, price_end,
                             session_hours, request_status)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         RETURNING {}",
        TUTOR_COLUMNS
    ))
    .bind(user_id)
    .bind(&input.about_me)
    .bind(input.date_of_birth)
    .bind(input.start_age)
    .bind(input.end_age)
    .bind(input.price_from)
    .bind(input.price_end)
    .bind(input.session_hours)
    .bind(RequestStatus::Pending)
    .fetch_one(conn)
    .await
    .map_err(|e| DatabaseError::on_unique_violation(e, "Tutor profile already exists"))?;
    Ok(tutor)
}

/// `%term%` with LIKE wildcards in the term matched literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub struct TutorRepository {
    pool: PgPool,
}

impl TutorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: Uuid) -> Result<Option<Tutor>, DatabaseError> {
        let tutor = sqlx::query_as::<_, Tutor>(&format!("SELECT {} FROM tutors WHERE user_id = $1", TUTOR_COLUMNS))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tutor)
    }

    pub async fn update_profile(&self, user_id: Uuid, input: &TutorProfileInput) -> Result<Tutor, DatabaseError> {
        let tutor = sqlx::query_as::<_, Tutor>(&format!(
            "UPDATE tutors SET about_me = $2, date_of_birth = $3, start_age = $4, end_age = $5,
                price_from = $6, price_end = $7, session_hours = $8, updated_at = now()
             WHERE user_id = $1
             RETURNING {}",
            TUTOR_COLUMNS
        ))
        .bind(user_id)
        .bind(&input.about_me)
        .bind(input.date_of_birth)
        .bind(input.start_age)
        .bind(input.end_age)
        .bind(input.price_from)
        .bind(input.price_end)
        .bind(input.session_hours)
        .fetch_optional(&self.pool)
        .await?;
        tutor.ok_or_else(|| DatabaseError::NotFound("Tutor not found".to_string()))
    }

    /// Apply a registration decision; only pending requests change
    pub async fn decide_request(&self, user_id: Uuid, status: RequestStatus) -> Result<Option<Tutor>, DatabaseError> {
        let tutor = sqlx::query_as::<_, Tutor>(&format!(
            "UPDATE tutors SET request_status = $2, updated_at = now()
             WHERE user_id = $1 AND request_status = $3
             RETURNING {}",
            TUTOR_COLUMNS
        ))
        .bind(user_id)
        .bind(status)
        .bind(RequestStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tutor)
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<Option<TutorSummary>, DatabaseError> {
        let summary = sqlx::query_as::<_, TutorSummary>(&format!(
            "{} WHERE t.user_id = $1 GROUP BY t.user_id, u.id",
            SUMMARY_SELECT
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(summary)
    }

    /// All approved, unlocked tutors matching the filter, unpaged
    pub async fn search_approved(&self, filter: &TutorFilter) -> Result<Vec<TutorSummary>, DatabaseError> {
        let pattern = filter.search.as_deref().map(contains_pattern);

        let rows = sqlx::query_as::<_, TutorSummary>(&format!(
            "{}
             WHERE t.request_status = $1
             AND NOT u.is_locked_out
             AND ($2::text IS NULL OR u.full_name ILIKE $2 ESCAPE '\\' OR u.address ILIKE $2 ESCAPE '\\')
             AND ($3::int IS NULL OR t.end_age >= $3)
             AND ($4::int IS NULL OR t.start_age <= $4)
             GROUP BY t.user_id, u.id",
            SUMMARY_SELECT
        ))
        .bind(RequestStatus::Approve)
        .bind(&pattern)
        .bind(filter.age_from)
        .bind(filter.age_to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Registration requests for staff review
    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
        page: PageRequest,
    ) -> Result<(Vec<TutorSummary>, i64), DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tutors WHERE ($1::text IS NULL OR request_status = $1)")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, TutorSummary>(&format!(
            "{}
             WHERE ($1::text IS NULL OR t.request_status = $1)
             GROUP BY t.user_id, u.id
             ORDER BY t.created_at DESC
             LIMIT $2 OFFSET $3",
            SUMMARY_SELECT
        ))
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn count_by_status(&self) -> Result<Vec<(RequestStatus, i64)>, DatabaseError> {
        let rows: Vec<(RequestStatus, i64)> =
            sqlx::query_as("SELECT request_status, COUNT(*) FROM tutors GROUP BY request_status")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_term_wildcards_are_literal() {
        assert_eq!(contains_pattern(" Anna "), "%Anna%");
        assert_eq!(contains_pattern("100%_off"), "%100\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
