use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::review::{Review, ReviewStats, ReviewView};
use crate::middleware::response::PageRequest;

const REVIEW_COLUMNS: &str = "id, tutor_id, parent_id, rate_score, description, is_hidden, created_at, updated_at";

pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        tutor_id: Uuid,
        parent_id: Uuid,
        rate_score: f64,
        description: &str,
    ) -> Result<Review, DatabaseError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews (id, tutor_id, parent_id, rate_score, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(tutor_id)
        .bind(parent_id)
        .bind(rate_score)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::on_unique_violation(e, "You have already reviewed this tutor"))?;
        Ok(review)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Review>, DatabaseError> {
        let review = sqlx::query_as::<_, Review>(&format!("SELECT {} FROM reviews WHERE id = $1", REVIEW_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    pub async fn update(&self, id: Uuid, rate_score: f64, description: &str) -> Result<Review, DatabaseError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET rate_score = $2, description = $3, updated_at = now()
             WHERE id = $1 RETURNING {}",
            REVIEW_COLUMNS
        ))
        .bind(id)
        .bind(rate_score)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;
        review.ok_or_else(|| DatabaseError::NotFound("Review not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Review not found".to_string()));
        }
        Ok(())
    }

    pub async fn list_visible_for_tutor(
        &self,
        tutor_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<ReviewView>, i64), DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reviews WHERE tutor_id = $1 AND NOT is_hidden")
            .bind(tutor_id)
            .fetch_one(&self.pool)
            .await?;

        let reviews = sqlx::query_as::<_, ReviewView>(
            "SELECT r.id, r.tutor_id, r.parent_id, u.full_name AS parent_name, u.image_url AS parent_image_url,
                    r.rate_score, r.description, r.created_at
             FROM reviews r JOIN users u ON u.id = r.parent_id
             WHERE r.tutor_id = $1 AND NOT r.is_hidden
             ORDER BY r.created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(tutor_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((reviews, total))
    }

    pub async fn stats_for_tutor(&self, tutor_id: Uuid) -> Result<ReviewStats, DatabaseError> {
        let stats = sqlx::query_as::<_, ReviewStats>(
            "SELECT COALESCE(AVG(rate_score), 0)::float8 AS average, COUNT(*) AS total
             FROM reviews WHERE tutor_id = $1 AND NOT is_hidden",
        )
        .bind(tutor_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}
