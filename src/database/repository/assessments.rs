use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::assessment::{AssessmentOption, AssessmentQuestion, NewOption, QuestionWithOptions};

pub struct AssessmentRepository {
    pool: PgPool,
}

impl AssessmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Question and its options are written in one transaction
    pub async fn insert_question(
        &self,
        question: &str,
        options: &[NewOption],
        created_by: Uuid,
    ) -> Result<QuestionWithOptions, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let question = sqlx::query_as::<_, AssessmentQuestion>(
            "INSERT INTO assessment_questions (id, question, created_by) VALUES ($1, $2, $3)
             RETURNING id, question, created_by, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(question)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut inserted = Vec::with_capacity(options.len());
        for option in options {
            let row = sqlx::query_as::<_, AssessmentOption>(
                "INSERT INTO assessment_options (id, question_id, option_text, point) VALUES ($1, $2, $3, $4)
                 RETURNING id, question_id, option_text, point",
            )
            .bind(Uuid::new_v4())
            .bind(question.id)
            .bind(&option.option_text)
            .bind(option.point)
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(QuestionWithOptions { question, options: inserted })
    }

    pub async fn list_questions(&self) -> Result<Vec<QuestionWithOptions>, DatabaseError> {
        let questions = sqlx::query_as::<_, AssessmentQuestion>(
            "SELECT id, question, created_by, created_at FROM assessment_questions ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        let options = sqlx::query_as::<_, AssessmentOption>(
            "SELECT id, question_id, option_text, point FROM assessment_options ORDER BY point",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_question: HashMap<Uuid, Vec<AssessmentOption>> = HashMap::new();
        for option in options {
            by_question.entry(option.question_id).or_default().push(option);
        }

        Ok(questions
            .into_iter()
            .map(|question| {
                let options = by_question.remove(&question.id).unwrap_or_default();
                QuestionWithOptions { question, options }
            })
            .collect())
    }

    pub async fn delete_question(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM assessment_questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Assessment question not found".to_string()));
        }
        Ok(())
    }

    pub async fn options_by_ids(&self, ids: &[Uuid]) -> Result<Vec<AssessmentOption>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let options = sqlx::query_as::<_, AssessmentOption>(
            "SELECT id, question_id, option_text, point FROM assessment_options WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }

    pub async fn question_exists(&self, question: &str) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM assessment_questions WHERE lower(question) = lower($1))",
        )
        .bind(question.trim())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
