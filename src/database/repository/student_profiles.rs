use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::assessment::{AnswerInput, AssessmentResult, StudentProfile};
use crate::types::StudentProfileStatus;

const PROFILE_COLUMNS: &str = "id, tutor_id, parent_id, child_name, birth_date, status, total_point, created_at";

#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileFilter {
    pub tutor_id: Option<Uuid>,
    pub parent_id: Option<Uuid>,
    pub status: Option<StudentProfileStatus>,
}

pub struct StudentProfileRepository {
    pool: PgPool,
}

impl StudentProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Profile and its assessment answers are written in one transaction
    pub async fn insert(
        &self,
        tutor_id: Uuid,
        parent_id: Uuid,
        child_name: &str,
        birth_date: NaiveDate,
        total_point: f64,
        answers: &[AnswerInput],
    ) -> Result<StudentProfile, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let profile = sqlx::query_as::<_, StudentProfile>(&format!(
            "INSERT INTO student_profiles (id, tutor_id, parent_id, child_name, birth_date, status, total_point)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(tutor_id)
        .bind(parent_id)
        .bind(child_name)
        .bind(birth_date)
        .bind(StudentProfileStatus::Pending)
        .bind(total_point)
        .fetch_one(&mut *tx)
        .await?;

        for answer in answers {
            sqlx::query(
                "INSERT INTO assessment_results (id, student_profile_id, question_id, option_id)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(profile.id)
            .bind(answer.question_id)
            .bind(answer.option_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(profile)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<StudentProfile>, DatabaseError> {
        let profile = sqlx::query_as::<_, StudentProfile>(&format!(
            "SELECT {} FROM student_profiles WHERE id = $1",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn results(&self, profile_id: Uuid) -> Result<Vec<AssessmentResult>, DatabaseError> {
        let rows = sqlx::query_as::<_, AssessmentResult>(
            "SELECT r.id, r.student_profile_id, r.question_id, q.question, r.option_id, o.option_text, o.point
             FROM assessment_results r
             JOIN assessment_questions q ON q.id = r.question_id
             JOIN assessment_options o ON o.id = r.option_id
             WHERE r.student_profile_id = $1
             ORDER BY q.created_at",
        )
        .bind(profile_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Compare-and-set on status so concurrent transitions cannot both apply
    pub async fn transition(
        &self,
        id: Uuid,
        from: StudentProfileStatus,
        to: StudentProfileStatus,
    ) -> Result<Option<StudentProfile>, DatabaseError> {
        let profile = sqlx::query_as::<_, StudentProfile>(&format!(
            "UPDATE student_profiles SET status = $3 WHERE id = $1 AND status = $2 RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn list(&self, filter: ProfileFilter) -> Result<Vec<StudentProfile>, DatabaseError> {
        let profiles = sqlx::query_as::<_, StudentProfile>(&format!(
            "SELECT {} FROM student_profiles
             WHERE ($1::uuid IS NULL OR tutor_id = $1)
             AND ($2::uuid IS NULL OR parent_id = $2)
             AND ($3::text IS NULL OR status = $3)
             ORDER BY created_at DESC",
            PROFILE_COLUMNS
        ))
        .bind(filter.tutor_id)
        .bind(filter.parent_id)
        .bind(filter.status)
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    /// Whether the parent has (or had) a child taught by the tutor
    pub async fn has_taught(&self, parent_id: Uuid, tutor_id: Uuid) -> Result<bool, DatabaseError> {
        let statuses = [StudentProfileStatus::Teaching.as_str(), StudentProfileStatus::Stop.as_str()];
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM student_profiles
             WHERE parent_id = $1 AND tutor_id = $2 AND status = ANY($3))",
        )
        .bind(parent_id)
        .bind(tutor_id)
        .bind(&statuses[..])
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
