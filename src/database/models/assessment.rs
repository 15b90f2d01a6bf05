use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::StudentProfileStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentQuestion {
    pub id: Uuid,
    pub question: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentOption {
    pub id: Uuid,
    pub question_id: Uuid,
    pub option_text: String,
    pub point: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionWithOptions {
    #[serde(flatten)]
    pub question: AssessmentQuestion,
    pub options: Vec<AssessmentOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOption {
    pub option_text: String,
    pub point: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub parent_id: Uuid,
    pub child_name: String,
    pub birth_date: NaiveDate,
    pub status: StudentProfileStatus,
    pub total_point: f64,
    pub created_at: DateTime<Utc>,
}

/// One chosen option of a student's initial assessment
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub id: Uuid,
    pub student_profile_id: Uuid,
    pub question_id: Uuid,
    pub question: String,
    pub option_id: Uuid,
    pub option_text: String,
    pub point: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfileDetail {
    #[serde(flatten)]
    pub profile: StudentProfile,
    pub assessment_results: Vec<AssessmentResult>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: Uuid,
    pub option_id: Uuid,
}
