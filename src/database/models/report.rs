use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::{ReportType, RequestStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub report_type: ReportType,
    pub status: RequestStatus,
    pub description: String,
    pub reporter_id: Option<Uuid>,
    pub reporter_email: String,
    pub tutor_id: Option<Uuid>,
    pub review_id: Option<Uuid>,
    pub handled_by: Option<Uuid>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReport {
    pub report_type: ReportType,
    pub description: String,
    pub reporter_id: Option<Uuid>,
    pub reporter_email: String,
    pub tutor_id: Option<Uuid>,
    pub review_id: Option<Uuid>,
}

/// What approving a report changes besides its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalEffect {
    None,
    UnlockUser(String),
    HideReview(Uuid),
}
