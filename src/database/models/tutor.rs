use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::RequestStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tutor {
    pub user_id: Uuid,
    pub about_me: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub start_age: i32,
    pub end_age: i32,
    pub price_from: Decimal,
    pub price_end: Decimal,
    pub session_hours: f32,
    pub request_status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tutor row joined with the owning user and review aggregates
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TutorSummary {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub about_me: Option<String>,
    pub start_age: i32,
    pub end_age: i32,
    pub price_from: Decimal,
    pub price_end: Decimal,
    pub session_hours: f32,
    pub request_status: RequestStatus,
    pub review_score: f64,
    pub total_review: i64,
}

/// Tutor-specific fields submitted at registration or profile update
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorProfileInput {
    pub about_me: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub start_age: i32,
    pub end_age: i32,
    pub price_from: Decimal,
    pub price_end: Decimal,
    pub session_hours: f32,
}

impl TutorProfileInput {
    /// Returns the offending field and reason
    pub fn validate(&self) -> Result<(), (&'static str, &'static str)> {
        if self.start_age < 0 || self.end_age > 18 {
            return Err(("startAge", "teaching ages must be within 0..=18"));
        }
        if self.start_age > self.end_age {
            return Err(("endAge", "must not be below startAge"));
        }
        if self.price_from < Decimal::ZERO || self.price_from > self.price_end {
            return Err(("priceFrom", "must be non-negative and not above priceEnd"));
        }
        if !(self.session_hours > 0.0 && self.session_hours <= 8.0) {
            return Err(("sessionHours", "must be within (0, 8]"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> TutorProfileInput {
        TutorProfileInput {
            about_me: None,
            date_of_birth: None,
            start_age: 3,
            end_age: 10,
            price_from: Decimal::new(100_000, 0),
            price_end: Decimal::new(200_000, 0),
            session_hours: 1.5,
        }
    }

    #[test]
    fn accepts_sane_profile() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_ranges() {
        let mut bad = input();
        bad.start_age = 12;
        assert_eq!(bad.validate().unwrap_err().0, "endAge");

        let mut bad = input();
        bad.price_from = Decimal::new(300_000, 0);
        assert_eq!(bad.validate().unwrap_err().0, "priceFrom");

        let mut bad = input();
        bad.session_hours = 0.0;
        assert_eq!(bad.validate().unwrap_err().0, "sessionHours");
    }
}
