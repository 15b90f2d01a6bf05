use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::AttendanceStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: Uuid,
    pub tutor_id: Uuid,
    pub student_profile_id: Uuid,
    pub schedule_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub attendance: AttendanceStatus,
    pub created_at: DateTime<Utc>,
}

impl Schedule {
    /// Half-open intervals: a slot ending at 10:00 does not clash with one starting at 10:00
    pub fn overlaps(&self, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> bool {
        self.schedule_date == date && self.start_time < end && start < self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(start: (u32, u32), end: (u32, u32)) -> Schedule {
        Schedule {
            id: Uuid::new_v4(),
            tutor_id: Uuid::new_v4(),
            student_profile_id: Uuid::new_v4(),
            schedule_date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            attendance: AttendanceStatus::NotYet,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn overlap_is_half_open() {
        let existing = slot((9, 0), (10, 0));
        let day = existing.schedule_date;
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

        assert!(existing.overlaps(day, t(9, 30), t(10, 30)));
        assert!(existing.overlaps(day, t(8, 0), t(11, 0)));
        assert!(!existing.overlaps(day, t(10, 0), t(11, 0)));
        assert!(!existing.overlaps(day, t(8, 0), t(9, 0)));
        assert!(!existing.overlaps(day.succ_opt().unwrap(), t(9, 30), t(10, 30)));
    }
}
