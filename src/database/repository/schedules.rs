use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::schedule::Schedule;
use crate::types::AttendanceStatus;

const SCHEDULE_COLUMNS: &str =
    "id, tutor_id, student_profile_id, schedule_date, start_time, end_time, attendance, created_at";

pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn for_tutor_on(&self, tutor_id: Uuid, date: NaiveDate) -> Result<Vec<Schedule>, DatabaseError> {
        let rows = sqlx::query_as::<_, Schedule>(&format!(
            "SELECT {} FROM schedules WHERE tutor_id = $1 AND schedule_date = $2 ORDER BY start_time",
            SCHEDULE_COLUMNS
        ))
        .bind(tutor_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn insert(
        &self,
        tutor_id: Uuid,
        student_profile_id: Uuid,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Result<Schedule, DatabaseError> {
        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            "INSERT INTO schedules (id, tutor_id, student_profile_id, schedule_date, start_time, end_time, attendance)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {}",
            SCHEDULE_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(tutor_id)
        .bind(student_profile_id)
        .bind(date)
        .bind(start)
        .bind(end)
        .bind(AttendanceStatus::NotYet)
        .fetch_one(&self.pool)
        .await?;
        Ok(schedule)
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<Schedule>, DatabaseError> {
        let schedule = sqlx::query_as::<_, Schedule>(&format!("SELECT {} FROM schedules WHERE id = $1", SCHEDULE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(schedule)
    }

    pub async fn set_attendance(&self, id: Uuid, attendance: AttendanceStatus) -> Result<Schedule, DatabaseError> {
        let schedule = sqlx::query_as::<_, Schedule>(&format!(
            "UPDATE schedules SET attendance = $2 WHERE id = $1 RETURNING {}",
            SCHEDULE_COLUMNS
        ))
        .bind(id)
        .bind(attendance)
        .fetch_optional(&self.pool)
        .await?;
        schedule.ok_or_else(|| DatabaseError::NotFound("Schedule not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM schedules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Slots in `[from, to]` for a tutor, or for all children of a parent
    pub async fn list_between(
        &self,
        tutor_id: Option<Uuid>,
        parent_id: Option<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Schedule>, DatabaseError> {
        let rows = sqlx::query_as::<_, Schedule>(
            "SELECT s.id, s.tutor_id, s.student_profile_id, s.schedule_date, s.start_time, s.end_time,
                    s.attendance, s.created_at
             FROM schedules s
             JOIN student_profiles p ON p.id = s.student_profile_id
             WHERE ($1::uuid IS NULL OR s.tutor_id = $1)
             AND ($2::uuid IS NULL OR p.parent_id = $2)
             AND s.schedule_date BETWEEN $3 AND $4
             ORDER BY s.schedule_date, s.start_time",
        )
        .bind(tutor_id)
        .bind(parent_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
