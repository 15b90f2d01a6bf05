use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::repository::payments::PaymentAmount;
use crate::types::{RequestStatus, Role};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub month: u32,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub total_parents: i64,
    pub total_tutors: i64,
    pub total_staff: i64,
    pub total_managers: i64,
    pub total_admins: i64,
    pub approved_tutors: i64,
    pub pending_tutor_requests: i64,
    pub pending_reports: i64,
}

impl DashboardOverview {
    pub fn from_counts(
        users_by_role: &[(Role, i64)],
        tutors_by_status: &[(RequestStatus, i64)],
        pending_reports: i64,
    ) -> Self {
        let mut overview = DashboardOverview {
            pending_reports,
            ..Default::default()
        };
        for (role, count) in users_by_role {
            match role {
                Role::Parent => overview.total_parents = *count,
                Role::Tutor => overview.total_tutors = *count,
                Role::Staff => overview.total_staff = *count,
                Role::Manager => overview.total_managers = *count,
                Role::Admin => overview.total_admins = *count,
            }
        }
        for (status, count) in tutors_by_status {
            match status {
                RequestStatus::Approve => overview.approved_tutors = *count,
                RequestStatus::Pending => overview.pending_tutor_requests = *count,
                RequestStatus::Reject => {}
            }
        }
        overview
    }
}

/// `[Jan 1 of year, Jan 1 of year + 1)` in UTC
pub fn year_bounds(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single()?;
    Some((start, end))
}

/// Twelve entries, one per month; months without payments are zero
pub fn revenue_by_month(year: i32, payments: &[PaymentAmount]) -> Vec<MonthlyRevenue> {
    let mut totals = [Decimal::ZERO; 12];
    for payment in payments.iter().filter(|p| p.payment_date.year() == year) {
        totals[payment.payment_date.month0() as usize] += payment.amount;
    }
    totals
        .iter()
        .enumerate()
        .map(|(i, revenue)| MonthlyRevenue {
            month: i as u32 + 1,
            revenue: *revenue,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paid(y: i32, m: u32, amount: i64) -> PaymentAmount {
        PaymentAmount {
            payment_date: Utc.with_ymd_and_hms(y, m, 15, 8, 0, 0).unwrap(),
            amount: Decimal::new(amount, 0),
        }
    }

    #[test]
    fn revenue_has_twelve_months_with_zero_gaps() {
        let payments = vec![paid(2024, 1, 100), paid(2024, 1, 50), paid(2024, 12, 20), paid(2023, 5, 999)];
        let months = revenue_by_month(2024, &payments);

        assert_eq!(months.len(), 12);
        assert_eq!(months[0], MonthlyRevenue { month: 1, revenue: Decimal::new(150, 0) });
        assert_eq!(months[4].revenue, Decimal::ZERO);
        assert_eq!(months[11].revenue, Decimal::new(20, 0));
    }

    #[test]
    fn year_bounds_cover_the_calendar_year() {
        let (start, end) = year_bounds(2024).unwrap();
        assert_eq!(start.year(), 2024);
        assert_eq!(end.year(), 2025);
        assert_eq!((end - start).num_days(), 366);
    }

    #[test]
    fn overview_maps_grouped_counts() {
        let overview = DashboardOverview::from_counts(
            &[(Role::Parent, 10), (Role::Tutor, 4), (Role::Admin, 1)],
            &[(RequestStatus::Approve, 3), (RequestStatus::Pending, 1)],
            2,
        );
        assert_eq!(overview.total_parents, 10);
        assert_eq!(overview.total_staff, 0);
        assert_eq!(overview.approved_tutors, 3);
        assert_eq!(overview.pending_tutor_requests, 1);
        assert_eq!(overview.pending_reports, 2);
    }
}
