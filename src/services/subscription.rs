use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;

use crate::database::models::payment::PackagePayment;
use crate::error::ApiError;

/// New subscriptions stack on top of an unexpired one
pub fn next_expiration(
    now: DateTime<Utc>,
    latest: Option<DateTime<Utc>>,
    duration_months: i32,
) -> Option<DateTime<Utc>> {
    let months = u32::try_from(duration_months).ok().filter(|m| *m > 0)?;
    let start = latest.filter(|l| *l > now).unwrap_or(now);
    start.checked_add_months(Months::new(months))
}

/// A purchase must target an active package and pay its exact price
pub fn check_purchase(package: &PackagePayment, amount: Decimal, transaction_id: &str) -> Result<(), ApiError> {
    if !package.is_active {
        return Err(ApiError::bad_request("Package is no longer offered"));
    }
    if transaction_id.trim().is_empty() {
        return Err(ApiError::invalid_field("transactionId", "is required"));
    }
    if amount != package.price {
        return Err(ApiError::invalid_field("amount", format!("must equal the package price {}", package.price)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn package(price: i64, active: bool) -> PackagePayment {
        PackagePayment {
            id: Uuid::new_v4(),
            title: "Quarter".into(),
            duration_months: 3,
            price: Decimal::new(price, 0),
            description: None,
            is_active: active,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn first_purchase_starts_now() {
        assert_eq!(next_expiration(at(2024, 1, 10), None, 3), Some(at(2024, 4, 10)));
    }

    #[test]
    fn active_subscription_is_extended() {
        let now = at(2024, 1, 10);
        let latest = at(2024, 3, 1);
        assert_eq!(next_expiration(now, Some(latest), 1), Some(at(2024, 4, 1)));
    }

    #[test]
    fn lapsed_subscription_restarts_from_now() {
        let now = at(2024, 6, 1);
        assert_eq!(next_expiration(now, Some(at(2024, 2, 1)), 1), Some(at(2024, 7, 1)));
    }

    #[test]
    fn month_end_is_clamped() {
        assert_eq!(next_expiration(at(2024, 1, 31), None, 1), Some(at(2024, 2, 29)));
    }

    #[test]
    fn non_positive_durations_are_refused() {
        assert_eq!(next_expiration(Utc::now(), None, 0), None);
        assert_eq!(next_expiration(Utc::now(), None, -2), None);
    }

    #[test]
    fn purchase_amount_must_match_price() {
        let pkg = package(300, true);
        assert!(check_purchase(&pkg, Decimal::new(300, 0), "tx-1").is_ok());
        assert_eq!(check_purchase(&pkg, Decimal::new(299, 0), "tx-1").unwrap_err().status_code(), 400);
        assert!(check_purchase(&pkg, Decimal::new(300, 0), " ").is_err());
        assert!(check_purchase(&package(300, false), Decimal::new(300, 0), "tx-1").is_err());
    }
}
