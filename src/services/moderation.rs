use uuid::Uuid;

pub use crate::database::models::report::ApprovalEffect;
use crate::database::models::report::Report;
use crate::database::repository::ReportRepository;
use crate::error::ApiError;
use crate::services::{email, notifier};
use crate::state::AppState;
use crate::types::{ReportType, RequestStatus};

/// Side effect written together with the decision; rejections change nothing else
pub fn approval_effect(report: &Report, decision: RequestStatus) -> ApprovalEffect {
    if decision != RequestStatus::Approve {
        return ApprovalEffect::None;
    }
    match (report.report_type, report.review_id) {
        (ReportType::UnlockAccount, _) => ApprovalEffect::UnlockUser(report.reporter_email.clone()),
        (ReportType::ReviewComplaint, Some(review_id)) => ApprovalEffect::HideReview(review_id),
        _ => ApprovalEffect::None,
    }
}

/// Decide a pending report and apply its side effects
pub async fn decide_report(
    state: &AppState,
    report_id: Uuid,
    decision: RequestStatus,
    moderator_id: Uuid,
    comment: Option<&str>,
) -> Result<Report, ApiError> {
    if decision == RequestStatus::Pending {
        return Err(ApiError::invalid_field("status", "must be Approve or Reject"));
    }

    let reports = ReportRepository::new(state.pool.clone());
    let report = reports
        .find(report_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Report not found"))?;

    report
        .status
        .decide(decision)
        .map_err(|current| ApiError::conflict(format!("Report has already been handled ({})", current)))?;

    let effect = approval_effect(&report, decision);
    let decided = reports
        .decide(report_id, decision, moderator_id, comment, &effect)
        .await?
        .ok_or_else(|| ApiError::conflict("Report has already been handled"))?;
    match &effect {
        ApprovalEffect::UnlockUser(email) => tracing::info!("Unlocked {} after appeal {}", email, decided.id),
        ApprovalEffect::HideReview(review_id) => {
            tracing::info!("Hid review {} after complaint {}", review_id, decided.id)
        }
        ApprovalEffect::None => {}
    }

    if decided.report_type == ReportType::UnlockAccount {
        email::deliver(
            state.mailer.as_ref(),
            email::unlock_appeal_decided(&decided.reporter_email, decision, comment),
        )
        .await;
    } else if let Some(reporter_id) = decided.reporter_id {
        let verdict = if decision == RequestStatus::Approve { "approved" } else { "rejected" };
        notifier::notify_quietly(
            state,
            reporter_id,
            &format!("Your report has been {}", verdict),
            Some(&format!("/reports/{}", decided.id)),
        )
        .await;
    }

    Ok(decided)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report(report_type: ReportType, review_id: Option<Uuid>) -> Report {
        Report {
            id: Uuid::new_v4(),
            report_type,
            status: RequestStatus::Pending,
            description: "details".into(),
            reporter_id: Some(Uuid::new_v4()),
            reporter_email: "locked@example.com".into(),
            tutor_id: None,
            review_id,
            handled_by: None,
            comment: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unlock_appeals_unlock_the_reporter_email() {
        assert_eq!(
            approval_effect(&report(ReportType::UnlockAccount, None), RequestStatus::Approve),
            ApprovalEffect::UnlockUser("locked@example.com".into())
        );
    }

    #[test]
    fn review_complaints_hide_the_review() {
        let review_id = Uuid::new_v4();
        assert_eq!(
            approval_effect(&report(ReportType::ReviewComplaint, Some(review_id)), RequestStatus::Approve),
            ApprovalEffect::HideReview(review_id)
        );
    }

    #[test]
    fn tutor_complaints_have_no_side_effect() {
        assert_eq!(
            approval_effect(&report(ReportType::TutorComplaint, None), RequestStatus::Approve),
            ApprovalEffect::None
        );
    }

    #[test]
    fn rejections_have_no_side_effect() {
        let review_id = Uuid::new_v4();
        assert_eq!(
            approval_effect(&report(ReportType::ReviewComplaint, Some(review_id)), RequestStatus::Reject),
            ApprovalEffect::None
        );
        assert_eq!(
            approval_effect(&report(ReportType::UnlockAccount, None), RequestStatus::Reject),
            ApprovalEffect::None
        );
    }

    #[test]
    fn only_pending_reports_can_be_decided() {
        assert_eq!(RequestStatus::Pending.decide(RequestStatus::Approve), Ok(RequestStatus::Approve));
        assert_eq!(RequestStatus::Approve.decide(RequestStatus::Reject), Err(RequestStatus::Approve));
        assert_eq!(RequestStatus::Reject.decide(RequestStatus::Approve), Err(RequestStatus::Reject));
    }
}
