use async_trait::async_trait;

use crate::config;
use crate::types::RequestStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Email delivery failed: {0}")]
    Delivery(String),
}

/// Outbound mail seam. Handlers log and swallow delivery failures.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
}

/// Writes outgoing mail to the log instead of a mail server
#[derive(Debug, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let from = &config::config().email.sender_address;
        if crate::is_development!() {
            tracing::info!(
                "Email from {} to {}: {}\n{}",
                from,
                message.to,
                message.subject,
                message.body
            );
        } else {
            tracing::info!("Email from {} to {}: {}", from, message.to, message.subject);
        }
        Ok(())
    }
}

/// Send and log failures; email is never allowed to fail a request
pub async fn deliver(sender: &dyn EmailSender, message: EmailMessage) {
    let to = message.to.clone();
    if let Err(e) = sender.send(message).await {
        tracing::error!("Failed to send email to {}: {}", to, e);
    }
}

pub fn password_reset(to: &str, token: &str) -> EmailMessage {
    let email_config = &config::config().email;
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("token", token)
        .append_pair("email", to)
        .finish();
    let link = format!("{}/reset-password?{}", email_config.frontend_url.trim_end_matches('/'), query);
    EmailMessage {
        to: to.to_string(),
        subject: "Reset your AutismEdu password".to_string(),
        body: format!(
            "We received a request to reset your password.\n\nOpen the link below within {} minutes:\n{}\n\nIf you did not ask for this, ignore this email.",
            config::config().security.reset_token_minutes,
            link
        ),
    }
}

pub fn tutor_request_decided(to: &str, full_name: &str, status: RequestStatus) -> EmailMessage {
    let body = match status {
        RequestStatus::Approve => format!(
            "Hello {},\n\nYour tutor registration has been approved. You can now sign in to AutismEdu.",
            full_name
        ),
        _ => format!(
            "Hello {},\n\nYour tutor registration was not approved. Contact us if you have questions.",
            full_name
        ),
    };
    EmailMessage {
        to: to.to_string(),
        subject: "Your AutismEdu tutor registration".to_string(),
        body,
    }
}

pub fn unlock_appeal_decided(to: &str, status: RequestStatus, comment: Option<&str>) -> EmailMessage {
    let outcome = match status {
        RequestStatus::Approve => "Your account has been unlocked. You can sign in again.",
        _ => "Your request to unlock your account was rejected.",
    };
    let body = match comment {
        Some(comment) if !comment.trim().is_empty() => format!("{}\n\nComment: {}", outcome, comment.trim()),
        _ => outcome.to_string(),
    };
    EmailMessage {
        to: to.to_string(),
        subject: "Your AutismEdu account".to_string(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_email_links_to_frontend() {
        let message = password_reset("parent@example.com", "tok123");
        assert_eq!(message.to, "parent@example.com");
        assert!(message.body.contains("/reset-password?token=tok123&email=parent%40example.com"));
    }

    #[test]
    fn reset_link_keeps_plus_addresses() {
        let message = password_reset("ann+kids@example.com", "a/b+c=");
        let link = message
            .body
            .lines()
            .find(|line| line.contains("/reset-password?"))
            .unwrap();
        let parsed = url::Url::parse(link).unwrap();
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();
        assert_eq!(pairs["email"], "ann+kids@example.com");
        assert_eq!(pairs["token"], "a/b+c=");
    }

    #[test]
    fn unlock_email_includes_comment_when_present() {
        let approved = unlock_appeal_decided("a@example.com", RequestStatus::Approve, Some("welcome back"));
        assert!(approved.body.contains("unlocked"));
        assert!(approved.body.contains("welcome back"));

        let rejected = unlock_appeal_decided("a@example.com", RequestStatus::Reject, Some("  "));
        assert!(rejected.body.contains("rejected"));
        assert!(!rejected.body.contains("Comment"));
    }

    #[tokio::test]
    async fn log_sender_always_succeeds() {
        let message = tutor_request_decided("t@example.com", "Tutor", RequestStatus::Approve);
        assert!(LogEmailSender.send(message).await.is_ok());
    }
}
