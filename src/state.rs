use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::google::GoogleOAuthClient;
use crate::config;
use crate::services::email::{EmailSender, LogEmailSender};
use crate::services::hub::NotificationHub;

/// Shared handles passed to every handler through axum `State`
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub hub: NotificationHub,
    pub mailer: Arc<dyn EmailSender>,
    pub google: GoogleOAuthClient,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            hub: NotificationHub::new(),
            mailer: Arc::new(LogEmailSender),
            google: GoogleOAuthClient::new(config::config().google.clone()),
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn EmailSender>) -> Self {
        self.mailer = mailer;
        self
    }
}
