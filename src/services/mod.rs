pub mod assessment;
pub mod dashboard;
pub mod email;
pub mod hub;
pub mod moderation;
pub mod notifier;
pub mod subscription;
pub mod tutor_search;

pub use hub::{HubEvent, NotificationHub};
