pub mod assessment;
pub mod blog;
pub mod messaging;
pub mod notification;
pub mod payment;
pub mod report;
pub mod review;
pub mod schedule;
pub mod token;
pub mod tutor;
pub mod user;
