// Flows that need a real Postgres. Every test returns early when
// DATABASE_URL is unset or unreachable.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{DurationRound, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use autismedu_api::auth::refresh::TokenService;
use autismedu_api::auth::TokenError;
use autismedu_api::database::models::report::NewReport;
use autismedu_api::database::models::tutor::TutorProfileInput;
use autismedu_api::database::models::user::{NewUser, User};
use autismedu_api::database::repository::{
    PaymentRepository, ReportRepository, ReviewRepository, TutorRepository, UserRepository,
};
use autismedu_api::database::{DatabaseError, DatabaseManager};
use autismedu_api::error::ApiError;
use autismedu_api::middleware::load_active_user;
use autismedu_api::services::email::{EmailError, EmailMessage, EmailSender};
use autismedu_api::services::{moderation, subscription};
use autismedu_api::state::AppState;
use autismedu_api::types::{ReportType, RequestStatus, Role};

async fn database() -> Option<PgPool> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&url)
        .await
        .ok()?;
    DatabaseManager::migrate(&pool).await.ok()?;
    Some(pool)
}

macro_rules! require_database {
    () => {
        match database().await {
            Some(pool) => pool,
            None => {
                eprintln!("database unavailable, skipping");
                return;
            }
        }
    };
}

#[derive(Default)]
struct CapturingSender(Mutex<Vec<EmailMessage>>);

#[async_trait]
impl EmailSender for CapturingSender {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        self.0.lock().unwrap().push(message);
        Ok(())
    }
}

impl CapturingSender {
    fn sent(&self) -> Vec<EmailMessage> {
        self.0.lock().unwrap().clone()
    }
}

fn unique_email(prefix: &str) -> String {
    format!("{}+{}@example.com", prefix, Uuid::new_v4().simple())
}

fn new_user(email: String, role: Role) -> NewUser {
    NewUser {
        email,
        full_name: "Test User".into(),
        phone_number: None,
        address: None,
        image_url: None,
        password_hash: None,
        role,
    }
}

async fn create_user(pool: &PgPool, role: Role) -> User {
    UserRepository::new(pool.clone())
        .insert(new_user(unique_email("user"), role))
        .await
        .unwrap()
}

fn tutor_profile(start_age: i32, end_age: i32) -> TutorProfileInput {
    TutorProfileInput {
        about_me: Some("Patient and structured".into()),
        date_of_birth: None,
        start_age,
        end_age,
        price_from: Decimal::new(100, 0),
        price_end: Decimal::new(200, 0),
        session_hours: 1.5,
    }
}

async fn create_approved_tutor(pool: &PgPool) -> User {
    let (user, _) = UserRepository::new(pool.clone())
        .insert_tutor(new_user(unique_email("tutor"), Role::Tutor), &tutor_profile(3, 10))
        .await
        .unwrap();
    TutorRepository::new(pool.clone())
        .decide_request(user.id, RequestStatus::Approve)
        .await
        .unwrap();
    user
}

#[tokio::test]
async fn reused_refresh_token_ends_the_chain() {
    let pool = require_database!();
    let user = create_user(&pool, Role::Parent).await;
    let tokens = TokenService::new(pool.clone());

    let first = tokens.issue_token_pair(&user).await.unwrap();
    let second = tokens.refresh(&first).await.unwrap();

    let reused = tokens.refresh(&first).await.unwrap_err();
    assert!(matches!(reused, TokenError::RefreshRejected));

    // The pair issued by the legitimate rotation dies with the chain
    let after = tokens.refresh(&second).await.unwrap_err();
    assert!(matches!(after, TokenError::RefreshRejected));
}

#[tokio::test]
async fn concurrent_rotations_have_one_winner() {
    let pool = require_database!();
    let user = create_user(&pool, Role::Parent).await;
    let tokens = TokenService::new(pool.clone());
    let pair = tokens.issue_token_pair(&user).await.unwrap();

    let (a, b) = tokio::join!(tokens.refresh(&pair), tokens.refresh(&pair));
    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
}

#[tokio::test]
async fn revoke_ends_the_chain() {
    let pool = require_database!();
    let user = create_user(&pool, Role::Parent).await;
    let tokens = TokenService::new(pool.clone());
    let pair = tokens.issue_token_pair(&user).await.unwrap();

    tokens.revoke(&pair).await.unwrap();
    assert!(matches!(tokens.refresh(&pair).await, Err(TokenError::RefreshRejected)));
}

#[tokio::test]
async fn locked_user_cannot_refresh() {
    let pool = require_database!();
    let user = create_user(&pool, Role::Parent).await;
    let tokens = TokenService::new(pool.clone());
    let pair = tokens.issue_token_pair(&user).await.unwrap();

    UserRepository::new(pool.clone()).set_locked(user.id, true).await.unwrap();

    let err = tokens.refresh(&pair).await.unwrap_err();
    assert!(matches!(err, TokenError::AccountLocked));
    assert_eq!(ApiError::from(err).status_code(), 403);
}

#[tokio::test]
async fn user_validation_refuses_locked_and_missing_accounts() {
    let pool = require_database!();
    let state = AppState::new(pool.clone());
    let user = create_user(&pool, Role::Parent).await;

    assert_eq!(load_active_user(&state, user.id, Role::Parent).await.unwrap().id, user.id);

    UserRepository::new(pool.clone()).set_locked(user.id, true).await.unwrap();
    let locked = load_active_user(&state, user.id, Role::Parent).await.unwrap_err();
    assert_eq!(locked.status_code(), 403);

    let missing = load_active_user(&state, Uuid::new_v4(), Role::Parent).await.unwrap_err();
    assert_eq!(missing.status_code(), 401);
}

#[tokio::test]
async fn concurrent_purchases_stack() {
    let pool = require_database!();
    let tutor = create_approved_tutor(&pool).await;
    let manager = create_user(&pool, Role::Manager).await;
    let payments = PaymentRepository::new(pool.clone());
    let package = payments
        .insert_package("One month", 1, Decimal::new(150, 0), None, manager.id)
        .await
        .unwrap();

    // Postgres keeps microseconds
    let now = Utc::now().duration_trunc(chrono::Duration::microseconds(1)).unwrap();
    let (package_id, price, tutor_id) = (package.id, package.price, tutor.id);
    let first_id = Uuid::new_v4().to_string();
    let second_id = Uuid::new_v4().to_string();
    let (a, b) = tokio::join!(
        payments.record_purchase(package_id, tutor_id, price, &first_id, now, |latest| {
            subscription::next_expiration(now, latest, 1)
        }),
        payments.record_purchase(package_id, tutor_id, price, &second_id, now, |latest| {
            subscription::next_expiration(now, latest, 1)
        }),
    );

    let mut expirations = vec![
        a.unwrap().unwrap().expiration_date,
        b.unwrap().unwrap().expiration_date,
    ];
    expirations.sort();
    let one = subscription::next_expiration(now, None, 1).unwrap();
    let two = subscription::next_expiration(now, Some(one), 1).unwrap();
    assert_eq!(expirations, vec![one, two]);
}

#[tokio::test]
async fn duplicate_transaction_id_conflicts() {
    let pool = require_database!();
    let tutor = create_approved_tutor(&pool).await;
    let manager = create_user(&pool, Role::Manager).await;
    let payments = PaymentRepository::new(pool.clone());
    let package = payments
        .insert_package("Three months", 3, Decimal::new(400, 0), None, manager.id)
        .await
        .unwrap();
    let transaction_id = Uuid::new_v4().to_string();
    let now = Utc::now();

    payments
        .record_purchase(package.id, tutor.id, package.price, &transaction_id, now, |latest| {
            subscription::next_expiration(now, latest, 3)
        })
        .await
        .unwrap()
        .unwrap();
    let err = payments
        .record_purchase(package.id, tutor.id, package.price, &transaction_id, now, |latest| {
            subscription::next_expiration(now, latest, 3)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)));
    assert_eq!(ApiError::from(err).status_code(), 409);
}

#[tokio::test]
async fn second_review_of_a_tutor_conflicts() {
    let pool = require_database!();
    let tutor = create_approved_tutor(&pool).await;
    let parent = create_user(&pool, Role::Parent).await;
    let reviews = ReviewRepository::new(pool.clone());

    reviews.insert(tutor.id, parent.id, 5.0, "Great").await.unwrap();
    let err = reviews.insert(tutor.id, parent.id, 4.0, "Again").await.unwrap_err();
    assert!(matches!(err, DatabaseError::Conflict(_)));
}

#[tokio::test]
async fn failed_tutor_profile_leaves_no_account() {
    let pool = require_database!();
    let users = UserRepository::new(pool.clone());
    let email = unique_email("tutor");

    // Inverted ages violate the tutors CHECK constraint after the user row is written
    let result = users
        .insert_tutor(new_user(email.clone(), Role::Tutor), &tutor_profile(12, 4))
        .await;
    assert!(result.is_err());
    assert!(users.find_by_email(&email).await.unwrap().is_none());
}

#[tokio::test]
async fn approved_unlock_appeal_unlocks_once() {
    let pool = require_database!();
    let mailer = Arc::new(CapturingSender::default());
    let state = AppState::new(pool.clone()).with_mailer(mailer.clone());

    let users = UserRepository::new(pool.clone());
    let locked = create_user(&pool, Role::Parent).await;
    users.set_locked(locked.id, true).await.unwrap();
    let moderator = create_user(&pool, Role::Staff).await;

    let report = ReportRepository::new(pool.clone())
        .insert(NewReport {
            report_type: ReportType::UnlockAccount,
            description: "Please unlock my account".into(),
            reporter_id: None,
            reporter_email: locked.email.clone(),
            tutor_id: None,
            review_id: None,
        })
        .await
        .unwrap();

    let decided = moderation::decide_report(&state, report.id, RequestStatus::Approve, moderator.id, Some("ok"))
        .await
        .unwrap();
    assert_eq!(decided.status, RequestStatus::Approve);
    assert!(!users.get(locked.id).await.unwrap().is_locked_out);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, locked.email);

    let again = moderation::decide_report(&state, report.id, RequestStatus::Reject, moderator.id, None)
        .await
        .unwrap_err();
    assert_eq!(again.status_code(), 409);
}

#[tokio::test]
async fn forgot_password_mails_a_link_that_keeps_the_address() {
    let pool = require_database!();
    let mailer = Arc::new(CapturingSender::default());
    let app = autismedu_api::routes::app(AppState::new(pool.clone()).with_mailer(mailer.clone()));
    let user = create_user(&pool, Role::Parent).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/forgot-password")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::json!({ "email": user.email }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    let link = sent[0]
        .body
        .lines()
        .find(|line| line.contains("/reset-password?"))
        .unwrap();
    let parsed = url::Url::parse(link).unwrap();
    let email = parsed
        .query_pairs()
        .find(|(key, _)| key == "email")
        .map(|(_, value)| value.into_owned());
    assert_eq!(email.as_deref(), Some(user.email.as_str()));
}
