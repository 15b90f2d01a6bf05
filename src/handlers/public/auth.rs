// handlers/public/auth.rs - account and token endpoints under /api/v1/auth

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password, validate_strength, verify_password};
use crate::auth::{hash_token, new_opaque_token, TokenPair, TokenService};
use crate::config;
use crate::database::models::tutor::TutorProfileInput;
use crate::database::models::user::{NewUser, User};
use crate::database::repository::{TokenRepository, TutorRepository, UserRepository};
use crate::error::ApiError;
use crate::handlers::validation;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::email;
use crate::state::AppState;
use crate::types::{RequestStatus, Role};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    pub tutor_profile: Option<TutorProfileInput>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user: User,
    /// Present for parents; tutors wait for staff approval
    pub tokens: Option<TokenPair>,
}

/// Tutors may sign in only once their registration request is approved
async fn ensure_can_sign_in(state: &AppState, user: &User) -> Result<(), ApiError> {
    if user.is_locked_out {
        tracing::warn!("Sign-in refused for locked user {}", user.id);
        return Err(ApiError::forbidden("Account is locked"));
    }
    if user.role == Role::Tutor {
        let tutor = TutorRepository::new(state.pool.clone()).find(user.id).await?;
        match tutor.map(|t| t.request_status) {
            Some(RequestStatus::Approve) => {}
            Some(RequestStatus::Pending) => {
                return Err(ApiError::forbidden("Tutor registration is waiting for approval"))
            }
            _ => return Err(ApiError::forbidden("Tutor registration was not approved")),
        }
    }
    Ok(())
}

/// POST /api/v1/auth/register - Register a parent, or a tutor pending approval
pub async fn register(State(state): State<AppState>, Json(body): Json<RegisterRequest>) -> ApiResult<RegisterResponse> {
    let email = validation::email(&body.email)?;
    let full_name = validation::max_len("fullName", &body.full_name, 100)?.to_string();
    let role = body.role.unwrap_or(Role::Parent);
    if !matches!(role, Role::Parent | Role::Tutor) {
        return Err(ApiError::invalid_field("role", "must be Parent or Tutor"));
    }

    let tutor_profile = match (role, &body.tutor_profile) {
        (Role::Tutor, Some(profile)) => {
            profile.validate().map_err(|(field, msg)| ApiError::invalid_field(field, msg))?;
            Some(profile)
        }
        (Role::Tutor, None) => return Err(ApiError::invalid_field("tutorProfile", "is required for tutors")),
        _ => None,
    };

    let password_hash = hash_password(&body.password)?;
    let new_user = NewUser {
        email,
        full_name,
        phone_number: body.phone_number,
        address: body.address,
        image_url: body.image_url,
        password_hash: Some(password_hash),
        role,
    };
    let users = UserRepository::new(state.pool.clone());

    if let Some(profile) = tutor_profile {
        let (user, _) = users.insert_tutor(new_user, profile).await?;
        tracing::info!("Tutor {} registered, waiting for approval", user.id);
        return Ok(ApiResponse::created(RegisterResponse { user, tokens: None }));
    }

    let user = users.insert(new_user).await?;
    let tokens = TokenService::new(state.pool.clone()).issue_token_pair(&user).await?;
    tracing::info!("Parent {} registered", user.id);
    Ok(ApiResponse::created(RegisterResponse {
        user,
        tokens: Some(tokens),
    }))
}

/// POST /api/v1/auth/login - Exchange email and password for a token pair
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> ApiResult<AuthResponse> {
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = UserRepository::new(state.pool.clone())
        .find_by_email(&body.email.trim().to_lowercase())
        .await?
        .ok_or_else(invalid)?;

    let verified = user
        .password_hash
        .as_deref()
        .map(|hash| verify_password(&body.password, hash))
        .unwrap_or(false);
    if !verified {
        tracing::warn!("Failed login for {}", user.id);
        return Err(invalid());
    }

    ensure_can_sign_in(&state, &user).await?;

    let tokens = TokenService::new(state.pool.clone()).issue_token_pair(&user).await?;
    tracing::info!("User {} signed in", user.id);
    Ok(ApiResponse::success(AuthResponse { user, tokens }))
}

/// POST /api/v1/auth/refresh - Rotate a refresh token (access token may be expired)
pub async fn refresh(State(state): State<AppState>, Json(body): Json<TokenPair>) -> ApiResult<TokenPair> {
    let tokens = TokenService::new(state.pool.clone()).refresh(&body).await?;
    Ok(ApiResponse::success(tokens))
}

/// POST /api/v1/auth/revoke - Log out by invalidating the pair's refresh chain
pub async fn revoke(State(state): State<AppState>, Json(body): Json<TokenPair>) -> ApiResult<()> {
    TokenService::new(state.pool.clone()).revoke(&body).await?;
    Ok(ApiResponse::no_content())
}

/// POST /api/v1/auth/google - Sign in with a Google authorization code
pub async fn google_login(State(state): State<AppState>, Json(body): Json<GoogleLoginRequest>) -> ApiResult<AuthResponse> {
    let code = validation::required("code", &body.code)?;
    let identity = state.google.authenticate(code).await?;

    let users = UserRepository::new(state.pool.clone());
    let user = match users.find_by_email(&identity.email).await? {
        Some(user) if user.role.is_staff() => {
            tracing::warn!("Google sign-in refused for staff account {}", user.id);
            return Err(ApiError::forbidden("Staff accounts must sign in with a password"));
        }
        Some(user) => user,
        None => {
            let user = users
                .insert(NewUser {
                    email: identity.email,
                    full_name: identity.full_name,
                    phone_number: None,
                    address: None,
                    image_url: identity.image_url,
                    password_hash: None,
                    role: Role::Parent,
                })
                .await?;
            tracing::info!("Parent {} created from Google sign-in", user.id);
            user
        }
    };

    ensure_can_sign_in(&state, &user).await?;

    let tokens = TokenService::new(state.pool.clone()).issue_token_pair(&user).await?;
    Ok(ApiResponse::success(AuthResponse { user, tokens }))
}

/// POST /api/v1/auth/forgot-password - Email a one-time reset link
///
/// Answers the same way whether or not the email is registered.
pub async fn forgot_password(State(state): State<AppState>, Json(body): Json<ForgotPasswordRequest>) -> ApiResult<()> {
    let email_address = validation::email(&body.email)?;

    if let Some(user) = UserRepository::new(state.pool.clone()).find_by_email(&email_address).await? {
        let token = new_opaque_token();
        let expires_at = Utc::now() + Duration::minutes(config::config().security.reset_token_minutes);
        TokenRepository::new(state.pool.clone())
            .insert_reset(user.id, &hash_token(&token), expires_at)
            .await?;
        email::deliver(state.mailer.as_ref(), email::password_reset(&user.email, &token)).await;
        tracing::info!("Password reset requested for user {}", user.id);
    }

    Ok(ApiResponse::success(()))
}

/// POST /api/v1/auth/reset-password - Consume a reset token and set a new password
pub async fn reset_password(State(state): State<AppState>, Json(body): Json<ResetPasswordRequest>) -> ApiResult<()> {
    validate_strength(&body.new_password)?;
    let invalid = || ApiError::bad_request("Reset token is invalid or has expired");

    let users = UserRepository::new(state.pool.clone());
    let user = users.find_by_email(&body.email).await?.ok_or_else(invalid)?;

    let tokens = TokenRepository::new(state.pool.clone());
    let reset = tokens
        .find_active_reset(user.id, &hash_token(body.token.trim()))
        .await?
        .ok_or_else(invalid)?;
    if !tokens.mark_reset_used(reset.id).await? {
        return Err(invalid());
    }

    users.set_password_hash(user.id, &hash_password(&body.new_password)?).await?;
    let revoked = TokenService::new(state.pool.clone()).revoke_all_for_user(user.id).await?;
    tracing::info!("Password reset for user {}; {} refresh tokens invalidated", user.id, revoked);

    Ok(ApiResponse::success(()))
}
