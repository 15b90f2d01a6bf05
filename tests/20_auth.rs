mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn register_rejects_invalid_email() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .post(server.url("/api/v1/auth/register"))
        .json(&json!({
            "email": "not-an-email",
            "password": "secret123",
            "fullName": "Test Parent",
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::error_envelope(res).await?;
    assert_eq!(body["fieldErrors"]["email"], "is not a valid email address");
    Ok(())
}

#[tokio::test]
async fn register_refuses_staff_roles() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .post(server.url("/api/v1/auth/register"))
        .json(&json!({
            "email": "someone@example.com",
            "password": "secret123",
            "fullName": "Would-be Admin",
            "role": "Admin",
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    common::error_envelope(res).await?;
    Ok(())
}

#[tokio::test]
async fn tutor_registration_requires_profile() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .post(server.url("/api/v1/auth/register"))
        .json(&json!({
            "email": "tutor@example.com",
            "password": "secret123",
            "fullName": "Tutor Without Profile",
            "role": "Tutor",
        }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn login_with_unknown_account_fails() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .post(server.url("/api/v1/auth/login"))
        .json(&json!({ "email": "nobody-here@example.com", "password": "whatever1" }))
        .send()
        .await?;

    // 401 with a database, 503 without one
    let status = res.status();
    assert!(
        status == StatusCode::UNAUTHORIZED || status == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        status
    );
    common::error_envelope(res).await?;
    Ok(())
}

#[tokio::test]
async fn refresh_with_garbage_pair_fails() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .post(server.url("/api/v1/auth/refresh"))
        .json(&json!({ "accessToken": "garbage", "refreshToken": "garbage" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
