mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn protected_routes_require_token() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in [
        "/api/v1/users/me",
        "/api/v1/notifications",
        "/api/v1/conversations",
        "/api/v1/student-profiles",
        "/api/v1/schedules",
        "/api/v1/admin/users",
        "/api/v1/admin/dashboard",
    ] {
        let res = client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{} should require a token", path);
        common::error_envelope(res).await?;
    }
    Ok(())
}

#[tokio::test]
async fn malformed_authorization_header_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::Client::new()
        .get(server.url("/api/v1/users/me"))
        .header("Authorization", "Token abc")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn tutor_search_validates_review_score() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(server.url("/api/v1/tutors?reviewScore=7")).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = common::error_envelope(res).await?;
    assert!(body["fieldErrors"]["reviewScore"].is_string());
    Ok(())
}

#[tokio::test]
async fn tutor_search_rejects_inverted_age_range() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(server.url("/api/v1/tutors?ageFrom=10&ageTo=4")).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
