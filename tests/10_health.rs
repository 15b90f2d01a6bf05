mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(server.url("/health")).await?;

    // OK with a database, SERVICE_UNAVAILABLE without one
    let status = res.status();
    assert!(
        status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE,
        "unexpected status: {}",
        status
    );
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["statusCode"], status.as_u16());
    Ok(())
}

#[tokio::test]
async fn root_returns_service_info() -> Result<()> {
    let server = common::ensure_server().await?;
    let res = reqwest::get(server.url("/")).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["isSuccess"], true);
    assert_eq!(body["result"]["name"], "AutismEdu API");
    assert!(body["result"]["version"].is_string());
    Ok(())
}
