mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn login_by_username_and_email() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    for identifier in [common::ADMIN_USERNAME, "admin@example.com"] {
        let res = client
            .post(server.url("/api/login"))
            .json(&json!({ "identifier": identifier, "password": common::ADMIN_PASSWORD }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "login as {}", identifier);
        let body: Value = res.json().await?;
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert!(body["data"]["access_token"].as_str().is_some());
        assert!(body["data"]["refresh_token"].as_str().is_some());
    }
    Ok(())
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let wrong_password = client
        .post(server.url("/api/login"))
        .json(&json!({ "identifier": common::ADMIN_USERNAME, "password": "nope" }))
        .send()
        .await?;
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let unknown_user = client
        .post(server.url("/api/login"))
        .json(&json!({ "identifier": "ghost", "password": "nope" }))
        .send()
        .await?;
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let body: Value = unknown_user.json().await?;
    assert_eq!(body["message"], "Invalid credentials");

    let malformed = client
        .post(server.url("/api/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_bearer_token() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = reqwest::Client::new();

    let res = client.get(server.url("/api/victims")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(server.url("/api/me"))
        .bearer_auth("garbage")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn me_returns_claims() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let client = common::admin_client(server).await?;

    let body: Value = client.get(server.url("/api/me")).send().await?.json().await?;
    assert_eq!(body["data"]["email"], "admin@example.com");
    assert!(body["data"]["roles"].as_array().unwrap().iter().any(|r| r == "Admin"));
    Ok(())
}

#[tokio::test]
async fn refresh_token_issues_new_pair() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let tokens = common::login_admin(server).await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url("/api/refresh-token"))
        .json(&json!({ "refresh_token": tokens["refresh_token"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let access = body["data"]["access_token"].as_str().unwrap().to_string();

    let me = client.get(server.url("/api/me")).bearer_auth(access).send().await?;
    assert_eq!(me.status(), StatusCode::OK);

    // An access token is not accepted as a refresh token
    let res = client
        .post(server.url("/api/refresh-token"))
        .json(&json!({ "refresh_token": tokens["access_token"] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
