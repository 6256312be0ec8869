mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::{TestServer, PASSWORD};

#[tokio::test]
async fn health_and_banner_respond() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = server.get("/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "CivicPulse API");
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_enveloped_404() -> Result<()> {
    let server = TestServer::start().await?;

    let (status, body) = server.get("/api/nowhere", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
    Ok(())
}

#[tokio::test]
async fn register_returns_user_and_token_without_password() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "name": "Alice Able", "email": "  Alice@Example.com ", "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: Value = res.json().await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    assert_eq!(body["data"]["user"]["role"], "user");
    assert_eq!(body["data"]["user"]["isBlocked"], false);
    assert!(body["data"]["user"].get("passwordHash").is_none());
    assert!(body["data"]["user"].get("password").is_none());
    assert!(body["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    Ok(())
}

#[tokio::test]
async fn duplicate_registration_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    server.register("Alice Able", "alice@example.com").await?;

    let res = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "name": "Other Alice", "email": "ALICE@example.com", "password": PASSWORD }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "User with this email already exists.");
    assert_eq!(body["errors"][0]["field"], "email");
    Ok(())
}

#[tokio::test]
async fn register_validates_fields() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/api/auth/register"))
        .json(&json!({ "name": "A", "email": "not-an-email", "password": "123" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
    Ok(())
}

#[tokio::test]
async fn malformed_json_body_is_enveloped() -> Result<()> {
    let server = TestServer::start().await?;

    let res = server
        .client
        .post(server.url("/api/auth/login"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn login_succeeds_only_with_the_right_password() -> Result<()> {
    let server = TestServer::start().await?;
    server.register("Alice Able", "alice@example.com").await?;

    let (status, body) = server.login("alice@example.com", PASSWORD).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());

    let (status, body) = server.login("alice@example.com", "wrong-password").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password.");

    let (status, body) = server.login("nobody@example.com", PASSWORD).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password.");
    Ok(())
}

#[tokio::test]
async fn me_requires_a_valid_bearer_token() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("Alice Able", "alice@example.com").await?;

    let (status, body) = server.get("/api/auth/me", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access denied. No token provided.");

    let res = server
        .client
        .get(server.url("/api/auth/me"))
        .bearer_auth("not.a.token")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Invalid token.");

    let (status, body) = server.get("/api/auth/me", Some(&alice)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], alice.id);
    Ok(())
}

#[tokio::test]
async fn token_of_deleted_user_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("Alice Able", "alice@example.com").await?;
    server.state.repos.users.delete(alice.id).await?;

    let (status, body) = server.get("/api/auth/me", Some(&alice)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token. User not found.");
    Ok(())
}
