mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

use common::TestServer;

#[tokio::test]
async fn add_and_list_comments_newest_first() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("Alice Able", "alice@example.com").await?;
    let bob = server.register("Bob Baker", "bob@example.com").await?;
    let problem = server.create_problem(&alice, "Broken streetlight on Elm", "Elm St").await?;
    let path = format!("/api/problems/{}/comments", problem["id"]);

    let (status, body) = server.post_json(&path, &bob, json!({ "text": "  First!  " })).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Comment added successfully.");
    assert_eq!(body["data"]["comment"]["text"], "First!");
    assert_eq!(body["data"]["comment"]["user"]["name"], "Bob Baker");

    server.post_json(&path, &alice, json!({ "text": "Second" })).await?;

    let (status, body) = server.get(&path, None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["data"]["comments"][0]["text"], "Second");
    assert_eq!(body["data"]["comments"][1]["text"], "First!");
    assert_eq!(body["data"]["comments"][0]["user"]["email"], "alice@example.com");

    // Detail view nests the same comments, authors reduced to id and name
    let (_, body) = server.get(&format!("/api/problems/{}", problem["id"]), None).await?;
    let nested = &body["data"]["problem"]["comments"];
    assert_eq!(nested[0]["text"], "Second");
    assert!(nested[0]["user"].get("email").is_none());
    assert_eq!(body["data"]["problem"]["commentCount"], 2);
    Ok(())
}

#[tokio::test]
async fn comment_text_is_validated() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("Alice Able", "alice@example.com").await?;
    let problem = server.create_problem(&alice, "Broken streetlight on Elm", "Elm St").await?;
    let path = format!("/api/problems/{}/comments", problem["id"]);

    let (status, body) = server.post_json(&path, &alice, json!({ "text": "   " })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Comment text is required");

    let long = "x".repeat(1001);
    let (status, body) = server.post_json(&path, &alice, json!({ "text": long })).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Comment must be between 1 and 1000 characters");
    Ok(())
}

#[tokio::test]
async fn comments_on_missing_problem_are_404() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("Alice Able", "alice@example.com").await?;

    let (status, body) = server
        .post_json("/api/problems/9999/comments", &alice, json!({ "text": "Hello" }))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Problem not found.");

    let (status, _) = server.get("/api/problems/9999/comments", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_comment_owner_or_admin_only() -> Result<()> {
    let server = TestServer::start().await?;
    let alice = server.register("Alice Able", "alice@example.com").await?;
    let bob = server.register("Bob Baker", "bob@example.com").await?;
    let admin = server.admin("Ada Admin", "ada@example.com").await?;
    let problem = server.create_problem(&alice, "Broken streetlight on Elm", "Elm St").await?;
    let path = format!("/api/problems/{}/comments", problem["id"]);

    let (_, body) = server.post_json(&path, &bob, json!({ "text": "Mine" })).await?;
    let first = body["data"]["comment"]["id"].as_i64().unwrap();
    let (_, body) = server.post_json(&path, &bob, json!({ "text": "Also mine" })).await?;
    let second = body["data"]["comment"]["id"].as_i64().unwrap();

    // Problem owner is not the comment author
    let (status, body) = server.delete(&format!("/api/problems/comments/{}", first), &alice).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not authorized to delete this comment.");

    let (status, body) = server.delete(&format!("/api/problems/comments/{}", first), &bob).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Comment deleted successfully.");

    let (status, _) = server.delete(&format!("/api/problems/comments/{}", second), &admin).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.delete(&format!("/api/problems/comments/{}", second), &admin).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Comment not found.");

    let (_, body) = server.get(&path, None).await?;
    assert_eq!(body["count"], 0);
    Ok(())
}
