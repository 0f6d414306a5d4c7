//! Comment Tests
//!
//! Covers adding, listing, editing, and deleting comments on a tip.

mod common;

use axum::http::StatusCode;
use common::app;
use serde_json::json;

#[tokio::test]
async fn comments_are_newest_first() {
    let app = app();
    let alice = app.create_user("alice").await;
    let id = app.create_tip_id(&alice, "Herbs").await;

    let resp = app
        .post_json(
            &format!("/api/tips/{}/comments", id),
            json!({ "text": "first", "rating": 4 }),
            Some(&alice.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let c1 = resp.json();
    assert!(c1["id"].is_string());
    assert_eq!(c1["userId"], "alice");
    assert_eq!(c1["userName"], alice.name);
    assert_eq!(c1["rating"], 4);
    assert!(c1["time"].is_string());

    let c2 = app
        .post_json(
            &format!("/api/tips/{}/comments", id),
            json!({ "text": "second", "rating": 5 }),
            Some(&alice.access_token),
        )
        .await
        .json();

    let resp = app.get(&format!("/api/tips/{}/comments", id), None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let comments = resp.json();
    assert_eq!(comments.as_array().unwrap().len(), 2);
    assert_eq!(comments[0]["id"], c2["id"]);
    assert_eq!(comments[1]["id"], c1["id"]);

    let tips = app.get("/api/tips", None).await.json();
    assert_eq!(tips[0]["reviewCount"], 2);
    assert_eq!(tips[0]["ratingCount"], 0);
}

#[tokio::test]
async fn commenter_without_profile_is_anonymous() {
    let app = app();
    let alice = app.create_user("alice").await;
    let id = app.create_tip_id(&alice, "Herbs").await;
    let token = app.token_for("ghost");

    let resp = app
        .post_json(
            &format!("/api/tips/{}/comments", id),
            json!({ "text": "boo" }),
            Some(&token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["userName"], "Anonymous");
    assert_eq!(resp.json()["rating"], 0);
}

#[tokio::test]
async fn comments_on_missing_tip() {
    let app = app();
    let alice = app.create_user("alice").await;

    let resp = app
        .post_json(
            "/api/tips/missing/comments",
            json!({ "text": "hello", "rating": 3 }),
            Some(&alice.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = app.get("/api/tips/missing/comments", None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "tip not found");
}

#[tokio::test]
async fn only_author_edits_comment() {
    let app = app();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let id = app.create_tip_id(&alice, "Herbs").await;

    let comment = app
        .post_json(
            &format!("/api/tips/{}/comments", id),
            json!({ "text": "original", "rating": 3 }),
            Some(&bob.access_token),
        )
        .await
        .json();
    let path = format!("/api/tips/{}/comments/{}", id, comment["id"].as_str().unwrap());

    let resp = app
        .put_json(
            &path,
            json!({ "text": "tampered", "rating": 1 }),
            Some(&alice.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = app
        .put_json(
            &format!("/api/tips/{}/comments/unknown", id),
            json!({ "text": "x", "rating": 1 }),
            Some(&bob.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "comment not found");

    let resp = app
        .put_json(
            &path,
            json!({ "text": "edited", "rating": 5 }),
            Some(&bob.access_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["text"], "edited");
    assert_eq!(body["rating"], 5);
    assert_eq!(body["id"], comment["id"]);
    assert_eq!(body["time"], comment["time"]);

    let comments = app.get(&format!("/api/tips/{}/comments", id), None).await.json();
    assert_eq!(comments[0]["text"], "edited");
}

#[tokio::test]
async fn only_author_deletes_comment() {
    let app = app();
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let id = app.create_tip_id(&alice, "Herbs").await;

    let comment = app
        .post_json(
            &format!("/api/tips/{}/comments", id),
            json!({ "text": "mine", "rating": 3 }),
            Some(&bob.access_token),
        )
        .await
        .json();
    let path = format!("/api/tips/{}/comments/{}", id, comment["id"].as_str().unwrap());

    let resp = app.delete(&path, Some(&alice.access_token)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(
        app.get("/api/tips", None).await.json()[0]["reviewCount"],
        1
    );

    let resp = app.delete(&path, Some(&bob.access_token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["message"], "comment deleted");

    let resp = app.delete(&path, Some(&bob.access_token)).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let tips = app.get("/api/tips", None).await.json();
    assert_eq!(tips[0]["reviewCount"], 0);
    assert!(tips[0]["comments"].as_array().unwrap().is_empty());

    let resp = app
        .delete("/api/tips/missing/comments/whatever", Some(&bob.access_token))
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "tip not found");
}
