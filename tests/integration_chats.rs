#![allow(clippy::unwrap_used, clippy::panic, clippy::missing_panics_doc, clippy::clone_on_ref_ptr)]

use axum::http::StatusCode;
use serde_json::json;

mod common;

async fn create_group(
    app: &common::TestApp,
    token: &str,
    members: &[uuid::Uuid],
    name: &str,
) -> serde_json::Value {
    let resp = app
        .client
        .post(format!("{}/chats", app.api_url))
        .bearer_auth(token)
        .json(&json!({ "members": members, "name": name, "isGroup": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_create_group_chat() {
    let app = common::TestApp::spawn().await;
    let (alice, token) = app.register_user("Alice", "Ames");
    let (bob, _) = app.register_user("Bob", "Burke");
    let (carol, _) = app.register_user("Carol", "Cole");

    let body = create_group(&app, &token, &[bob, carol], "Trip").await;

    assert_eq!(body["isGroup"], true);
    assert_eq!(body["name"], "Trip");
    assert_eq!(body["groupAdmin"], json!(alice));

    // The response member list resolves profiles and excludes the creator.
    let members = body["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|m| m["id"] != json!(alice)));
    assert!(members.iter().any(|m| m["firstName"] == "Bob"));
}

#[tokio::test]
async fn test_create_group_without_name_fails() {
    let app = common::TestApp::spawn().await;
    let (_, token) = app.register_user("Alice", "Ames");
    let (bob, _) = app.register_user("Bob", "Burke");
    let (carol, _) = app.register_user("Carol", "Cole");

    let resp = app
        .client
        .post(format!("{}/chats", app.api_url))
        .bearer_auth(&token)
        .json(&json!({ "members": [bob, carol], "isGroup": true }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "You must add a group name");
}

#[tokio::test]
async fn test_create_group_with_too_few_members_fails() {
    let app = common::TestApp::spawn().await;
    let (_, token) = app.register_user("Alice", "Ames");
    let (bob, _) = app.register_user("Bob", "Burke");

    let resp = app
        .client
        .post(format!("{}/chats", app.api_url))
        .bearer_auth(&token)
        .json(&json!({ "members": [bob, bob], "name": "Trip", "isGroup": true }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_direct_chat_conflicts() {
    let app = common::TestApp::spawn().await;
    let (alice, alice_token) = app.register_user("Alice", "Ames");
    let (bob, bob_token) = app.register_user("Bob", "Burke");

    let resp = app
        .client
        .post(format!("{}/chats", app.api_url))
        .bearer_auth(&alice_token)
        .json(&json!({ "members": [bob], "isGroup": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Same pair again, created from the other side.
    let resp = app
        .client
        .post(format!("{}/chats", app.api_url))
        .bearer_auth(&bob_token)
        .json(&json!({ "members": [alice], "isGroup": false }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "This chat is already created");
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = common::TestApp::spawn().await;

    let resp = app
        .client
        .get(format!("{}/chats", app.api_url))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_chat_id_is_a_bad_request() {
    let app = common::TestApp::spawn().await;
    let (_, token) = app.register_user("Alice", "Ames");

    let resp = app
        .client
        .get(format!("{}/chats/not-a-uuid", app.api_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_missing_chat_is_not_found() {
    let app = common::TestApp::spawn().await;
    let (_, token) = app.register_user("Alice", "Ames");

    let resp = app
        .client
        .get(format!("{}/chats/{}", app.api_url, uuid::Uuid::new_v4()))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_group_authorization_and_shape() {
    let app = common::TestApp::spawn().await;
    let (_, admin_token) = app.register_user("Alice", "Ames");
    let (bob, bob_token) = app.register_user("Bob", "Burke");
    let (carol, _) = app.register_user("Carol", "Cole");
    let (dave, _) = app.register_user("Dave", "Dunn");

    let group = create_group(&app, &admin_token, &[bob, carol], "Trip").await;
    let chat_id = group["id"].as_str().unwrap();

    // Non-admin cannot update.
    let resp = app
        .client
        .put(format!("{}/chats/{chat_id}", app.api_url))
        .bearer_auth(&bob_token)
        .json(&json!({ "members": [bob, carol], "name": "Hike" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Admin swaps Carol for Dave.
    let resp = app
        .client
        .put(format!("{}/chats/{chat_id}", app.api_url))
        .bearer_auth(&admin_token)
        .json(&json!({ "members": [bob, dave], "name": "Hike" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "Hike");
    let members = body["members"].as_array().unwrap();
    assert!(members.iter().any(|m| m["id"] == json!(dave)));
    assert!(members.iter().all(|m| m["id"] != json!(carol)));
}

#[tokio::test]
async fn test_update_direct_chat_is_rejected() {
    let app = common::TestApp::spawn().await;
    let (_, alice_token) = app.register_user("Alice", "Ames");
    let (bob, _) = app.register_user("Bob", "Burke");

    let resp = app
        .client
        .post(format!("{}/chats", app.api_url))
        .bearer_auth(&alice_token)
        .json(&json!({ "members": [bob], "isGroup": false }))
        .send()
        .await
        .unwrap();
    let chat: serde_json::Value = resp.json().await.unwrap();
    let chat_id = chat["id"].as_str().unwrap();

    let resp = app
        .client
        .put(format!("{}/chats/{chat_id}", app.api_url))
        .bearer_auth(&alice_token)
        .json(&json!({ "members": [bob], "name": "Nope" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_leave_group_rules() {
    let app = common::TestApp::spawn().await;
    let (_, admin_token) = app.register_user("Alice", "Ames");
    let (bob, bob_token) = app.register_user("Bob", "Burke");
    let (carol, _) = app.register_user("Carol", "Cole");

    let group = create_group(&app, &admin_token, &[bob, carol], "Trip").await;
    let chat_id = group["id"].as_str().unwrap();

    // The admin cannot leave their own group.
    let resp = app
        .client
        .post(format!("{}/chats/{chat_id}/leave", app.api_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // A member can, and only they are removed.
    let resp = app
        .client
        .post(format!("{}/chats/{chat_id}/leave", app.api_url))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    let members = body["members"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|m| *m != json!(bob)));
    assert!(members.iter().any(|m| *m == json!(carol)));
}

#[tokio::test]
async fn test_delete_group_requires_admin() {
    let app = common::TestApp::spawn().await;
    let (_, admin_token) = app.register_user("Alice", "Ames");
    let (bob, bob_token) = app.register_user("Bob", "Burke");
    let (carol, _) = app.register_user("Carol", "Cole");

    let group = create_group(&app, &admin_token, &[bob, carol], "Trip").await;
    let chat_id = group["id"].as_str().unwrap();

    let resp = app
        .client
        .delete(format!("{}/chats/{chat_id}", app.api_url))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .client
        .delete(format!("{}/chats/{chat_id}", app.api_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // The record is gone afterwards.
    let resp = app
        .client
        .get(format!("{}/chats/{chat_id}", app.api_url))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
