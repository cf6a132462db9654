use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::test_support;

#[tokio::test]
async fn notes_are_scoped_to_their_owner() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "noteowner01", UserRole::Student, "owner-pass")
            .await;
    let other =
        test_support::insert_user(ctx.state.db(), "noteother01", UserRole::Student, "other-pass")
            .await;

    let owner_token = test_support::bearer_token(&owner.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/notes",
            Some(&owner_token),
            Some(json!({ "title": "Lecture recap", "content": "Pointers and slices" })),
        ))
        .await
        .expect("create note");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    let note_id = created["id"].as_str().expect("note id").to_string();

    // Someone else's note looks like a missing one.
    let other_token = test_support::bearer_token(&other.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/notes/{note_id}"),
            Some(&other_token),
            None,
        ))
        .await
        .expect("get note as other user");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/notes/{note_id}"),
            Some(&owner_token),
            None,
        ))
        .await
        .expect("get note as owner");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn note_can_be_moved_into_and_out_of_folders() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "noteuser02", UserRole::Student, "user-pass").await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/notes/folders",
            Some(&token),
            Some(json!({ "name": "Rust" })),
        ))
        .await
        .expect("create folder");
    let folder = test_support::read_json(response).await;
    let folder_id = folder["id"].as_str().expect("folder id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/notes",
            Some(&token),
            Some(json!({ "title": "Ownership", "content": "Borrow checker notes" })),
        ))
        .await
        .expect("create note");
    let note = test_support::read_json(response).await;
    let note_id = note["id"].as_str().expect("note id").to_string();
    assert!(note["folder_id"].is_null());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/notes/{note_id}"),
            Some(&token),
            Some(json!({ "folder_id": folder_id })),
        ))
        .await
        .expect("move note into folder");
    let moved = test_support::read_json(response).await;
    assert_eq!(moved["folder_id"], folder_id.as_str());

    // Omitting folder_id leaves the note where it is.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/notes/{note_id}"),
            Some(&token),
            Some(json!({ "title": "Ownership and borrows" })),
        ))
        .await
        .expect("rename note");
    let renamed = test_support::read_json(response).await;
    assert_eq!(renamed["folder_id"], folder_id.as_str());

    // Explicit null moves it back to the top level.
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/notes/{note_id}"),
            Some(&token),
            Some(json!({ "folder_id": null })),
        ))
        .await
        .expect("move note out of folder");
    let unfiled = test_support::read_json(response).await;
    assert!(unfiled["folder_id"].is_null());
}

#[tokio::test]
async fn deleting_folder_keeps_its_notes() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "noteuser03", UserRole::Student, "user-pass").await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/notes/folders",
            Some(&token),
            Some(json!({ "name": "Doomed" })),
        ))
        .await
        .expect("create folder");
    let folder = test_support::read_json(response).await;
    let folder_id = folder["id"].as_str().expect("folder id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/notes",
            Some(&token),
            Some(json!({ "title": "Survivor", "folder_id": folder_id })),
        ))
        .await
        .expect("create note in folder");
    let note = test_support::read_json(response).await;
    let note_id = note["id"].as_str().expect("note id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/notes/folders/{folder_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete folder");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/notes/{note_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("get note after folder deletion");

    let status = response.status();
    let survivor = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {survivor}");
    assert!(survivor["folder_id"].is_null());
}

#[tokio::test]
async fn listing_filters_by_folder() {
    let ctx = test_support::setup_test_context().await;

    let user =
        test_support::insert_user(ctx.state.db(), "noteuser04", UserRole::Student, "user-pass").await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/notes/folders",
            Some(&token),
            Some(json!({ "name": "Filtered" })),
        ))
        .await
        .expect("create folder");
    let folder = test_support::read_json(response).await;
    let folder_id = folder["id"].as_str().expect("folder id").to_string();

    for (title, in_folder) in [("Inside", true), ("Outside", false)] {
        let body = if in_folder {
            json!({ "title": title, "folder_id": folder_id })
        } else {
            json!({ "title": title })
        };
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::POST, "/api/v1/notes", Some(&token), Some(body)))
            .await
            .expect("create note");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/notes?folder_id={folder_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("list folder notes");

    let listed = test_support::read_json(response).await;
    let items = listed.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Inside");
}
