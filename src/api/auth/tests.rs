use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::test_support;

#[tokio::test]
async fn signup_login_me_flow() {
    let ctx = test_support::setup_test_context().await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(json!({
                "username": "newstudent01",
                "email": "newstudent01@example.com",
                "password": "correct-horse",
                "first_name": "New",
                "last_name": "Student"
            })),
        ))
        .await
        .expect("signup");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["user"]["username"], "newstudent01");
    assert_eq!(created["user"]["role"], "student");
    assert_eq!(created["token_type"], "bearer");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "newstudent01", "password": "correct-horse" })),
        ))
        .await
        .expect("login");

    let status = response.status();
    let login = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {login}");
    let token = login["access_token"].as_str().expect("access token");

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", Some(token), None))
        .await
        .expect("me");

    let status = response.status();
    let me = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {me}");
    assert_eq!(me["username"], "newstudent01");
    assert_eq!(me["email"], "newstudent01@example.com");
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let ctx = test_support::setup_test_context().await;

    let payload = json!({
        "username": "dupuser01",
        "email": "dupuser01@example.com",
        "password": "correct-horse",
        "first_name": "Dup",
        "last_name": "User"
    });

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(payload.clone()),
        ))
        .await
        .expect("first signup");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::POST, "/api/v1/auth/signup", None, Some(payload)))
        .await
        .expect("second signup");

    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {error}");
    assert_eq!(error["detail"], "User with this username or email already exists");
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let ctx = test_support::setup_test_context().await;

    test_support::insert_user(
        ctx.state.db(),
        "loginuser01",
        crate::db::types::UserRole::Student,
        "right-password",
    )
    .await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "loginuser01", "password": "wrong-password" })),
        ))
        .await
        .expect("login");

    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "response: {error}");
    assert_eq!(error["detail"], "Incorrect username or password");
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let ctx = test_support::setup_test_context().await;

    let user = test_support::insert_user(
        ctx.state.db(),
        "pwuser01",
        crate::db::types::UserRole::Student,
        "old-password",
    )
    .await;
    let token = test_support::bearer_token(&user.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/change-password",
            Some(&token),
            Some(json!({ "current_password": "not-the-password", "new_password": "brand-new-password" })),
        ))
        .await
        .expect("change password with wrong current");

    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {error}");
    assert_eq!(error["detail"], "Current password is incorrect");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/change-password",
            Some(&token),
            Some(json!({ "current_password": "old-password", "new_password": "brand-new-password" })),
        ))
        .await
        .expect("change password");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "username": "pwuser01", "password": "brand-new-password" })),
        ))
        .await
        .expect("login with new password");
    assert_eq!(response.status(), StatusCode::OK);
}
