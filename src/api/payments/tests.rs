use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{CourseStatus, UserRole};
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn purchase_enrolls_and_records_transaction() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "payteacher01", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "paystudent01", UserRole::Student, "student-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Premium Rust",
        &teacher.id,
        CourseStatus::Premium,
        Some(120.0),
    )
    .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/payments/purchase",
            Some(&token),
            Some(json!({ "course_id": course.id })),
        ))
        .await
        .expect("purchase");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {body}");
    assert_eq!(body["transaction"]["amount"], 120.0);
    assert_eq!(body["transaction"]["description"], "Purchase of course 'Premium Rust'");
    assert!(body["enrollment_id"].as_str().is_some());

    let enrolled = repositories::enrollments::exists(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("check enrollment");
    assert!(enrolled);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/payments/history/{}", student.id),
            Some(&token),
            None,
        ))
        .await
        .expect("history");

    let status = response.status();
    let history = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {history}");
    assert_eq!(history.as_array().expect("array").len(), 1);
}

#[tokio::test]
async fn free_course_purchase_is_rejected() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "payteacher02", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "paystudent02", UserRole::Student, "student-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Free Intro",
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/payments/purchase",
            Some(&token),
            Some(json!({ "course_id": course.id })),
        ))
        .await
        .expect("purchase free course");

    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {error}");
    assert_eq!(error["detail"], "Free courses do not require a purchase");
}

#[tokio::test]
async fn history_is_private_to_owner_and_admin() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "paystudent03", UserRole::Student, "student-pass")
            .await;
    let other =
        test_support::insert_user(ctx.state.db(), "paystudent04", UserRole::Student, "other-pass")
            .await;
    let admin =
        test_support::insert_user(ctx.state.db(), "payadmin01", UserRole::Admin, "admin-pass").await;

    let other_token = test_support::bearer_token(&other.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/payments/history/{}", student.id),
            Some(&other_token),
            None,
        ))
        .await
        .expect("history as other student");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/payments/history/{}", student.id),
            Some(&admin_token),
            None,
        ))
        .await
        .expect("history as admin");
    assert_eq!(response.status(), StatusCode::OK);
}
