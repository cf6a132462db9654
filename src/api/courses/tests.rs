use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{CourseStatus, UserRole};
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn teacher_creates_and_deletes_course() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "courseteacher01", UserRole::Teacher, "teacher-pass")
            .await;
    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses",
            Some(&token),
            Some(json!({
                "title": "Linear Algebra",
                "description": "Vectors and matrices",
                "start_date": "2026-09-01",
                "duration_weeks": 12
            })),
        ))
        .await
        .expect("create course");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    assert_eq!(created["status"], "free");
    assert_eq!(created["teacher_id"], teacher.id);
    let course_id = created["id"].as_str().expect("course id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/courses/{course_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete course");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let found = repositories::courses::find_by_id(ctx.state.db(), &course_id)
        .await
        .expect("find course after deletion");
    assert!(found.is_none());
}

#[tokio::test]
async fn student_cannot_create_course() {
    let ctx = test_support::setup_test_context().await;

    let student =
        test_support::insert_user(ctx.state.db(), "coursestudent01", UserRole::Student, "student-pass")
            .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses",
            Some(&token),
            Some(json!({ "title": "Not Allowed", "start_date": "2026-09-01" })),
        ))
        .await
        .expect("create course as student");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn premium_course_requires_positive_price() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "courseteacher02", UserRole::Teacher, "teacher-pass")
            .await;
    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses",
            Some(&token),
            Some(json!({
                "title": "Paid Course",
                "status": "premium",
                "start_date": "2026-09-01"
            })),
        ))
        .await
        .expect("create premium course without price");

    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {error}");
    assert_eq!(error["detail"], "Premium courses require a positive price");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses",
            Some(&token),
            Some(json!({
                "title": "Paid Course",
                "status": "premium",
                "price": 49.99,
                "start_date": "2026-09-01"
            })),
        ))
        .await
        .expect("create premium course");
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn only_owner_can_update_course() {
    let ctx = test_support::setup_test_context().await;

    let owner =
        test_support::insert_user(ctx.state.db(), "courseowner01", UserRole::Teacher, "owner-pass")
            .await;
    let other =
        test_support::insert_user(ctx.state.db(), "courseother01", UserRole::Teacher, "other-pass")
            .await;
    let course =
        test_support::insert_course(ctx.state.db(), "Owned Course", &owner.id, CourseStatus::Free, None)
            .await;

    let other_token = test_support::bearer_token(&other.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/courses/{}", course.id),
            Some(&other_token),
            Some(json!({ "title": "Hijacked" })),
        ))
        .await
        .expect("update as non-owner");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let owner_token = test_support::bearer_token(&owner.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::PATCH,
            &format!("/api/v1/courses/{}", course.id),
            Some(&owner_token),
            Some(json!({ "title": "Renamed Course" })),
        ))
        .await
        .expect("update as owner");

    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["title"], "Renamed Course");
}

#[tokio::test]
async fn create_rejects_unknown_categories() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "courseteacher03", UserRole::Teacher, "teacher-pass")
            .await;
    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/courses",
            Some(&token),
            Some(json!({
                "title": "Categorized",
                "start_date": "2026-09-01",
                "category_ids": ["does-not-exist"]
            })),
        ))
        .await
        .expect("create course with bad category");

    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {error}");
    assert_eq!(error["detail"], "One or more categories do not exist");
}
