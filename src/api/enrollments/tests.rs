use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{CourseStatus, SubmissionStatus, UserRole};
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn student_enrolls_in_free_course_once() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "enrollteacher01", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "enrollstudent01", UserRole::Student, "student-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Open Course",
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": course.id })),
        ))
        .await
        .expect("enroll");
    assert_eq!(response.status(), StatusCode::CREATED);

    let enrolled = repositories::enrollments::exists(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("check enrollment");
    assert!(enrolled);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": course.id })),
        ))
        .await
        .expect("enroll again");

    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {error}");
    assert_eq!(error["detail"], "Already enrolled in this course");
}

#[tokio::test]
async fn premium_course_cannot_be_enrolled_directly() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "enrollteacher02", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "enrollstudent02", UserRole::Student, "student-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Paid Course",
        &teacher.id,
        CourseStatus::Premium,
        Some(99.0),
    )
    .await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": course.id })),
        ))
        .await
        .expect("enroll in premium course");

    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {error}");
    assert_eq!(error["detail"], "This course requires a purchase to enroll");
}

#[tokio::test]
async fn enrollment_backfills_existing_assignments() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "enrollteacher03", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "enrollstudent03", UserRole::Student, "student-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Backfill Course",
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, &teacher.id, "Homework 1").await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": course.id })),
        ))
        .await
        .expect("enroll");
    assert_eq!(response.status(), StatusCode::CREATED);

    let submission =
        repositories::submissions::find_for_student(ctx.state.db(), &assignment.id, &student.id)
            .await
            .expect("find submission")
            .expect("placeholder exists");
    assert_eq!(submission.status, SubmissionStatus::Assigned);
}

#[tokio::test]
async fn teacher_cannot_enroll() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "enrollteacher04", UserRole::Teacher, "teacher-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Teacher Course",
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/enrollments",
            Some(&token),
            Some(json!({ "course_id": course.id })),
        ))
        .await
        .expect("enroll as teacher");

    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::FORBIDDEN, "response: {error}");
    assert_eq!(error["detail"], "Only students can enroll");
}
