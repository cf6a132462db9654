use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{CourseStatus, UserRole};
use crate::test_support;

#[tokio::test]
async fn completing_all_lessons_completes_module() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "progteacher01", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "progstudent01", UserRole::Student, "student-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Progress Course",
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Module 1").await;
    let lesson_a = test_support::insert_lesson(ctx.state.db(), &module.id, "Lesson A").await;
    let lesson_b = test_support::insert_lesson(ctx.state.db(), &module.id, "Lesson B").await;
    test_support::enroll_student(ctx.state.db(), &course.id, &student.id).await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/progress/lessons/{}/complete", lesson_a.id),
            Some(&token),
            None,
        ))
        .await
        .expect("complete first lesson");
    let status = response.status();
    let first = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {first}");
    assert_eq!(first["module_completed"], false);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/progress/lessons/{}/complete", lesson_b.id),
            Some(&token),
            None,
        ))
        .await
        .expect("complete second lesson");
    let second = test_support::read_json(response).await;
    assert_eq!(second["module_completed"], true);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/progress/courses/{}", course.id),
            Some(&token),
            None,
        ))
        .await
        .expect("course progress");
    let progress = test_support::read_json(response).await;
    assert_eq!(progress["total_modules"], 1);
    assert_eq!(progress["completed_modules"], 1);
    assert_eq!(progress["completed_lessons"], 2);
}

#[tokio::test]
async fn lesson_completion_is_idempotent() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "progteacher02", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "progstudent02", UserRole::Student, "student-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Idempotent Course",
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Module 1").await;
    let lesson = test_support::insert_lesson(ctx.state.db(), &module.id, "Only Lesson").await;
    test_support::insert_lesson(ctx.state.db(), &module.id, "Other Lesson").await;
    test_support::enroll_student(ctx.state.db(), &course.id, &student.id).await;

    let token = test_support::bearer_token(&student.id, ctx.state.settings());
    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/v1/progress/lessons/{}/complete", lesson.id),
                Some(&token),
                None,
            ))
            .await
            .expect("complete lesson");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/progress/courses/{}", course.id),
            Some(&token),
            None,
        ))
        .await
        .expect("course progress");
    let progress = test_support::read_json(response).await;
    assert_eq!(progress["completed_lessons"], 1);
    assert_eq!(progress["completed_modules"], 0);
}

#[tokio::test]
async fn new_lesson_reopens_completed_module() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "progteacher03", UserRole::Teacher, "teacher-pass")
            .await;
    let student =
        test_support::insert_user(ctx.state.db(), "progstudent03", UserRole::Student, "student-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Reopen Course",
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Module 1").await;
    let lesson = test_support::insert_lesson(ctx.state.db(), &module.id, "Lesson A").await;
    test_support::enroll_student(ctx.state.db(), &course.id, &student.id).await;

    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/progress/lessons/{}/complete", lesson.id),
            Some(&student_token),
            None,
        ))
        .await
        .expect("complete lesson");
    let completed = test_support::read_json(response).await;
    assert_eq!(completed["module_completed"], true);

    let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/lessons",
            Some(&teacher_token),
            Some(json!({
                "module_id": module.id,
                "title": "Lesson B",
                "content": "New material"
            })),
        ))
        .await
        .expect("create lesson");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/progress/courses/{}", course.id),
            Some(&student_token),
            None,
        ))
        .await
        .expect("course progress after new lesson");
    let progress = test_support::read_json(response).await;
    assert_eq!(progress["completed_modules"], 0);
    assert_eq!(progress["completed_lessons"], 1);
}

#[tokio::test]
async fn progress_requires_enrollment() {
    let ctx = test_support::setup_test_context().await;

    let teacher =
        test_support::insert_user(ctx.state.db(), "progteacher04", UserRole::Teacher, "teacher-pass")
            .await;
    let outsider =
        test_support::insert_user(ctx.state.db(), "progstudent04", UserRole::Student, "student-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Locked Course",
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Module 1").await;
    let lesson = test_support::insert_lesson(ctx.state.db(), &module.id, "Lesson A").await;

    let token = test_support::bearer_token(&outsider.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/progress/lessons/{}/complete", lesson.id),
            Some(&token),
            None,
        ))
        .await
        .expect("complete without enrollment");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
