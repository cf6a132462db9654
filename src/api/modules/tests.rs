use axum::http::{Method, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::types::{CourseStatus, FileKind, UserRole};
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn deleting_module_removes_lessons_and_attachments() {
    let ctx = test_support::setup_test_context().await;
    let teacher =
        test_support::insert_user(ctx.state.db(), "modteacher01", UserRole::Teacher, "teacher-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Module Course 01",
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Week 1").await;
    let lesson = test_support::insert_lesson(ctx.state.db(), &module.id, "Intro").await;

    repositories::lessons::add_file(
        ctx.state.db(),
        &Uuid::new_v4().to_string(),
        &lesson.id,
        "https://files.example.com/intro.pdf",
        FileKind::Pdf,
        1024,
        primitive_now_utc(),
    )
    .await
    .expect("insert lesson file");
    repositories::lessons::add_link(
        ctx.state.db(),
        &Uuid::new_v4().to_string(),
        &lesson.id,
        "https://example.com/reading",
        "Reading",
        primitive_now_utc(),
    )
    .await
    .expect("insert lesson link");

    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/modules/{}", module.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete module");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let lessons: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lessons WHERE module_id = $1")
        .bind(&module.id)
        .fetch_one(ctx.state.db())
        .await
        .expect("count lessons");
    assert_eq!(lessons, 0);

    let files: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lesson_files WHERE lesson_id = $1")
        .bind(&lesson.id)
        .fetch_one(ctx.state.db())
        .await
        .expect("count lesson files");
    assert_eq!(files, 0);

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM lesson_links WHERE lesson_id = $1")
        .bind(&lesson.id)
        .fetch_one(ctx.state.db())
        .await
        .expect("count lesson links");
    assert_eq!(links, 0);
}

#[tokio::test]
async fn outsider_teacher_cannot_delete_module() {
    let ctx = test_support::setup_test_context().await;
    let teacher =
        test_support::insert_user(ctx.state.db(), "modteacher02", UserRole::Teacher, "teacher-pass")
            .await;
    let outsider =
        test_support::insert_user(ctx.state.db(), "modoutsider02", UserRole::Teacher, "outsider-pass")
            .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        "Module Course 02",
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    let module = test_support::insert_module(ctx.state.db(), &course.id, "Week 1").await;

    let token = test_support::bearer_token(&outsider.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/modules/{}", module.id),
            Some(&token),
            None,
        ))
        .await
        .expect("delete module as outsider");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
