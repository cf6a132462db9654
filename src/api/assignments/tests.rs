use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::models::{Course, User};
use crate::db::types::{CourseStatus, SubmissionStatus, UserRole};
use crate::repositories;
use crate::test_support;

async fn course_with_enrolled_student(
    ctx: &test_support::TestContext,
    suffix: &str,
) -> (User, User, Course) {
    let teacher = test_support::insert_user(
        ctx.state.db(),
        &format!("asgteacher{suffix}"),
        UserRole::Teacher,
        "teacher-pass",
    )
    .await;
    let student = test_support::insert_user(
        ctx.state.db(),
        &format!("asgstudent{suffix}"),
        UserRole::Student,
        "student-pass",
    )
    .await;
    let course = test_support::insert_course(
        ctx.state.db(),
        &format!("Assignment Course {suffix}"),
        &teacher.id,
        CourseStatus::Free,
        None,
    )
    .await;
    test_support::enroll_student(ctx.state.db(), &course.id, &student.id).await;
    (teacher, student, course)
}

#[tokio::test]
async fn create_fans_out_placeholders_to_enrolled_students() {
    let ctx = test_support::setup_test_context().await;
    let (teacher, student, course) = course_with_enrolled_student(&ctx, "01").await;

    let token = test_support::bearer_token(&teacher.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/assignments",
            Some(&token),
            Some(json!({
                "course_id": course.id,
                "title": "Essay 1",
                "description": "Write an essay"
            })),
        ))
        .await
        .expect("create assignment");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    let assignment_id = created["id"].as_str().expect("assignment id");

    let submission =
        repositories::submissions::find_for_student(ctx.state.db(), assignment_id, &student.id)
            .await
            .expect("find submission")
            .expect("placeholder exists");
    assert_eq!(submission.status, SubmissionStatus::Assigned);
}

#[tokio::test]
async fn submit_grade_and_resubmit_after_return() {
    let ctx = test_support::setup_test_context().await;
    let (teacher, student, course) = course_with_enrolled_student(&ctx, "02").await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, &teacher.id, "Essay 2").await;
    crate::api::enrollments::backfill_submissions(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("backfill");

    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());
    let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            Method::POST,
            &format!("/api/v1/assignments/{}/submit", assignment.id),
            Some(&student_token),
            &[("comment", "Here is my essay")],
        ))
        .await
        .expect("submit");

    let status = response.status();
    let submitted = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {submitted}");
    assert_eq!(submitted["status"], "submitted");
    assert_eq!(submitted["comment"], "Here is my essay");
    let submission_id = submitted["id"].as_str().expect("submission id").to_string();

    // A second submit while pending is rejected.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            Method::POST,
            &format!("/api/v1/assignments/{}/submit", assignment.id),
            Some(&student_token),
            &[("comment", "Again")],
        ))
        .await
        .expect("double submit");
    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {error}");
    assert_eq!(error["detail"], "Submission has already been submitted");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/assignments/submissions/{submission_id}/return"),
            Some(&teacher_token),
            Some(json!({ "feedback": "Please expand section two" })),
        ))
        .await
        .expect("return submission");
    let status = response.status();
    let returned = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {returned}");
    assert_eq!(returned["status"], "returned");
    assert_eq!(returned["feedback"], "Please expand section two");

    // Returned work can be submitted again.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            Method::POST,
            &format!("/api/v1/assignments/{}/submit", assignment.id),
            Some(&student_token),
            &[("comment", "Expanded as requested")],
        ))
        .await
        .expect("resubmit");
    let status = response.status();
    let resubmitted = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {resubmitted}");
    assert_eq!(resubmitted["status"], "submitted");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/assignments/submissions/{submission_id}/grade"),
            Some(&teacher_token),
            Some(json!({ "grade": 92.5, "feedback": "Well done" })),
        ))
        .await
        .expect("grade submission");
    let status = response.status();
    let graded = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {graded}");
    assert_eq!(graded["status"], "graded");
    assert_eq!(graded["grade"], 92.5);
}

#[tokio::test]
async fn grading_unsubmitted_work_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let (teacher, student, course) = course_with_enrolled_student(&ctx, "03").await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, &teacher.id, "Essay 3").await;
    crate::api::enrollments::backfill_submissions(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("backfill");

    let submission =
        repositories::submissions::find_for_student(ctx.state.db(), &assignment.id, &student.id)
            .await
            .expect("find submission")
            .expect("placeholder");

    let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/assignments/submissions/{}/grade", submission.id),
            Some(&teacher_token),
            Some(json!({ "grade": 80.0 })),
        ))
        .await
        .expect("grade placeholder");

    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {error}");
    assert_eq!(error["detail"], "Nothing has been submitted yet");
}

#[tokio::test]
async fn cancel_reverts_submission_to_assigned() {
    let ctx = test_support::setup_test_context().await;
    let (teacher, student, course) = course_with_enrolled_student(&ctx, "04").await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, &teacher.id, "Essay 4").await;
    crate::api::enrollments::backfill_submissions(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("backfill");

    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    // Cancel before submitting is a conflict.
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/assignments/{}/cancel", assignment.id),
            Some(&student_token),
            None,
        ))
        .await
        .expect("cancel placeholder");
    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CONFLICT, "response: {error}");
    assert_eq!(error["detail"], "Only submitted work can be cancelled");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            Method::POST,
            &format!("/api/v1/assignments/{}/submit", assignment.id),
            Some(&student_token),
            &[("comment", "Draft")],
        ))
        .await
        .expect("submit");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/assignments/{}/cancel", assignment.id),
            Some(&student_token),
            None,
        ))
        .await
        .expect("cancel");

    let status = response.status();
    let cancelled = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {cancelled}");
    assert_eq!(cancelled["status"], "assigned");
}

#[tokio::test]
async fn student_list_hides_grade_until_graded() {
    let ctx = test_support::setup_test_context().await;
    let (teacher, student, course) = course_with_enrolled_student(&ctx, "05").await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, &teacher.id, "Essay 5").await;
    crate::api::enrollments::backfill_submissions(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("backfill");

    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());
    let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            Method::POST,
            &format!("/api/v1/assignments/{}/submit", assignment.id),
            Some(&student_token),
            &[("comment", "My answer")],
        ))
        .await
        .expect("submit");
    let submitted = test_support::read_json(response).await;
    let submission_id = submitted["id"].as_str().expect("submission id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/assignments/course/{}/student", course.id),
            Some(&student_token),
            None,
        ))
        .await
        .expect("student list before grading");
    let listed = test_support::read_json(response).await;
    assert_eq!(listed[0]["status"], "submitted");
    assert!(listed[0]["grade"].is_null());
    assert!(listed[0]["feedback"].is_null());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/assignments/submissions/{submission_id}/grade"),
            Some(&teacher_token),
            Some(json!({ "grade": 75.0, "feedback": "Solid" })),
        ))
        .await
        .expect("grade");
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/assignments/course/{}/student", course.id),
            Some(&student_token),
            None,
        ))
        .await
        .expect("student list after grading");
    let listed = test_support::read_json(response).await;
    assert_eq!(listed[0]["status"], "graded");
    assert_eq!(listed[0]["grade"], 75.0);
    assert_eq!(listed[0]["feedback"], "Solid");
}

#[tokio::test]
async fn teacher_detail_reports_status_counts() {
    let ctx = test_support::setup_test_context().await;
    let (teacher, student, course) = course_with_enrolled_student(&ctx, "06").await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, &teacher.id, "Essay 6").await;
    crate::api::enrollments::backfill_submissions(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("backfill");

    let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/assignments/{}", assignment.id),
            Some(&teacher_token),
            None,
        ))
        .await
        .expect("teacher detail");

    let status = response.status();
    let detail = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {detail}");
    assert_eq!(detail["status_counts"]["assigned"], 1);
    assert_eq!(detail["status_counts"]["submitted"], 0);
}

#[tokio::test]
async fn rejects_blank_title_bad_link_and_out_of_scale_grade() {
    let ctx = test_support::setup_test_context().await;
    let (teacher, student, course) = course_with_enrolled_student(&ctx, "08").await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, &teacher.id, "Essay 8").await;
    crate::api::enrollments::backfill_submissions(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("backfill");

    let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());
    let student_token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/v1/assignments",
            Some(&teacher_token),
            Some(json!({ "course_id": course.id, "title": "" })),
        ))
        .await
        .expect("create with blank title");
    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {error}");
    assert!(error["detail"].as_str().expect("detail").contains("title"));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/assignments/{}/links", assignment.id),
            Some(&teacher_token),
            Some(json!([{ "link_url": "ftp://example.com/reading" }])),
        ))
        .await
        .expect("add ftp link");
    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {error}");
    assert!(error["detail"].as_str().expect("detail").contains("link_url"));

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            Method::POST,
            &format!("/api/v1/assignments/{}/submit", assignment.id),
            Some(&student_token),
            &[("comment", "Done")],
        ))
        .await
        .expect("submit");
    let submitted = test_support::read_json(response).await;
    let submission_id = submitted["id"].as_str().expect("submission id");

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/v1/assignments/submissions/{submission_id}/grade"),
            Some(&teacher_token),
            Some(json!({ "grade": 150.0 })),
        ))
        .await
        .expect("grade out of scale");
    let status = response.status();
    let error = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {error}");
    assert!(error["detail"].as_str().expect("detail").contains("grade must be between 0 and 100"));
}

#[tokio::test]
async fn deleting_assignment_removes_submissions() {
    let ctx = test_support::setup_test_context().await;
    let (teacher, student, course) = course_with_enrolled_student(&ctx, "09").await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, &teacher.id, "Essay 9").await;
    crate::api::enrollments::backfill_submissions(ctx.state.db(), &course.id, &student.id)
        .await
        .expect("backfill");

    let teacher_token = test_support::bearer_token(&teacher.id, ctx.state.settings());
    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/v1/assignments/{}", assignment.id),
            Some(&teacher_token),
            None,
        ))
        .await
        .expect("delete assignment");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let submission =
        repositories::submissions::find_for_student(ctx.state.db(), &assignment.id, &student.id)
            .await
            .expect("find submission");
    assert!(submission.is_none(), "submissions must go with their assignment");
}

#[tokio::test]
async fn outsider_teacher_cannot_list_submissions() {
    let ctx = test_support::setup_test_context().await;
    let (teacher, _student, course) = course_with_enrolled_student(&ctx, "07").await;
    let assignment =
        test_support::insert_assignment(ctx.state.db(), &course.id, &teacher.id, "Essay 7").await;

    let outsider =
        test_support::insert_user(ctx.state.db(), "asgoutsider07", UserRole::Teacher, "outsider-pass")
            .await;
    let token = test_support::bearer_token(&outsider.id, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/v1/assignments/{}/submissions", assignment.id),
            Some(&token),
            None,
        ))
        .await
        .expect("list submissions as outsider");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
