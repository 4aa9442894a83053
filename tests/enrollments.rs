mod common;

use axum::http::StatusCode;
use common::*;
use serde_json::json;

/// Instructor `tutor` with a course `course` holding one module and two lessons.
fn course_with_lessons(flow: Flow) -> Flow {
    flow.step(
        register_action("Tutor", "tutor@example.com", Some("instructor"))
            .with_save_as("tutor"),
    )
    .step(create_course_action("tutor", "Rust Course").with_save_as("course"))
    .step(
        Action::new("module", "POST", "")
            .with_dyn_path(course_path("course", "/modules"))
            .with_token("tutor")
            .with_body(json!({ "title": "Basics" }))
            .with_expect(StatusCode::CREATED)
            .with_save_as("module"),
    )
    .step(lesson_action("Ownership").with_save_as("lesson1"))
    .step(lesson_action("Borrowing").with_save_as("lesson2"))
}

fn lesson_action(title: &str) -> Action {
    Action::new("lesson", "POST", "")
        .with_dyn_path(|ctx| format!("/api/modules/{}/lessons", ctx.str_at("module", "/module/id")))
        .with_token("tutor")
        .with_body(json!({ "title": title, "content": "Text", "duration": 120 }))
        .with_expect(StatusCode::CREATED)
}

fn enroll_action(token_key: &'static str) -> Action {
    Action::new("enroll", "POST", "")
        .with_dyn_path(|ctx| {
            format!("/api/enrollments/courses/{}", ctx.str_at("course", "/course/id"))
        })
        .with_token(token_key)
}

fn lesson_progress_action(token_key: &'static str, lesson_key: &'static str) -> Action {
    Action::new("lesson_progress", "PUT", "")
        .with_dyn_path(move |ctx| {
            format!(
                "/api/enrollments/lessons/{}/progress",
                ctx.str_at(lesson_key, "/lesson/id")
            )
        })
        .with_token(token_key)
}

fn course_progress_action(token_key: &'static str) -> Action {
    Action::new("course_progress", "GET", "")
        .with_dyn_path(|ctx| {
            format!(
                "/api/enrollments/courses/{}/progress",
                ctx.str_at("course", "/course/id")
            )
        })
        .with_token(token_key)
}

#[tokio::test]
async fn enroll_rules_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    course_with_lessons(Flow::new())
        .step(register_action("Student", "student@example.com", None).with_save_as("student"))
        .step(
            enroll_action("student")
                .with_expect(StatusCode::NOT_FOUND)
                .assert_body(|body| {
                    assert_eq!(body["error"], "course not found or not available");
                }),
        )
        .sql(publish_sql("course"))
        .step(enroll_action("tutor").with_expect(StatusCode::FORBIDDEN))
        .step(
            enroll_action("student")
                .with_expect(StatusCode::CREATED)
                .assert_body(|body| {
                    assert_eq!(body["message"], "successfully enrolled in course");
                    assert_eq!(body["enrollment"]["course_title"], "Rust Course");
                    assert_eq!(body["enrollment"]["student_name"], "Student");
                    assert_eq!(body["enrollment"]["progress"], 0.0);
                }),
        )
        .step(
            enroll_action("student")
                .with_expect(StatusCode::CONFLICT)
                .assert_body(|body| assert_eq!(body["error"], "already enrolled in this course")),
        )
        .step(
            Action::new("unknown_course", "POST", "")
                .with_dyn_path(|_| format!("/api/enrollments/courses/{}", uuid::Uuid::new_v4()))
                .with_token("student")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("course_stats", "GET", "")
                .with_dyn_path(course_path("course", ""))
                .assert_body(|body| {
                    assert_eq!(body["course"]["stats"]["enrolled_students"], 1);
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn lesson_progress_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    course_with_lessons(Flow::new())
        .sql(publish_sql("course"))
        .step(register_action("Student", "student@example.com", None).with_save_as("student"))
        .step(
            lesson_progress_action("student", "lesson1")
                .with_body(json!({ "completed": true }))
                .with_expect(StatusCode::NOT_FOUND)
                .assert_body(|body| {
                    assert_eq!(body["error"], "lesson not found or access denied");
                }),
        )
        .step(enroll_action("student").with_expect(StatusCode::CREATED))
        .step(
            lesson_progress_action("student", "lesson1")
                .with_body(json!({ "watchedDuration": -5 }))
                .with_expect(StatusCode::BAD_REQUEST),
        )
        .step(
            lesson_progress_action("student", "lesson1")
                .with_body(json!({ "completed": true, "watchedDuration": 120 }))
                .assert_body(|body| {
                    assert_eq!(body["message"], "progress updated successfully");
                    assert_eq!(body["progress"]["completed"], true);
                    assert_eq!(body["progress"]["watched_duration"], 120);
                    assert!(body["progress"]["completed_at"].is_string());
                    assert_eq!(body["course_progress"], 50);
                }),
        )
        .step(course_progress_action("student").assert_body(|body| {
            assert_eq!(body["stats"]["total_lessons"], 2);
            assert_eq!(body["stats"]["completed_lessons"], 1);
            assert_eq!(body["stats"]["progress_percentage"], 50);
            let lessons = body["modules"][0]["lessons"].as_array().unwrap();
            assert_eq!(lessons.len(), 2);
            assert_eq!(lessons[0]["title"], "Ownership");
            assert_eq!(lessons[0]["completed"], true);
            assert_eq!(lessons[1]["completed"], false);
        }))
        .step(
            lesson_progress_action("student", "lesson2")
                .with_body(json!({ "completed": true }))
                .assert_body(|body| assert_eq!(body["course_progress"], 100)),
        )
        .step(
            Action::new("my_courses", "GET", "/api/enrollments/my-courses")
                .with_token("student")
                .assert_body(|body| {
                    assert_eq!(body["pagination"]["total"], 1);
                    let enrollment = &body["enrollments"][0];
                    assert_eq!(enrollment["title"], "Rust Course");
                    assert_eq!(enrollment["instructor_name"], "Tutor");
                    assert_eq!(enrollment["total_lessons"], 2);
                    assert_eq!(enrollment["completed_lessons"], 2);
                    assert_eq!(enrollment["progress"], 100);
                    assert!(enrollment["completed_at"].is_string());
                }),
        )
        .step(
            lesson_progress_action("student", "lesson2")
                .with_body(json!({ "completed": false }))
                .assert_body(|body| {
                    assert_eq!(body["course_progress"], 50);
                    assert!(body["progress"]["completed_at"].is_null());
                }),
        )
        .step(
            Action::new("my_courses_reopened", "GET", "/api/enrollments/my-courses")
                .with_token("student")
                .assert_body(|body| {
                    assert_eq!(body["enrollments"][0]["progress"], 50);
                    assert!(body["enrollments"][0]["completed_at"].is_null());
                }),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn watched_duration_overwrite_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    course_with_lessons(Flow::new())
        .sql(publish_sql("course"))
        .step(register_action("Student", "student@example.com", None).with_save_as("student"))
        .step(enroll_action("student").with_expect(StatusCode::CREATED))
        .step(
            lesson_progress_action("student", "lesson1")
                .with_body(json!({ "completed": false, "watchedDuration": 90 }))
                .assert_body(|body| assert_eq!(body["progress"]["watched_duration"], 90)),
        )
        .step(
            lesson_progress_action("student", "lesson1")
                .with_body(json!({ "completed": true }))
                .assert_body(|body| {
                    assert_eq!(body["progress"]["completed"], true);
                    assert_eq!(body["progress"]["watched_duration"], 0);
                    assert_eq!(body["course_progress"], 50);
                }),
        )
        .step(course_progress_action("student").assert_body(|body| {
            assert_eq!(body["modules"][0]["lessons"][0]["watched_duration"], 0);
        }))
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn course_progress_requires_enrollment_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    course_with_lessons(Flow::new())
        .sql(publish_sql("course"))
        .step(register_action("Student", "student@example.com", None).with_save_as("student"))
        .step(
            course_progress_action("student")
                .with_expect(StatusCode::NOT_FOUND)
                .assert_body(|body| assert_eq!(body["error"], "enrollment not found")),
        )
        .step(course_progress_action("tutor").with_expect(StatusCode::FORBIDDEN))
        .step(
            Action::new("my_courses_anonymous", "GET", "/api/enrollments/my-courses")
                .with_expect(StatusCode::UNAUTHORIZED),
        )
        .run(&mut server, db)
        .await;
}

#[tokio::test]
async fn unenroll_test() {
    let db = setup_test_db().await;
    let mut server = setup_server(&db).await;

    course_with_lessons(Flow::new())
        .sql(publish_sql("course"))
        .step(register_action("Student", "student@example.com", None).with_save_as("student"))
        .step(register_action("Intruder", "intruder@example.com", None).with_save_as("intruder"))
        .step(
            enroll_action("student")
                .with_expect(StatusCode::CREATED)
                .with_save_as("enrollment"),
        )
        .step(
            lesson_progress_action("student", "lesson1")
                .with_body(json!({ "completed": true })),
        )
        .step(
            Action::new("foreign_unenroll", "DELETE", "")
                .with_dyn_path(|ctx| {
                    format!("/api/enrollments/{}", ctx.str_at("enrollment", "/enrollment/id"))
                })
                .with_token("intruder")
                .with_expect(StatusCode::FORBIDDEN),
        )
        .step(
            Action::new("unenroll", "DELETE", "")
                .with_dyn_path(|ctx| {
                    format!("/api/enrollments/{}", ctx.str_at("enrollment", "/enrollment/id"))
                })
                .with_token("student")
                .assert_body(|body| {
                    assert_eq!(body["message"], "successfully unenrolled from course");
                }),
        )
        .step(
            Action::new("unenroll_again", "DELETE", "")
                .with_dyn_path(|ctx| {
                    format!("/api/enrollments/{}", ctx.str_at("enrollment", "/enrollment/id"))
                })
                .with_token("student")
                .with_expect(StatusCode::NOT_FOUND),
        )
        .step(
            Action::new("my_courses_empty", "GET", "/api/enrollments/my-courses")
                .with_token("student")
                .assert_body(|body| {
                    assert_eq!(body["pagination"]["total"], 0);
                    assert!(body["enrollments"].as_array().unwrap().is_empty());
                }),
        )
        .step(course_progress_action("student").with_expect(StatusCode::NOT_FOUND))
        .run(&mut server, db)
        .await;
}
