use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use uuid::Uuid;

use crate::{
    model::{
        PaginatableRepository, ResourceTyped, check_access,
        entity::{
            Course, Enrollment, EnrollmentDetail, EnrollmentFilter, EnrollmentSummary, Lesson,
            LessonProgress,
        },
        progress::CourseProgress,
    },
    web::{
        AppState, ErrorResponse, RequestContext, UserRole, WebError, WebResult,
        dto::{
            MessageResponse,
            enrollments::{
                EnrollmentResponse, LessonProgressBody, LessonProgressResponse, MyCourse,
                MyCoursesQuery, MyCoursesResponse,
            },
        },
        extract::{Json, Path, Query},
        middlewares,
    },
};

const ENROLLING_ROLES: [UserRole; 2] = [UserRole::Student, UserRole::Admin];

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/courses/{course_id}", post(enroll_handler))
        .route("/my-courses", get(my_courses_handler))
        .route("/courses/{course_id}/progress", get(course_progress_handler))
        .route("/lessons/{lesson_id}/progress", put(lesson_progress_handler))
        .route("/{id}", delete(unenroll_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/enrollments/courses/{course_id}",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 201, description = "Enrolled", body = EnrollmentResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "Students only", body = ErrorResponse),
        (status = 404, description = "Course not found or not available", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn enroll_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.authorize(&ENROLLING_ROLES)?;

    let course = Course::find_published(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;
    if course.is_none() {
        return Err(WebError::resource_unavailable(
            Course::get_resource_type(),
            "course not found or not available",
        ));
    }

    let existing =
        Enrollment::find_by_student_course(state.pool(), user, user.user_id(), course_id)
            .await
            .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;
    if existing.is_some() {
        return Err(WebError::resource_conflict(
            Enrollment::get_resource_type(),
            "already enrolled in this course",
        ));
    }

    let enrollment = Enrollment::enroll(state.pool(), user, course_id)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                WebError::resource_conflict(
                    Enrollment::get_resource_type(),
                    "already enrolled in this course",
                )
            } else {
                WebError::resource_fetch_error(Enrollment::get_resource_type(), e)
            }
        })?;

    let detail = EnrollmentDetail::find_by_id(state.pool(), user, enrollment.id())
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Enrollment::get_resource_type()))?;

    tracing::info!(student = %user.user_id(), course = %course_id, "student enrolled");

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentResponse {
            message: String::from("successfully enrolled in course"),
            enrollment: detail,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/my-courses",
    params(MyCoursesQuery),
    responses(
        (status = 200, description = "Enrollments of the current student", body = MyCoursesResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "Students only", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn my_courses_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(query): Query<MyCoursesQuery>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.authorize(&ENROLLING_ROLES)?;

    let filter = EnrollmentFilter {
        student_id: user.user_id(),
    };
    let page = EnrollmentSummary::page(state.pool(), user, &filter, query.page_query())
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok(Json(MyCoursesResponse {
        enrollments: page.items.into_iter().map(MyCourse::from).collect(),
        pagination: page.pagination,
    }))
}

#[utoipa::path(
    get,
    path = "/api/enrollments/courses/{course_id}/progress",
    params(("course_id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Per-lesson progress grouped by module", body = CourseProgress),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn course_progress_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.authorize(&ENROLLING_ROLES)?;

    let enrollment =
        Enrollment::find_by_student_course(state.pool(), user, user.user_id(), course_id)
            .await
            .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;
    if enrollment.is_none() {
        return Err(WebError::resource_unavailable(
            Enrollment::get_resource_type(),
            "enrollment not found",
        ));
    }

    let progress = CourseProgress::fetch(state.pool(), user.user_id(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok(Json(progress))
}

#[utoipa::path(
    put,
    path = "/api/enrollments/lessons/{lesson_id}/progress",
    params(("lesson_id" = Uuid, Path, description = "Lesson id")),
    request_body = LessonProgressBody,
    responses(
        (status = 200, description = "Progress recorded", body = LessonProgressResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 404, description = "Lesson not found or access denied", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn lesson_progress_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(lesson_id): Path<Uuid>,
    Json(payload): Json<LessonProgressBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.authorize(&ENROLLING_ROLES)?;
    let payload = payload.validate(lesson_id)?;

    let course_id = Lesson::enrolled_course_id(state.pool(), user, lesson_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_unavailable(
            Lesson::get_resource_type(),
            "lesson not found or access denied",
        ))?;

    let mut tx = state
        .pool()
        .begin()
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    let progress = LessonProgress::upsert(&mut *tx, user, payload)
        .await
        .map_err(|e| WebError::resource_fetch_error(LessonProgress::get_resource_type(), e))?;

    let course_progress = Enrollment::recalculate_progress(&mut *tx, user.user_id(), course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    tx.commit()
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e.into()))?;

    Ok(Json(LessonProgressResponse {
        message: String::from("progress updated successfully"),
        progress,
        course_progress: course_progress.round() as i32,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/enrollments/{id}",
    params(("id" = Uuid, Path, description = "Enrollment id")),
    responses(
        (status = 200, description = "Unenrolled", body = MessageResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "Not your enrollment", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse),
    ),
    tag = "enrollments",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn unenroll_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.authorize(&ENROLLING_ROLES)?;

    let enrollment = Enrollment::find_by_id(state.pool(), user, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Enrollment::get_resource_type()))?;

    check_access(state.pool(), user, &enrollment, user.user_id())
        .await
        .map_err(|e| WebError::from_database(Enrollment::get_resource_type(), e))?;

    enrollment
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Enrollment::get_resource_type(), e))?;

    Ok(Json(MessageResponse::new("successfully unenrolled from course")))
}
