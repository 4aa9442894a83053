use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, PaginatableRepository, ResourceTyped, check_access,
        entity::{Course, CourseFilter, CourseLevel, CourseStats, CourseSummary, ModuleSummary},
    },
    web::{
        AppState, AuthenticatedUser, ErrorResponse, RequestContext, UserRole, WebError,
        WebResult,
        dto::{
            MessageResponse,
            courses::{
                ApproveBody, CourseCreateBody, CourseDetail, CourseDetailResponse,
                CourseListQuery, CourseResponse, CourseUpdateBody, CoursesResponse, PublishBody,
            },
        },
        extract::{Json, Path, Query},
        middlewares,
        routes::content,
        validation::Validator,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let catalogue = Router::new()
        .route("/", get(course_list_handler))
        .route("/{id}", get(course_get_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::optional_context_fn,
        ));

    let management = Router::new()
        .route("/", post(course_create_handler))
        .route("/{id}", put(course_update_handler).delete(course_delete_handler))
        .route("/{id}/approve", patch(course_approve_handler))
        .route("/{id}/publish", patch(course_publish_handler))
        .route("/{id}/modules", post(content::module_create_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    catalogue.merge(management).with_state(state)
}

async fn find_course(state: &AppState, actor: &AuthenticatedUser, id: Uuid) -> WebResult<Course> {
    Course::find_by_id(state.pool(), actor, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseCreateBody,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "Only instructors and admins create courses", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
#[tracing::instrument(skip_all)]
pub async fn course_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<CourseCreateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.authorize(&[UserRole::Instructor, UserRole::Admin])?;
    let payload = payload.validate()?;

    let created = Course::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    tracing::info!(course = %created.id(), instructor = %user.user_id(), "course created");

    Ok((
        StatusCode::CREATED,
        Json(CourseResponse {
            message: String::from("course created successfully"),
            course: created,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseListQuery),
    description = "Published courses, newest first. Admins also see unpublished ones.",
    responses(
        (status = 200, description = "Requested page", body = CoursesResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    ),
    tag = "courses"
)]
pub async fn course_list_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> WebResult<impl IntoResponse> {
    let mut v = Validator::new();
    let level = query.level.as_deref().and_then(|level| {
        v.one_of(
            "level",
            level,
            CourseLevel::parse,
            &["beginner", "intermediate", "advanced"],
        )
    });
    v.finish()?;

    let filter = CourseFilter {
        category: query.category.clone(),
        level,
        instructor_id: query.instructor_id,
        include_unpublished: ctx.is_admin(),
    };

    // anonymous visitors read as the system actor, visibility is decided by the filter
    let actor = ctx
        .maybe_user()
        .cloned()
        .unwrap_or_else(AuthenticatedUser::admin);

    let page = CourseSummary::page(state.pool(), &actor, &filter, query.page_query())
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok(Json(CoursesResponse {
        courses: page.items,
        pagination: page.pagination,
    }))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course with modules and stats", body = CourseDetailResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses"
)]
pub async fn course_get_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let actor = ctx
        .maybe_user()
        .cloned()
        .unwrap_or_else(AuthenticatedUser::admin);

    let course = find_course(&state, &actor, id).await?;

    let (modules, stats) = tokio::try_join!(
        ModuleSummary::all_by_course(state.pool(), &actor, id),
        CourseStats::fetch(state.pool(), &actor, id),
    )
    .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    Ok(Json(CourseDetailResponse {
        course: CourseDetail {
            course,
            modules,
            stats,
        },
    }))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = CourseUpdateBody,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn course_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CourseUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = find_course(&state, user, id).await?;

    check_access(state.pool(), user, &course, user.user_id())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    let payload = payload.validate()?;
    let updated = course
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    Ok(Json(CourseResponse {
        message: String::from("course updated successfully"),
        course: updated,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    description = "Deletes the course with its modules, lessons and enrollments",
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn course_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = find_course(&state, user, id).await?;

    check_access(state.pool(), user, &course, user.user_id())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    course
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    tracing::info!(course = %id, "course deleted");
    Ok(Json(MessageResponse::new("course deleted successfully")))
}

#[utoipa::path(
    patch,
    path = "/api/courses/{id}/approve",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = ApproveBody,
    responses(
        (status = 200, description = "Approval changed", body = CourseResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "Admins only", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn course_approve_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.authorize(&[UserRole::Admin])?;

    let course = find_course(&state, user, id)
        .await?
        .set_approved(state.pool(), user, payload.approved)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let message = if payload.approved {
        "course approved successfully"
    } else {
        "course rejected successfully"
    };

    Ok(Json(CourseResponse {
        message: String::from(message),
        course,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/courses/{id}/publish",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = PublishBody,
    responses(
        (status = 200, description = "Publication changed", body = CourseResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn course_publish_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PublishBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let course = find_course(&state, user, id).await?;

    check_access(state.pool(), user, &course, user.user_id())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    let course = course
        .set_published(state.pool(), user, payload.published)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?;

    let message = if payload.published {
        "course published successfully"
    } else {
        "course unpublished successfully"
    };

    Ok(Json(CourseResponse {
        message: String::from(message),
        course,
    }))
}
