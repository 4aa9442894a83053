//! Curriculum management: modules of a course and lessons of a module.
//! Only the course instructor (or an admin) may change them.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{post, put},
};
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceTyped, check_access,
        entity::{Course, Lesson, Module},
    },
    web::{
        AppState, AuthenticatedUser, ErrorResponse, RequestContext, WebError, WebResult,
        dto::{
            MessageResponse,
            content::{
                LessonCreateBody, LessonResponse, LessonUpdateBody, ModuleCreateBody,
                ModuleResponse, ModuleUpdateBody,
            },
        },
        extract::{Json, Path},
        middlewares,
    },
};

pub fn module_routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/{id}",
            put(module_update_handler).delete(module_delete_handler),
        )
        .route("/{id}/lessons", post(lesson_create_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

pub fn lesson_routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route(
            "/{id}",
            put(lesson_update_handler).delete(lesson_delete_handler),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

async fn find_module(state: &AppState, actor: &AuthenticatedUser, id: Uuid) -> WebResult<Module> {
    let module = Module::find_by_id(state.pool(), actor, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Module::get_resource_type()))?;

    check_access(state.pool(), actor, &module, actor.user_id())
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    Ok(module)
}

async fn find_lesson(state: &AppState, actor: &AuthenticatedUser, id: Uuid) -> WebResult<Lesson> {
    let lesson = Lesson::find_by_id(state.pool(), actor, id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Lesson::get_resource_type()))?;

    check_access(state.pool(), actor, &lesson, actor.user_id())
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    Ok(lesson)
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/modules",
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = ModuleCreateBody,
    responses(
        (status = 201, description = "Module created", body = ModuleResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
    ),
    tag = "content",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn module_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(payload): Json<ModuleCreateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let course = Course::find_by_id(state.pool(), user, course_id)
        .await
        .map_err(|e| WebError::resource_fetch_error(Course::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(Course::get_resource_type()))?;

    check_access(state.pool(), user, &course, user.user_id())
        .await
        .map_err(|e| WebError::from_database(Course::get_resource_type(), e))?;

    let payload = payload.validate(course_id)?;
    let module = Module::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    Ok((
        StatusCode::CREATED,
        Json(ModuleResponse {
            message: String::from("module created successfully"),
            module,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/modules/{id}",
    params(("id" = Uuid, Path, description = "Module id")),
    request_body = ModuleUpdateBody,
    responses(
        (status = 200, description = "Module updated", body = ModuleResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
    ),
    tag = "content",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn module_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ModuleUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let module = find_module(&state, user, id).await?;
    let payload = payload.validate()?;

    let module = module
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::from_database(Module::get_resource_type(), e))?;

    Ok(Json(ModuleResponse {
        message: String::from("module updated successfully"),
        module,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/modules/{id}",
    params(("id" = Uuid, Path, description = "Module id")),
    responses(
        (status = 200, description = "Module deleted with its lessons", body = MessageResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
    ),
    tag = "content",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn module_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let module = find_module(&state, user, id).await?;

    module
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Module::get_resource_type(), e))?;

    Ok(Json(MessageResponse::new("module deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/modules/{id}/lessons",
    params(("id" = Uuid, Path, description = "Module id")),
    request_body = LessonCreateBody,
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Module not found", body = ErrorResponse),
    ),
    tag = "content",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn lesson_create_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(module_id): Path<Uuid>,
    Json(payload): Json<LessonCreateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let module = find_module(&state, user, module_id).await?;
    let payload = payload.validate(module.id())?;

    let lesson = Lesson::create(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    Ok((
        StatusCode::CREATED,
        Json(LessonResponse {
            message: String::from("lesson created successfully"),
            lesson,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/api/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson id")),
    request_body = LessonUpdateBody,
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    tag = "content",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn lesson_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<LessonUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lesson = find_lesson(&state, user, id).await?;
    let payload = payload.validate()?;

    let lesson = lesson
        .update(state.pool(), user, payload)
        .await
        .map_err(|e| WebError::from_database(Lesson::get_resource_type(), e))?;

    Ok(Json(LessonResponse {
        message: String::from("lesson updated successfully"),
        lesson,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "Lesson deleted", body = MessageResponse),
        (status = 403, description = "Not the owner of the course", body = ErrorResponse),
        (status = 404, description = "Lesson not found", body = ErrorResponse),
    ),
    tag = "content",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn lesson_delete_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let lesson = find_lesson(&state, user, id).await?;

    lesson
        .delete(state.pool(), user)
        .await
        .map_err(|e| WebError::resource_fetch_error(Lesson::get_resource_type(), e))?;

    Ok(Json(MessageResponse::new("lesson deleted successfully")))
}
