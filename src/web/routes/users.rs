use axum::{
    Router,
    extract::State,
    middleware,
    response::IntoResponse,
    routing::get,
};

use crate::{
    model::{
        PaginatableRepository, ResourceTyped,
        entity::{UserEntity, UserFilter},
    },
    web::{
        AppState, ErrorResponse, RequestContext, UserRole, WebError, WebResult,
        dto::users::{UserListQuery, UsersResponse},
        extract::{Json, Query},
        middlewares,
        validation::Validator,
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/", get(user_list_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Returns requested page", body = UsersResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "You're not an admin to do this", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "users",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn user_list_handler(
    ctx: RequestContext,
    Query(query): Query<UserListQuery>,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    user.authorize(&[UserRole::Admin])?;

    let mut v = Validator::new();
    let role = query.role.as_deref().and_then(|role| {
        v.one_of(
            "role",
            role,
            UserRole::parse,
            &["admin", "instructor", "student"],
        )
    });
    v.finish()?;

    let page = UserEntity::page(
        state.pool(),
        user,
        &UserFilter { role },
        query.page_query(),
    )
    .await
    .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok(Json(UsersResponse {
        users: page.items,
        pagination: page.pagination,
    }))
}
