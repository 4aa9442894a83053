use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::{
    auth,
    model::{CrudRepository, ResourceTyped, entity::UserEntity},
    web::{AppState, RequestContext, context::AuthenticatedUser, error::WebError},
};

pub static AUTH_TOKEN: &str = "SID";

/// Token from `Authorization: Bearer ...`, or from the `SID` cookie.
fn request_token(headers: &HeaderMap, cookies: &Cookies) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    bearer.or_else(|| cookies.get(AUTH_TOKEN).map(|c| c.value().to_string()))
}

/// Resolves the caller behind the request token. No token means an anonymous caller.
async fn resolve_user(
    state: &AppState,
    headers: &HeaderMap,
    cookies: &Cookies,
) -> Result<Option<AuthenticatedUser>, WebError> {
    let Some(token) = request_token(headers, cookies) else {
        return Ok(None);
    };

    let claims = auth::process_token(&token, state.config().app().jwt())
        .map_err(WebError::auth_token_invalid)?;

    let id = claims
        .claims
        .sub
        .parse::<uuid::Uuid>()
        .map_err(|_| WebError::auth_user_inactive())?;

    // role comes from the users table, not from the token
    let user = UserEntity::find_by_id(state.pool(), &AuthenticatedUser::admin(), id)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    match user {
        Some(user) if user.is_active() => Ok(Some(AuthenticatedUser::new(id, user.role()))),
        _ => Err(WebError::auth_user_inactive()),
    }
}

/// Rejects requests carrying an invalid token or a token of an inactive user.
pub async fn extract_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let user = resolve_user(&state, req.headers(), &cookies).await?;
    req.extensions_mut().insert(RequestContext::new(user));

    Ok(next.run(req).await)
}

/// For public routes: a token that does not resolve to an active user reads as anonymous.
pub async fn optional_context_fn(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let user = match resolve_user(&state, req.headers(), &cookies).await {
        Ok(user) => user,
        Err(WebError::AuthenticationError(e)) => {
            tracing::debug!("treating request as anonymous: {e}");
            None
        }
        Err(e) => return Err(e),
    };
    req.extensions_mut().insert(RequestContext::new(user));

    Ok(next.run(req).await)
}
