use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use tower_cookies::{Cookie, Cookies, cookie::SameSite};

use crate::{
    auth::{
        self, OAuthError, UserClaims, hash_password,
        oauth::{OAUTH_STATE, generate_state},
        verify_password,
    },
    model::{
        CrudRepository, ResourceTyped,
        entity::{UserEntity, UserEntityCreate, UserEntityUpdate},
    },
    web::{
        AppState, AuthenticatedUser, ErrorResponse, RequestContext, UserRole, WebError,
        WebResult,
        dto::auth::{
            AuthResponse, GoogleCallbackQuery, LoginBody, ProfileResponse, ProfileUpdateBody,
            RegisterBody,
        },
        extract::{Json, Query},
        middlewares::{self, AUTH_TOKEN},
    },
};

pub fn routes<S>(state: AppState) -> Router<S> {
    let protected = Router::new()
        .route("/profile", get(profile_handler).put(profile_update_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            middlewares::extract_context_fn,
        ));

    Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/google", get(google_start_handler))
        .route("/google/callback", get(google_callback_handler))
        .merge(protected)
        .with_state(state)
}

fn session_cookie(name: &'static str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, value);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_http_only(true);
    cookie.set_path("/");
    cookie
}

/// Signs a JWT for `user` and stores it in the `SID` cookie as well.
fn issue_token(state: &AppState, cookies: &Cookies, user: &UserEntity) -> WebResult<String> {
    let app = state.config().app();
    let claims = UserClaims::new(user.id(), user.email(), user.role(), app.jwt_ttl());
    let token = auth::generate_token(claims, app.jwt())
        .map_err(|e| WebError::server_crypt_error(e.into()))?;

    cookies.add(session_cookie(AUTH_TOKEN, token.clone()));
    Ok(token)
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterBody,
    description = "Creates a student or instructor account",
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all)]
pub async fn register_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<RegisterBody>,
) -> WebResult<impl IntoResponse> {
    let registration = payload.validate()?;
    let admin = AuthenticatedUser::admin();

    let found = UserEntity::find_by_email(state.pool(), &admin, &registration.email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    if found.is_some() {
        return Err(WebError::registration_conflict());
    }

    let hash = hash_password(&registration.password).map_err(WebError::server_crypt_error)?;
    let payload = UserEntityCreate {
        name: registration.name,
        email: registration.email,
        password_hash: Some(hash),
        role: registration.role,
        avatar: None,
        google_id: None,
    };

    let created = UserEntity::create(state.pool(), &admin, payload)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                WebError::registration_conflict()
            } else {
                WebError::resource_fetch_error(UserEntity::get_resource_type(), e)
            }
        })?;

    let token = issue_token(&state, &cookies, &created)?;
    tracing::info!(user = %created.id(), role = %created.role(), "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: String::from("user registered successfully"),
            user: created,
            token,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    description = "Authorizes user in the system",
    request_body = LoginBody,
    responses(
        (status = 200, description = "User signed in", body = AuthResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Credentials invalid or account disabled", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "auth",
)]
#[tracing::instrument(skip_all)]
pub async fn login_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<LoginBody>,
) -> WebResult<impl IntoResponse> {
    let email = payload.validate()?;
    let admin = AuthenticatedUser::admin();

    let found = UserEntity::find_by_email(state.pool(), &admin, &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::auth_invalid_credentials())?;

    // accounts created through Google have no password
    let hash = found.hash().ok_or(WebError::auth_invalid_credentials())?;

    let is_verified =
        verify_password(hash, &payload.password).map_err(WebError::server_crypt_error)?;

    if !is_verified {
        return Err(WebError::auth_invalid_credentials());
    }

    if !found.is_active() {
        return Err(WebError::auth_account_disabled());
    }

    let token = issue_token(&state, &cookies, &found)?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            message: String::from("login successful"),
            user: found,
            token,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user", body = ProfileResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 403, description = "Invalid token", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "auth",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn profile_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;

    Ok(Json(ProfileResponse {
        message: None,
        user: found,
    }))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = ProfileUpdateBody,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Access token required", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
    ),
    tag = "auth",
    security(
        ("bearer" = []),
        ("cookie" = [])
    )
)]
pub async fn profile_update_handler(
    ctx: RequestContext,
    State(state): State<AppState>,
    Json(payload): Json<ProfileUpdateBody>,
) -> WebResult<impl IntoResponse> {
    let user = ctx.user()?;
    let name = payload.validate()?;

    let found = UserEntity::find_by_id(state.pool(), user, user.user_id())
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?
        .ok_or(WebError::resource_not_found(UserEntity::get_resource_type()))?;

    let updated = found
        .update(state.pool(), user, UserEntityUpdate { name })
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    Ok(Json(ProfileResponse {
        message: Some(String::from("profile updated successfully")),
        user: updated,
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/google",
    description = "Redirects to the Google consent screen",
    responses(
        (status = 303, description = "Redirect to Google"),
        (status = 503, description = "Google sign-in is not configured", body = ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn google_start_handler(
    State(state): State<AppState>,
    cookies: Cookies,
) -> WebResult<impl IntoResponse> {
    let client = state.google().ok_or(WebError::server_oauth_unavailable())?;

    let csrf = generate_state();
    let url = client
        .authorize_url(&csrf)
        .map_err(WebError::server_oauth_error)?;

    cookies.add(session_cookie(OAUTH_STATE, csrf));
    Ok(Redirect::to(url.as_str()))
}

#[utoipa::path(
    get,
    path = "/api/auth/google/callback",
    params(GoogleCallbackQuery),
    description = "Completes Google sign-in and redirects to the frontend with a token",
    responses(
        (status = 303, description = "Redirect to the frontend"),
        (status = 400, description = "State mismatch or missing code", body = ErrorResponse),
        (status = 502, description = "Google request failed", body = ErrorResponse),
        (status = 503, description = "Google sign-in is not configured", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[tracing::instrument(skip_all)]
pub async fn google_callback_handler(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<GoogleCallbackQuery>,
) -> WebResult<impl IntoResponse> {
    let client = state.google().ok_or(WebError::server_oauth_unavailable())?;
    let frontend = state.config().app().frontend_url();

    if let Some(error) = query.error {
        tracing::warn!("google sign-in was cancelled: {error}");
        return Ok(Redirect::to(&format!("{frontend}/login?error=oauth_failed")));
    }

    let expected = cookies.get(OAUTH_STATE).map(|c| c.value().to_string());
    cookies.remove(session_cookie(OAUTH_STATE, String::new()));

    match (expected, query.state) {
        (Some(expected), Some(actual)) if expected == actual => {}
        _ => return Err(WebError::auth_state_mismatch()),
    }

    let code = query.code.ok_or(WebError::resource_bad_request(
        UserEntity::get_resource_type(),
        "missing authorization code",
    ))?;

    let access_token = client
        .exchange_code(&code)
        .await
        .map_err(WebError::server_oauth_error)?;
    let profile = client
        .fetch_profile(&access_token)
        .await
        .map_err(WebError::server_oauth_error)?;
    let email = profile.verified_email().map_err(WebError::server_oauth_error)?;

    let admin = AuthenticatedUser::admin();
    let found = UserEntity::find_by_google(state.pool(), &admin, &profile.sub, &email)
        .await
        .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?;

    let user = match found {
        Some(user) if !user.is_active() => return Err(WebError::auth_account_disabled()),
        Some(user) if user.google_id().is_none() => user
            .link_google_id(state.pool(), &admin, &profile.sub)
            .await
            .map_err(|e| WebError::resource_fetch_error(UserEntity::get_resource_type(), e))?,
        Some(user) => user,
        None => {
            let payload = UserEntityCreate {
                name: profile.display_name(&email),
                email,
                password_hash: None,
                role: UserRole::Student,
                avatar: profile.picture.clone(),
                google_id: Some(profile.sub.clone()),
            };
            UserEntity::create(state.pool(), &admin, payload)
                .await
                .map_err(|e| WebError::from_database(UserEntity::get_resource_type(), e))?
        }
    };

    let token = issue_token(&state, &cookies, &user)?;
    let redirect = reqwest::Url::parse_with_params(
        &format!("{frontend}/auth/callback"),
        &[("token", token.as_str())],
    )
    .map_err(|e| WebError::server_oauth_error(OAuthError::InvalidUrl(e.to_string())))?;

    tracing::info!(user = %user.id(), "google sign-in");
    Ok(Redirect::to(redirect.as_str()))
}
