use crate::{
    Config,
    web::{AppState, ErrorResponse, doc::ApiDoc, dto::HealthResponse},
};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{
        HeaderValue, Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::IntoResponse,
    routing::get,
};
use tower_cookies::CookieManagerLayer;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod content;
pub mod courses;
pub mod enrollments;
pub mod users;

const BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_app<S: Send + Sync + Clone + 'static>(
    state: AppState,
    config: &'static Config,
) -> Router<S> {
    let mut router = Router::new()
        .route("/api/health", get(health_handler))
        .nest("/api/auth", auth::routes(state.clone()))
        .nest("/api/users", users::routes(state.clone()))
        .nest("/api/courses", courses::routes(state.clone()))
        .nest("/api/modules", content::module_routes(state.clone()))
        .nest("/api/lessons", content::lesson_routes(state.clone()))
        .nest("/api/enrollments", enrollments::routes(state.clone()))
        .fallback(fallback_handler)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CookieManagerLayer::default())
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config.app().docs() {
        let openapi = ApiDoc::openapi();

        router = router.merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", openapi));
    }

    router
}

/// Only the frontend origin may call the API with credentials.
fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(config.app().frontend_url()) {
        Ok(origin) => layer.allow_origin(AllowOrigin::exact(origin)),
        Err(e) => {
            tracing::warn!("frontend_url is not a valid origin, CORS disabled: {e}");
            layer
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: String::from("OK"),
        timestamp: chrono::Utc::now(),
        version: String::from(env!("CARGO_PKG_VERSION")),
    })
}

pub async fn fallback_handler() -> impl IntoResponse {
    let body = ErrorResponse {
        error: String::from("route not found"),
        status_code: StatusCode::NOT_FOUND.as_str().to_string(),
        details: None,
        errors: None,
    };
    (StatusCode::NOT_FOUND, Json(body))
}
