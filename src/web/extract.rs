//! Request extractors whose rejections go through [`WebError`], so malformed bodies, path
//! segments and query strings answer with the same JSON envelope as every other failure.

use axum::{
    extract::{
        FromRequest, FromRequestParts, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::web::{WebError, validation::FieldError};

impl From<JsonRejection> for WebError {
    fn from(rejection: JsonRejection) -> Self {
        WebError::validation(vec![FieldError::new("body", rejection.body_text())])
    }
}

impl From<PathRejection> for WebError {
    fn from(rejection: PathRejection) -> Self {
        WebError::validation(vec![FieldError::new("path", rejection.body_text())])
    }
}

impl From<QueryRejection> for WebError {
    fn from(rejection: QueryRejection) -> Self {
        WebError::validation(vec![FieldError::new("query", rejection.body_text())])
    }
}

/// JSON body extractor and response.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug)]
pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    axum::extract::Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) =
            axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[derive(Debug)]
pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    axum::extract::Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod test {
    use axum::{
        Router,
        http::StatusCode,
        routing::{get, post},
    };
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{Value, json};
    use uuid::Uuid;

    use super::*;

    #[derive(Deserialize)]
    struct PriceBody {
        price: f64,
    }

    #[derive(Deserialize)]
    struct PageQuery {
        page: u32,
    }

    async fn price_handler(Json(body): Json<PriceBody>) -> Json<Value> {
        Json(json!({ "price": body.price }))
    }

    async fn item_handler(Path(id): Path<Uuid>, Query(query): Query<PageQuery>) -> Json<Value> {
        Json(json!({ "id": id, "page": query.page }))
    }

    fn server() -> TestServer {
        let app = Router::new()
            .route("/price", post(price_handler))
            .route("/items/{id}", get(item_handler));
        TestServer::new(app).unwrap()
    }

    fn assert_envelope(body: &Value, field: &str) {
        assert_eq!(body["error"], "validation failed");
        assert_eq!(body["status_code"], "400");
        assert_eq!(body["errors"][0]["field"], field);
    }

    #[tokio::test]
    async fn wrong_body_type_is_validation_error_test() {
        let resp = server().post("/price").json(&json!({ "price": "abc" })).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope(&resp.json::<Value>(), "body");
    }

    #[tokio::test]
    async fn malformed_json_is_validation_error_test() {
        let resp = server()
            .post("/price")
            .bytes("{\"price\": ".into())
            .content_type("application/json")
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope(&resp.json::<Value>(), "body");
    }

    #[tokio::test]
    async fn bad_path_and_query_are_validation_errors_test() {
        let resp = server().get("/items/not-a-uuid").add_query_param("page", 1).await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope(&resp.json::<Value>(), "path");

        let resp = server()
            .get(&format!("/items/{}", Uuid::new_v4()))
            .add_query_param("page", "first")
            .await;
        resp.assert_status(StatusCode::BAD_REQUEST);
        assert_envelope(&resp.json::<Value>(), "query");
    }

    #[tokio::test]
    async fn valid_request_passes_through_test() {
        let resp = server().post("/price").json(&json!({ "price": 9.5 })).await;
        resp.assert_status_ok();
        assert_eq!(resp.json::<Value>()["price"], 9.5);
    }
}
