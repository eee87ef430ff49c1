//! Types and functions to help building request handlers.
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, FieldError};

pub type Request = hyper::Request<Body>;
pub type Response = hyper::Response<Body>;
pub type AppResult = Result<Response, AppError>;

/// The wire shape of every failure response.
#[derive(Serialize, Debug)]
struct ErrorBody<'a> {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

fn json_response(status: StatusCode, bytes: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn serialize<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => json_response(status, bytes),
        Err(e) => {
            log::error!("Failed to serialize a response body: {}", e);
            error_response(&AppError::unexpected(e))
        }
    }
}

pub fn ok_response<T: Serialize>(value: T) -> Response {
    serialize(StatusCode::OK, &value)
}

pub fn created<T: Serialize>(value: T) -> Response {
    serialize(StatusCode::CREATED, &value)
}

pub fn no_content() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

/// Builds the `{ "message": ..., "errors": [...] }` failure body.
///
/// Internal errors keep their details out of the body, the real cause
/// only goes to the log.
pub fn error_response(error: &AppError) -> Response {
    match error {
        AppError::Database(e) => log::error!("Database error: {}", e),
        AppError::HyperError(e) => log::error!("Transport error: {}", e),
        _ => (),
    }
    let body = ErrorBody {
        message: error.to_string(),
        errors: error.field_errors(),
    };
    match serde_json::to_vec(&body) {
        Ok(bytes) => json_response(error.status_code(), bytes),
        Err(e) => {
            log::error!("Failed to serialize an error body: {}", e);
            json_response(StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
        }
    }
}

pub fn missing() -> AppResult {
    Err(AppError::missing())
}

/// Splits the leading path segment off and parses it as an id.
///
/// `"/7f1…/npcs"` becomes the id and the `"/npcs"` tail, `"/7f1…"`
/// leaves an empty tail.
pub fn parse_id(path: &str) -> Result<(Uuid, &str), AppError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let (head, tail) = match trimmed.find('/') {
        Some(at) => trimmed.split_at(at),
        None => (trimmed, ""),
    };
    let id = Uuid::parse_str(head)
        .map_err(|_| AppError::BadRequest(format!("Expected an id in the path, found \"{}\"", head)))?;
    Ok((id, tail))
}

/// Splits the first path segment off: `"/races/1"` becomes
/// `("races", "/1")`.
pub fn pop_segment(path: &str) -> (&str, &str) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    match trimmed.find('/') {
        Some(at) => trimmed.split_at(at),
        None => (trimmed, ""),
    }
}

pub fn parse_query<T>(uri: &hyper::http::Uri) -> Result<T, AppError>
where
    for<'de> T: Deserialize<'de>,
{
    let query = uri.query().unwrap_or("");
    serde_urlencoded::from_str(query).map_err(|e| {
        let message = format!("Failed to parse the query in the URI ({})", uri);
        log::debug!("{}: {}", message, e);
        AppError::BadRequest(message)
    })
}

pub async fn parse_body<T>(req: Request) -> Result<T, AppError>
where
    for<'de> T: Deserialize<'de>,
{
    let body = hyper::body::to_bytes(req.into_body())
        .await
        .map_err(|_| AppError::BadRequest("Failed to read the request body".to_string()))?;
    serde_json::from_slice(&*body).map_err(|_| AppError::BadRequest("Failed to parse the request body".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationErrors;

    #[derive(Deserialize, Debug, Eq, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct UserIdQuery {
        user_id: Uuid,
    }

    #[test]
    fn path_ids() {
        let id = Uuid::new_v4();
        let path = format!("/{}/npcs/extra", id);
        let (parsed, tail) = parse_id(&path).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(tail, "/npcs/extra");

        let path = format!("/{}", id);
        let (parsed, tail) = parse_id(&path).unwrap();
        assert_eq!(parsed, id);
        assert_eq!(tail, "");

        let malformed = parse_id("/not-an-id").unwrap_err();
        assert_eq!(malformed.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn path_segments() {
        assert_eq!(pop_segment("/races/abc"), ("races", "/abc"));
        assert_eq!(pop_segment("/races"), ("races", ""));
        assert_eq!(pop_segment("races"), ("races", ""));
        assert_eq!(pop_segment(""), ("", ""));
    }

    #[test]
    fn query_parsing() {
        let id = Uuid::new_v4();
        let uri: hyper::http::Uri = format!("/campaigns?userId={}", id).parse().unwrap();
        let query: UserIdQuery = parse_query(&uri).unwrap();
        assert_eq!(query.user_id, id);

        let uri: hyper::http::Uri = "/campaigns?userId=oops".parse().unwrap();
        assert!(parse_query::<UserIdQuery>(&uri).is_err());
    }

    #[tokio::test]
    async fn error_body_shape() {
        let mut errors = ValidationErrors::default();
        errors.push("name", "Name shall not be empty.");
        let response = error_response(&errors.into_result().unwrap_err());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Validation failed: name");
        assert_eq!(body["errors"][0]["field"], "name");
        assert_eq!(body["errors"][0]["message"], "Name shall not be empty.");

        let response = error_response(&AppError::NotFound("Campaign"));
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Campaign not found");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn internal_errors_are_redacted() {
        let error = AppError::Unexpected(anyhow::anyhow!("secret detail"));
        let response = error_response(&error);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "An unexpected error occurred");
    }
}
