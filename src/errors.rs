use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use serde_json::json;

/// HTTP error taxonomy for the JSON API. Messages are reported verbatim.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    NotFound(String),
    /// The ranked-search path has no fallback; an unreachable index is a 500
    /// with a distinct message, never an empty result set.
    SearchUnavailable,
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (Status, String) {
        match self {
            ApiError::BadRequest(m) => (Status::BadRequest, m.clone()),
            ApiError::Unauthorized => (Status::Unauthorized, "missing or invalid credentials".into()),
            ApiError::Forbidden(m) => (Status::Forbidden, m.clone()),
            ApiError::NotFound(m) => (Status::NotFound, m.clone()),
            ApiError::SearchUnavailable => (
                Status::InternalServerError,
                "search service unavailable, please retry later".into(),
            ),
            ApiError::Internal(m) => (Status::InternalServerError, m.clone()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!("internal error: {e:#}");
        ApiError::Internal("internal server error".into())
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        let (status, detail) = self.parts();
        let body = json!({ "success": false, "detail": detail }).to_string();
        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
