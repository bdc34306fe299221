//! # HTTP error mapping
//!
//! Lookup misses become 404; every other failure, a malformed thread id
//! included, becomes a 500 naming the operation. Causes are logged, never
//! sent to the client.

use std::fmt;

use actix_web::error::JsonPayloadError;
use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse, ResponseError};
use rb_core::error::AppError;
use serde::Serialize;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn internal(operation: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: operation.to_string(),
        }
    }

    /// Builds the mapper used by a handler: `.map_err(ApiError::during("Unable to ..."))`.
    pub fn during(operation: &'static str) -> impl Fn(AppError) -> ApiError {
        move |err| match err {
            AppError::NotFound(kind, id) => {
                log::debug!("{operation}: {kind} {id:?} not found");
                Self {
                    status: StatusCode::NOT_FOUND,
                    message: format!("{kind} not found"),
                }
            }
            other => {
                log::error!("{operation}: {other}");
                Self::internal(operation)
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorBody { error: &self.message })
    }
}

/// Operation name for a request, used when the body never reaches a handler.
pub fn operation_for(req: &HttpRequest) -> &'static str {
    let replies = req.path().starts_with("/api/replies");
    let method = req.method();
    if *method == Method::POST {
        if replies { "Unable to add reply" } else { "Unable to create thread" }
    } else if *method == Method::GET {
        if replies { "Unable to retrieve thread" } else { "Unable to retrieve threads" }
    } else if *method == Method::DELETE {
        if replies { "Unable to delete reply" } else { "Unable to delete thread" }
    } else if *method == Method::PUT {
        if replies { "Unable to report reply" } else { "Unable to report thread" }
    } else {
        "Unable to process request"
    }
}

/// Unreadable bodies fall into the generic failure tier, like any other
/// failure the store would have rejected.
pub fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let operation = operation_for(req);
    log::warn!("{operation}: unreadable body: {err}");
    ApiError::internal(operation).into()
}
