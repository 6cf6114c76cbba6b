//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Maps store and auth failures onto the `{"error": "<message>"}` body and
//! status code taxonomy from §4.6/§6/§7 rule 6.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Conflict(String),
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            ApiError::Conflict(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<radius_db::Error> for ApiError {
    fn from(error: radius_db::Error) -> ApiError {
        error.log();
        match error {
            radius_db::Error::NotFound(what) => ApiError::NotFound(what.to_string()),
            radius_db::Error::UniqueViolation(what) => {
                ApiError::Conflict(format!("{what} already exists"))
            }
            radius_db::Error::Pool(_)
            | radius_db::Error::Migrate(_)
            | radius_db::Error::Query(_)
            | radius_db::Error::PasswordHash(_) => ApiError::Internal,
        }
    }
}
