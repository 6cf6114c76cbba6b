//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! `Authorization: Bearer <token>` extraction, required on every route
//! except `/api/auth/login` and `/api/health` (§4.6).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::jwt::{self, Claims};
use crate::state::AppState;

/// An extractor that pulls and verifies the bearer token, yielding the
/// admin's claims. Route handlers that take `AuthAdmin` as a parameter get
/// the 401 rejection automatically, with no explicit middleware layer
/// needed per route.
pub struct AuthAdmin(pub Claims);

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

        let claims = jwt::verify(token, state.jwt_secret()).map_err(|_| ApiError::Unauthorized)?;
        Ok(AuthAdmin(claims))
    }
}
