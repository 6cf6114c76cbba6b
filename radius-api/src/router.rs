//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the full `/api/*` router described in spec §6. Every route but
/// `/api/auth/login` and `/api/health` requires a bearer token, enforced by
/// the `AuthAdmin` extractor each handler takes rather than a blanket
/// middleware layer -- keeps the two public routes from needing an
/// exception list.
pub fn build(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/me", get(handlers::me))
        .route("/api/dashboard/stats", get(handlers::stats))
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/api/users/:username",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route(
            "/api/nas",
            get(handlers::list_nas).post(handlers::create_nas),
        )
        .route(
            "/api/nas/:ip_address",
            get(handlers::get_nas)
                .put(handlers::update_nas)
                .delete(handlers::delete_nas),
        )
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/accounting", get(handlers::list_accounting))
        .route(
            "/api/profiles",
            get(handlers::list_profiles).post(handlers::create_profile),
        )
        .route("/api/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
