//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The admin HTTP API (§4.6, §6): a stateless JSON/axum service in front of
//! the shared [`radius_db::Store`], bearer-token authenticated with a
//! 24h-TTL JWT.

pub mod error;
mod handlers;
pub mod jwt;
mod middleware;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::build;
pub use state::AppState;
