//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Route handlers for the endpoint surface in spec §6. Path parameters that
//! the spec calls `:id` address `users` and `nas` by their natural unique
//! key (`username`, `ip_address`) rather than a synthetic numeric id, since
//! that's the key every store method already takes.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use radius_db::{AccountingRecord, Credential, NasClient, Profile, Session, User};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::jwt;
use crate::middleware::AuthAdmin;
use crate::state::AppState;

#[derive(Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Deserialize)]
pub struct PageQuery {
    page: Option<i64>,
    limit: Option<i64>,
    search: Option<String>,
}

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 20;

// ===== auth =====

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub struct AdminView {
    pub id: i64,
    pub username: String,
    pub role: String,
}

impl From<&radius_db::Admin> for AdminView {
    fn from(admin: &radius_db::Admin) -> AdminView {
        AdminView {
            id: admin.id,
            username: admin.username.clone(),
            role: admin.role.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AdminView,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let admin = state
        .store()
        .get_admin_by_username(&body.username)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let matches = bcrypt::verify(&body.password, &admin.password_hash).map_err(|_| ApiError::Internal)?;
    if !matches {
        return Err(ApiError::Unauthorized);
    }

    let token = jwt::issue(admin.id, &admin.username, &admin.role, state.jwt_secret())
        .map_err(|_| ApiError::Internal)?;
    Ok(Json(LoginResponse { token, user: AdminView::from(&admin) }))
}

pub async fn me(
    State(state): State<AppState>,
    AuthAdmin(claims): AuthAdmin,
) -> Result<Json<AdminView>, ApiError> {
    let admin = state
        .store()
        .get_admin_by_username(&claims.username)
        .await?
        .ok_or(ApiError::Unauthorized)?;
    Ok(Json(AdminView::from(&admin)))
}

// ===== dashboard =====

#[derive(Serialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub active_users: i64,
    pub total_nas: i64,
    pub active_sessions: i64,
    pub today_input_octets: i64,
    pub today_output_octets: i64,
    pub uptime_seconds: u64,
    pub version: &'static str,
}

pub async fn stats(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state.store().stats().await?;
    Ok(Json(StatsResponse {
        total_users: stats.total_users,
        active_users: stats.active_users,
        total_nas: stats.total_nas,
        active_sessions: stats.active_sessions,
        today_input_octets: stats.today_input_octets,
        today_output_octets: stats.today_output_octets,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION"),
    }))
}

// ===== users =====

#[derive(Deserialize)]
pub struct CreateUserRequest {
    username: String,
    #[serde(default)]
    password: Option<String>,
    /// Hex-encoded 16-byte NT-Hash, an alternative to `password` for
    /// operators who want to avoid storing the cleartext (SPEC_FULL.md §C).
    /// Mutually exclusive with `password`.
    #[serde(default)]
    nt_hash: Option<String>,
    #[serde(default)]
    profile_name: Option<String>,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    nt_hash: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    profile_name: Option<String>,
    #[serde(default)]
    expires_at: Option<Option<DateTime<Utc>>>,
}

/// Builds the `Credential` a create/update request asked for.
/// `password` and `nt_hash` are mutually exclusive; `nt_hash` is a
/// hex-encoded 16-byte NT-Hash.
fn parse_credential(
    password: Option<String>,
    nt_hash: Option<String>,
) -> Result<Option<Credential>, ApiError> {
    match (password, nt_hash) {
        (Some(_), Some(_)) => {
            Err(ApiError::BadRequest("password and nt_hash are mutually exclusive".to_string()))
        }
        (Some(password), None) => Ok(Some(Credential::Cleartext(password))),
        (None, Some(nt_hash)) => {
            let decoded = hex::decode(&nt_hash)
                .map_err(|_| ApiError::BadRequest("nt_hash must be hex-encoded".to_string()))?;
            let hash: [u8; 16] = decoded
                .try_into()
                .map_err(|_| ApiError::BadRequest("nt_hash must decode to 16 bytes".to_string()))?;
            Ok(Some(Credential::NtHash(hash)))
        }
        (None, None) => Ok(None),
    }
}

pub async fn list_users(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<User>>, ApiError> {
    let page = query.page.unwrap_or(DEFAULT_PAGE);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let result = state.store().list_users(page, limit, query.search.as_deref()).await?;
    Ok(Json(Page { items: result.items, page, limit, total: result.total }))
}

pub async fn create_user(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Json(body): Json<CreateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let profile_name = body.profile_name.as_deref().unwrap_or(radius_db::DEFAULT_PROFILE);
    let credential = parse_credential(body.password, body.nt_hash)?
        .ok_or_else(|| ApiError::BadRequest("either password or nt_hash is required".to_string()))?;
    let user = state
        .store()
        .create_user(&body.username, &credential, profile_name, body.expires_at)
        .await?;
    Ok(Json(user))
}

pub async fn get_user(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(username): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store()
        .get_user_by_username(&username)
        .await?
        .ok_or(ApiError::NotFound("user".to_string()))?;
    Ok(Json(user))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(username): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let credential = parse_credential(body.password, body.nt_hash)?;
    let user = state
        .store()
        .update_user(
            &username,
            body.is_active,
            body.profile_name.as_deref(),
            credential.as_ref(),
            body.expires_at,
        )
        .await?;
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(username): Path<String>,
) -> Result<(), ApiError> {
    state.store().delete_user(&username).await?;
    Ok(())
}

// ===== nas clients =====

#[derive(Deserialize)]
pub struct CreateNasRequest {
    ip_address: String,
    secret: String,
    name: String,
    #[serde(default = "default_vendor")]
    vendor: String,
}

fn default_vendor() -> String {
    "mikrotik".to_string()
}

#[derive(Deserialize)]
pub struct UpdateNasRequest {
    #[serde(default)]
    secret: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
}

pub async fn list_nas(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
) -> Result<Json<Vec<NasClient>>, ApiError> {
    Ok(Json(state.store().list_nas().await?))
}

pub async fn create_nas(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Json(body): Json<CreateNasRequest>,
) -> Result<Json<NasClient>, ApiError> {
    let nas = state
        .store()
        .create_nas(&body.ip_address, &body.secret, &body.name, &body.vendor)
        .await?;
    Ok(Json(nas))
}

pub async fn get_nas(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(ip_address): Path<String>,
) -> Result<Json<NasClient>, ApiError> {
    let nas = state
        .store()
        .get_nas_by_ip(&ip_address)
        .await?
        .ok_or(ApiError::NotFound("nas client".to_string()))?;
    Ok(Json(nas))
}

pub async fn update_nas(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(ip_address): Path<String>,
    Json(body): Json<UpdateNasRequest>,
) -> Result<Json<NasClient>, ApiError> {
    let nas = state
        .store()
        .update_nas(&ip_address, body.secret.as_deref(), body.name.as_deref(), body.is_active)
        .await?;
    Ok(Json(nas))
}

pub async fn delete_nas(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Path(ip_address): Path<String>,
) -> Result<(), ApiError> {
    state.store().delete_nas(&ip_address).await?;
    Ok(())
}

// ===== sessions & accounting =====

pub async fn list_sessions(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
) -> Result<Json<Vec<Session>>, ApiError> {
    Ok(Json(state.store().list_active_sessions().await?))
}

#[derive(Deserialize)]
pub struct AccountingPageQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

pub async fn list_accounting(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Query(query): Query<AccountingPageQuery>,
) -> Result<Json<Page<AccountingRecord>>, ApiError> {
    let page = query.page.unwrap_or(DEFAULT_PAGE);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let result = state.store().list_accounting(page, limit).await?;
    Ok(Json(Page { items: result.items, page, limit, total: result.total }))
}

// ===== profiles =====

#[derive(Deserialize)]
pub struct CreateProfileRequest {
    name: String,
    #[serde(default)]
    rate_limit: Option<String>,
    #[serde(default)]
    session_timeout: Option<i64>,
    #[serde(default)]
    idle_timeout: Option<i64>,
}

pub async fn list_profiles(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
) -> Result<Json<Vec<Profile>>, ApiError> {
    Ok(Json(state.store().list_profiles().await?))
}

pub async fn create_profile(
    State(state): State<AppState>,
    AuthAdmin(_): AuthAdmin,
    Json(body): Json<CreateProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .store()
        .create_profile(
            &body.name,
            body.rate_limit.as_deref(),
            body.session_timeout,
            body.idle_timeout,
        )
        .await?;
    Ok(Json(profile))
}

// ===== health =====

#[derive(Serialize)]
pub struct HealthResponse {
    pub uptime_seconds: u64,
    pub version: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_credential_prefers_cleartext_password() {
        let credential = parse_credential(Some("wonderland".to_string()), None).unwrap();
        assert_eq!(credential, Some(Credential::Cleartext("wonderland".to_string())));
    }

    #[test]
    fn parse_credential_decodes_nt_hash_hex() {
        let hex_hash = "00112233445566778899aabbccddeeff".to_string();
        let credential = parse_credential(None, Some(hex_hash)).unwrap();
        assert!(matches!(credential, Some(Credential::NtHash(_))));
    }

    #[test]
    fn parse_credential_rejects_both_fields() {
        let result = parse_credential(Some("x".to_string()), Some("00".repeat(16)));
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn parse_credential_rejects_malformed_hex() {
        let result = parse_credential(None, Some("not-hex".to_string()));
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn parse_credential_rejects_wrong_length_hash() {
        let result = parse_credential(None, Some("00".repeat(8)));
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn parse_credential_allows_neither_field() {
        assert_eq!(parse_credential(None, None).unwrap(), None);
    }
}
