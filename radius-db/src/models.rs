//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Row types for the five persisted tables (§3 of the data model) plus the
//! admin table. Mapped with `sqlx::FromRow` rather than the compile-time
//! `query!` macros, since those require a live database at build time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's stored credential. `Cleartext` is required for MS-CHAP/v2,
/// which must recompute the NT-hash from the password; `NtHash` lets an
/// operator avoid storing cleartext when only PAP/CHAP is in use.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Credential {
    Cleartext(String),
    NtHash([u8; 16]),
}

impl Credential {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Credential::Cleartext(_) => "cleartext",
            Credential::NtHash(_) => "nt_hash",
        }
    }

    pub(crate) fn value(&self) -> String {
        match self {
            Credential::Cleartext(s) => s.clone(),
            Credential::NtHash(h) => hex::encode(h),
        }
    }

    pub(crate) fn from_row(kind: &str, value: &str) -> Credential {
        match kind {
            "nt_hash" => {
                let mut hash = [0u8; 16];
                if let Ok(decoded) = hex::decode(value) {
                    if decoded.len() == 16 {
                        hash.copy_from_slice(&decoded);
                    }
                }
                Credential::NtHash(hash)
            }
            _ => Credential::Cleartext(value.to_string()),
        }
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub credential_kind: String,
    pub credential_value: String,
    pub is_active: bool,
    pub profile_name: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub credential_kind: String,
    #[serde(skip)]
    pub credential_value: String,
    pub is_active: bool,
    pub profile_name: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn credential(&self) -> Credential {
        Credential::from_row(&self.credential_kind, &self.credential_value)
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> User {
        User {
            id: row.id,
            username: row.username,
            credential_kind: row.credential_kind,
            credential_value: row.credential_value,
            is_active: row.is_active,
            profile_name: row.profile_name,
            expires_at: row.expires_at,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct NasClient {
    pub id: i64,
    pub ip_address: String,
    pub secret: String,
    pub name: String,
    pub vendor: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub rate_limit: Option<String>,
    pub session_timeout: Option<i64>,
    pub idle_timeout: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: i64,
    pub session_id: String,
    pub username: String,
    pub nas_ip_address: String,
    pub framed_ip: Option<String>,
    pub mac_address: Option<String>,
    pub start_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    pub stop_time: Option<DateTime<Utc>>,
    pub session_time: i64,
    pub input_octets: i64,
    pub output_octets: i64,
    pub terminate_cause: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccountingRecord {
    pub id: i64,
    pub session_id: String,
    pub username: String,
    pub nas_ip_address: String,
    pub status_type: String,
    pub session_time: i64,
    pub input_octets: i64,
    pub output_octets: i64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: String,
}
