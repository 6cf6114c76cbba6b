//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Bearer-token issuance and verification (§4.6): an opaque, symmetric-key
//! signed token with a 24h TTL carrying `{admin_id, username, role}`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const TOKEN_TTL: Duration = Duration::hours(24);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub admin_id: i64,
    pub username: String,
    pub role: String,
    exp: i64,
}

pub fn issue(admin_id: i64, username: &str, role: &str, secret: &[u8]) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        admin_id,
        username: username.to_string(),
        role: role.to_string(),
        exp: (Utc::now() + TOKEN_TTL).timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret))
}

pub fn verify(token: &str, secret: &[u8]) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())?;
    Ok(data.claims)
}
