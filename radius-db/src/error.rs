//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{error, warn};

// Store errors.
#[derive(Debug)]
pub enum Error {
    Pool(sqlx::Error),
    Migrate(sqlx::migrate::MigrateError),
    Query(sqlx::Error),
    UniqueViolation(&'static str),
    NotFound(&'static str),
    PasswordHash(bcrypt::BcryptError),
}

// ===== impl Error =====

impl Error {
    /// Logs the error at the severity appropriate to its likely cause: a
    /// unique-constraint violation or a not-found is routine and logged at
    /// `warn`, everything else (pool/migrate/query failures) is `error`.
    pub fn log(&self) {
        match self {
            Error::Pool(error) => error!(error = %with_source(error), "{}", self),
            Error::Migrate(error) => error!(error = %with_source(error), "{}", self),
            Error::Query(error) => error!(error = %with_source(error), "{}", self),
            Error::UniqueViolation(field) => warn!(%field, "{}", self),
            Error::NotFound(entity) => warn!(%entity, "{}", self),
            Error::PasswordHash(error) => error!(error = %with_source(error), "{}", self),
        }
    }

    /// True when this failure is the kind of thing a caller should retry as
    /// an update rather than an insert (RFC 9.5: "Session-id upsert race").
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Error::UniqueViolation(_))
            || matches!(self, Error::Query(sqlx::Error::Database(db)) if db.is_unique_violation())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Pool(..) => write!(f, "failed to open the database pool"),
            Error::Migrate(..) => write!(f, "failed to apply database migrations"),
            Error::Query(..) => write!(f, "database query failed"),
            Error::UniqueViolation(field) => {
                write!(f, "value for '{field}' is already in use")
            }
            Error::NotFound(entity) => write!(f, "{entity} not found"),
            Error::PasswordHash(..) => write!(f, "failed to hash password"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Pool(error) => Some(error),
            Error::Migrate(error) => Some(error),
            Error::Query(error) => Some(error),
            Error::PasswordHash(error) => Some(error),
            Error::UniqueViolation(..) | Error::NotFound(..) => None,
        }
    }
}

impl From<sqlx::migrate::MigrateError> for Error {
    fn from(error: sqlx::migrate::MigrateError) -> Error {
        Error::Migrate(error)
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(error: bcrypt::BcryptError) -> Error {
        Error::PasswordHash(error)
    }
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Error {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::UniqueViolation("unique constraint")
            }
            sqlx::Error::RowNotFound => Error::NotFound("row"),
            _ => Error::Query(error),
        }
    }
}

/// Checks a raw `sqlx::Error` for a unique-constraint violation without
/// consuming it -- used in match guards, where moving the scrutinee isn't
/// allowed.
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}
