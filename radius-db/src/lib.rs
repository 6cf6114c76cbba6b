//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The persisted store behind the RADIUS core and admin API: users, NAS
//! clients, profiles, sessions, an append-only accounting log, and admin
//! accounts, on a single SQLite database in WAL journal mode.

pub mod error;
pub mod models;
pub mod store;

pub use error::Error;
pub use models::{AccountingRecord, Admin, Credential, NasClient, Profile, Session, User};
pub use store::{Page, Stats, Store, DEFAULT_PROFILE};
