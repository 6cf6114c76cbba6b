//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! The store: a single SQLite pool (WAL journal mode) behind per-call
//! atomic methods. Handlers never see a connection or a transaction that
//! spans more than one call.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::error::Error;
use crate::models::{AccountingRecord, Admin, Credential, NasClient, Profile, Session, User, UserRow};

pub const DEFAULT_PROFILE: &str = "default";

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

/// A page of results plus the total row count matching the query, the
/// shape every paginated list endpoint in the admin API returns.
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Aggregate counters behind `GET /api/dashboard/stats`.
pub struct Stats {
    pub total_users: i64,
    pub active_users: i64,
    pub total_nas: i64,
    pub active_sessions: i64,
    pub today_input_octets: i64,
    pub today_output_octets: i64,
}

impl Store {
    /// Opens (creating if absent) the SQLite database at `path` and applies
    /// pending migrations.
    pub async fn connect(path: &str) -> Result<Self, Error> {
        let mut options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        // A bare ":memory:" database is private per-connection (and can't
        // use WAL journaling); cap the pool at one connection so every
        // query lands on the same in-memory database instead of a fresh
        // empty one.
        let max_connections = if path == ":memory:" {
            1
        } else {
            options = options.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
            8
        };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(Error::Pool)?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!(%path, "database ready");
        Ok(Store { pool })
    }

    /// Seeds the default admin (from the given credentials, if no admin
    /// exists yet) and the `default` profile, per §6's first-boot contract.
    /// Idempotent: safe to call on every startup.
    pub async fn seed_defaults(
        &self,
        admin_username: &str,
        admin_password: &str,
    ) -> Result<(), Error> {
        let admin_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins")
            .fetch_one(&self.pool)
            .await?;
        if admin_count == 0 {
            let hash = bcrypt::hash(admin_password, 12)?;
            sqlx::query(
                "INSERT INTO admins (username, password_hash, role) VALUES (?, ?, 'admin')",
            )
            .bind(admin_username)
            .bind(hash)
            .execute(&self.pool)
            .await?;
            info!(username = %admin_username, "seeded default admin");
        }

        let profile_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE name = ?")
                .bind(DEFAULT_PROFILE)
                .fetch_one(&self.pool)
                .await?;
        if profile_exists == 0 {
            sqlx::query("INSERT INTO profiles (name) VALUES (?)")
                .bind(DEFAULT_PROFILE)
                .execute(&self.pool)
                .await?;
            info!("seeded default profile");
        }
        Ok(())
    }

    // ===== users =====

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, credential_kind, credential_value, is_active, \
             profile_name, expires_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    pub async fn list_users(
        &self,
        page: i64,
        limit: i64,
        search: Option<&str>,
    ) -> Result<Page<User>, Error> {
        let pattern = search.map(|s| format!("%{s}%"));
        let offset = (page.max(1) - 1) * limit.max(1);

        let (rows, total) = match &pattern {
            Some(pattern) => {
                let rows = sqlx::query_as::<_, UserRow>(
                    "SELECT id, username, credential_kind, credential_value, is_active, \
                     profile_name, expires_at FROM users WHERE username LIKE ? \
                     ORDER BY username LIMIT ? OFFSET ?",
                )
                .bind(pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                let total: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username LIKE ?")
                        .bind(pattern)
                        .fetch_one(&self.pool)
                        .await?;
                (rows, total)
            }
            None => {
                let rows = sqlx::query_as::<_, UserRow>(
                    "SELECT id, username, credential_kind, credential_value, is_active, \
                     profile_name, expires_at FROM users ORDER BY username LIMIT ? OFFSET ?",
                )
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await?;
                let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                    .fetch_one(&self.pool)
                    .await?;
                (rows, total)
            }
        };

        Ok(Page {
            items: rows.into_iter().map(User::from).collect(),
            total,
        })
    }

    pub async fn create_user(
        &self,
        username: &str,
        credential: &Credential,
        profile_name: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<User, Error> {
        let id = sqlx::query(
            "INSERT INTO users (username, credential_kind, credential_value, is_active, \
             profile_name, expires_at) VALUES (?, ?, ?, 1, ?, ?)",
        )
        .bind(username)
        .bind(credential.kind())
        .bind(credential.value())
        .bind(profile_name)
        .bind(expires_at)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_user_by_username(username)
            .await?
            .ok_or(Error::NotFound("user"))
            .map(|u| {
                debug_assert_eq!(u.id, id);
                u
            })
    }

    pub async fn update_user(
        &self,
        username: &str,
        is_active: Option<bool>,
        profile_name: Option<&str>,
        credential: Option<&Credential>,
        expires_at: Option<Option<DateTime<Utc>>>,
    ) -> Result<User, Error> {
        let current = self
            .get_user_by_username(username)
            .await?
            .ok_or(Error::NotFound("user"))?;

        let is_active = is_active.unwrap_or(current.is_active);
        let profile_name = profile_name.unwrap_or(&current.profile_name).to_string();
        let (credential_kind, credential_value) = match credential {
            Some(c) => (c.kind().to_string(), c.value()),
            None => (current.credential_kind.clone(), current.credential_value.clone()),
        };
        let expires_at = expires_at.unwrap_or(current.expires_at);

        sqlx::query(
            "UPDATE users SET is_active = ?, profile_name = ?, credential_kind = ?, \
             credential_value = ?, expires_at = ? WHERE username = ?",
        )
        .bind(is_active)
        .bind(&profile_name)
        .bind(&credential_kind)
        .bind(&credential_value)
        .bind(expires_at)
        .bind(username)
        .execute(&self.pool)
        .await?;

        self.get_user_by_username(username)
            .await?
            .ok_or(Error::NotFound("user"))
    }

    pub async fn delete_user(&self, username: &str) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM users WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("user"));
        }
        Ok(())
    }

    // ===== NAS clients =====

    pub async fn get_nas_by_ip(&self, ip_address: &str) -> Result<Option<NasClient>, Error> {
        let nas = sqlx::query_as::<_, NasClient>(
            "SELECT id, ip_address, secret, name, vendor, is_active FROM nas_clients \
             WHERE ip_address = ?",
        )
        .bind(ip_address)
        .fetch_optional(&self.pool)
        .await?;
        Ok(nas)
    }

    pub async fn list_nas(&self) -> Result<Vec<NasClient>, Error> {
        let rows = sqlx::query_as::<_, NasClient>(
            "SELECT id, ip_address, secret, name, vendor, is_active FROM nas_clients \
             ORDER BY ip_address",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_nas(
        &self,
        ip_address: &str,
        secret: &str,
        name: &str,
        vendor: &str,
    ) -> Result<NasClient, Error> {
        sqlx::query(
            "INSERT INTO nas_clients (ip_address, secret, name, vendor, is_active) \
             VALUES (?, ?, ?, ?, 1)",
        )
        .bind(ip_address)
        .bind(secret)
        .bind(name)
        .bind(vendor)
        .execute(&self.pool)
        .await?;
        self.get_nas_by_ip(ip_address)
            .await?
            .ok_or(Error::NotFound("nas client"))
    }

    pub async fn update_nas(
        &self,
        ip_address: &str,
        secret: Option<&str>,
        name: Option<&str>,
        is_active: Option<bool>,
    ) -> Result<NasClient, Error> {
        let current = self
            .get_nas_by_ip(ip_address)
            .await?
            .ok_or(Error::NotFound("nas client"))?;
        sqlx::query(
            "UPDATE nas_clients SET secret = ?, name = ?, is_active = ? WHERE ip_address = ?",
        )
        .bind(secret.unwrap_or(&current.secret))
        .bind(name.unwrap_or(&current.name))
        .bind(is_active.unwrap_or(current.is_active))
        .bind(ip_address)
        .execute(&self.pool)
        .await?;
        self.get_nas_by_ip(ip_address)
            .await?
            .ok_or(Error::NotFound("nas client"))
    }

    pub async fn delete_nas(&self, ip_address: &str) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM nas_clients WHERE ip_address = ?")
            .bind(ip_address)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("nas client"));
        }
        Ok(())
    }

    // ===== profiles =====

    pub async fn get_profile_by_name(&self, name: &str) -> Result<Option<Profile>, Error> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT id, name, rate_limit, session_timeout, idle_timeout FROM profiles \
             WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn list_profiles(&self) -> Result<Vec<Profile>, Error> {
        let rows = sqlx::query_as::<_, Profile>(
            "SELECT id, name, rate_limit, session_timeout, idle_timeout FROM profiles \
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create_profile(
        &self,
        name: &str,
        rate_limit: Option<&str>,
        session_timeout: Option<i64>,
        idle_timeout: Option<i64>,
    ) -> Result<Profile, Error> {
        sqlx::query(
            "INSERT INTO profiles (name, rate_limit, session_timeout, idle_timeout) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(rate_limit)
        .bind(session_timeout)
        .bind(idle_timeout)
        .execute(&self.pool)
        .await?;
        self.get_profile_by_name(name)
            .await?
            .ok_or(Error::NotFound("profile"))
    }

    // ===== sessions & accounting =====

    /// Handles Accounting-Request Start: upsert by `session_id`, clearing
    /// `stop_time` and resetting `start_time` if the row already exists
    /// (tolerates a NAS retransmitting Start for a session it never saw
    /// acknowledged). Races with a concurrent first-insert are resolved by
    /// falling back to the update on a unique-constraint violation.
    pub async fn accounting_start(
        &self,
        session_id: &str,
        username: &str,
        nas_ip_address: &str,
        framed_ip: Option<&str>,
        mac_address: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let insert = sqlx::query(
            "INSERT INTO sessions (session_id, username, nas_ip_address, framed_ip, \
             mac_address, start_time, update_time, stop_time, session_time, \
             input_octets, output_octets, terminate_cause) \
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL, 0, 0, 0, NULL)",
        )
        .bind(session_id)
        .bind(username)
        .bind(nas_ip_address)
        .bind(framed_ip)
        .bind(mac_address)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match insert {
            Ok(_) => Ok(()),
            Err(error) if crate::error::is_unique_violation(&error) => {
                sqlx::query(
                    "UPDATE sessions SET username = ?, nas_ip_address = ?, framed_ip = ?, \
                     mac_address = ?, start_time = ?, update_time = ?, stop_time = NULL \
                     WHERE session_id = ?",
                )
                .bind(username)
                .bind(nas_ip_address)
                .bind(framed_ip)
                .bind(mac_address)
                .bind(now)
                .bind(now)
                .bind(session_id)
                .execute(&self.pool)
                .await?;
                Ok(())
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Handles Interim-Update: updates cumulative counters, creating the
    /// session row if Start was missed.
    pub async fn accounting_interim(
        &self,
        session_id: &str,
        username: &str,
        nas_ip_address: &str,
        session_time: i64,
        input_octets: i64,
        output_octets: i64,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let updated = sqlx::query(
            "UPDATE sessions SET update_time = ?, session_time = ?, input_octets = ?, \
             output_octets = ? WHERE session_id = ?",
        )
        .bind(now)
        .bind(session_time)
        .bind(input_octets)
        .bind(output_octets)
        .bind(session_id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            let insert = sqlx::query(
                "INSERT INTO sessions (session_id, username, nas_ip_address, start_time, \
                 update_time, stop_time, session_time, input_octets, output_octets, \
                 terminate_cause) VALUES (?, ?, ?, ?, ?, NULL, ?, ?, ?, NULL)",
            )
            .bind(session_id)
            .bind(username)
            .bind(nas_ip_address)
            .bind(now)
            .bind(now)
            .bind(session_time)
            .bind(input_octets)
            .bind(output_octets)
            .execute(&self.pool)
            .await;
            if let Err(error) = insert {
                if !crate::error::is_unique_violation(&error) {
                    return Err(error.into());
                }
                // Lost the race to a concurrent Start/Interim; the counters
                // above already landed via the UPDATE branch of whichever
                // handler won, nothing further to do.
            }
        }
        Ok(())
    }

    /// Handles Stop: sets `stop_time`, final counters and
    /// `terminate_cause` (defaulting to `"User-Request"`).
    pub async fn accounting_stop(
        &self,
        session_id: &str,
        session_time: i64,
        input_octets: i64,
        output_octets: i64,
        terminate_cause: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            "UPDATE sessions SET stop_time = ?, update_time = ?, session_time = ?, \
             input_octets = ?, output_octets = ?, terminate_cause = ? WHERE session_id = ?",
        )
        .bind(now)
        .bind(now)
        .bind(session_time)
        .bind(input_octets)
        .bind(output_octets)
        .bind(terminate_cause.unwrap_or("User-Request"))
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn append_accounting_record(
        &self,
        session_id: &str,
        username: &str,
        nas_ip_address: &str,
        status_type: &str,
        session_time: i64,
        input_octets: i64,
        output_octets: i64,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO accounting_log (session_id, username, nas_ip_address, status_type, \
             session_time, input_octets, output_octets, recorded_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(session_id)
        .bind(username)
        .bind(nas_ip_address)
        .bind(status_type)
        .bind(session_time)
        .bind(input_octets)
        .bind(output_octets)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list_active_sessions(&self) -> Result<Vec<Session>, Error> {
        let rows = sqlx::query_as::<_, Session>(
            "SELECT id, session_id, username, nas_ip_address, framed_ip, mac_address, \
             start_time, update_time, stop_time, session_time, input_octets, output_octets, \
             terminate_cause FROM sessions WHERE stop_time IS NULL ORDER BY start_time DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_accounting(&self, page: i64, limit: i64) -> Result<Page<AccountingRecord>, Error> {
        let offset = (page.max(1) - 1) * limit.max(1);
        let rows = sqlx::query_as::<_, AccountingRecord>(
            "SELECT id, session_id, username, nas_ip_address, status_type, session_time, \
             input_octets, output_octets, recorded_at FROM accounting_log \
             ORDER BY recorded_at DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounting_log")
            .fetch_one(&self.pool)
            .await?;
        Ok(Page { items: rows, total })
    }

    // ===== admins =====

    pub async fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>, Error> {
        let admin = sqlx::query_as::<_, Admin>(
            "SELECT id, username, password_hash, role FROM admins WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    // ===== stats =====

    pub async fn stats(&self) -> Result<Stats, Error> {
        let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        let active_users: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;
        let total_nas: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM nas_clients")
            .fetch_one(&self.pool)
            .await?;
        let active_sessions: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE stop_time IS NULL")
                .fetch_one(&self.pool)
                .await?;

        let row = sqlx::query(
            "SELECT COALESCE(SUM(input_octets), 0) AS input, \
             COALESCE(SUM(output_octets), 0) AS output FROM accounting_log \
             WHERE date(recorded_at) = date('now')",
        )
        .fetch_one(&self.pool)
        .await?;
        let today_input_octets: i64 = row.try_get("input")?;
        let today_output_octets: i64 = row.try_get("output")?;

        Ok(Stats {
            total_users,
            active_users,
            total_nas,
            active_sessions,
            today_input_octets,
            today_output_octets,
        })
    }
}
