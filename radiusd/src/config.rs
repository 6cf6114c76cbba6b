//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::Deserialize;

/// Daemon configuration, loaded from a TOML file and then overridden by
/// environment variables (§6). Every field has a usable default so the
/// daemon can start with no config file at all.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub auth_port: u16,
    pub acct_port: u16,
    pub dashboard_port: u16,
    pub database_path: String,
    pub default_secret: String,
    pub admin_username: String,
    pub admin_password: String,
    pub jwt_secret: String,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            auth_port: 1812,
            acct_port: 1813,
            dashboard_port: 8080,
            database_path: "radiusd.db".to_owned(),
            default_secret: "testing123".to_owned(),
            admin_username: "admin".to_owned(),
            admin_password: "admin123".to_owned(),
            jwt_secret: "change-me-in-production".to_owned(),
            log_level: "info".to_owned(),
        }
    }
}

impl Config {
    const DFLT_FILEPATH: &'static str = "/etc/radiusd.toml";

    /// Loads `config_file` (or the default path), falling back to
    /// [`Config::default`] when the file is absent, then lets the
    /// environment variables from §6 override individual fields.
    pub(crate) fn load(config_file: Option<&str>) -> Config {
        let config_file = config_file.unwrap_or(Config::DFLT_FILEPATH);

        let mut config = match std::fs::read_to_string(config_file) {
            Ok(config_str) => {
                toml::from_str(&config_str).expect("failed to parse configuration file")
            }
            Err(_) => Config::default(),
        };
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("RADIUS_AUTH_PORT") {
            if let Ok(port) = value.parse() {
                self.auth_port = port;
            }
        }
        if let Ok(value) = std::env::var("RADIUS_ACCT_PORT") {
            if let Ok(port) = value.parse() {
                self.acct_port = port;
            }
        }
        if let Ok(value) = std::env::var("DASHBOARD_PORT") {
            if let Ok(port) = value.parse() {
                self.dashboard_port = port;
            }
        }
        if let Ok(value) = std::env::var("DATABASE_PATH") {
            self.database_path = value;
        }
        if let Ok(value) = std::env::var("DEFAULT_SECRET") {
            self.default_secret = value;
        }
        if let Ok(value) = std::env::var("ADMIN_USERNAME") {
            self.admin_username = value;
        }
        if let Ok(value) = std::env::var("ADMIN_PASSWORD") {
            self.admin_password = value;
        }
        if let Ok(value) = std::env::var("JWT_SECRET") {
            self.jwt_secret = value;
        }
        if let Ok(value) = std::env::var("LOG_LEVEL") {
            self.log_level = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_the_spec_default_ports() {
        let config = Config::default();
        assert_eq!(config.auth_port, 1812);
        assert_eq!(config.acct_port, 1813);
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = Config::load(Some("/nonexistent/radiusd.toml"));
        assert_eq!(config.database_path, "radiusd.db");
    }
}
