//! Runtime settings: defaults, then `DATABASE_URL`, then `BOARD_*` variables.

use ::config::{Config, ConfigError, Environment};
use serde::Deserialize;

const DEFAULT_DATABASE_URL: &str = "sqlite:rusty_board.db?mode=rwc";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Store location, e.g. `sqlite:board.db` or `sqlite::memory:`
    pub database_url: String,
    /// Store Argon2 hashes instead of plaintext delete passwords
    pub password_hashing: bool,
}

impl Settings {
    /// # Environment Variables
    /// - `BOARD_HOST` (default `127.0.0.1`)
    /// - `BOARD_PORT` (default `8080`)
    /// - `BOARD_DATABASE_URL`, falling back to `DATABASE_URL`
    /// - `BOARD_PASSWORD_HASHING` (default `false`)
    pub fn load() -> Result<Self, ConfigError> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8080)?
            .set_default("database_url", database_url)?
            .set_default("password_hashing", false)?
            .add_source(Environment::with_prefix("BOARD").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize() {
        let settings: Settings = Config::builder()
            .set_default("host", "0.0.0.0")
            .unwrap()
            .set_default("port", 3000)
            .unwrap()
            .set_default("database_url", DEFAULT_DATABASE_URL)
            .unwrap()
            .set_default("password_hashing", false)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.bind_addr(), ("0.0.0.0", 3000));
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert!(!settings.password_hashing);
    }
}
