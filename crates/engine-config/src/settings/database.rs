use crate::{env::EnvManager, error::ConfigError};
use std::fmt;
use urlencoding::encode;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_USER: &str = "sirenuser";
pub const DEFAULT_DATABASE: &str = "siren";

/// MySQL connection settings read from `MYSQL_*` variables.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DatabaseSettings {
    pub fn from_env(env: &EnvManager) -> Result<Self, ConfigError> {
        let port = match env.get("MYSQL_PORT").filter(|p| !p.is_empty()) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "MYSQL_PORT".into(),
                reason: format!("'{raw}' is not a port number ({e})"),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(DatabaseSettings {
            host: env.get_or("MYSQL_HOST", DEFAULT_HOST),
            port,
            user: env.get_or("MYSQL_USER", DEFAULT_USER),
            password: env.get("MYSQL_PASSWORD").unwrap_or_default().to_string(),
            database: env.get_or("MYSQL_DATABASE", DEFAULT_DATABASE),
        })
    }

    /// Connection URL understood by the MySQL driver.
    pub fn url(&self) -> String {
        self.build_url(&encode(&self.password))
    }

    /// Same as [`url`](Self::url) with the password masked, for logs.
    pub fn redacted_url(&self) -> String {
        if self.password.is_empty() {
            self.build_url("")
        } else {
            self.build_url("********")
        }
    }

    fn build_url(&self, password: &str) -> String {
        let user = encode(&self.user).into_owned();
        let credentials = if password.is_empty() {
            user
        } else {
            format!("{user}:{password}")
        };
        format!(
            "mysql://{credentials}@{}:{}/{}",
            self.host,
            self.port,
            encode(&self.database)
        )
    }
}

impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"********")
            .field("database", &self.database)
            .finish()
    }
}

impl fmt::Display for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.host, self.port, self.database)
    }
}
