use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub upload_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = DatabaseConfig {
            host: std::env::var("MYSQLHOST").unwrap_or_else(|_| "localhost".into()),
            user: std::env::var("MYSQLUSER").unwrap_or_else(|_| "root".into()),
            password: std::env::var("MYSQLPASSWORD").unwrap_or_default(),
            database: std::env::var("MYSQLDATABASE").unwrap_or_else(|_| "tastebook".into()),
            port: std::env::var("MYSQLPORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(3306),
        };
        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".into())
            .into();
        let static_dir = std::env::var("STATIC_DIR")
            .unwrap_or_else(|_| "static".into())
            .into();
        Ok(Self {
            database,
            upload_dir,
            static_dir,
        })
    }
}

impl DatabaseConfig {
    /// Loopback connections stay plaintext; anything else goes over TLS.
    pub fn requires_tls(&self) -> bool {
        !matches!(self.host.as_str(), "localhost" | "127.0.0.1" | "::1")
    }
}

#[cfg(test)]
mod tests {
    use super::DatabaseConfig;

    fn with_host(host: &str) -> DatabaseConfig {
        DatabaseConfig {
            host: host.into(),
            user: "root".into(),
            password: String::new(),
            database: "tastebook".into(),
            port: 3306,
        }
    }

    #[test]
    fn loopback_hosts_skip_tls() {
        assert!(!with_host("localhost").requires_tls());
        assert!(!with_host("127.0.0.1").requires_tls());
        assert!(!with_host("::1").requires_tls());
    }

    #[test]
    fn remote_hosts_require_tls() {
        assert!(with_host("db.internal.example.com").requires_tls());
        assert!(with_host("10.0.0.5").requires_tls());
    }
}
