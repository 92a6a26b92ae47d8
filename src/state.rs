use std::sync::Arc;

use anyhow::Context;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlSslMode};

use crate::config::AppConfig;
use crate::uploads::{DiskUploads, UploadStore};

#[derive(Clone)]
pub struct AppState {
    pub db: MySqlPool,
    pub config: Arc<AppConfig>,
    pub uploads: Arc<dyn UploadStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db_cfg = &config.database;
        let ssl_mode = if db_cfg.requires_tls() {
            // Managed MySQL endpoints present certs we do not pin.
            MySqlSslMode::Required
        } else {
            MySqlSslMode::Disabled
        };
        let options = MySqlConnectOptions::new()
            .host(&db_cfg.host)
            .port(db_cfg.port)
            .username(&db_cfg.user)
            .password(&db_cfg.password)
            .database(&db_cfg.database)
            .ssl_mode(ssl_mode);

        let db = MySqlPoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("connect to database")?;

        let uploads = Arc::new(DiskUploads::new(&config.upload_dir)) as Arc<dyn UploadStore>;

        Ok(Self {
            db,
            config,
            uploads,
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use async_trait::async_trait;
        use bytes::Bytes;

        #[derive(Clone)]
        struct FakeUploads;
        #[async_trait]
        impl UploadStore for FakeUploads {
            async fn save(&self, ext: &str, _body: Bytes) -> anyhow::Result<String> {
                Ok(format!("/uploads/fake.{ext}"))
            }
            async fn read(&self, _filename: &str) -> anyhow::Result<Option<Vec<u8>>> {
                Ok(None)
            }
        }

        let db = MySqlPoolOptions::new()
            .connect_lazy("mysql://root@localhost:3306/tastebook")
            .expect("lazy pool ok");

        let config = Arc::new(AppConfig {
            database: crate::config::DatabaseConfig {
                host: "localhost".into(),
                user: "root".into(),
                password: String::new(),
                database: "tastebook".into(),
                port: 3306,
            },
            upload_dir: "uploads".into(),
            static_dir: "static".into(),
        });

        let uploads = Arc::new(FakeUploads) as Arc<dyn UploadStore>;
        Self {
            db,
            config,
            uploads,
        }
    }
}
