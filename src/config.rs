use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use sea_orm::ConnectOptions;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub public_origin: String,
    pub client_origin: String,
    pub upload_dir: PathBuf,
    pub session_ttl_days: i64,
    pub cookie_secure: bool,
    pub auth_rps: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "5000".to_string()).parse().context("PORT")?;

        let database_url = match std::env::var("DATABASE_URL") {
            Ok(url) => url,
            Err(_) => mysql_url_from_parts()
                .unwrap_or_else(|| "sqlite://reelhouse.db?mode=rwc".to_string()),
        };

        let db_max_connections: u32 =
            std::env::var("DB_MAX_CONNECTIONS").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        let public_origin = std::env::var("PUBLIC_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string();

        let client_origin = std::env::var("CLIENT_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        let upload_dir =
            PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()));

        let session_ttl_days: i64 =
            std::env::var("SESSION_TTL_DAYS").ok().and_then(|s| s.parse().ok()).unwrap_or(1);

        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let auth_rps: u32 =
            std::env::var("AUTH_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(5);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            db_max_connections,
            public_origin,
            client_origin,
            upload_dir,
            session_ttl_days,
            cookie_secure,
            auth_rps,
        })
    }

    pub fn database_options(&self) -> ConnectOptions {
        let mut opts = ConnectOptions::new(self.database_url.clone());
        opts.max_connections(self.db_max_connections)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        opts
    }

    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_days.max(1) * 86_400
    }
}

fn mysql_url_from_parts() -> Option<String> {
    let host = std::env::var("DB_HOST").ok()?;
    let name = std::env::var("DB_NAME").ok()?;
    let user = std::env::var("DB_USER").ok()?;
    let pass = std::env::var("DB_PASS").unwrap_or_default();
    let port = std::env::var("DB_PORT").unwrap_or_else(|_| "3306".to_string());
    Some(build_mysql_url(&host, &port, &name, &user, &pass))
}

fn build_mysql_url(host: &str, port: &str, name: &str, user: &str, pass: &str) -> String {
    let user = urlencoding::encode(user);
    if pass.is_empty() {
        format!("mysql://{user}@{host}:{port}/{name}")
    } else {
        format!("mysql://{user}:{}@{host}:{port}/{name}", urlencoding::encode(pass))
    }
}
