use std::env;
use std::time::Duration;

/// Runtime configuration, read once at startup and passed explicitly into the
/// components that need it. There is no package-level mutable state; the
/// session signing/storage setup lives entirely inside this object.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub server_port: u16,
    pub server_host: String,
    /// Lifetime of an issued session token.
    pub session_ttl: Duration,
    /// Upper bound on any single session-store round trip.
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            session_ttl: Duration::from_secs(
                env::var("SESSION_TTL_SECONDS")
                    .unwrap_or_else(|_| "600".to_string())
                    .parse()
                    .expect("SESSION_TTL_SECONDS must be a number"),
            ),
            store_timeout: Duration::from_millis(
                env::var("STORE_TIMEOUT_MS")
                    .unwrap_or_else(|_| "2000".to_string())
                    .parse()
                    .expect("STORE_TIMEOUT_MS must be a number"),
            ),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
