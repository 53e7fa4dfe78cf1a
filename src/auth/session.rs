use crate::config::Config;
use crate::error::AppError;
use redis::AsyncCommands;
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

/// Issues, validates, and revokes opaque session tokens backed by an external
/// key-value store.
///
/// A token is a random UUIDv4 string mapped to the owning user's id under
/// `session:{token}` with a fixed TTL. The store is the single source of truth:
/// a token is never trusted without a round trip, which is what makes
/// revocation O(1). The manager holds no mutable state of its own, so one
/// instance is shared across all in-flight requests via `web::Data`.
#[derive(Clone)]
pub struct SessionManager {
    client: redis::Client,
    session_ttl: Duration,
    store_timeout: Duration,
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

impl SessionManager {
    pub fn new(client: redis::Client, session_ttl: Duration, store_timeout: Duration) -> Self {
        Self {
            client,
            session_ttl,
            store_timeout,
        }
    }

    /// Opens a client against the store named in the config.
    ///
    /// The connection itself is established lazily, per request.
    pub fn connect(config: &Config) -> Result<Self, AppError> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        Ok(Self::new(client, config.session_ttl, config.store_timeout))
    }

    /// Lifetime of issued tokens, for aligning the cookie's `Max-Age`.
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Generates a fresh session token for `user_id` and writes it to the
    /// store with the configured TTL.
    ///
    /// Each login gets its own token; concurrent sessions per user are allowed.
    pub async fn issue_session(&self, user_id: i32) -> Result<String, AppError> {
        let token = Uuid::new_v4().to_string();
        let ttl_secs = self.session_ttl.as_secs().max(1);

        let mut conn = self.connection().await?;
        self.bounded(conn.set_ex::<_, _, ()>(session_key(&token), user_id, ttl_secs))
            .await??;

        Ok(token)
    }

    /// Resolves a token to the user id it was issued for.
    ///
    /// A token that is absent from the store, for whatever reason (expired,
    /// revoked, or never issued), yields the same generic `Unauthorized`
    /// error. Store unavailability is a distinct failure class and surfaces
    /// as an infrastructure error instead.
    pub async fn validate_session(&self, token: &str) -> Result<i32, AppError> {
        let mut conn = self.connection().await?;
        let user_id: Option<i32> = self.bounded(conn.get(session_key(token))).await??;

        user_id.ok_or_else(|| AppError::Unauthorized("no valid authorization token".into()))
    }

    /// Deletes a token from the store, ending that session immediately.
    ///
    /// Revoking a token that is already gone is not an error.
    pub async fn revoke_session(&self, token: &str) -> Result<(), AppError> {
        let mut conn = self.connection().await?;
        self.bounded(conn.del::<_, ()>(session_key(token))).await??;
        Ok(())
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.bounded(self.client.get_multiplexed_async_connection())
            .await?
            .map_err(AppError::from)
    }

    /// Applies the configured timeout to a store round trip. No retries; an
    /// unavailable store is surfaced immediately.
    async fn bounded<F, T>(&self, fut: F) -> Result<T, AppError>
    where
        F: std::future::Future<Output = T>,
    {
        timeout(self.store_timeout, fut)
            .await
            .map_err(|_| AppError::InternalServerError("session store timed out".into()))
    }
}
