use async_trait::async_trait;
use redis::{aio::ConnectionManager, Client};

/// Server-side session records: opaque token -> user id.
///
/// Sessions are created on signup/signin, read once per request, and removed
/// on signout; the TTL bounds abandoned sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, token: &str, user_id: i64, ttl_seconds: i64) -> Result<(), anyhow::Error>;
    async fn get(&self, token: &str) -> Result<Option<i64>, anyhow::Error>;
    async fn remove(&self, token: &str) -> Result<(), anyhow::Error>;
    async fn health_check(&self) -> Result<(), anyhow::Error>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    _client: Client,
    manager: ConnectionManager,
}

impl RedisSessionStore {
    pub async fn new(config: &crate::config::RedisConfig) -> Result<Self, anyhow::Error> {
        tracing::info!(url = %config.url, "Connecting to Redis");
        let client = Client::open(config.url.clone())?;

        // Use ConnectionManager for automatic reconnection
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!("Failed to get Redis connection manager: {}", e);
            anyhow::anyhow!("Failed to connect to Redis: {}", e)
        })?;

        tracing::info!("Successfully connected to Redis");

        Ok(Self {
            _client: client,
            manager,
        })
    }

    fn key(token: &str) -> String {
        format!("session:{}", token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, token: &str, user_id: i64, ttl_seconds: i64) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(Self::key(token))
            .arg(user_id)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to store session: {}", e))
    }

    async fn get(&self, token: &str) -> Result<Option<i64>, anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("GET")
            .arg(Self::key(token))
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read session: {}", e))
    }

    async fn remove(&self, token: &str) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("DEL")
            .arg(Self::key(token))
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to remove session: {}", e))
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        let mut conn = self.manager.clone();
        redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| anyhow::anyhow!("Redis health check failed: {}", e))
    }
}

/// In-memory session store for tests. TTLs are ignored.
pub struct MockSessionStore {
    sessions: std::sync::Mutex<std::collections::HashMap<String, i64>>,
}

impl Default for MockSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSessionStore {
    pub fn new() -> Self {
        Self {
            sessions: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }
}

#[async_trait]
impl SessionStore for MockSessionStore {
    async fn put(&self, token: &str, user_id: i64, _ttl_seconds: i64) -> Result<(), anyhow::Error> {
        self.sessions
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock session store mutex poisoned: {}", e))?
            .insert(token.to_string(), user_id);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<i64>, anyhow::Error> {
        let user_id = self
            .sessions
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock session store mutex poisoned: {}", e))?
            .get(token)
            .copied();
        Ok(user_id)
    }

    async fn remove(&self, token: &str) -> Result<(), anyhow::Error> {
        self.sessions
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock session store mutex poisoned: {}", e))?
            .remove(token);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), anyhow::Error> {
        Ok(())
    }
}
