//! RedisStagingStore - staging store backed by a redis server

use std::collections::HashMap;

use contracts::{ContractError, StagingStore};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Staging store on a redis server
///
/// Holds one multiplexed connection; every operation is a single command.
pub struct RedisStagingStore {
    name: String,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl RedisStagingStore {
    /// Connect to the server at `url`
    #[instrument(name = "redis_staging_connect", skip(url))]
    pub async fn connect(url: &str) -> Result<Self, ContractError> {
        let name = "redis".to_string();
        let client = redis::Client::open(url)
            .map_err(|e| ContractError::store(&name, format!("invalid url: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| ContractError::store(&name, format!("connect failed: {e}")))?;

        info!(store = %name, "RedisStagingStore connected");

        Ok(Self {
            name,
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Clone of the live connection; multiplexed connections are cheap to clone
    async fn conn(&self) -> Result<MultiplexedConnection, ContractError> {
        self.conn
            .lock()
            .await
            .clone()
            .ok_or_else(|| ContractError::store(&self.name, "store is closed"))
    }

    fn command_error(&self, command: &str, key: &str, err: redis::RedisError) -> ContractError {
        ContractError::store(&self.name, format!("{command} '{key}' failed: {err}"))
    }
}

impl StagingStore for RedisStagingStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "redis_staging_delete", skip(self))]
    async fn delete(&self, key: &str) -> Result<(), ContractError> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| self.command_error("DEL", key, e))
    }

    #[instrument(name = "redis_staging_add_member", skip(self))]
    async fn add_member(&self, key: &str, member: &str) -> Result<(), ContractError> {
        let mut conn = self.conn().await?;
        conn.sadd::<_, _, ()>(key, member)
            .await
            .map_err(|e| self.command_error("SADD", key, e))
    }

    #[instrument(name = "redis_staging_members", skip(self))]
    async fn members(&self, key: &str) -> Result<Vec<String>, ContractError> {
        let mut conn = self.conn().await?;
        conn.smembers::<_, Vec<String>>(key)
            .await
            .map_err(|e| self.command_error("SMEMBERS", key, e))
    }

    #[instrument(name = "redis_staging_field_map", skip(self))]
    async fn field_map(&self, key: &str) -> Result<HashMap<String, String>, ContractError> {
        let mut conn = self.conn().await?;
        conn.hgetall::<_, HashMap<String, String>>(key)
            .await
            .map_err(|e| self.command_error("HGETALL", key, e))
    }

    #[instrument(name = "redis_staging_set_field_map", skip(self, fields))]
    async fn set_field_map(
        &self,
        key: &str,
        fields: &HashMap<String, String>,
    ) -> Result<(), ContractError> {
        if fields.is_empty() {
            return Ok(());
        }
        let items: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let mut conn = self.conn().await?;
        conn.hset_multiple::<_, _, _, ()>(key, items.as_slice())
            .await
            .map_err(|e| self.command_error("HSET", key, e))
    }

    #[instrument(name = "redis_staging_keys", skip(self))]
    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>, ContractError> {
        let mut conn = self.conn().await?;
        conn.keys::<_, Vec<String>>(pattern)
            .await
            .map_err(|e| self.command_error("KEYS", pattern, e))
    }

    #[instrument(name = "redis_staging_close", skip(self))]
    async fn close(&self) -> Result<(), ContractError> {
        let dropped = self.conn.lock().await.take();
        debug!(store = %self.name, was_open = dropped.is_some(), "RedisStagingStore closed");
        Ok(())
    }
}
