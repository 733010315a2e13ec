use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::config::FirebirdDialectConfig;
use crate::connection::{
    ConnectionId, DatabaseConnection, FirebirdConnection, NativeConnection, call_native,
};
use crate::error::FirebirdDbError;
use crate::transaction::TransactionSettings;

/// Connection lifecycle contract consumed by a query builder.
#[async_trait]
pub trait Driver: Send + Sync {
    type Connection: DatabaseConnection;

    async fn init(&self) -> Result<(), FirebirdDbError>;

    async fn acquire_connection(&self) -> Result<Self::Connection, FirebirdDbError>;

    async fn begin_transaction(
        &self,
        connection: &mut Self::Connection,
        settings: TransactionSettings,
    ) -> Result<(), FirebirdDbError>;

    async fn commit_transaction(&self, connection: &mut Self::Connection) -> Result<(), FirebirdDbError>;

    async fn rollback_transaction(&self, connection: &mut Self::Connection)
    -> Result<(), FirebirdDbError>;

    async fn release_connection(&self, connection: &mut Self::Connection) -> Result<(), FirebirdDbError>;

    async fn destroy(&self) -> Result<(), FirebirdDbError>;
}

/// Hands out [`FirebirdConnection`]s from a native pool and tracks them until release.
pub struct FirebirdDriver {
    config: FirebirdDialectConfig,
    connections: Mutex<HashMap<ConnectionId, Arc<NativeConnection>>>,
    destroyed: AtomicBool,
}

impl FirebirdDriver {
    #[must_use]
    pub fn new(config: FirebirdDialectConfig) -> Self {
        Self {
            config,
            connections: Mutex::new(HashMap::new()),
            destroyed: AtomicBool::new(false),
        }
    }

    fn tracked(&self) -> MutexGuard<'_, HashMap<ConnectionId, Arc<NativeConnection>>> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Tracked native connection for `id`, if it has not been released.
    #[must_use]
    pub fn connection(&self, id: ConnectionId) -> Option<Arc<NativeConnection>> {
        self.tracked().get(&id).cloned()
    }

    /// Number of acquired connections not yet released.
    #[must_use]
    pub fn outstanding_connections(&self) -> usize {
        self.tracked().len()
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    async fn detach_logged(id: ConnectionId, native: &NativeConnection) {
        match native.detach().await {
            Ok(()) => tracing::debug!(id = %id, "connection released"),
            Err(error) => tracing::warn!(id = %id, error = %error, "error closing connection"),
        }
    }

    /// Ask the pool for a connection and start tracking it.
    ///
    /// # Errors
    /// - [`FirebirdDbError::PoolDestroyed`] after [`FirebirdDriver::destroy`]
    /// - [`FirebirdDbError::Native`] if the pool reports a failure
    /// - [`FirebirdDbError::ConnectionError`] if the pool yields no handle
    pub async fn acquire_connection(&self) -> Result<FirebirdConnection, FirebirdDbError> {
        if self.is_destroyed() {
            return Err(FirebirdDbError::PoolDestroyed);
        }
        tracing::debug!("acquiring connection");

        let pool = &self.config.pool;
        let handle = call_native(|cb| pool.get(cb)).await?.ok_or_else(|| {
            FirebirdDbError::ConnectionError("pool yielded no connection".into())
        })?;
        let native = Arc::new(NativeConnection::new(handle));
        let connection = FirebirdConnection::new(
            Arc::clone(&native),
            self.config.inline_log_parameters,
        );

        if self.is_destroyed() {
            Self::detach_logged(connection.id(), &native).await;
            return Err(FirebirdDbError::PoolDestroyed);
        }

        self.tracked().insert(connection.id(), native);
        tracing::debug!(id = %connection.id(), "connection acquired");
        Ok(connection)
    }

    /// Begin a transaction on `connection`; an unset level uses the configured default.
    ///
    /// # Errors
    /// See [`FirebirdConnection::begin_transaction`].
    pub async fn begin_transaction(
        &self,
        connection: &mut FirebirdConnection,
        settings: TransactionSettings,
    ) -> Result<(), FirebirdDbError> {
        let isolation_level = settings
            .isolation_level
            .unwrap_or(self.config.default_isolation_level);
        tracing::debug!(id = %connection.id(), isolation_level = %isolation_level, "beginning transaction");
        connection.begin_transaction(isolation_level).await
    }

    /// # Errors
    /// See [`FirebirdConnection::commit_transaction`].
    pub async fn commit_transaction(
        &self,
        connection: &mut FirebirdConnection,
    ) -> Result<(), FirebirdDbError> {
        connection.commit_transaction().await?;
        tracing::debug!(id = %connection.id(), "transaction committed");
        Ok(())
    }

    /// # Errors
    /// See [`FirebirdConnection::rollback_transaction`].
    pub async fn rollback_transaction(
        &self,
        connection: &mut FirebirdConnection,
    ) -> Result<(), FirebirdDbError> {
        connection.rollback_transaction().await?;
        tracing::debug!(id = %connection.id(), "transaction rolled back");
        Ok(())
    }

    /// Return `connection` to the pool.
    ///
    /// An open transaction is rolled back first. Rollback and detach failures are logged,
    /// never returned; the connection is untracked and unusable afterwards either way.
    pub async fn release_connection(&self, connection: &mut FirebirdConnection) {
        let id = connection.id();
        tracing::debug!(id = %id, "releasing connection");

        if connection.has_active_transaction() {
            if let Err(error) = connection.rollback_transaction().await {
                tracing::warn!(id = %id, error = %error, "rollback before release failed");
            }
        }

        let native = self
            .tracked()
            .remove(&id)
            .unwrap_or_else(|| Arc::clone(connection.native()));
        Self::detach_logged(id, &native).await;
    }

    /// Release every tracked connection, then tear down the pool.
    ///
    /// Further acquires fail with [`FirebirdDbError::PoolDestroyed`]. Calling this twice
    /// is a no-op.
    pub async fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return;
        }
        let remaining: Vec<(ConnectionId, Arc<NativeConnection>)> =
            self.tracked().drain().collect();
        tracing::debug!(connections = remaining.len(), "destroying driver");
        for (id, native) in remaining {
            Self::detach_logged(id, &native).await;
        }
        self.config.pool.destroy();
    }
}

#[async_trait]
impl Driver for FirebirdDriver {
    type Connection = FirebirdConnection;

    async fn init(&self) -> Result<(), FirebirdDbError> {
        Ok(())
    }

    async fn acquire_connection(&self) -> Result<FirebirdConnection, FirebirdDbError> {
        FirebirdDriver::acquire_connection(self).await
    }

    async fn begin_transaction(
        &self,
        connection: &mut FirebirdConnection,
        settings: TransactionSettings,
    ) -> Result<(), FirebirdDbError> {
        FirebirdDriver::begin_transaction(self, connection, settings).await
    }

    async fn commit_transaction(&self, connection: &mut FirebirdConnection) -> Result<(), FirebirdDbError> {
        FirebirdDriver::commit_transaction(self, connection).await
    }

    async fn rollback_transaction(
        &self,
        connection: &mut FirebirdConnection,
    ) -> Result<(), FirebirdDbError> {
        FirebirdDriver::rollback_transaction(self, connection).await
    }

    async fn release_connection(&self, connection: &mut FirebirdConnection) -> Result<(), FirebirdDbError> {
        FirebirdDriver::release_connection(self, connection).await;
        Ok(())
    }

    async fn destroy(&self) -> Result<(), FirebirdDbError> {
        FirebirdDriver::destroy(self).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativePool;
    use crate::test_utils::{MockEvent, MockPool};

    fn driver(pool: &MockPool) -> FirebirdDriver {
        let pool: Arc<dyn NativePool> = Arc::new(pool.clone());
        FirebirdDriver::new(FirebirdDialectConfig::new(pool))
    }

    #[tokio::test]
    async fn acquire_tracks_and_release_untracks() {
        let pool = MockPool::new();
        let driver = driver(&pool);
        let mut conn = driver.acquire_connection().await.unwrap();
        assert_eq!(driver.outstanding_connections(), 1);
        assert!(driver.connection(conn.id()).is_some());

        driver.release_connection(&mut conn).await;
        assert_eq!(driver.outstanding_connections(), 0);
        assert!(conn.is_released());
        assert_eq!(pool.attached(), 0);

        let err = conn.execute("select 1 from rdb$database", &[]).await.unwrap_err();
        assert!(matches!(err, FirebirdDbError::ConnectionReleased(_)));
    }

    #[tokio::test]
    async fn pool_failures_surface_on_acquire() {
        let pool = MockPool::new();
        let driver = driver(&pool);

        pool.fail_next_get("connection refused");
        let err = driver.acquire_connection().await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");

        pool.yield_nothing_next();
        let err = driver.acquire_connection().await.unwrap_err();
        assert!(matches!(err, FirebirdDbError::ConnectionError(_)));
        assert_eq!(driver.outstanding_connections(), 0);
    }

    #[tokio::test]
    async fn failed_detach_still_untracks() {
        let pool = MockPool::new();
        let driver = driver(&pool);
        let mut conn = driver.acquire_connection().await.unwrap();
        pool.fail_next_detach("network error");
        driver.release_connection(&mut conn).await;
        assert_eq!(driver.outstanding_connections(), 0);
        assert!(driver.connection(conn.id()).is_none());
    }

    #[tokio::test]
    async fn release_rolls_back_open_transaction() {
        let pool = MockPool::new();
        let driver = driver(&pool);
        let mut conn = driver.acquire_connection().await.unwrap();
        driver
            .begin_transaction(&mut conn, TransactionSettings::default())
            .await
            .unwrap();
        driver.release_connection(&mut conn).await;
        let events = pool.events();
        let rollback = events.iter().position(|e| *e == MockEvent::Rollback).unwrap();
        let detach = events.iter().position(|e| *e == MockEvent::Detach).unwrap();
        assert!(rollback < detach);
        assert!(!conn.has_active_transaction());
    }

    #[tokio::test]
    async fn destroy_releases_everything_before_the_pool() {
        let pool = MockPool::new();
        let driver = driver(&pool);
        let _a = driver.acquire_connection().await.unwrap();
        let _b = driver.acquire_connection().await.unwrap();

        driver.destroy().await;

        let events = pool.events();
        let detaches = events.iter().filter(|e| **e == MockEvent::Detach).count();
        assert_eq!(detaches, 2);
        assert_eq!(events.last(), Some(&MockEvent::Destroy));
        assert_eq!(driver.outstanding_connections(), 0);
        assert!(matches!(
            driver.acquire_connection().await,
            Err(FirebirdDbError::PoolDestroyed)
        ));

        driver.destroy().await;
        let destroys = pool.events().iter().filter(|e| **e == MockEvent::Destroy).count();
        assert_eq!(destroys, 1);
    }
}
