//! Async wrapper around one native Firebird connection.

mod bridge;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use uuid::Uuid;

pub(crate) use bridge::call_native;
pub use bridge::NativeConnection;

use crate::compiler::CompiledQuery;
use crate::error::FirebirdDbError;
use crate::native::{NativeResult, PositionalRows};
use crate::results::ResultSet;
use crate::transaction::{IsolationLevel, Transaction};
use crate::translation::{inline_parameters, renumber_placeholders};
use crate::types::RowValues;

/// Unique identifier of a wrapped connection, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Query-side contract of a connection, as seen by a query builder.
#[async_trait]
pub trait DatabaseConnection: Send + Sync {
    async fn execute_query(&self, query: &CompiledQuery) -> Result<ResultSet, FirebirdDbError>;

    async fn stream_query(
        &self,
        query: &CompiledQuery,
        chunk_size: Option<usize>,
    ) -> Result<ResultSet, FirebirdDbError>;
}

/// One native connection with at most one active transaction.
///
/// Statements run on the active transaction when there is one, otherwise directly on
/// the connection. Calls on the same connection complete in the order they were issued.
pub struct FirebirdConnection {
    id: ConnectionId,
    native: Arc<NativeConnection>,
    transaction: Option<Transaction>,
    inline_log_parameters: bool,
}

enum Call {
    Query,
    Execute,
}

enum Outcome {
    Rows(NativeResult),
    Positional(PositionalRows),
}

impl FirebirdConnection {
    pub(crate) fn new(native: Arc<NativeConnection>, inline_log_parameters: bool) -> Self {
        Self {
            id: ConnectionId::new(),
            native,
            transaction: None,
            inline_log_parameters,
        }
    }

    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub(crate) fn native(&self) -> &Arc<NativeConnection> {
        &self.native
    }

    #[must_use]
    pub fn has_active_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Isolation level of the active transaction.
    #[must_use]
    pub fn isolation_level(&self) -> Option<IsolationLevel> {
        self.transaction.as_ref().map(Transaction::isolation_level)
    }

    /// `true` once the connection has been handed back to the pool.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.native.is_released()
    }

    /// Run a statement and collect its rows.
    ///
    /// Numbered `$N` markers are rewritten to `?` first. `rows_affected` is never
    /// reported.
    ///
    /// # Errors
    /// - [`FirebirdDbError::PlaceholderError`] if markers and `params` disagree
    /// - [`FirebirdDbError::ConnectionReleased`] after release
    /// - [`FirebirdDbError::Native`] with the client's error, unchanged
    pub async fn execute(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<ResultSet, FirebirdDbError> {
        match self.dispatch(Call::Query, sql, params).await? {
            Outcome::Rows(result) => Ok(ResultSet::from_rows(result.into_rows())),
            Outcome::Positional(_) => Err(FirebirdDbError::ConnectionError(
                "native query answered with positional rows".into(),
            )),
        }
    }

    /// Run a statement through the native `execute` call, returning positional rows.
    ///
    /// # Errors
    /// Same as [`FirebirdConnection::execute`].
    pub async fn execute_rows(
        &self,
        sql: &str,
        params: &[RowValues],
    ) -> Result<PositionalRows, FirebirdDbError> {
        match self.dispatch(Call::Execute, sql, params).await? {
            Outcome::Positional(rows) => Ok(rows),
            Outcome::Rows(_) => Err(FirebirdDbError::ConnectionError(
                "native execute answered with named rows".into(),
            )),
        }
    }

    async fn dispatch(
        &self,
        call: Call,
        sql: &str,
        params: &[RowValues],
    ) -> Result<Outcome, FirebirdDbError> {
        let sql = renumber_placeholders(sql, params.len())?;
        if self.native.is_released() {
            return Err(FirebirdDbError::ConnectionReleased(self.id.to_string()));
        }

        if self.inline_log_parameters {
            tracing::debug!(id = %self.id, sql = %inline_parameters(&sql, params), "executing query");
        } else {
            tracing::debug!(id = %self.id, sql = %sql, "executing query");
        }

        let started = Instant::now();
        let params = params.to_vec();
        let result = match (&self.transaction, call) {
            (Some(tx), Call::Query) => self
                .native
                .run(|cb| tx.handle.query(&sql, params, cb))
                .await
                .map(Outcome::Rows),
            (Some(tx), Call::Execute) => self
                .native
                .run(|cb| tx.handle.execute(&sql, params, cb))
                .await
                .map(Outcome::Positional),
            (None, Call::Query) => self
                .native
                .run(|cb| self.native.handle().query(&sql, params, cb))
                .await
                .map(Outcome::Rows),
            (None, Call::Execute) => self
                .native
                .run(|cb| self.native.handle().execute(&sql, params, cb))
                .await
                .map(Outcome::Positional),
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match &result {
            Ok(_) => tracing::debug!(id = %self.id, duration_ms, "execution complete"),
            Err(error) => {
                tracing::error!(id = %self.id, duration_ms, error = %error, "error executing query");
            }
        }
        result
    }

    /// Run a compiled query.
    ///
    /// # Errors
    /// Same as [`FirebirdConnection::execute`].
    pub async fn execute_query(&self, query: &CompiledQuery) -> Result<ResultSet, FirebirdDbError> {
        self.execute(&query.sql, &query.parameters).await
    }

    /// Streaming is not available over the callback client.
    ///
    /// # Errors
    /// Always [`FirebirdDbError::Unimplemented`].
    pub fn stream_query(&self, _query: &CompiledQuery) -> Result<ResultSet, FirebirdDbError> {
        Err(FirebirdDbError::Unimplemented("streaming queries".into()))
    }

    /// Start a transaction with the given isolation level.
    ///
    /// # Errors
    /// [`FirebirdDbError::TransactionAlreadyActive`] if one is already open, otherwise
    /// any native failure; the connection stays without a transaction on failure.
    pub async fn begin_transaction(
        &mut self,
        isolation_level: IsolationLevel,
    ) -> Result<(), FirebirdDbError> {
        if self.transaction.is_some() {
            return Err(FirebirdDbError::TransactionAlreadyActive);
        }
        if self.native.is_released() {
            return Err(FirebirdDbError::ConnectionReleased(self.id.to_string()));
        }
        let flags = isolation_level.flags();
        let handle = self
            .native
            .run(|cb| self.native.handle().transaction(flags, cb))
            .await?;
        self.transaction = Some(Transaction {
            handle,
            isolation_level,
        });
        Ok(())
    }

    /// Commit the active transaction.
    ///
    /// The transaction is consumed even when the native commit fails.
    ///
    /// # Errors
    /// [`FirebirdDbError::NoActiveTransaction`] when none is open, otherwise any native
    /// failure.
    pub async fn commit_transaction(&mut self) -> Result<(), FirebirdDbError> {
        let tx = self
            .transaction
            .take()
            .ok_or(FirebirdDbError::NoActiveTransaction)?;
        self.native.run(|cb| tx.handle.commit(cb)).await
    }

    /// Roll back the active transaction.
    ///
    /// # Errors
    /// [`FirebirdDbError::NoActiveTransaction`] when none is open, otherwise any native
    /// failure.
    pub async fn rollback_transaction(&mut self) -> Result<(), FirebirdDbError> {
        let tx = self
            .transaction
            .take()
            .ok_or(FirebirdDbError::NoActiveTransaction)?;
        self.native.run(|cb| tx.handle.rollback(cb)).await
    }
}

#[async_trait]
impl DatabaseConnection for FirebirdConnection {
    async fn execute_query(&self, query: &CompiledQuery) -> Result<ResultSet, FirebirdDbError> {
        FirebirdConnection::execute_query(self, query).await
    }

    async fn stream_query(
        &self,
        query: &CompiledQuery,
        _chunk_size: Option<usize>,
    ) -> Result<ResultSet, FirebirdDbError> {
        FirebirdConnection::stream_query(self, query)
    }
}

impl fmt::Debug for FirebirdConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirebirdConnection")
            .field("id", &self.id)
            .field("transaction", &self.transaction)
            .field("released", &self.native.is_released())
            .finish()
    }
}
