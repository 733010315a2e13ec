//! Boundary to a callback-based Firebird client library.
//!
//! The native client is stateful and non-reentrant: a handle accepts one operation at a
//! time and reports the outcome once through a callback. Implement these traits over the
//! actual client (or use `test_utils::MockPool`) and hand the pool to
//! [`crate::config::FirebirdDialectConfigBuilder`].

use thiserror::Error;

use crate::results::CustomDbRow;
use crate::transaction::TpbFlag;
use crate::types::RowValues;

/// Error reported by the native client, passed through to callers verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct NativeError {
    pub message: String,
    /// Firebird GDS code, when the client reports one.
    pub gds_code: Option<i64>,
}

impl NativeError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            gds_code: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, gds_code: i64) -> Self {
        self.gds_code = Some(gds_code);
        self
    }
}

/// One-shot completion handed to a native operation.
pub type NativeCallback<T> = Box<dyn FnOnce(Result<T, NativeError>) + Send + 'static>;

/// What a native `query` call yields.
///
/// Clients report multi-row results as a list and some single-row statements
/// (`execute procedure`, `insert ... returning`) as one bare row.
#[derive(Debug, Clone)]
pub enum NativeResult {
    Rows(Vec<CustomDbRow>),
    Row(CustomDbRow),
    Empty,
}

impl NativeResult {
    /// Normalize to a row list.
    #[must_use]
    pub fn into_rows(self) -> Vec<CustomDbRow> {
        match self {
            Self::Rows(rows) => rows,
            Self::Row(row) => vec![row],
            Self::Empty => Vec::new(),
        }
    }
}

/// Positional rows from a native `execute` call.
pub type PositionalRows = Vec<Vec<RowValues>>;

/// Pool of native connections.
pub trait NativePool: Send + Sync {
    /// Hand out a connection; `Ok(None)` means the pool produced no handle.
    fn get(&self, callback: NativeCallback<Option<Box<dyn NativeDatabase>>>);

    /// Tear the pool down. Called once, after every connection has been detached.
    fn destroy(&self);
}

/// One attached native connection.
pub trait NativeDatabase: Send + Sync {
    fn query(&self, sql: &str, params: Vec<RowValues>, callback: NativeCallback<NativeResult>);

    fn execute(&self, sql: &str, params: Vec<RowValues>, callback: NativeCallback<PositionalRows>);

    /// Return the connection to its pool.
    fn detach(&self, callback: NativeCallback<()>);

    /// Start a transaction with the given TPB flags.
    fn transaction(&self, flags: &[TpbFlag], callback: NativeCallback<Box<dyn NativeTransaction>>);
}

/// An open native transaction; finished by exactly one `commit` or `rollback`.
pub trait NativeTransaction: Send + Sync {
    fn query(&self, sql: &str, params: Vec<RowValues>, callback: NativeCallback<NativeResult>);

    fn execute(&self, sql: &str, params: Vec<RowValues>, callback: NativeCallback<PositionalRows>);

    fn commit(&self, callback: NativeCallback<()>);

    fn rollback(&self, callback: NativeCallback<()>);
}
