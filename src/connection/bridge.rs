use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, oneshot};

use crate::error::FirebirdDbError;
use crate::native::{NativeCallback, NativeDatabase};

/// Issue one callback-style native call and wait for its completion.
///
/// The callback may fire synchronously or from any thread. A callback that is dropped
/// without firing surfaces as [`FirebirdDbError::ConnectionError`]; one that fires after
/// the caller stopped waiting is ignored.
pub(crate) async fn call_native<T, F>(op: F) -> Result<T, FirebirdDbError>
where
    T: Send + 'static,
    F: FnOnce(NativeCallback<T>),
{
    let (respond_to, response) = oneshot::channel();
    op(Box::new(move |result| {
        let _ = respond_to.send(result);
    }));
    match response.await {
        Ok(result) => result.map_err(FirebirdDbError::from),
        Err(_) => Err(FirebirdDbError::ConnectionError(
            "native callback dropped without completing".into(),
        )),
    }
}

/// Native connection handle plus the gate that keeps one call in flight at a time.
///
/// The gate stays closed until the native callback fires or is dropped, even if the
/// waiting caller has gone away.
pub struct NativeConnection {
    handle: Box<dyn NativeDatabase>,
    gate: Arc<Mutex<()>>,
    released: AtomicBool,
}

impl NativeConnection {
    pub(crate) fn new(handle: Box<dyn NativeDatabase>) -> Self {
        Self {
            handle,
            gate: Arc::new(Mutex::new(())),
            released: AtomicBool::new(false),
        }
    }

    pub(crate) fn handle(&self) -> &dyn NativeDatabase {
        self.handle.as_ref()
    }

    /// Run one native call under the gate.
    pub(crate) async fn run<T, F>(&self, op: F) -> Result<T, FirebirdDbError>
    where
        T: Send + 'static,
        F: FnOnce(NativeCallback<T>) + Send,
    {
        let gate = Arc::clone(&self.gate).lock_owned().await;
        call_native(move |callback: NativeCallback<T>| {
            op(Box::new(move |result| {
                drop(gate);
                callback(result);
            }));
        })
        .await
    }

    /// Detach from the pool. The handle counts as released from here on, whether or
    /// not the native detach succeeds.
    pub(crate) async fn detach(&self) -> Result<(), FirebirdDbError> {
        if self.released.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.run(|callback| self.handle.detach(callback)).await
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl fmt::Debug for NativeConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeConnection")
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}
