use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::native::{
    NativeCallback, NativeDatabase, NativeError, NativePool, NativeResult, NativeTransaction,
    PositionalRows,
};
use crate::transaction::TpbFlag;
use crate::types::RowValues;

/// One call observed by the mock client, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    Get,
    ConnectionQuery(String),
    ConnectionExecute(String),
    TransactionQuery(String),
    TransactionExecute(String),
    /// TPB codes passed to `transaction`.
    Begin(Vec<u8>),
    Commit,
    Rollback,
    Detach,
    Destroy,
}

#[derive(Default)]
struct MockState {
    events: Vec<MockEvent>,
    parameters: Vec<Vec<RowValues>>,
    responses: Vec<(String, NativeResult)>,
    positional: Vec<(String, PositionalRows)>,
    fail_get: Option<String>,
    yield_nothing: bool,
    fail_query: Option<String>,
    fail_begin: Option<String>,
    fail_commit: Option<String>,
    fail_rollback: Option<String>,
    fail_detach: Option<String>,
    threaded: bool,
    attached: usize,
}

#[derive(Clone, Default)]
struct Shared(Arc<Mutex<MockState>>);

impl Shared {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fire `callback`, from a fresh thread when threaded delivery is on.
    fn deliver<T: Send + 'static>(&self, callback: NativeCallback<T>, result: Result<T, NativeError>) {
        if self.lock().threaded {
            std::thread::spawn(move || callback(result));
        } else {
            callback(result);
        }
    }

    fn take_failure(slot: &mut Option<String>) -> Option<NativeError> {
        slot.take().map(NativeError::new)
    }

    fn query(&self, event: MockEvent, sql: &str, params: Vec<RowValues>) -> Result<NativeResult, NativeError> {
        let mut state = self.lock();
        state.events.push(event);
        state.parameters.push(params);
        if let Some(err) = Self::take_failure(&mut state.fail_query) {
            return Err(err);
        }
        Ok(state
            .responses
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map_or(NativeResult::Empty, |(_, result)| result.clone()))
    }

    fn execute(&self, event: MockEvent, sql: &str, params: Vec<RowValues>) -> Result<PositionalRows, NativeError> {
        let mut state = self.lock();
        state.events.push(event);
        state.parameters.push(params);
        if let Some(err) = Self::take_failure(&mut state.fail_query) {
            return Err(err);
        }
        Ok(state
            .positional
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}

/// In-memory stand-in for a callback-based Firebird client.
///
/// Every handle it gives out shares one event log, so tests can assert on the exact
/// sequence of native calls. Query answers are scripted by SQL substring.
#[derive(Clone, Default)]
pub struct MockPool {
    shared: Shared,
}

impl MockPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<MockEvent> {
        self.shared.lock().events.clone()
    }

    /// Parameters of every query/execute call, in order.
    #[must_use]
    pub fn parameters(&self) -> Vec<Vec<RowValues>> {
        self.shared.lock().parameters.clone()
    }

    /// Handles given out and not yet detached.
    #[must_use]
    pub fn attached(&self) -> usize {
        self.shared.lock().attached
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.shared.lock().events.contains(&MockEvent::Destroy)
    }

    /// Answer queries whose SQL contains `pattern`; first registration wins.
    pub fn respond_to(&self, pattern: impl Into<String>, result: NativeResult) {
        self.shared.lock().responses.push((pattern.into(), result));
    }

    pub fn respond_positional(&self, pattern: impl Into<String>, rows: PositionalRows) {
        self.shared.lock().positional.push((pattern.into(), rows));
    }

    /// Deliver callbacks from spawned threads instead of inline.
    pub fn set_threaded(&self, threaded: bool) {
        self.shared.lock().threaded = threaded;
    }

    pub fn fail_next_get(&self, message: impl Into<String>) {
        self.shared.lock().fail_get = Some(message.into());
    }

    /// Next `get` succeeds but yields no handle.
    pub fn yield_nothing_next(&self) {
        self.shared.lock().yield_nothing = true;
    }

    pub fn fail_next_query(&self, message: impl Into<String>) {
        self.shared.lock().fail_query = Some(message.into());
    }

    pub fn fail_next_begin(&self, message: impl Into<String>) {
        self.shared.lock().fail_begin = Some(message.into());
    }

    pub fn fail_next_commit(&self, message: impl Into<String>) {
        self.shared.lock().fail_commit = Some(message.into());
    }

    pub fn fail_next_rollback(&self, message: impl Into<String>) {
        self.shared.lock().fail_rollback = Some(message.into());
    }

    pub fn fail_next_detach(&self, message: impl Into<String>) {
        self.shared.lock().fail_detach = Some(message.into());
    }
}

impl NativePool for MockPool {
    fn get(&self, callback: NativeCallback<Option<Box<dyn NativeDatabase>>>) {
        let result = {
            let mut state = self.shared.lock();
            state.events.push(MockEvent::Get);
            if let Some(err) = Shared::take_failure(&mut state.fail_get) {
                Err(err)
            } else if std::mem::take(&mut state.yield_nothing) {
                Ok(None)
            } else {
                state.attached += 1;
                Ok(Some(Box::new(MockDatabase {
                    shared: self.shared.clone(),
                }) as Box<dyn NativeDatabase>))
            }
        };
        self.shared.deliver(callback, result);
    }

    fn destroy(&self) {
        self.shared.lock().events.push(MockEvent::Destroy);
    }
}

struct MockDatabase {
    shared: Shared,
}

impl NativeDatabase for MockDatabase {
    fn query(&self, sql: &str, params: Vec<RowValues>, callback: NativeCallback<NativeResult>) {
        let result = self
            .shared
            .query(MockEvent::ConnectionQuery(sql.to_string()), sql, params);
        self.shared.deliver(callback, result);
    }

    fn execute(&self, sql: &str, params: Vec<RowValues>, callback: NativeCallback<PositionalRows>) {
        let result = self
            .shared
            .execute(MockEvent::ConnectionExecute(sql.to_string()), sql, params);
        self.shared.deliver(callback, result);
    }

    fn detach(&self, callback: NativeCallback<()>) {
        let result = {
            let mut state = self.shared.lock();
            state.events.push(MockEvent::Detach);
            state.attached = state.attached.saturating_sub(1);
            Shared::take_failure(&mut state.fail_detach).map_or(Ok(()), Err)
        };
        self.shared.deliver(callback, result);
    }

    fn transaction(&self, flags: &[TpbFlag], callback: NativeCallback<Box<dyn NativeTransaction>>) {
        let result = {
            let mut state = self.shared.lock();
            state
                .events
                .push(MockEvent::Begin(flags.iter().map(|f| f.code()).collect()));
            match Shared::take_failure(&mut state.fail_begin) {
                Some(err) => Err(err),
                None => Ok(Box::new(MockTransaction {
                    shared: self.shared.clone(),
                }) as Box<dyn NativeTransaction>),
            }
        };
        self.shared.deliver(callback, result);
    }
}

struct MockTransaction {
    shared: Shared,
}

impl NativeTransaction for MockTransaction {
    fn query(&self, sql: &str, params: Vec<RowValues>, callback: NativeCallback<NativeResult>) {
        let result = self
            .shared
            .query(MockEvent::TransactionQuery(sql.to_string()), sql, params);
        self.shared.deliver(callback, result);
    }

    fn execute(&self, sql: &str, params: Vec<RowValues>, callback: NativeCallback<PositionalRows>) {
        let result = self
            .shared
            .execute(MockEvent::TransactionExecute(sql.to_string()), sql, params);
        self.shared.deliver(callback, result);
    }

    fn commit(&self, callback: NativeCallback<()>) {
        let result = {
            let mut state = self.shared.lock();
            state.events.push(MockEvent::Commit);
            Shared::take_failure(&mut state.fail_commit).map_or(Ok(()), Err)
        };
        self.shared.deliver(callback, result);
    }

    fn rollback(&self, callback: NativeCallback<()>) {
        let result = {
            let mut state = self.shared.lock();
            state.events.push(MockEvent::Rollback);
            Shared::take_failure(&mut state.fail_rollback).map_or(Ok(()), Err)
        };
        self.shared.deliver(callback, result);
    }
}
