//! Scripted transport for tests.
//!
//! Outcomes are queued in call order; every call the store makes is recorded
//! with its token and payload so tests can assert what went over the wire
//! (and that fail-fast paths made no call at all).

use async_trait::async_trait;
use parking_lot::Mutex;
use patio_core::models::{RemoteMotorcycle, RemotePayload};
use patio_core::transport::{RecordTransport, TransportFailure};
use std::collections::VecDeque;

/// One scripted response. `Fleet` answers `fetch_all`, `Record` answers
/// `create`/`update`, `Done` answers `delete`, `Fail` answers anything.
pub enum StubOutcome {
    Fleet(Vec<RemoteMotorcycle>),
    Record(RemoteMotorcycle),
    Done,
    Fail(TransportFailure),
}

#[derive(Debug, Clone)]
pub struct StubCall {
    pub op: String,
    pub token: String,
    pub id: Option<String>,
    pub payload: Option<RemotePayload>,
}

#[derive(Default)]
pub struct StubTransport {
    outcomes: Mutex<VecDeque<StubOutcome>>,
    calls: Mutex<Vec<StubCall>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: StubOutcome) {
        self.outcomes.lock().push_back(outcome);
    }

    pub fn fail_next(&self, failure: TransportFailure) {
        self.push(StubOutcome::Fail(failure));
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn record(&self, op: &str, token: &str, id: Option<&str>, payload: Option<&RemotePayload>) {
        log::debug!("[stub] recording {op} call");
        self.calls.lock().push(StubCall {
            op: op.to_string(),
            token: token.to_string(),
            id: id.map(str::to_string),
            payload: payload.cloned(),
        });
    }

    fn next(&self) -> Result<StubOutcome, TransportFailure> {
        self.outcomes
            .lock()
            .pop_front()
            .ok_or_else(|| TransportFailure::NoResponse("stub: script exhausted".into()))
    }
}

fn mismatch(op: &str) -> TransportFailure {
    TransportFailure::NoResponse(format!("stub: unexpected outcome type for {op}"))
}

#[async_trait]
impl RecordTransport for StubTransport {
    async fn fetch_all(&self, token: &str) -> Result<Vec<RemoteMotorcycle>, TransportFailure> {
        self.record("fetch_all", token, None, None);
        match self.next()? {
            StubOutcome::Fleet(fleet) => Ok(fleet),
            StubOutcome::Fail(failure) => Err(failure),
            _ => Err(mismatch("fetch_all")),
        }
    }

    async fn create(
        &self,
        token: &str,
        payload: &RemotePayload,
    ) -> Result<RemoteMotorcycle, TransportFailure> {
        self.record("create", token, None, Some(payload));
        match self.next()? {
            StubOutcome::Record(record) => Ok(record),
            StubOutcome::Fail(failure) => Err(failure),
            _ => Err(mismatch("create")),
        }
    }

    async fn update(
        &self,
        token: &str,
        id: &str,
        payload: &RemotePayload,
    ) -> Result<RemoteMotorcycle, TransportFailure> {
        self.record("update", token, Some(id), Some(payload));
        match self.next()? {
            StubOutcome::Record(record) => Ok(record),
            StubOutcome::Fail(failure) => Err(failure),
            _ => Err(mismatch("update")),
        }
    }

    async fn delete(&self, token: &str, id: &str) -> Result<(), TransportFailure> {
        self.record("delete", token, Some(id), None);
        match self.next()? {
            StubOutcome::Done => Ok(()),
            StubOutcome::Fail(failure) => Err(failure),
            _ => Err(mismatch("delete")),
        }
    }
}
