//! `Response` and `QueryResult` (§3).
//!
//! A `Response` is shared between the session's global FIFO of pending responses (used to
//! correlate each inbound message to the request that is waiting for it) and the `QueryResult`
//! that exposes it to the caller. `Arc<Mutex<_>>` gives both owners a handle to the same object
//! and keeps `Session` `Send`, unlike a single-threaded `Rc<RefCell<_>>`; a session is still not
//! safe for concurrent use, but it may be handed across a thread boundary between uses.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::BoltResult;
use crate::packstream::{Map, Value};

/// The lifecycle of one outstanding request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseStatus {
    /// The request is on the wire or its response is still being assembled.
    #[default]
    Pending,
    /// The server answered `SUCCESS`.
    Success,
    /// The server answered `FAILURE`.
    Failure,
    /// The server answered `IGNORED`.
    Ignored,
}

impl ResponseStatus {
    fn is_terminal(self) -> bool {
        !matches!(self, ResponseStatus::Pending)
    }
}

/// One outstanding request's accumulated records, terminal status, and metadata.
///
/// Created when a request is written, terminal once any non-`RECORD` message closes it.
#[derive(Debug, Default)]
pub struct Response {
    records: VecDeque<Vec<Value>>,
    status: ResponseStatus,
    metadata: Map,
}

/// A shared handle to one [`Response`], held by both the session's pending queue and whichever
/// [`QueryResult`] it belongs to.
pub(crate) type SharedResponse = Arc<Mutex<Response>>;

impl Response {
    pub(crate) fn new_shared() -> SharedResponse {
        Arc::new(Mutex::new(Self::default()))
    }

    pub fn status(&self) -> ResponseStatus {
        self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn metadata(&self) -> &Map {
        &self.metadata
    }

    pub(crate) fn push_record(&mut self, values: Vec<Value>) {
        self.records.push_back(values);
    }

    pub(crate) fn mark_success(&mut self, metadata: Map) {
        self.metadata = metadata;
        self.status = ResponseStatus::Success;
    }

    pub(crate) fn mark_failure(&mut self, metadata: Map) {
        self.metadata = metadata;
        self.status = ResponseStatus::Failure;
    }

    pub(crate) fn mark_ignored(&mut self) {
        self.status = ResponseStatus::Ignored;
    }

    fn take_record(&mut self) -> Option<Vec<Value>> {
        self.records.pop_front()
    }

    fn has_records(&self) -> bool {
        !self.records.is_empty()
    }
}

/// An ordered sequence of [`Response`]s representing one query: today, the `RUN` response
/// followed by the `PULL` response flagged final (§3).
///
/// `first` is never empty by construction; only [`QueryResult::append`] can add further
/// responses, so "a result always has at least one response" is a type invariant rather than a
/// runtime check.
#[derive(Debug)]
pub struct QueryResult {
    first: SharedResponse,
    rest: VecDeque<SharedResponse>,
    complete: bool,
}

impl QueryResult {
    pub(crate) fn new(run_response: SharedResponse) -> Self {
        Self {
            first: run_response,
            rest: VecDeque::new(),
            complete: false,
        }
    }

    pub(crate) fn append(&mut self, response: SharedResponse, is_final: bool) {
        self.rest.push_back(response);
        if is_final {
            self.complete = true;
        }
    }

    pub(crate) fn last(&self) -> SharedResponse {
        self.rest.back().cloned().unwrap_or_else(|| self.first.clone())
    }

    fn items(&self) -> impl Iterator<Item = &SharedResponse> {
        std::iter::once(&self.first).chain(self.rest.iter())
    }

    /// Whether this result's final response has been appended and has become terminal.
    pub fn is_complete(&self) -> BoltResult<bool> {
        if !self.complete {
            return Ok(false);
        }
        Ok(self.last().lock()?.is_terminal())
    }

    fn has_records(&self) -> BoltResult<bool> {
        for response in self.items() {
            if response.lock()?.has_records() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Takes the next buffered record in FIFO order across this result's responses, or `None`
    /// if none are currently buffered.
    pub(crate) fn take_buffered_record(&mut self) -> BoltResult<Option<Vec<Value>>> {
        for response in self.items() {
            if let Some(record) = response.lock()?.take_record() {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    pub(crate) fn has_buffered_records(&self) -> BoltResult<bool> {
        self.has_records()
    }

    /// The metadata of the last response once it has become terminal, e.g. `SUCCESS`'s run-time
    /// summary metadata.
    pub fn last_metadata(&self) -> BoltResult<Option<Map>> {
        let last = self.last();
        let guard = last.lock()?;
        Ok(if guard.is_terminal() {
            Some(guard.metadata().clone())
        } else {
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_starts_pending_and_not_terminal() {
        let r = Response::new_shared();
        assert_eq!(r.lock().unwrap().status(), ResponseStatus::Pending);
        assert!(!r.lock().unwrap().is_terminal());
    }

    #[test]
    fn success_marks_terminal_and_stores_metadata() {
        let r = Response::new_shared();
        let mut meta = Map::new();
        meta.insert("fields", Value::List(vec![Value::String("n".into())]));
        r.lock().unwrap().mark_success(meta);
        assert_eq!(r.lock().unwrap().status(), ResponseStatus::Success);
        assert!(r.lock().unwrap().is_terminal());
        assert!(r.lock().unwrap().metadata().get("fields").is_some());
    }

    #[test]
    fn query_result_is_complete_once_final_response_is_terminal() {
        let run_response = Response::new_shared();
        run_response.lock().unwrap().mark_success(Map::new());
        let mut qr = QueryResult::new(run_response);
        assert!(!qr.is_complete().unwrap());

        let pull_response = Response::new_shared();
        qr.append(pull_response.clone(), true);
        assert!(!qr.is_complete().unwrap());

        pull_response.lock().unwrap().mark_success(Map::new());
        assert!(qr.is_complete().unwrap());
    }

    #[test]
    fn records_drain_fifo_across_responses() {
        let run_response = Response::new_shared();
        run_response.lock().unwrap().push_record(vec![Value::Integer(1)]);
        run_response.lock().unwrap().mark_success(Map::new());
        let mut qr = QueryResult::new(run_response);

        let pull_response = Response::new_shared();
        pull_response.lock().unwrap().push_record(vec![Value::Integer(2)]);
        pull_response.lock().unwrap().mark_success(Map::new());
        qr.append(pull_response, true);

        assert_eq!(qr.take_buffered_record().unwrap(), Some(vec![Value::Integer(1)]));
        assert_eq!(qr.take_buffered_record().unwrap(), Some(vec![Value::Integer(2)]));
        assert_eq!(qr.take_buffered_record().unwrap(), None);
    }
}
