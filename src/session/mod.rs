//! The session engine (§4.E): handshake, `HELLO`, `RUN`/`PULL`/`SYNC`, record draining, and
//! `GOODBYE`, tying the wire, codec, chunker, and message layers together behind one FIFO
//! response queue.

mod response;
mod state;

pub use response::{QueryResult, ResponseStatus};
pub use state::SessionState;

use std::collections::VecDeque;
use std::net::TcpStream;
use std::sync::Arc;

use crate::error::{BoltError, BoltResult};
use crate::message::{read_message, tag, write_message};
use crate::packstream::{Map, Value};
use crate::params::ConnectParams;
use crate::wire::{Transport, Wire};

use response::{Response, SharedResponse};

/// One point-to-point connection to a Bolt server: owns the wire, the pending-response FIFO,
/// and the session's state (§4.E, §5).
///
/// Not `Sync` — at most one caller-owned control flow may operate on a `Session` at a time.
/// `Send`, so a whole session may be handed across a thread boundary between uses, never shared
/// concurrently.
#[derive(Debug)]
pub struct Session<S: Transport = TcpStream> {
    wire: Wire<S>,
    state: SessionState,
    pending: VecDeque<SharedResponse>,
    server_agent: Option<String>,
    connection_id: Option<String>,
}

impl Session<TcpStream> {
    /// Connects to `params.addr()`, performs the version handshake, then authenticates with
    /// `HELLO`. Returns a session in the `Ready` state. If the handshake or authentication
    /// fails, the partially-built session is dropped and the failure is returned directly;
    /// there is no `Broken` session to hand back in that case.
    pub fn open(params: &ConnectParams) -> BoltResult<Self> {
        debug!("C: <DIAL> {}", params.addr());
        let wire = Wire::connect(params.addr())?;
        debug!("S: <ACCEPT>");
        Self::open_on(wire, params)
    }
}

impl<S: Transport> Session<S> {
    /// Builds a session on an already-connected transport and runs it through handshake and
    /// `HELLO`. The public entry point for a real connection is [`Session::open`]; this also
    /// lets tests drive the same state machine over an in-memory double.
    pub(crate) fn open_on(wire: Wire<S>, params: &ConnectParams) -> BoltResult<Self> {
        let mut session = Self {
            wire,
            state: SessionState::Negotiating,
            pending: VecDeque::new(),
            server_agent: None,
            connection_id: None,
        };
        session.handshake()?;
        session.hello(params.user(), params.password().unsecure(), params.user_agent())?;
        Ok(session)
    }

    fn handshake(&mut self) -> BoltResult<()> {
        debug!("C: <BOLT>");
        self.wire.write(&[0x60, 0x60, 0xB0, 0x17]);
        trace!("C: <PROTOCOL> 4.0 | 0.0 | 0.0 | 0.0");
        self.wire.write(&[
            0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ]);
        self.wire.send()?;
        let reply = self.wire.read(4)?;
        let (major, minor) = (reply[3], reply[2]);
        debug!("S: <PROTOCOL> {major}.{minor}");
        if (major, minor) != (4, 0) {
            self.state = SessionState::Broken;
            return Err(BoltError::HandshakeFailed(format!(
                "server proposed Bolt {major}.{minor}, only 4.0 is supported"
            )));
        }
        self.state = SessionState::Authenticating;
        Ok(())
    }

    fn hello(&mut self, user: &str, password: &str, user_agent: &str) -> BoltResult<()> {
        let mut extra = Map::new();
        extra.insert("user_agent", Value::String(user_agent.to_string()));
        extra.insert("scheme", Value::String("basic".to_string()));
        extra.insert("principal", Value::String(user.to_string()));
        extra.insert("credentials", Value::String(password.to_string()));
        debug!(
            "C: HELLO {{user_agent: {user_agent:?}, scheme: \"basic\", principal: {user:?}, \
             credentials: \"*******\"}}"
        );
        let response = self.write_request(tag::HELLO, &[Value::Map(extra)])?;
        self.wire.send()?;
        self.wait(&response)?;
        let meta = response.lock()?.metadata().clone();
        self.server_agent = meta.get("server").and_then(value_as_string);
        self.connection_id = meta.get("connection_id").and_then(value_as_string);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Runs a Cypher statement, returning a [`QueryResult`] wrapping its `RUN` response. No
    /// flush happens here; the request may be pipelined with others until [`Session::sync`].
    pub fn run(
        &mut self,
        cypher: &str,
        parameters: Map,
        db: Option<&str>,
    ) -> BoltResult<QueryResult> {
        self.ensure_not_broken()?;
        let mut extra = Map::new();
        if let Some(db) = db {
            extra.insert("db", Value::String(db.to_string()));
        }
        debug!("C: RUN {cypher:?} {parameters:?} {extra:?}");
        let response = self.write_request(
            tag::RUN,
            &[
                Value::String(cypher.to_string()),
                Value::Map(parameters),
                Value::Map(extra),
            ],
        )?;
        self.state = SessionState::Streaming;
        Ok(QueryResult::new(response))
    }

    /// Requests up to `n` records (`-1` for "all") for `result`'s most recent response,
    /// appending a new final response to it.
    pub fn pull(&mut self, result: &mut QueryResult, n: i64) -> BoltResult<()> {
        self.ensure_not_broken()?;
        let mut extra = Map::new();
        extra.insert("n", Value::Integer(n));
        debug!("C: PULL {extra:?}");
        let response = self.write_request(tag::PULL, &[Value::Map(extra)])?;
        result.append(response, true);
        Ok(())
    }

    /// Flushes any buffered writes, then blocks until `result`'s last response becomes
    /// terminal.
    pub fn sync(&mut self, result: &mut QueryResult) -> BoltResult<()> {
        self.ensure_not_broken()?;
        let sent = self.wire.send()?;
        if sent > 0 {
            debug!("C: <SENT {sent} bytes>");
        }
        let last = result.last();
        self.wait(&last)?;
        if result.is_complete()? {
            self.state = SessionState::Ready;
        }
        Ok(())
    }

    /// Returns the next record for `result`, or `None` once it has no more. Drains inbound
    /// messages (including any earlier, still-pending responses ahead of it in the session's
    /// FIFO) as needed to produce one.
    pub fn take(&mut self, result: &mut QueryResult) -> BoltResult<Option<Vec<Value>>> {
        self.ensure_not_broken()?;
        if !result.has_buffered_records()? && !result.is_complete()? {
            let last = result.last();
            while let Some(front) = self.pending.front().cloned() {
                if Arc::ptr_eq(&front, &last) {
                    break;
                }
                self.wait(&front)?;
            }
            self.wait(&last)?;
        }
        result.take_buffered_record()
    }

    /// Sends `GOODBYE` (fire-and-forget; no response is expected) and closes the transport.
    /// Idempotent, and safe to call on a broken session.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if self.state != SessionState::Broken {
            debug!("C: GOODBYE");
            let _ = write_message(&mut self.wire, tag::GOODBYE, &[]);
            let _ = self.wire.send();
        }
        self.wire.close();
        self.state = SessionState::Closed;
        debug!("C: <HANGUP>");
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_broken(&self) -> bool {
        self.state == SessionState::Broken
    }

    pub fn server_agent(&self) -> Option<&str> {
        self.server_agent.as_deref()
    }

    pub fn connection_id(&self) -> Option<&str> {
        self.connection_id.as_deref()
    }

    fn write_request(&mut self, tag: u8, fields: &[Value]) -> BoltResult<SharedResponse> {
        write_message(&mut self.wire, tag, fields)?;
        let response = Response::new_shared();
        self.pending.push_back(response.clone());
        Ok(response)
    }

    /// Reads and dispatches one inbound message to the head of the pending queue (§4.E).
    fn fetch(&mut self) -> BoltResult<()> {
        let message = read_message(&mut self.wire)?;
        let Some(head) = self.pending.front().cloned() else {
            return Err(BoltError::Protocol(
                "received a message with no pending request to correlate it to".to_string(),
            ));
        };
        match message.tag {
            tag::SUCCESS => {
                let meta = expect_map(message.fields, "SUCCESS field must be a map")?;
                debug!("S: SUCCESS {meta:?}");
                head.lock()?.mark_success(meta);
                self.pending.pop_front();
            }
            tag::RECORD => {
                let values = expect_list(message.fields, "RECORD field must be a list")?;
                trace!("S: RECORD {values:?}");
                head.lock()?.push_record(values);
            }
            tag::FAILURE => {
                let meta = expect_map(message.fields, "FAILURE field must be a map")?;
                debug!("S: FAILURE {meta:?}");
                head.lock()?.mark_failure(meta);
                self.pending.pop_front();
                // This core does not send ACK_FAILURE/RESET; any failure ends the session.
                self.state = SessionState::Broken;
                self.wire.close();
            }
            tag::IGNORED => {
                debug!("S: IGNORED");
                head.lock()?.mark_ignored();
                self.pending.pop_front();
            }
            other => {
                return Err(BoltError::Protocol(format!(
                    "unexpected message tag 0x{other:02X}"
                )));
            }
        }
        Ok(())
    }

    /// Fetches until `target` becomes terminal, then surfaces `FAILURE` as a
    /// [`BoltError::ServerFailure`].
    fn wait(&mut self, target: &SharedResponse) -> BoltResult<()> {
        while !target.lock()?.is_terminal() {
            self.fetch()?;
        }
        if target.lock()?.status() == ResponseStatus::Failure {
            let meta = target.lock()?.metadata().clone();
            let code = meta
                .get("code")
                .and_then(value_as_string)
                .unwrap_or_default();
            let message = meta
                .get("message")
                .and_then(value_as_string)
                .unwrap_or_default();
            return Err(BoltError::ServerFailure { code, message });
        }
        Ok(())
    }

    fn ensure_not_broken(&self) -> BoltResult<()> {
        if self.state == SessionState::Broken {
            Err(BoltError::SessionBroken)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
impl<S: Transport> Session<S> {
    /// Test-only: unwraps the session's transport so a test can inspect exactly what was put on
    /// the wire.
    pub(crate) fn into_wire(self) -> Wire<S> {
        self.wire
    }
}

fn value_as_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn expect_map(fields: Vec<Value>, what: &'static str) -> BoltResult<Map> {
    match fields.into_iter().next() {
        Some(Value::Map(m)) => Ok(m),
        _ => Err(BoltError::Malformed(what)),
    }
}

fn expect_list(fields: Vec<Value>, what: &'static str) -> BoltResult<Vec<Value>> {
    match fields.into_iter().next() {
        Some(Value::List(l)) => Ok(l),
        _ => Err(BoltError::Malformed(what)),
    }
}
