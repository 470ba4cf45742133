/// The session's lifecycle (§4.E).
///
/// `Broken` is absorbing: once entered, every operation fails with
/// [`crate::error::BoltError::SessionBroken`] without touching the wire again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Only `open()` is legal; no socket exists yet.
    Unopened,
    /// The 4-byte version handshake reply is outstanding.
    Negotiating,
    /// The `HELLO` response is outstanding.
    Authenticating,
    /// Idle and authenticated; `run` and `close` are legal.
    Ready,
    /// A result is open and being drained; `pull`, `take`, `sync`, `run`, and `close` are legal.
    Streaming,
    /// The transport or protocol broke; only `close` remains callable, and it is a no-op.
    Broken,
    /// `close()` has completed.
    Closed,
}
