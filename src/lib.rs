//! A minimal, pure-Rust client for the Bolt v4 graph database wire protocol.
//!
//! This crate speaks exactly one protocol version (Bolt 4.0) over a single blocking, plain TCP
//! connection: no TLS, no connection pooling, no transactions beyond the server's implicit
//! auto-commit. See [`Session`] for the entry point.
//!
//! ```no_run
//! use bolt4::{ConnectParams, Map, Session};
//!
//! let params = ConnectParams::new("localhost", 7687, "neo4j", "neo4j");
//! let mut session = Session::open(&params)?;
//! let mut result = session.run("RETURN 1 AS n", Map::new(), None)?;
//! session.pull(&mut result, -1)?;
//! session.sync(&mut result)?;
//! while let Some(record) = session.take(&mut result)? {
//!     println!("{record:?}");
//! }
//! session.close();
//! # Ok::<(), bolt4::BoltError>(())
//! ```

#![deny(missing_debug_implementations)]
#![warn(clippy::all)]

#[macro_use]
extern crate log;

mod chunking;
mod error;
mod message;
mod packstream;
mod params;
mod session;
mod wire;

pub use crate::error::{BoltError, BoltResult};
pub use crate::packstream::{Map, Value};
pub use crate::params::ConnectParams;
pub use crate::session::{QueryResult, ResponseStatus, Session, SessionState};
