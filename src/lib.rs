//! SMPP v3.4 session layer for messaging gateways and ESMEs.
//!
//! The crate has two tightly coupled halves: the [`session`] engine, which
//! frames binary PDUs over a reliable byte stream, enforces the bind/unbind
//! state machine for both roles, multiplexes concurrent requests by sequence
//! number and applies send/receive window admission control; and the
//! [`splitter`], which cuts user text into GSM-7 or UCS-2 short-message
//! segments with correct concatenation UDHs.
//!
//! A session is created from an already-connected stream:
//!
//! ```rust,no_run
//! use smpp_session::{Session, SessionConfig, SessionType};
//!
//! # async fn example(stream: tokio::net::TcpStream) {
//! let sess = Session::new(
//!     stream,
//!     SessionConfig {
//!         session_type: SessionType::Smsc,
//!         ..Default::default()
//!     },
//! );
//! // ... the read loop is running; close() must be called eventually.
//! let _ = sess.close().await;
//! # }
//! ```
//!
//! ESME-side, the bind helpers dial and bind in one step:
//!
//! ```rust,no_run
//! use smpp_session::{bind_transceiver, BindConfig, SessionConfig};
//!
//! # async fn example() -> Result<(), smpp_session::SessionError> {
//! let sess = bind_transceiver(
//!     SessionConfig::default(),
//!     BindConfig {
//!         addr: "localhost:2775".to_string(),
//!         system_id: "system_id".to_string(),
//!         password: "password".to_string(),
//!         ..Default::default()
//!     },
//! )
//! .await?;
//! // Traffic may flow once the session_state hook reports a bound state;
//! // the bind response arrives through the response handler.
//! # Ok(())
//! # }
//! ```
//!
//! Inbound PDUs are served by [`Handler`] implementations through a
//! [`Context`]:
//!
//! ```rust
//! use async_trait::async_trait;
//! use smpp_session::{CommandStatus, Context, Handler, Pdu};
//!
//! struct Server;
//!
//! #[async_trait]
//! impl Handler for Server {
//!     async fn serve(&self, ctx: &mut Context) {
//!         if let Ok(unbind) = ctx.unbind() {
//!             let resp = Pdu::UnbindResp(unbind.response());
//!             let _ = ctx.respond(resp, CommandStatus::Ok).await;
//!             ctx.close_session();
//!         }
//!     }
//! }
//! ```

pub mod codec;
pub mod connect;
pub mod context;
pub mod datatypes;
pub mod error;
pub mod session;
pub mod sequencer;
pub mod short_message;
pub mod splitter;
pub mod udh;

pub(crate) mod macros;
mod transition;

#[cfg(test)]
mod tests;

/// SMPP protocol version spoken by this crate.
pub const VERSION: u8 = 0x34;

pub use codec::{CodecError, Decodable, Encodable, Pdu, PduHeader, MAX_PDU_SIZE};
pub use connect::{bind_receiver, bind_transceiver, bind_transmitter, unbind, BindConfig};
pub use context::Context;
pub use datatypes::{CommandId, CommandStatus, StatusError};
pub use error::SessionError;
pub use sequencer::{DefaultSequencer, Sequencer, SEQUENCE_END, SEQUENCE_START};
pub use session::{
    Handler, Session, SessionConfig, SessionState, SessionStateHook, SessionType,
};
pub use splitter::{split, split_with_udh, DataCoding, SplitError, SplitResult};
pub use udh::{MultiPartData, UserDataHeader};

/// A specialized `Result` type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
