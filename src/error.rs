// ABOUTME: Session-level error types for all engine operations
// ABOUTME: Distinguishes temporary conditions (retryable) from fatal ones that end the session

use std::io;
use thiserror::Error;

use crate::codec::CodecError;
use crate::datatypes::{CommandId, StatusError};
use crate::session::SessionState;

/// Error type for session operations.
///
/// Temporary errors (`is_temporary()`) describe conditions that clear by
/// themselves - a full send window, a PDU issued in a state that does not
/// allow it yet. I/O and framing errors are fatal and shut the session down.
#[derive(Debug, Error)]
pub enum SessionError {
    /// I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Framing or body decode error.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// PDU not permitted in the current session state.
    #[error("processing {command_id:?} in invalid session state {state:?}")]
    InvalidState {
        command_id: CommandId,
        state: SessionState,
    },

    /// Illegal direct state change (e.g. closing an already closed session).
    #[error("invalid session state change {from:?} -> {to:?}")]
    InvalidStateChange {
        from: SessionState,
        to: SessionState,
    },

    /// The outbound request window is full.
    #[error("sending window closed")]
    WindowClosed,

    /// The session has shut down.
    #[error("session closed")]
    Closed,

    /// Operation did not complete within its deadline.
    #[error("operation timed out")]
    Timeout,

    /// A Context accessor was invoked for a different PDU variant.
    #[error("invalid cast: PDU is {actual:?}, expected {expected}")]
    InvalidCast {
        expected: &'static str,
        actual: CommandId,
    },

    /// Non-zero SMPP status in a received response.
    #[error(transparent)]
    Status(#[from] StatusError),
}

impl SessionError {
    /// Whether the caller may retry after the condition clears.
    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            SessionError::WindowClosed | SessionError::InvalidState { .. }
        )
    }
}
