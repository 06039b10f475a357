// ABOUTME: Per-request container handed to request and response handlers
// ABOUTME: Binds a decoded PDU to its session, sequence and cancellation token

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;

use crate::codec::{Pdu, PduHeader};
use crate::datatypes::{
    AlertNotification, BindReceiver, BindReceiverResp, BindTransceiver, BindTransceiverResp,
    BindTransmitter, BindTransmitterResp, CancelSm, CancelSmResp, CommandId, CommandStatus,
    DataSm, DataSmResp, DeliverSm, DeliverSmResp, EnquireLink, EnquireLinkResp, GenericNack,
    Outbind, QuerySm, QuerySmResp, ReplaceSm, ReplaceSmResp, SubmitMulti, SubmitMultiResp,
    SubmitSm, SubmitSmResp, Unbind, UnbindResp,
};
use crate::error::SessionError;
use crate::session::Session;

macro_rules! pdu_accessor {
    ($(#[$meta:meta])* $name:ident, $variant:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $name(&self) -> Result<&$ty, SessionError> {
            match &self.pdu {
                Pdu::$variant(p) => Ok(p),
                other => Err(SessionError::InvalidCast {
                    expected: stringify!($ty),
                    actual: other.command_id(),
                }),
            }
        }
    };
}

/// Container for the information related to one inbound PDU.
///
/// The engine creates a context per dispatched PDU and hands it to the
/// request or response handler; it lives until the handler returns and must
/// not be retained afterwards.
pub struct Context {
    session: Session,
    token: CancellationToken,
    header: PduHeader,
    sequence: u32,
    status: CommandStatus,
    pdu: Pdu,
    close: bool,
}

impl Context {
    pub(crate) fn new(
        session: Session,
        token: CancellationToken,
        header: PduHeader,
        pdu: Pdu,
    ) -> Self {
        Self {
            session,
            token,
            sequence: header.sequence_number,
            status: CommandStatus::from_code(header.command_status),
            header,
            pdu,
            close: false,
        }
    }

    /// ID of the session handling this PDU.
    pub fn session_id(&self) -> &str {
        self.session.id()
    }

    /// Identity of the bound peer this PDU came from.
    pub async fn system_id(&self) -> String {
        self.session.system_id().await
    }

    /// Network address of the bound peer, when known.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.session.remote_addr()
    }

    /// The session this context belongs to. The handle may be cloned for
    /// sends initiated outside the handler, but the context itself must not
    /// outlive the handler invocation.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// command_id of the PDU.
    pub fn command_id(&self) -> CommandId {
        self.pdu.command_id()
    }

    /// Header of the inbound frame.
    pub fn header(&self) -> &PduHeader {
        &self.header
    }

    /// Sequence number replies will echo.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Status of the current PDU (non-zero only on responses). Codes the
    /// specification does not define arrive as
    /// [`CommandStatus::Unrecognized`] with the wire value preserved; pass
    /// the status to [`CommandStatus::into_result`] for a typed error.
    pub fn status(&self) -> CommandStatus {
        self.status
    }

    /// The decoded PDU, for handlers that prefer to match on the variant
    /// directly instead of the typed accessors.
    pub fn pdu(&self) -> &Pdu {
        &self.pdu
    }

    /// Cancellation token for this dispatch: fires when the window timeout
    /// elapses or the session begins shutdown. Cancellation is advisory;
    /// in-flight writes complete or fail with an I/O error.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.token
    }

    /// Request a graceful session shutdown after the handler returns.
    pub fn close_session(&mut self) {
        self.close = true;
    }

    /// Initiate session shutdown immediately, without waiting for the
    /// handler to return.
    pub fn force_close(&mut self) {
        self.close = true;
        self.session.request_close();
    }

    pub(crate) fn close_requested(&self) -> bool {
        self.close
    }

    /// Send `pdu` as the response to this context's PDU, echoing its
    /// sequence number.
    pub async fn respond(&mut self, pdu: Pdu, status: CommandStatus) -> Result<(), SessionError> {
        self.status = status;
        self.session.send_response(pdu, self.sequence, status).await
    }

    /// Send `pdu` as a response with an overridden sequence number, used
    /// when relaying a response correlated on another session.
    pub async fn respond_with_sequence(
        &mut self,
        pdu: Pdu,
        sequence: u32,
        status: CommandStatus,
    ) -> Result<(), SessionError> {
        self.status = status;
        self.sequence = sequence;
        self.session.send_response(pdu, sequence, status).await
    }

    /// Issue a new request on the session; returns the allocated sequence.
    pub async fn send_request(&self, pdu: Pdu) -> Result<u32, SessionError> {
        self.session.send_request(pdu).await
    }

    /// Issue a new request with a caller-supplied sequence number.
    pub async fn send_request_with_sequence(
        &self,
        pdu: Pdu,
        sequence: u32,
    ) -> Result<u32, SessionError> {
        self.session.send_request_with_sequence(pdu, sequence).await
    }

    pdu_accessor!(
        /// The PDU as a BindTransmitter, failing when it is another variant.
        bind_transmitter, BindTransmitter, BindTransmitter);
    pdu_accessor!(bind_transmitter_resp, BindTransmitterResp, BindTransmitterResp);
    pdu_accessor!(bind_receiver, BindReceiver, BindReceiver);
    pdu_accessor!(bind_receiver_resp, BindReceiverResp, BindReceiverResp);
    pdu_accessor!(bind_transceiver, BindTransceiver, BindTransceiver);
    pdu_accessor!(bind_transceiver_resp, BindTransceiverResp, BindTransceiverResp);
    pdu_accessor!(outbind, Outbind, Outbind);
    pdu_accessor!(unbind, Unbind, Unbind);
    pdu_accessor!(unbind_resp, UnbindResp, UnbindResp);
    pdu_accessor!(enquire_link, EnquireLink, EnquireLink);
    pdu_accessor!(enquire_link_resp, EnquireLinkResp, EnquireLinkResp);
    pdu_accessor!(generic_nack, GenericNack, GenericNack);
    pdu_accessor!(submit_sm, SubmitSm, SubmitSm);
    pdu_accessor!(submit_sm_resp, SubmitSmResp, SubmitSmResp);
    pdu_accessor!(submit_multi, SubmitMulti, SubmitMulti);
    pdu_accessor!(submit_multi_resp, SubmitMultiResp, SubmitMultiResp);
    pdu_accessor!(deliver_sm, DeliverSm, DeliverSm);
    pdu_accessor!(deliver_sm_resp, DeliverSmResp, DeliverSmResp);
    pdu_accessor!(data_sm, DataSm, DataSm);
    pdu_accessor!(data_sm_resp, DataSmResp, DataSmResp);
    pdu_accessor!(query_sm, QuerySm, QuerySm);
    pdu_accessor!(query_sm_resp, QuerySmResp, QuerySmResp);
    pdu_accessor!(cancel_sm, CancelSm, CancelSm);
    pdu_accessor!(cancel_sm_resp, CancelSmResp, CancelSmResp);
    pdu_accessor!(replace_sm, ReplaceSm, ReplaceSm);
    pdu_accessor!(replace_sm_resp, ReplaceSmResp, ReplaceSmResp);
    pdu_accessor!(alert_notification, AlertNotification, AlertNotification);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionConfig, SessionType};

    fn test_context(pdu: Pdu) -> Context {
        let (stream, _peer) = tokio::io::duplex(64);
        let session = Session::new(
            stream,
            SessionConfig {
                session_type: SessionType::Smsc,
                ..Default::default()
            },
        );
        let header = PduHeader {
            command_length: 16,
            command_id: pdu.command_id(),
            command_status: CommandStatus::Ok.code(),
            sequence_number: 9,
        };
        Context::new(session, CancellationToken::new(), header, pdu)
    }

    #[tokio::test]
    async fn typed_accessor_matches_variant() {
        let ctx = test_context(Pdu::Unbind(Unbind));
        assert!(ctx.unbind().is_ok());
        assert_eq!(ctx.sequence(), 9);
        assert_eq!(ctx.command_id(), CommandId::Unbind);
    }

    #[tokio::test]
    async fn typed_accessor_rejects_other_variant() {
        let ctx = test_context(Pdu::EnquireLink(EnquireLink));
        let err = ctx.submit_sm().unwrap_err();
        match err {
            SessionError::InvalidCast { expected, actual } => {
                assert_eq!(expected, "SubmitSm");
                assert_eq!(actual, CommandId::EnquireLink);
            }
            other => panic!("expected invalid cast, got {other:?}"),
        }
    }
}
