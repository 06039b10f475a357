// End-to-end session scenarios: two engines wired over an in-memory duplex
// stream, one per role, talking real SMPP frames.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::codec::{Pdu, PduHeader};
use crate::datatypes::{
    BindTransmitter, BindTransmitterResp, CommandId, CommandStatus, EnquireLink, GenericNack,
    SubmitSm, Unbind,
};
use crate::error::SessionError;
use crate::session::{
    Handler, Session, SessionConfig, SessionState, SessionStateHook, SessionType,
};

/// Minimal SMSC behavior: accept binds, answer link checks and unbinds, and
/// (optionally, after a delay) acknowledge submissions.
struct SmscHandler {
    submit_delay: Duration,
    respond_submits: bool,
}

impl Default for SmscHandler {
    fn default() -> Self {
        Self {
            submit_delay: Duration::ZERO,
            respond_submits: true,
        }
    }
}

#[async_trait]
impl Handler for SmscHandler {
    async fn serve(&self, ctx: &mut crate::Context) {
        let pdu = ctx.pdu().clone();
        match pdu {
            Pdu::BindTransmitter(bind) => {
                let resp = Pdu::BindTransmitterResp(bind.response("SMSC"));
                ctx.respond(resp, CommandStatus::Ok).await.unwrap();
            }
            Pdu::BindReceiver(bind) => {
                let resp = Pdu::BindReceiverResp(bind.response("SMSC"));
                ctx.respond(resp, CommandStatus::Ok).await.unwrap();
            }
            Pdu::BindTransceiver(bind) => {
                let resp = Pdu::BindTransceiverResp(bind.response("SMSC"));
                ctx.respond(resp, CommandStatus::Ok).await.unwrap();
            }
            Pdu::EnquireLink(enquire) => {
                let resp = Pdu::EnquireLinkResp(enquire.response());
                ctx.respond(resp, CommandStatus::Ok).await.unwrap();
            }
            Pdu::Unbind(unbind) => {
                let resp = Pdu::UnbindResp(unbind.response());
                ctx.respond(resp, CommandStatus::Ok).await.unwrap();
            }
            Pdu::SubmitSm(submit) => {
                if !self.respond_submits {
                    return;
                }
                if !self.submit_delay.is_zero() {
                    tokio::time::sleep(self.submit_delay).await;
                }
                let resp = Pdu::SubmitSmResp(submit.response(format!("MSG{}", ctx.sequence())));
                ctx.respond(resp, CommandStatus::Ok).await.unwrap();
            }
            _ => {
                let _ = ctx
                    .respond(Pdu::GenericNack(GenericNack), CommandStatus::SystemError)
                    .await;
            }
        }
    }
}

/// Response handler forwarding (command, status, sequence) to a channel.
struct Collector {
    tx: mpsc::UnboundedSender<(CommandId, CommandStatus, u32)>,
}

#[async_trait]
impl Handler for Collector {
    async fn serve(&self, ctx: &mut crate::Context) {
        let _ = self
            .tx
            .send((ctx.command_id(), ctx.status(), ctx.sequence()));
    }
}

fn state_hook(tx: mpsc::UnboundedSender<SessionState>) -> SessionStateHook {
    Box::new(move |_id, _system_id, state| {
        let _ = tx.send(state);
    })
}

fn session_pair(esme: SessionConfig, smsc: SessionConfig) -> (Session, Session) {
    let (a, b) = tokio::io::duplex(64 * 1024);
    let esme = Session::new(
        a,
        SessionConfig {
            session_type: SessionType::Esme,
            ..esme
        },
    );
    let smsc = Session::new(
        b,
        SessionConfig {
            session_type: SessionType::Smsc,
            ..smsc
        },
    );
    (esme, smsc)
}

fn bind_tx_pdu(system_id: &str, password: &str) -> Pdu {
    Pdu::BindTransmitter(BindTransmitter {
        system_id: system_id.to_string(),
        password: password.to_string(),
        ..Default::default()
    })
}

fn submit_pdu() -> Pdu {
    Pdu::SubmitSm(Box::new(SubmitSm {
        source_addr: "11111111".to_string(),
        destination_addr: "22222222".to_string(),
        short_message: b"hello from smpp".to_vec(),
        ..Default::default()
    }))
}

#[tokio::test]
async fn bind_enquire_unbind_lifecycle() {
    let (state_tx, mut state_rx) = mpsc::unbounded_channel();
    let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();

    let (esme, smsc) = session_pair(
        SessionConfig {
            response_handler: Some(Arc::new(Collector { tx: resp_tx })),
            session_state: Some(state_hook(state_tx)),
            ..Default::default()
        },
        SessionConfig {
            request_handler: Some(Arc::new(SmscHandler::default())),
            ..Default::default()
        },
    );

    // Bind: Open -> Binding -> BoundTx.
    let seq = esme.send_request(bind_tx_pdu("X", "Y")).await.unwrap();
    let (id, status, resp_seq) = resp_rx.recv().await.unwrap();
    assert_eq!(id, CommandId::BindTransmitterResp);
    assert_eq!(status, CommandStatus::Ok);
    assert_eq!(resp_seq, seq);

    assert_eq!(state_rx.recv().await, Some(SessionState::Binding));
    assert_eq!(state_rx.recv().await, Some(SessionState::BoundTx));

    // The server observed the peer identity from the bind.
    assert_eq!(smsc.system_id().await, "X");

    // Link check.
    let seq = esme
        .send_request(Pdu::EnquireLink(EnquireLink))
        .await
        .unwrap();
    let (id, _, resp_seq) = resp_rx.recv().await.unwrap();
    assert_eq!(id, CommandId::EnquireLinkResp);
    assert_eq!(resp_seq, seq);

    // Unbind, then close.
    esme.send_request(Pdu::Unbind(Unbind)).await.unwrap();
    let (id, _, _) = resp_rx.recv().await.unwrap();
    assert_eq!(id, CommandId::UnbindResp);
    assert_eq!(state_rx.recv().await, Some(SessionState::Unbinding));

    esme.close().await.unwrap();
    esme.closed().await;
    assert_eq!(state_rx.recv().await, Some(SessionState::Closing));
    assert_eq!(state_rx.recv().await, Some(SessionState::Closed));
    assert_eq!(esme.state().await, SessionState::Closed);

    let _ = smsc.close().await;
}

#[tokio::test]
async fn inbound_window_throttles_with_generic_nack() {
    let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();

    let (esme, smsc) = session_pair(
        SessionConfig {
            response_handler: Some(Arc::new(Collector { tx: resp_tx })),
            ..Default::default()
        },
        SessionConfig {
            req_win_size: 2,
            request_handler: Some(Arc::new(SmscHandler {
                submit_delay: Duration::from_millis(300),
                respond_submits: true,
            })),
            ..Default::default()
        },
    );

    let bind_seq = esme.send_request(bind_tx_pdu("X", "Y")).await.unwrap();
    let (id, _, resp_seq) = resp_rx.recv().await.unwrap();
    assert_eq!(id, CommandId::BindTransmitterResp);
    assert_eq!(resp_seq, bind_seq);

    // Let the bind handler finish its window bookkeeping before the burst.
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Three rapid submissions against a window of two slow handlers.
    let mut seqs = Vec::new();
    for _ in 0..3 {
        seqs.push(esme.send_request(submit_pdu()).await.unwrap());
    }

    // The third is rejected immediately with a throttled GenericNack
    // echoing its sequence.
    let (id, status, resp_seq) = resp_rx.recv().await.unwrap();
    assert_eq!(id, CommandId::GenericNack);
    assert_eq!(status, CommandStatus::ThrottlingError);
    assert_eq!(status.code(), 0x0000_0058);
    assert_eq!(resp_seq, seqs[2]);

    // The two admitted submissions are answered once the handlers wake up.
    for _ in 0..2 {
        let (id, status, resp_seq) = resp_rx.recv().await.unwrap();
        assert_eq!(id, CommandId::SubmitSmResp);
        assert_eq!(status, CommandStatus::Ok);
        assert!(seqs[..2].contains(&resp_seq));
    }

    let _ = esme.close().await;
    let _ = smsc.close().await;
}

#[tokio::test]
async fn send_window_saturation_is_temporary() {
    let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();

    let (esme, smsc) = session_pair(
        SessionConfig {
            send_win_size: 1,
            response_handler: Some(Arc::new(Collector { tx: resp_tx })),
            ..Default::default()
        },
        SessionConfig {
            // Binds are answered; submissions are left pending forever.
            request_handler: Some(Arc::new(SmscHandler {
                submit_delay: Duration::ZERO,
                respond_submits: false,
            })),
            ..Default::default()
        },
    );

    let bind_seq = esme.send_request(bind_tx_pdu("X", "Y")).await.unwrap();
    let (_, _, resp_seq) = resp_rx.recv().await.unwrap();
    assert_eq!(resp_seq, bind_seq);

    // First submission occupies the single window slot.
    esme.send_request(submit_pdu()).await.unwrap();

    // Second submission fails with a temporary window error.
    let err = esme.send_request(submit_pdu()).await.unwrap_err();
    assert!(matches!(err, SessionError::WindowClosed));
    assert!(err.is_temporary());

    let _ = esme.close().await;
    let _ = smsc.close().await;
}

#[tokio::test]
async fn illegal_inbound_pdu_is_skipped_not_fatal() {
    let (mut raw, server_side) = tokio::io::duplex(8192);
    let smsc = Session::new(
        server_side,
        SessionConfig {
            session_type: SessionType::Smsc,
            request_handler: Some(Arc::new(SmscHandler::default())),
            ..Default::default()
        },
    );

    // A submit_sm in Open state is illegal: the engine logs it, skips the
    // dispatch and keeps reading.
    let submit = submit_pdu().to_bytes(CommandStatus::Ok, 5).unwrap();
    raw.write_all(&submit).await.unwrap();

    // The session is still alive: a bind on the same connection succeeds.
    let bind = bind_tx_pdu("X", "Y").to_bytes(CommandStatus::Ok, 6).unwrap();
    raw.write_all(&bind).await.unwrap();

    let mut header_bytes = [0u8; PduHeader::SIZE];
    raw.read_exact(&mut header_bytes).await.unwrap();
    let header = PduHeader::decode(&header_bytes).unwrap();
    // The first frame the peer sends back answers the bind; the skipped
    // submit_sm produced nothing.
    assert_eq!(header.command_id, CommandId::BindTransmitterResp);
    assert_eq!(header.sequence_number, 6);
    assert_eq!(header.command_status, CommandStatus::Ok.code());

    assert_eq!(smsc.state().await, SessionState::BoundTx);
    let _ = smsc.close().await;
}

#[tokio::test]
async fn unrecognized_status_is_surfaced_not_fatal() {
    let (mut raw, client_side) = tokio::io::duplex(8192);
    let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
    let esme = Session::new(
        client_side,
        SessionConfig {
            session_type: SessionType::Esme,
            response_handler: Some(Arc::new(Collector { tx: resp_tx })),
            ..Default::default()
        },
    );

    let seq = esme.send_request(bind_tx_pdu("X", "Y")).await.unwrap();

    // Drain the bind request from the wire.
    let mut header_bytes = [0u8; PduHeader::SIZE];
    raw.read_exact(&mut header_bytes).await.unwrap();
    let header = PduHeader::decode(&header_bytes).unwrap();
    let mut body = vec![0u8; header.command_length as usize - PduHeader::SIZE];
    raw.read_exact(&mut body).await.unwrap();

    // Answer with a status in the vendor-specific range, outside the codes
    // the taxonomy defines.
    let resp = Pdu::BindTransmitterResp(BindTransmitterResp {
        system_id: "SMSC".to_string(),
        tlvs: Vec::new(),
    })
    .to_bytes(CommandStatus::Unrecognized(0x0000_0400), seq)
    .unwrap();
    raw.write_all(&resp).await.unwrap();

    // The response handler sees the preserved wire value as a typed status.
    let (id, status, resp_seq) = resp_rx.recv().await.unwrap();
    assert_eq!(id, CommandId::BindTransmitterResp);
    assert_eq!(resp_seq, seq);
    assert_eq!(status, CommandStatus::Unrecognized(0x0000_0400));
    let err = status.into_result().unwrap_err();
    assert_eq!(err.status().code(), 0x0000_0400);

    // The session was not torn down and can still send.
    assert_eq!(esme.state().await, SessionState::BoundTx);
    esme.send_request(Pdu::EnquireLink(EnquireLink))
        .await
        .unwrap();

    let _ = esme.close().await;
}

#[tokio::test]
async fn framing_error_shuts_the_session_down() {
    let (mut raw, server_side) = tokio::io::duplex(8192);
    let smsc = Session::new(
        server_side,
        SessionConfig {
            session_type: SessionType::Smsc,
            ..Default::default()
        },
    );

    // command_length below the header size is a permanent framing error.
    let mut frame = Vec::new();
    frame.extend_from_slice(&15u32.to_be_bytes());
    frame.extend_from_slice(&(CommandId::EnquireLink as u32).to_be_bytes());
    frame.extend_from_slice(&0u32.to_be_bytes());
    frame.extend_from_slice(&1u32.to_be_bytes());
    raw.write_all(&frame).await.unwrap();

    smsc.closed().await;
    assert_eq!(smsc.state().await, SessionState::Closed);
}

#[tokio::test]
async fn double_close_yields_error() {
    let (esme, smsc) = session_pair(SessionConfig::default(), SessionConfig::default());

    esme.close().await.unwrap();
    let err = esme.close().await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidStateChange { .. }));

    let _ = smsc.close().await;
}

#[tokio::test]
async fn request_token_fires_after_window_timeout() {
    struct WaitForCancel {
        tx: mpsc::UnboundedSender<()>,
    }

    #[async_trait]
    impl Handler for WaitForCancel {
        async fn serve(&self, ctx: &mut crate::Context) {
            ctx.cancellation().cancelled().await;
            let _ = self.tx.send(());
        }
    }

    let (cancel_tx, mut cancel_rx) = mpsc::unbounded_channel();
    let (esme, smsc) = session_pair(
        SessionConfig::default(),
        SessionConfig {
            window_timeout: Duration::from_millis(100),
            request_handler: Some(Arc::new(WaitForCancel { tx: cancel_tx })),
            ..Default::default()
        },
    );

    esme.send_request(bind_tx_pdu("X", "Y")).await.unwrap();

    // The handler only returns once its token fires at the deadline.
    let fired = tokio::time::timeout(Duration::from_secs(2), cancel_rx.recv()).await;
    assert!(fired.is_ok());

    let _ = esme.close().await;
    let _ = smsc.close().await;
}

#[tokio::test]
async fn generated_session_ids_are_unique() {
    let (a, _keep_a) = tokio::io::duplex(64);
    let (b, _keep_b) = tokio::io::duplex(64);

    let first = Session::new(a, SessionConfig::default());
    let second = Session::new(b, SessionConfig::default());

    // 12 random bytes formatted as grouped hex.
    assert_eq!(first.id().len(), 26);
    assert_ne!(first.id(), second.id());

    let _ = first.close().await;
    let _ = second.close().await;
}

#[tokio::test]
async fn configured_session_id_is_kept() {
    let (stream, _keep) = tokio::io::duplex(64);
    let sess = Session::new(
        stream,
        SessionConfig {
            id: "session-7".to_string(),
            system_id: "GATEWAY".to_string(),
            ..Default::default()
        },
    );
    assert_eq!(sess.id(), "session-7");
    assert_eq!(sess.system_id().await, "GATEWAY");
    let _ = sess.close().await;
}
