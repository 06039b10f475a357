// ABOUTME: Bind helpers: dial an SMSC, open an ESME session and send the bind PDU
// ABOUTME: Also provides the unbind helper that tears a session down politely

use std::time::Duration;

use tokio::net::TcpStream;

use crate::codec::Pdu;
use crate::datatypes::{
    BindReceiver, BindTransceiver, BindTransmitter, InterfaceVersion, NumericPlanIndicator,
    TypeOfNumber, Unbind,
};
use crate::error::SessionError;
use crate::session::{Session, SessionConfig};

/// Configuration for binding to an SMPP server.
#[derive(Debug, Clone, Default)]
pub struct BindConfig {
    /// Bind will be attempted to this address.
    pub addr: String,
    /// Mandatory fields for the bind PDU.
    pub system_id: String,
    pub password: String,
    pub system_type: String,
    pub addr_ton: TypeOfNumber,
    pub addr_npi: NumericPlanIndicator,
    pub addr_range: String,
}

impl BindConfig {
    fn pdu_fields(&self) -> BindTransmitter {
        BindTransmitter {
            system_id: self.system_id.clone(),
            password: self.password.clone(),
            system_type: self.system_type.clone(),
            interface_version: InterfaceVersion::SmppV34,
            addr_ton: self.addr_ton,
            addr_npi: self.addr_npi,
            address_range: self.addr_range.clone(),
        }
    }
}

async fn bind(req: Pdu, sc: SessionConfig, bc: &BindConfig) -> Result<Session, SessionError> {
    // The session config applies its own defaults later; the bind send uses
    // a shorter 5 second deadline when no window timeout was configured.
    let timeout = if sc.window_timeout.is_zero() {
        Duration::from_secs(5)
    } else {
        sc.window_timeout
    };

    let stream = TcpStream::connect(bc.addr.as_str()).await?;
    let remote_addr = stream.peer_addr().ok();
    let sess = Session::with_remote_addr(stream, remote_addr, sc);

    match tokio::time::timeout(timeout, sess.send_request(req)).await {
        Ok(Ok(_sequence)) => Ok(sess),
        Ok(Err(err)) => {
            let _ = sess.close().await;
            Err(err)
        }
        Err(_elapsed) => {
            let _ = sess.close().await;
            Err(SessionError::Timeout)
        }
    }
}

/// Dial the peer and bind a transmitter session.
///
/// The session is returned as soon as the bind request is on the wire; the
/// bind response is delivered through the configured response handler.
/// Callers must not send traffic PDUs until the `session_state` hook
/// reports a bound state.
pub async fn bind_transmitter(sc: SessionConfig, bc: BindConfig) -> Result<Session, SessionError> {
    let req = Pdu::BindTransmitter(bc.pdu_fields());
    bind(req, sc, &bc).await
}

/// Dial the peer and bind a receiver session.
///
/// See [`bind_transmitter`] for the bind-completion contract.
pub async fn bind_receiver(sc: SessionConfig, bc: BindConfig) -> Result<Session, SessionError> {
    let fields = bc.pdu_fields();
    let req = Pdu::BindReceiver(BindReceiver {
        system_id: fields.system_id,
        password: fields.password,
        system_type: fields.system_type,
        interface_version: fields.interface_version,
        addr_ton: fields.addr_ton,
        addr_npi: fields.addr_npi,
        address_range: fields.address_range,
    });
    bind(req, sc, &bc).await
}

/// Dial the peer and bind a transceiver session.
///
/// See [`bind_transmitter`] for the bind-completion contract.
pub async fn bind_transceiver(sc: SessionConfig, bc: BindConfig) -> Result<Session, SessionError> {
    let fields = bc.pdu_fields();
    let req = Pdu::BindTransceiver(BindTransceiver {
        system_id: fields.system_id,
        password: fields.password,
        system_type: fields.system_type,
        interface_version: fields.interface_version,
        addr_ton: fields.addr_ton,
        addr_npi: fields.addr_npi,
        address_range: fields.address_range,
    });
    bind(req, sc, &bc).await
}

/// Initiate session unbinding and close the session.
///
/// The peer is notified with an unbind request first; the session is closed
/// even when sending it fails, and the first error encountered is returned.
pub async fn unbind(sess: &Session) -> Result<(), SessionError> {
    let send_result = sess.send_request(Pdu::Unbind(Unbind)).await;
    let close_result = sess.close().await;
    send_result.map(|_| ()).and(close_result)
}
