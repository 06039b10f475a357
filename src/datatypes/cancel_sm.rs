use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{
    decode_cstring, decode_npi, decode_ton, encode_cstring, encode_u8, CodecError, Decodable,
    Encodable,
};
use crate::datatypes::{CommandId, NumericPlanIndicator, TypeOfNumber};
use crate::macros::impl_body_less_pdu;

/// Cancel one or more previously submitted messages (Section 4.10.1).
///
/// Either a message_id selects a single message, or (service_type,
/// source_addr, destination_addr) select all matching pending messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CancelSm {
    pub service_type: String,
    /// SMSC message ID of the message to cancel, empty for address matching.
    pub message_id: String,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    pub source_addr: String,
    pub dest_addr_ton: TypeOfNumber,
    pub dest_addr_npi: NumericPlanIndicator,
    pub destination_addr: String,
}

/// Response to cancel_sm; header-only (Section 4.10.2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CancelSmResp;

impl CancelSm {
    /// The response PDU acknowledging this cancellation.
    pub fn response(&self) -> CancelSmResp {
        CancelSmResp
    }
}

impl Decodable for CancelSm {
    fn command_id() -> CommandId {
        CommandId::CancelSm
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Self {
            service_type: decode_cstring(buf, 6, "service_type")?,
            message_id: decode_cstring(buf, 65, "message_id")?,
            source_addr_ton: decode_ton(buf, "source_addr_ton")?,
            source_addr_npi: decode_npi(buf, "source_addr_npi")?,
            source_addr: decode_cstring(buf, 21, "source_addr")?,
            dest_addr_ton: decode_ton(buf, "dest_addr_ton")?,
            dest_addr_npi: decode_npi(buf, "dest_addr_npi")?,
            destination_addr: decode_cstring(buf, 21, "destination_addr")?,
        })
    }
}

impl Encodable for CancelSm {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.service_type, 6, "service_type")?;
        encode_cstring(buf, &self.message_id, 65, "message_id")?;
        encode_u8(buf, self.source_addr_ton as u8);
        encode_u8(buf, self.source_addr_npi as u8);
        encode_cstring(buf, &self.source_addr, 21, "source_addr")?;
        encode_u8(buf, self.dest_addr_ton as u8);
        encode_u8(buf, self.dest_addr_npi as u8);
        encode_cstring(buf, &self.destination_addr, 21, "destination_addr")
    }
}

impl_body_less_pdu!(CancelSmResp, CommandId::CancelSmResp);
