use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{
    decode_cstring, decode_npi, decode_octets, decode_ton, decode_u8, encode_cstring, encode_u8,
    CodecError, Decodable, Encodable,
};
use crate::datatypes::{CommandId, NumericPlanIndicator, TypeOfNumber};
use crate::macros::impl_body_less_pdu;

/// Replace a previously submitted, still pending message (Section 4.9.1).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplaceSm {
    /// SMSC message ID of the message to replace (max 64 chars).
    pub message_id: String,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    pub source_addr: String,
    pub schedule_delivery_time: String,
    pub validity_period: String,
    pub registered_delivery: u8,
    pub sm_default_msg_id: u8,
    /// Replacement payload octets.
    pub short_message: Vec<u8>,
}

/// Response to replace_sm; header-only (Section 4.9.2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaceSmResp;

impl ReplaceSm {
    /// The response PDU acknowledging this replacement.
    pub fn response(&self) -> ReplaceSmResp {
        ReplaceSmResp
    }
}

impl Decodable for ReplaceSm {
    fn command_id() -> CommandId {
        CommandId::ReplaceSm
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Self {
            message_id: decode_cstring(buf, 65, "message_id")?,
            source_addr_ton: decode_ton(buf, "source_addr_ton")?,
            source_addr_npi: decode_npi(buf, "source_addr_npi")?,
            source_addr: decode_cstring(buf, 21, "source_addr")?,
            schedule_delivery_time: decode_cstring(buf, 17, "schedule_delivery_time")?,
            validity_period: decode_cstring(buf, 17, "validity_period")?,
            registered_delivery: decode_u8(buf)?,
            sm_default_msg_id: decode_u8(buf)?,
            short_message: {
                let sm_length = decode_u8(buf)?;
                decode_octets(buf, sm_length as usize, "short_message")?
            },
        })
    }
}

impl Encodable for ReplaceSm {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.message_id, 65, "message_id")?;
        encode_u8(buf, self.source_addr_ton as u8);
        encode_u8(buf, self.source_addr_npi as u8);
        encode_cstring(buf, &self.source_addr, 21, "source_addr")?;
        encode_cstring(buf, &self.schedule_delivery_time, 17, "schedule_delivery_time")?;
        encode_cstring(buf, &self.validity_period, 17, "validity_period")?;
        encode_u8(buf, self.registered_delivery);
        encode_u8(buf, self.sm_default_msg_id);
        if self.short_message.len() > 254 {
            return Err(CodecError::FieldValidation {
                field: "short_message",
                reason: format!(
                    "short_message is {} octets, maximum is 254",
                    self.short_message.len()
                ),
            });
        }
        encode_u8(buf, self.short_message.len() as u8);
        buf.extend_from_slice(&self.short_message);
        Ok(())
    }
}

impl_body_less_pdu!(ReplaceSmResp, CommandId::ReplaceSmResp);
