use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{
    decode_cstring, decode_npi, decode_ton, decode_u8, encode_cstring, encode_u8, CodecError,
    Decodable, Encodable,
};
use crate::datatypes::{CommandId, NumericPlanIndicator, TypeOfNumber};

/// Query the state of a previously submitted message (Section 4.8.1).
///
/// The source address must match the one used on the original submit_sm.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuerySm {
    /// SMSC message ID of the message to query (max 64 chars).
    pub message_id: String,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    pub source_addr: String,
}

/// Response to query_sm (Section 4.8.2).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QuerySmResp {
    pub message_id: String,
    /// Final SMSC time format date, empty while the message is pending.
    pub final_date: String,
    /// message_state octet per Section 5.2.28.
    pub message_state: u8,
    /// Network-specific error code when the message is undeliverable.
    pub error_code: u8,
}

impl Decodable for QuerySm {
    fn command_id() -> CommandId {
        CommandId::QuerySm
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Self {
            message_id: decode_cstring(buf, 65, "message_id")?,
            source_addr_ton: decode_ton(buf, "source_addr_ton")?,
            source_addr_npi: decode_npi(buf, "source_addr_npi")?,
            source_addr: decode_cstring(buf, 21, "source_addr")?,
        })
    }
}

impl Encodable for QuerySm {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.message_id, 65, "message_id")?;
        encode_u8(buf, self.source_addr_ton as u8);
        encode_u8(buf, self.source_addr_npi as u8);
        encode_cstring(buf, &self.source_addr, 21, "source_addr")
    }
}

impl Decodable for QuerySmResp {
    fn command_id() -> CommandId {
        CommandId::QuerySmResp
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Self {
            message_id: decode_cstring(buf, 65, "message_id")?,
            final_date: decode_cstring(buf, 17, "final_date")?,
            message_state: decode_u8(buf)?,
            error_code: decode_u8(buf)?,
        })
    }
}

impl Encodable for QuerySmResp {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.message_id, 65, "message_id")?;
        encode_cstring(buf, &self.final_date, 17, "final_date")?;
        encode_u8(buf, self.message_state);
        encode_u8(buf, self.error_code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_sm_roundtrip() {
        let query = QuerySm {
            message_id: "A1B2C3".to_string(),
            source_addr_ton: TypeOfNumber::National,
            source_addr_npi: NumericPlanIndicator::Isdn,
            source_addr: "5550001".to_string(),
        };

        let mut buf = BytesMut::new();
        query.encode_body(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf.as_ref());
        assert_eq!(QuerySm::decode_body(&mut cursor).unwrap(), query);
    }
}
