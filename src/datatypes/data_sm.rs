use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{
    decode_cstring, decode_npi, decode_ton, decode_u8, encode_cstring, encode_u8, CodecError,
    Decodable, Encodable,
};
use crate::datatypes::{CommandId, NumericPlanIndicator, Tlv, TypeOfNumber};

/// Streamlined message exchange (Section 4.12.2).
///
/// data_sm carries no inline short_message; the payload always travels in
/// the message_payload optional parameter. Both ESME and SMSC may originate
/// it on transmitter- or receiver-capable sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSm {
    pub service_type: String,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    /// Address of the originating SME (max 64 chars).
    pub source_addr: String,
    pub dest_addr_ton: TypeOfNumber,
    pub dest_addr_npi: NumericPlanIndicator,
    /// Address of the destination SME (max 64 chars).
    pub destination_addr: String,
    pub esm_class: u8,
    pub registered_delivery: u8,
    pub data_coding: u8,
    pub tlvs: Vec<Tlv>,
}

impl DataSm {
    /// The response PDU acknowledging this exchange.
    pub fn response(&self, message_id: impl Into<String>) -> DataSmResp {
        DataSmResp {
            message_id: message_id.into(),
            tlvs: Vec::new(),
        }
    }
}

/// Response to data_sm (Section 4.12.3).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DataSmResp {
    /// SMSC message ID of the message (max 64 chars).
    pub message_id: String,
    pub tlvs: Vec<Tlv>,
}

impl Decodable for DataSm {
    fn command_id() -> CommandId {
        CommandId::DataSm
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Self {
            service_type: decode_cstring(buf, 6, "service_type")?,
            source_addr_ton: decode_ton(buf, "source_addr_ton")?,
            source_addr_npi: decode_npi(buf, "source_addr_npi")?,
            source_addr: decode_cstring(buf, 65, "source_addr")?,
            dest_addr_ton: decode_ton(buf, "dest_addr_ton")?,
            dest_addr_npi: decode_npi(buf, "dest_addr_npi")?,
            destination_addr: decode_cstring(buf, 65, "destination_addr")?,
            esm_class: decode_u8(buf)?,
            registered_delivery: decode_u8(buf)?,
            data_coding: decode_u8(buf)?,
            tlvs: Tlv::decode_all(buf)?,
        })
    }
}

impl Encodable for DataSm {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.service_type, 6, "service_type")?;
        encode_u8(buf, self.source_addr_ton as u8);
        encode_u8(buf, self.source_addr_npi as u8);
        encode_cstring(buf, &self.source_addr, 65, "source_addr")?;
        encode_u8(buf, self.dest_addr_ton as u8);
        encode_u8(buf, self.dest_addr_npi as u8);
        encode_cstring(buf, &self.destination_addr, 65, "destination_addr")?;
        encode_u8(buf, self.esm_class);
        encode_u8(buf, self.registered_delivery);
        encode_u8(buf, self.data_coding);
        for tlv in &self.tlvs {
            tlv.encode(buf)?;
        }
        Ok(())
    }
}

impl Decodable for DataSmResp {
    fn command_id() -> CommandId {
        CommandId::DataSmResp
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Self {
            message_id: decode_cstring(buf, 65, "message_id")?,
            tlvs: Tlv::decode_all(buf)?,
        })
    }
}

impl Encodable for DataSmResp {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.message_id, 65, "message_id")?;
        for tlv in &self.tlvs {
            tlv.encode(buf)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::tlv::tags;

    #[test]
    fn data_sm_roundtrip_with_payload_tlv() {
        let data_sm = DataSm {
            source_addr: "11111111".to_string(),
            destination_addr: "22222222".to_string(),
            data_coding: 0x04,
            tlvs: vec![Tlv::new(tags::MESSAGE_PAYLOAD, b"binary payload".to_vec())],
            ..Default::default()
        };

        let mut buf = BytesMut::new();
        data_sm.encode_body(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf.as_ref());
        let decoded = DataSm::decode_body(&mut cursor).unwrap();
        assert_eq!(decoded, data_sm);
    }
}
