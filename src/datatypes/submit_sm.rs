use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{
    decode_cstring, decode_npi, decode_octets, decode_ton, decode_u8, encode_cstring, encode_u8,
    CodecError, Decodable, Encodable,
};
use crate::datatypes::{CommandId, NumericPlanIndicator, Tlv, TypeOfNumber};

/// This operation is used by an ESME to submit a short message to the SMSC
/// for onward transmission to a specified short message entity (Section
/// 4.4.1).
///
/// `short_message` holds raw payload octets: packed GSM-7 septets, UCS-2
/// code units or 8-bit data depending on `data_coding`, optionally prefixed
/// by a user data header when the UDHI bit of `esm_class` is set. The
/// `sm_length` octet is derived from the payload at encode time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmitSm {
    /// SMS application service indicator (max 5 chars).
    pub service_type: String,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    /// Address of the submitting SME (max 20 chars).
    pub source_addr: String,
    pub dest_addr_ton: TypeOfNumber,
    pub dest_addr_npi: NumericPlanIndicator,
    /// Address of the destination SME (max 20 chars).
    pub destination_addr: String,
    /// Messaging mode and type bits; bit 6 flags a UDH in short_message.
    pub esm_class: u8,
    pub protocol_id: u8,
    pub priority_flag: u8,
    /// Absolute or relative SMSC time format (16 chars), empty for immediate.
    pub schedule_delivery_time: String,
    pub validity_period: String,
    pub registered_delivery: u8,
    pub replace_if_present_flag: u8,
    /// GSM 03.38 data coding scheme octet.
    pub data_coding: u8,
    pub sm_default_msg_id: u8,
    /// Up to 254 payload octets; longer content belongs in the
    /// message_payload TLV.
    pub short_message: Vec<u8>,
    /// Optional parameters.
    pub tlvs: Vec<Tlv>,
}

impl SubmitSm {
    /// The response PDU acknowledging this submission.
    pub fn response(&self, message_id: impl Into<String>) -> SubmitSmResp {
        SubmitSmResp {
            message_id: message_id.into(),
        }
    }
}

/// Response carrying the SMSC-assigned message identifier (Section 4.4.2).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmitSmResp {
    /// SMSC message ID of the submitted message (max 64 chars).
    pub message_id: String,
}

impl Decodable for SubmitSm {
    fn command_id() -> CommandId {
        CommandId::SubmitSm
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let service_type = decode_cstring(buf, 6, "service_type")?;
        let source_addr_ton = decode_ton(buf, "source_addr_ton")?;
        let source_addr_npi = decode_npi(buf, "source_addr_npi")?;
        let source_addr = decode_cstring(buf, 21, "source_addr")?;
        let dest_addr_ton = decode_ton(buf, "dest_addr_ton")?;
        let dest_addr_npi = decode_npi(buf, "dest_addr_npi")?;
        let destination_addr = decode_cstring(buf, 21, "destination_addr")?;
        let esm_class = decode_u8(buf)?;
        let protocol_id = decode_u8(buf)?;
        let priority_flag = decode_u8(buf)?;
        let schedule_delivery_time = decode_cstring(buf, 17, "schedule_delivery_time")?;
        let validity_period = decode_cstring(buf, 17, "validity_period")?;
        let registered_delivery = decode_u8(buf)?;
        let replace_if_present_flag = decode_u8(buf)?;
        let data_coding = decode_u8(buf)?;
        let sm_default_msg_id = decode_u8(buf)?;
        let sm_length = decode_u8(buf)?;
        let short_message = decode_octets(buf, sm_length as usize, "short_message")?;
        let tlvs = Tlv::decode_all(buf)?;

        Ok(SubmitSm {
            service_type,
            source_addr_ton,
            source_addr_npi,
            source_addr,
            dest_addr_ton,
            dest_addr_npi,
            destination_addr,
            esm_class,
            protocol_id,
            priority_flag,
            schedule_delivery_time,
            validity_period,
            registered_delivery,
            replace_if_present_flag,
            data_coding,
            sm_default_msg_id,
            short_message,
            tlvs,
        })
    }
}

impl Encodable for SubmitSm {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.service_type, 6, "service_type")?;
        encode_u8(buf, self.source_addr_ton as u8);
        encode_u8(buf, self.source_addr_npi as u8);
        encode_cstring(buf, &self.source_addr, 21, "source_addr")?;
        encode_u8(buf, self.dest_addr_ton as u8);
        encode_u8(buf, self.dest_addr_npi as u8);
        encode_cstring(buf, &self.destination_addr, 21, "destination_addr")?;
        encode_u8(buf, self.esm_class);
        encode_u8(buf, self.protocol_id);
        encode_u8(buf, self.priority_flag);
        encode_cstring(buf, &self.schedule_delivery_time, 17, "schedule_delivery_time")?;
        encode_cstring(buf, &self.validity_period, 17, "validity_period")?;
        encode_u8(buf, self.registered_delivery);
        encode_u8(buf, self.replace_if_present_flag);
        encode_u8(buf, self.data_coding);
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
        for tlv in &self.tlvs {
            tlv.encode(buf)?;
        }
        Ok(())
    }
}

impl Decodable for SubmitSmResp {
    fn command_id() -> CommandId {
        CommandId::SubmitSmResp
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Self {
            message_id: decode_cstring(buf, 65, "message_id")?,
        })
    }
}

impl Encodable for SubmitSmResp {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.message_id, 65, "message_id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::tlv::tags;

    #[test]
    fn submit_sm_roundtrip_with_tlvs() {
        let submit = SubmitSm {
            service_type: "CMT".to_string(),
            source_addr_ton: TypeOfNumber::International,
            source_addr_npi: NumericPlanIndicator::Isdn,
            source_addr: "11111111".to_string(),
            dest_addr_ton: TypeOfNumber::International,
            dest_addr_npi: NumericPlanIndicator::Isdn,
            destination_addr: "22222222".to_string(),
            esm_class: 0x40,
            registered_delivery: 1,
            data_coding: 0x08,
            short_message: vec![0x05, 0x00, 0x03, 0x2A, 0x02, 0x01, 0x06, 0x33],
            tlvs: vec![Tlv::new(tags::USER_MESSAGE_REFERENCE, vec![0x00, 0x07])],
            ..Default::default()
        };

        let mut buf = BytesMut::new();
        submit.encode_body(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf.as_ref());
        let decoded = SubmitSm::decode_body(&mut cursor).unwrap();
        assert_eq!(decoded, submit);
    }

    #[test]
    fn oversized_short_message_rejected() {
        let submit = SubmitSm {
            short_message: vec![0u8; 255],
            ..Default::default()
        };
        let mut buf = BytesMut::new();
        assert!(matches!(
            submit.encode_body(&mut buf),
            Err(CodecError::FieldValidation { field: "short_message", .. })
        ));
    }

    #[test]
    fn truncated_body_is_incomplete() {
        let submit = SubmitSm {
            destination_addr: "22222222".to_string(),
            short_message: b"hello".to_vec(),
            ..Default::default()
        };
        let mut buf = BytesMut::new();
        submit.encode_body(&mut buf).unwrap();

        let truncated = &buf.as_ref()[..buf.len() - 3];
        let mut cursor = Cursor::new(truncated);
        assert!(matches!(
            SubmitSm::decode_body(&mut cursor),
            Err(CodecError::Incomplete)
        ));
    }
}
