use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{
    decode_cstring, decode_npi, decode_octets, decode_ton, decode_u8, encode_cstring, encode_u8,
    CodecError, Decodable, Encodable,
};
use crate::datatypes::{CommandId, NumericPlanIndicator, Tlv, TypeOfNumber};

/// Message delivery from the SMSC to a receiver-bound ESME (Section 4.6.1).
///
/// The body layout mirrors submit_sm; `schedule_delivery_time` and
/// `validity_period` are carried but must be empty on delivery. Delivery
/// receipts arrive as deliver_sm with the receipt bits of `esm_class` set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliverSm {
    pub service_type: String,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    /// Address of the originating SME (max 20 chars).
    pub source_addr: String,
    pub dest_addr_ton: TypeOfNumber,
    pub dest_addr_npi: NumericPlanIndicator,
    /// Destination address of this delivery (max 20 chars).
    pub destination_addr: String,
    pub esm_class: u8,
    pub protocol_id: u8,
    pub priority_flag: u8,
    pub schedule_delivery_time: String,
    pub validity_period: String,
    pub registered_delivery: u8,
    pub replace_if_present_flag: u8,
    pub data_coding: u8,
    pub sm_default_msg_id: u8,
    pub short_message: Vec<u8>,
    pub tlvs: Vec<Tlv>,
}

impl DeliverSm {
    /// The response PDU acknowledging this delivery. Its message_id is
    /// unused and always empty (Section 4.6.2).
    pub fn response(&self) -> DeliverSmResp {
        DeliverSmResp::default()
    }
}

/// Response to deliver_sm (Section 4.6.2).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeliverSmResp {
    /// Unused, must be empty.
    pub message_id: String,
}

impl Decodable for DeliverSm {
    fn command_id() -> CommandId {
        CommandId::DeliverSm
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

        Ok(DeliverSm {
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

impl Encodable for DeliverSm {
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

impl Decodable for DeliverSmResp {
    fn command_id() -> CommandId {
        CommandId::DeliverSmResp
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Self {
            message_id: decode_cstring(buf, 65, "message_id")?,
        })
    }
}

impl Encodable for DeliverSmResp {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.message_id, 65, "message_id")
    }
}
