use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{
    decode_cstring, decode_npi, decode_octets, decode_ton, decode_u8, decode_u32, encode_cstring,
    encode_u8, encode_u32, CodecError, Decodable, Encodable,
};
use crate::datatypes::{CommandId, NumericPlanIndicator, Tlv, TypeOfNumber};

/// Submit a short message to up to 255 destinations (Section 4.5.1).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmitMulti {
    pub service_type: String,
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    pub source_addr: String,
    /// Destination SME addresses and distribution lists.
    pub dest_addresses: Vec<DestAddress>,
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

/// One destination of a submit_multi: an SME address or a distribution list
/// name, discriminated on the wire by the dest_flag octet (Section 4.5.1.1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DestAddress {
    Sme {
        dest_addr_ton: TypeOfNumber,
        dest_addr_npi: NumericPlanIndicator,
        destination_addr: String,
    },
    DistributionList {
        dl_name: String,
    },
}

const DEST_FLAG_SME: u8 = 0x01;
const DEST_FLAG_DISTRIBUTION_LIST: u8 = 0x02;

impl DestAddress {
    fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        match self {
            DestAddress::Sme {
                dest_addr_ton,
                dest_addr_npi,
                destination_addr,
            } => {
                encode_u8(buf, DEST_FLAG_SME);
                encode_u8(buf, *dest_addr_ton as u8);
                encode_u8(buf, *dest_addr_npi as u8);
                encode_cstring(buf, destination_addr, 21, "destination_addr")?;
            }
            DestAddress::DistributionList { dl_name } => {
                encode_u8(buf, DEST_FLAG_DISTRIBUTION_LIST);
                encode_cstring(buf, dl_name, 21, "dl_name")?;
            }
        }
        Ok(())
    }

    fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let flag = decode_u8(buf)?;
        match flag {
            DEST_FLAG_SME => Ok(DestAddress::Sme {
                dest_addr_ton: decode_ton(buf, "dest_addr_ton")?,
                dest_addr_npi: decode_npi(buf, "dest_addr_npi")?,
                destination_addr: decode_cstring(buf, 21, "destination_addr")?,
            }),
            DEST_FLAG_DISTRIBUTION_LIST => Ok(DestAddress::DistributionList {
                dl_name: decode_cstring(buf, 21, "dl_name")?,
            }),
            other => Err(CodecError::FieldValidation {
                field: "dest_flag",
                reason: format!("invalid dest_flag {other:#04x}"),
            }),
        }
    }
}

/// Response to submit_multi listing the destinations the SMSC could not
/// reach (Section 4.5.2).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubmitMultiResp {
    pub message_id: String,
    pub unsuccess_smes: Vec<UnsuccessSme>,
}

/// A destination that submit_multi failed for, with the SMPP status code
/// explaining why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsuccessSme {
    pub dest_addr_ton: TypeOfNumber,
    pub dest_addr_npi: NumericPlanIndicator,
    pub destination_addr: String,
    /// Raw command_status explaining the failure; kept numeric because
    /// SMSCs emit vendor-specific codes here.
    pub error_status_code: u32,
}

impl SubmitMulti {
    /// The response PDU acknowledging this submission.
    pub fn response(&self, message_id: impl Into<String>) -> SubmitMultiResp {
        SubmitMultiResp {
            message_id: message_id.into(),
            unsuccess_smes: Vec::new(),
        }
    }
}

impl Decodable for SubmitMulti {
    fn command_id() -> CommandId {
        CommandId::SubmitMulti
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let service_type = decode_cstring(buf, 6, "service_type")?;
        let source_addr_ton = decode_ton(buf, "source_addr_ton")?;
        let source_addr_npi = decode_npi(buf, "source_addr_npi")?;
        let source_addr = decode_cstring(buf, 21, "source_addr")?;
        let number_of_dests = decode_u8(buf)?;
        let mut dest_addresses = Vec::with_capacity(number_of_dests as usize);
        for _ in 0..number_of_dests {
            dest_addresses.push(DestAddress::decode(buf)?);
        }
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

        Ok(SubmitMulti {
            service_type,
            source_addr_ton,
            source_addr_npi,
            source_addr,
            dest_addresses,
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

impl Encodable for SubmitMulti {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        if self.dest_addresses.is_empty() || self.dest_addresses.len() > 255 {
            return Err(CodecError::FieldValidation {
                field: "number_of_dests",
                reason: format!(
                    "submit_multi requires 1-255 destinations, got {}",
                    self.dest_addresses.len()
                ),
            });
        }
        encode_cstring(buf, &self.service_type, 6, "service_type")?;
        encode_u8(buf, self.source_addr_ton as u8);
        encode_u8(buf, self.source_addr_npi as u8);
        encode_cstring(buf, &self.source_addr, 21, "source_addr")?;
        encode_u8(buf, self.dest_addresses.len() as u8);
        for dest in &self.dest_addresses {
            dest.encode(buf)?;
        }
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

impl Decodable for SubmitMultiResp {
    fn command_id() -> CommandId {
        CommandId::SubmitMultiResp
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        let message_id = decode_cstring(buf, 65, "message_id")?;
        let no_unsuccess = decode_u8(buf)?;
        let mut unsuccess_smes = Vec::with_capacity(no_unsuccess as usize);
        for _ in 0..no_unsuccess {
            unsuccess_smes.push(UnsuccessSme {
                dest_addr_ton: decode_ton(buf, "dest_addr_ton")?,
                dest_addr_npi: decode_npi(buf, "dest_addr_npi")?,
                destination_addr: decode_cstring(buf, 21, "destination_addr")?,
                error_status_code: decode_u32(buf)?,
            });
        }
        Ok(SubmitMultiResp {
            message_id,
            unsuccess_smes,
        })
    }
}

impl Encodable for SubmitMultiResp {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.message_id, 65, "message_id")?;
        if self.unsuccess_smes.len() > 255 {
            return Err(CodecError::FieldValidation {
                field: "no_unsuccess",
                reason: format!(
                    "submit_multi_resp carries at most 255 failures, got {}",
                    self.unsuccess_smes.len()
                ),
            });
        }
        encode_u8(buf, self.unsuccess_smes.len() as u8);
        for sme in &self.unsuccess_smes {
            encode_u8(buf, sme.dest_addr_ton as u8);
            encode_u8(buf, sme.dest_addr_npi as u8);
            encode_cstring(buf, &sme.destination_addr, 21, "destination_addr")?;
            encode_u32(buf, sme.error_status_code);
        }
        Ok(())
    }
}
