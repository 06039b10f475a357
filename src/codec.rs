// SMPP v3.4 codec - separates the wire format from the session engine.
//
// Every PDU is a fixed 16-byte big-endian header followed by a
// command-specific body. Body codecs live with their PDU structs in
// `datatypes`; this module owns the header, the field-level helpers and the
// polymorphic `Pdu` sum the session engine works with.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::io::Cursor;
use thiserror::Error;

use crate::datatypes::{
    AlertNotification, BindReceiver, BindReceiverResp, BindTransceiver, BindTransceiverResp,
    BindTransmitter, BindTransmitterResp, CancelSm, CancelSmResp, CommandId, CommandStatus,
    DataSm, DataSmResp, DeliverSm, DeliverSmResp, EnquireLink, EnquireLinkResp, GenericNack,
    NumericPlanIndicator, Outbind, QuerySm, QuerySmResp, ReplaceSm, ReplaceSmResp, SubmitMulti,
    SubmitMultiResp, SubmitSm, SubmitSmResp, TypeOfNumber, Unbind, UnbindResp,
};

/// Maximum allowed PDU size to prevent memory exhaustion from a hostile or
/// broken peer
pub const MAX_PDU_SIZE: u32 = 65536; // 64KB

/// SMPP v3.4 PDU Header (16 bytes, common to all PDUs)
///
/// The status travels as the raw wire integer: the specification reserves
/// ranges for extensions and vendor codes, so the header itself never
/// constrains it. [`CommandStatus::from_code`] interprets it where a typed
/// view is wanted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduHeader {
    pub command_length: u32,
    pub command_id: CommandId,
    pub command_status: u32,
    pub sequence_number: u32,
}

impl PduHeader {
    pub const SIZE: usize = 16;

    /// Decode a PDU header from its 16 wire octets with length validation.
    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < Self::SIZE {
            return Err(CodecError::Incomplete);
        }
        let mut buf = Cursor::new(bytes);

        let command_length = buf.get_u32();
        if command_length < Self::SIZE as u32 || command_length > MAX_PDU_SIZE {
            return Err(CodecError::InvalidPduLength {
                length: command_length,
                min: Self::SIZE as u32,
                max: MAX_PDU_SIZE,
            });
        }

        let command_id_raw = buf.get_u32();
        let command_id = CommandId::try_from(command_id_raw)
            .map_err(|_| CodecError::InvalidCommandId(command_id_raw))?;

        let command_status = buf.get_u32();
        let sequence_number = buf.get_u32();

        Ok(PduHeader {
            command_length,
            command_id,
            command_status,
            sequence_number,
        })
    }

    /// Encode the header to the buffer.
    pub fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32(self.command_length);
        buf.put_u32(self.command_id as u32);
        buf.put_u32(self.command_status);
        buf.put_u32(self.sequence_number);
    }
}

/// Trait for PDU bodies that can be encoded to wire octets.
///
/// The header (status, sequence and the final length) is supplied by the
/// session engine at send time; implementations write body fields only.
pub trait Encodable {
    /// Encode the PDU body into the buffer.
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError>;

    /// Calculate the encoded body size without encoding.
    fn encoded_size(&self) -> usize {
        let mut buf = BytesMut::new();
        self.encode_body(&mut buf).map(|_| buf.len()).unwrap_or(0)
    }
}

/// Trait for PDU bodies that can be decoded from wire octets.
pub trait Decodable: Sized {
    /// The command_id this PDU type answers to.
    fn command_id() -> CommandId;

    /// Decode the PDU body (everything after the 16-byte header).
    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError>;
}

/// Codec errors with context for debugging
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Incomplete PDU: need more data")]
    Incomplete,

    #[error("Invalid command_id: {0:#x}")]
    InvalidCommandId(u32),

    #[error("Invalid PDU length: {length}, must be {min}-{max}")]
    InvalidPduLength { length: u32, min: u32, max: u32 },

    #[error("Field '{field}' validation failed: {reason}")]
    FieldValidation { field: &'static str, reason: String },

    #[error("UTF-8 decoding error in field '{field}': {source}")]
    Utf8Error {
        field: &'static str,
        #[source]
        source: std::string::FromUtf8Error,
    },
}

/// Decode a variable-length null-terminated C-octet string.
///
/// `max_len` bounds the field including its terminating NUL, per the field
/// sizes in the SMPP v3.4 PDU tables.
pub fn decode_cstring(
    buf: &mut Cursor<&[u8]>,
    max_len: usize,
    field: &'static str,
) -> Result<String, CodecError> {
    let start = buf.position() as usize;
    let data = *buf.get_ref();

    let nul = data[start..]
        .iter()
        .position(|&b| b == 0)
        .ok_or(CodecError::Incomplete)?;
    if nul + 1 > max_len {
        return Err(CodecError::FieldValidation {
            field,
            reason: format!("C-octet string of {} octets exceeds field size {max_len}", nul + 1),
        });
    }

    let value = String::from_utf8(data[start..start + nul].to_vec())
        .map_err(|e| CodecError::Utf8Error { field, source: e })?;
    buf.set_position((start + nul + 1) as u64);
    Ok(value)
}

/// Encode a null-terminated C-octet string, validating the field bound.
pub fn encode_cstring(
    buf: &mut BytesMut,
    value: &str,
    max_len: usize,
    field: &'static str,
) -> Result<(), CodecError> {
    if value.len() + 1 > max_len {
        return Err(CodecError::FieldValidation {
            field,
            reason: format!(
                "C-octet string of {} octets exceeds field size {max_len}",
                value.len() + 1
            ),
        });
    }
    buf.put_slice(value.as_bytes());
    buf.put_u8(0);
    Ok(())
}

/// Decode a fixed-length octet string (e.g. short_message payload).
pub fn decode_octets(
    buf: &mut Cursor<&[u8]>,
    len: usize,
    _field: &'static str,
) -> Result<Vec<u8>, CodecError> {
    if buf.remaining() < len {
        return Err(CodecError::Incomplete);
    }
    let mut octets = vec![0u8; len];
    buf.copy_to_slice(&mut octets);
    Ok(octets)
}

/// Decode a single byte
pub fn decode_u8(buf: &mut Cursor<&[u8]>) -> Result<u8, CodecError> {
    if buf.remaining() < 1 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u8())
}

/// Decode a 32-bit big-endian integer
pub fn decode_u32(buf: &mut Cursor<&[u8]>) -> Result<u32, CodecError> {
    if buf.remaining() < 4 {
        return Err(CodecError::Incomplete);
    }
    Ok(buf.get_u32())
}

/// Encode a single byte
pub fn encode_u8(buf: &mut BytesMut, value: u8) {
    buf.put_u8(value);
}

/// Encode a 32-bit big-endian integer
pub fn encode_u32(buf: &mut BytesMut, value: u32) {
    buf.put_u32(value);
}

/// Decode a type_of_number octet.
pub fn decode_ton(
    buf: &mut Cursor<&[u8]>,
    field: &'static str,
) -> Result<TypeOfNumber, CodecError> {
    let raw = decode_u8(buf)?;
    TypeOfNumber::try_from(raw).map_err(|_| CodecError::FieldValidation {
        field,
        reason: format!("unknown TON {raw:#04x}"),
    })
}

/// Decode a numbering_plan_indicator octet.
pub fn decode_npi(
    buf: &mut Cursor<&[u8]>,
    field: &'static str,
) -> Result<NumericPlanIndicator, CodecError> {
    let raw = decode_u8(buf)?;
    NumericPlanIndicator::try_from(raw).map_err(|_| CodecError::FieldValidation {
        field,
        reason: format!("unknown NPI {raw:#04x}"),
    })
}

/// The polymorphic PDU the session engine frames, dispatches and sends.
///
/// Large bodies are boxed so the enum stays cheap to move through the
/// dispatch path.
#[derive(Clone, Debug, PartialEq)]
pub enum Pdu {
    // Bind family
    BindTransmitter(BindTransmitter),
    BindTransmitterResp(BindTransmitterResp),
    BindReceiver(BindReceiver),
    BindReceiverResp(BindReceiverResp),
    BindTransceiver(BindTransceiver),
    BindTransceiverResp(BindTransceiverResp),
    Outbind(Outbind),

    // Session management
    Unbind(Unbind),
    UnbindResp(UnbindResp),
    EnquireLink(EnquireLink),
    EnquireLinkResp(EnquireLinkResp),
    GenericNack(GenericNack),

    // Message submission and delivery
    SubmitSm(Box<SubmitSm>),
    SubmitSmResp(SubmitSmResp),
    SubmitMulti(Box<SubmitMulti>),
    SubmitMultiResp(SubmitMultiResp),
    DeliverSm(Box<DeliverSm>),
    DeliverSmResp(DeliverSmResp),
    DataSm(Box<DataSm>),
    DataSmResp(DataSmResp),

    // Message management
    QuerySm(QuerySm),
    QuerySmResp(QuerySmResp),
    CancelSm(CancelSm),
    CancelSmResp(CancelSmResp),
    ReplaceSm(Box<ReplaceSm>),
    ReplaceSmResp(ReplaceSmResp),

    // Notifications
    AlertNotification(AlertNotification),
}

impl Pdu {
    /// Get the command_id for this PDU
    pub fn command_id(&self) -> CommandId {
        match self {
            Pdu::BindTransmitter(_) => CommandId::BindTransmitter,
            Pdu::BindTransmitterResp(_) => CommandId::BindTransmitterResp,
            Pdu::BindReceiver(_) => CommandId::BindReceiver,
            Pdu::BindReceiverResp(_) => CommandId::BindReceiverResp,
            Pdu::BindTransceiver(_) => CommandId::BindTransceiver,
            Pdu::BindTransceiverResp(_) => CommandId::BindTransceiverResp,
            Pdu::Outbind(_) => CommandId::Outbind,
            Pdu::Unbind(_) => CommandId::Unbind,
            Pdu::UnbindResp(_) => CommandId::UnbindResp,
            Pdu::EnquireLink(_) => CommandId::EnquireLink,
            Pdu::EnquireLinkResp(_) => CommandId::EnquireLinkResp,
            Pdu::GenericNack(_) => CommandId::GenericNack,
            Pdu::SubmitSm(_) => CommandId::SubmitSm,
            Pdu::SubmitSmResp(_) => CommandId::SubmitSmResp,
            Pdu::SubmitMulti(_) => CommandId::SubmitMulti,
            Pdu::SubmitMultiResp(_) => CommandId::SubmitMultiResp,
            Pdu::DeliverSm(_) => CommandId::DeliverSm,
            Pdu::DeliverSmResp(_) => CommandId::DeliverSmResp,
            Pdu::DataSm(_) => CommandId::DataSm,
            Pdu::DataSmResp(_) => CommandId::DataSmResp,
            Pdu::QuerySm(_) => CommandId::QuerySm,
            Pdu::QuerySmResp(_) => CommandId::QuerySmResp,
            Pdu::CancelSm(_) => CommandId::CancelSm,
            Pdu::CancelSmResp(_) => CommandId::CancelSmResp,
            Pdu::ReplaceSm(_) => CommandId::ReplaceSm,
            Pdu::ReplaceSmResp(_) => CommandId::ReplaceSmResp,
            Pdu::AlertNotification(_) => CommandId::AlertNotification,
        }
    }

    /// Check if this PDU is a request
    pub fn is_request(&self) -> bool {
        self.command_id().is_request()
    }

    /// Check if this PDU is a response
    pub fn is_response(&self) -> bool {
        self.command_id().is_response()
    }

    /// The peer identity carried by bind-family PDUs; the session snapshots
    /// it when the first bind arrives.
    pub fn system_id(&self) -> Option<&str> {
        match self {
            Pdu::BindTransmitter(p) => Some(&p.system_id),
            Pdu::BindReceiver(p) => Some(&p.system_id),
            Pdu::BindTransceiver(p) => Some(&p.system_id),
            Pdu::Outbind(p) => Some(&p.system_id),
            _ => None,
        }
    }

    /// Decode a PDU body for a previously decoded header. The cursor must
    /// span exactly `command_length - 16` octets.
    pub fn decode_body(header: &PduHeader, buf: &mut Cursor<&[u8]>) -> Result<Pdu, CodecError> {
        Ok(match header.command_id {
            CommandId::BindTransmitter => {
                Pdu::BindTransmitter(BindTransmitter::decode_body(buf)?)
            }
            CommandId::BindTransmitterResp => {
                Pdu::BindTransmitterResp(BindTransmitterResp::decode_body(buf)?)
            }
            CommandId::BindReceiver => Pdu::BindReceiver(BindReceiver::decode_body(buf)?),
            CommandId::BindReceiverResp => {
                Pdu::BindReceiverResp(BindReceiverResp::decode_body(buf)?)
            }
            CommandId::BindTransceiver => {
                Pdu::BindTransceiver(BindTransceiver::decode_body(buf)?)
            }
            CommandId::BindTransceiverResp => {
                Pdu::BindTransceiverResp(BindTransceiverResp::decode_body(buf)?)
            }
            CommandId::Outbind => Pdu::Outbind(Outbind::decode_body(buf)?),
            CommandId::Unbind => Pdu::Unbind(Unbind::decode_body(buf)?),
            CommandId::UnbindResp => Pdu::UnbindResp(UnbindResp::decode_body(buf)?),
            CommandId::EnquireLink => Pdu::EnquireLink(EnquireLink::decode_body(buf)?),
            CommandId::EnquireLinkResp => {
                Pdu::EnquireLinkResp(EnquireLinkResp::decode_body(buf)?)
            }
            CommandId::GenericNack => Pdu::GenericNack(GenericNack::decode_body(buf)?),
            CommandId::SubmitSm => Pdu::SubmitSm(Box::new(SubmitSm::decode_body(buf)?)),
            CommandId::SubmitSmResp => Pdu::SubmitSmResp(SubmitSmResp::decode_body(buf)?),
            CommandId::SubmitMulti => Pdu::SubmitMulti(Box::new(SubmitMulti::decode_body(buf)?)),
            CommandId::SubmitMultiResp => {
                Pdu::SubmitMultiResp(SubmitMultiResp::decode_body(buf)?)
            }
            CommandId::DeliverSm => Pdu::DeliverSm(Box::new(DeliverSm::decode_body(buf)?)),
            CommandId::DeliverSmResp => Pdu::DeliverSmResp(DeliverSmResp::decode_body(buf)?),
            CommandId::DataSm => Pdu::DataSm(Box::new(DataSm::decode_body(buf)?)),
            CommandId::DataSmResp => Pdu::DataSmResp(DataSmResp::decode_body(buf)?),
            CommandId::QuerySm => Pdu::QuerySm(QuerySm::decode_body(buf)?),
            CommandId::QuerySmResp => Pdu::QuerySmResp(QuerySmResp::decode_body(buf)?),
            CommandId::CancelSm => Pdu::CancelSm(CancelSm::decode_body(buf)?),
            CommandId::CancelSmResp => Pdu::CancelSmResp(CancelSmResp::decode_body(buf)?),
            CommandId::ReplaceSm => Pdu::ReplaceSm(Box::new(ReplaceSm::decode_body(buf)?)),
            CommandId::ReplaceSmResp => Pdu::ReplaceSmResp(ReplaceSmResp::decode_body(buf)?),
            CommandId::AlertNotification => {
                Pdu::AlertNotification(AlertNotification::decode_body(buf)?)
            }
        })
    }

    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        match self {
            Pdu::BindTransmitter(p) => p.encode_body(buf),
            Pdu::BindTransmitterResp(p) => p.encode_body(buf),
            Pdu::BindReceiver(p) => p.encode_body(buf),
            Pdu::BindReceiverResp(p) => p.encode_body(buf),
            Pdu::BindTransceiver(p) => p.encode_body(buf),
            Pdu::BindTransceiverResp(p) => p.encode_body(buf),
            Pdu::Outbind(p) => p.encode_body(buf),
            Pdu::Unbind(p) => p.encode_body(buf),
            Pdu::UnbindResp(p) => p.encode_body(buf),
            Pdu::EnquireLink(p) => p.encode_body(buf),
            Pdu::EnquireLinkResp(p) => p.encode_body(buf),
            Pdu::GenericNack(p) => p.encode_body(buf),
            Pdu::SubmitSm(p) => p.encode_body(buf),
            Pdu::SubmitSmResp(p) => p.encode_body(buf),
            Pdu::SubmitMulti(p) => p.encode_body(buf),
            Pdu::SubmitMultiResp(p) => p.encode_body(buf),
            Pdu::DeliverSm(p) => p.encode_body(buf),
            Pdu::DeliverSmResp(p) => p.encode_body(buf),
            Pdu::DataSm(p) => p.encode_body(buf),
            Pdu::DataSmResp(p) => p.encode_body(buf),
            Pdu::QuerySm(p) => p.encode_body(buf),
            Pdu::QuerySmResp(p) => p.encode_body(buf),
            Pdu::CancelSm(p) => p.encode_body(buf),
            Pdu::CancelSmResp(p) => p.encode_body(buf),
            Pdu::ReplaceSm(p) => p.encode_body(buf),
            Pdu::ReplaceSmResp(p) => p.encode_body(buf),
            Pdu::AlertNotification(p) => p.encode_body(buf),
        }
    }

    /// Encode the full frame: header with the given status and sequence,
    /// body, and the command_length fixed up once the body size is known.
    pub fn to_bytes(
        &self,
        status: CommandStatus,
        sequence_number: u32,
    ) -> Result<Bytes, CodecError> {
        let mut buf = BytesMut::with_capacity(64);

        // Write a placeholder length that is replaced once the body is in.
        buf.put_u32(0);
        buf.put_u32(self.command_id() as u32);
        buf.put_u32(status.code());
        buf.put_u32(sequence_number);

        self.encode_body(&mut buf)?;

        if buf.len() > MAX_PDU_SIZE as usize {
            return Err(CodecError::InvalidPduLength {
                length: buf.len() as u32,
                min: PduHeader::SIZE as u32,
                max: MAX_PDU_SIZE,
            });
        }

        let length = buf.len() as u32;
        buf[0..4].copy_from_slice(&length.to_be_bytes());

        Ok(buf.freeze())
    }
}
