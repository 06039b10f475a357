use bytes::{Buf, BufMut, BytesMut};
use std::io::Cursor;

use crate::codec::CodecError;

/// Standard TLV tag constants per SMPP v3.4 specification
pub mod tags {
    pub const USER_MESSAGE_REFERENCE: u16 = 0x0204;
    pub const SOURCE_PORT: u16 = 0x020A;
    pub const DESTINATION_PORT: u16 = 0x020B;
    pub const SAR_MSG_REF_NUM: u16 = 0x020C;
    pub const SAR_TOTAL_SEGMENTS: u16 = 0x020E;
    pub const SAR_SEGMENT_SEQNUM: u16 = 0x020F;
    pub const SC_INTERFACE_VERSION: u16 = 0x0210;
    pub const MORE_MESSAGES_TO_SEND: u16 = 0x0426;
    pub const PAYLOAD_TYPE: u16 = 0x0019;
    pub const MESSAGE_PAYLOAD: u16 = 0x0424;
    pub const PRIVACY_INDICATOR: u16 = 0x0201;
    pub const CALLBACK_NUM: u16 = 0x0381;
    pub const NETWORK_ERROR_CODE: u16 = 0x0423;
    pub const DELIVERY_FAILURE_REASON: u16 = 0x0425;
    pub const MS_AVAILABILITY_STATUS: u16 = 0x0422;
    pub const RECEIPTED_MESSAGE_ID: u16 = 0x001E;
    pub const MESSAGE_STATE: u16 = 0x0427;
}

/// An SMPP optional parameter in Tag-Length-Value form (Section 5.3.1).
///
/// The session layer carries TLVs opaquely; interpreting a particular tag is
/// the application's concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    /// The Tag field uniquely identifies the optional parameter.
    pub tag: u16,
    /// The Value field holds the parameter data; its length is written on
    /// the wire as a 2-octet field.
    pub value: Vec<u8>,
}

impl Tlv {
    pub fn new(tag: u16, value: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }

    pub fn encode(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        if self.value.len() > u16::MAX as usize {
            return Err(CodecError::FieldValidation {
                field: "tlv_value",
                reason: format!("TLV value length {} exceeds u16", self.value.len()),
            });
        }
        buf.put_u16(self.tag);
        buf.put_u16(self.value.len() as u16);
        buf.extend_from_slice(&self.value);
        Ok(())
    }

    pub fn decode(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        if buf.remaining() < 4 {
            return Err(CodecError::Incomplete);
        }
        let tag = buf.get_u16();
        let length = buf.get_u16();
        if buf.remaining() < length as usize {
            return Err(CodecError::Incomplete);
        }
        let mut value = vec![0u8; length as usize];
        buf.copy_to_slice(&mut value);
        Ok(Self { tag, value })
    }

    /// Decode all TLVs remaining in the buffer (the optional-parameter tail
    /// of a PDU body).
    pub fn decode_all(buf: &mut Cursor<&[u8]>) -> Result<Vec<Tlv>, CodecError> {
        let mut tlvs = Vec::new();
        while buf.has_remaining() {
            tlvs.push(Tlv::decode(buf)?);
        }
        Ok(tlvs)
    }

    pub fn encoded_size(&self) -> usize {
        4 + self.value.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tlv_roundtrip() {
        let tlv = Tlv::new(tags::USER_MESSAGE_REFERENCE, vec![0x01, 0x02]);

        let mut buf = BytesMut::new();
        tlv.encode(&mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0x02, 0x04, 0x00, 0x02, 0x01, 0x02]);

        let mut cursor = Cursor::new(buf.as_ref());
        let decoded = Tlv::decode(&mut cursor).unwrap();
        assert_eq!(decoded, tlv);
    }

    #[test]
    fn tlv_truncated_value() {
        let data: &[u8] = &[0x02, 0x04, 0x00, 0x05, 0x01];
        let mut cursor = Cursor::new(data);
        assert!(matches!(
            Tlv::decode(&mut cursor),
            Err(CodecError::Incomplete)
        ));
    }

    #[test]
    fn tlv_decode_all_tail() {
        let mut buf = BytesMut::new();
        Tlv::new(tags::SAR_MSG_REF_NUM, vec![0x00, 0x2A])
            .encode(&mut buf)
            .unwrap();
        Tlv::new(tags::SAR_TOTAL_SEGMENTS, vec![0x03])
            .encode(&mut buf)
            .unwrap();

        let mut cursor = Cursor::new(buf.as_ref());
        let tlvs = Tlv::decode_all(&mut cursor).unwrap();
        assert_eq!(tlvs.len(), 2);
        assert_eq!(tlvs[1].tag, tags::SAR_TOTAL_SEGMENTS);
    }
}
