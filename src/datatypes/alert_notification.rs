use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{
    decode_cstring, decode_npi, decode_ton, encode_cstring, encode_u8, CodecError, Decodable,
    Encodable,
};
use crate::datatypes::{CommandId, NumericPlanIndicator, Tlv, TypeOfNumber};

/// SMSC notification that a mobile subscriber has become available
/// (Section 4.12.1).
///
/// Sent to receiver-bound ESMEs that requested delivery pending flags. This
/// PDU has no response; the ms_availability_status optional parameter may
/// qualify the notification.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AlertNotification {
    pub source_addr_ton: TypeOfNumber,
    pub source_addr_npi: NumericPlanIndicator,
    /// Address of the now-available MS (max 64 chars).
    pub source_addr: String,
    pub esme_addr_ton: TypeOfNumber,
    pub esme_addr_npi: NumericPlanIndicator,
    /// Address of the ESME that requested the alert (max 64 chars).
    pub esme_addr: String,
    pub tlvs: Vec<Tlv>,
}

impl Decodable for AlertNotification {
    fn command_id() -> CommandId {
        CommandId::AlertNotification
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Self {
            source_addr_ton: decode_ton(buf, "source_addr_ton")?,
            source_addr_npi: decode_npi(buf, "source_addr_npi")?,
            source_addr: decode_cstring(buf, 65, "source_addr")?,
            esme_addr_ton: decode_ton(buf, "esme_addr_ton")?,
            esme_addr_npi: decode_npi(buf, "esme_addr_npi")?,
            esme_addr: decode_cstring(buf, 65, "esme_addr")?,
            tlvs: Tlv::decode_all(buf)?,
        })
    }
}

impl Encodable for AlertNotification {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_u8(buf, self.source_addr_ton as u8);
        encode_u8(buf, self.source_addr_npi as u8);
        encode_cstring(buf, &self.source_addr, 65, "source_addr")?;
        encode_u8(buf, self.esme_addr_ton as u8);
        encode_u8(buf, self.esme_addr_npi as u8);
        encode_cstring(buf, &self.esme_addr, 65, "esme_addr")?;
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
    fn alert_notification_roundtrip() {
        let alert = AlertNotification {
            source_addr_ton: TypeOfNumber::International,
            source_addr_npi: NumericPlanIndicator::Isdn,
            source_addr: "447700900123".to_string(),
            esme_addr: "ESME01".to_string(),
            tlvs: vec![Tlv::new(tags::MS_AVAILABILITY_STATUS, vec![0x00])],
            ..Default::default()
        };

        let mut buf = BytesMut::new();
        alert.encode_body(&mut buf).unwrap();

        let mut cursor = Cursor::new(buf.as_ref());
        assert_eq!(
            AlertNotification::decode_body(&mut cursor).unwrap(),
            alert
        );
    }
}
