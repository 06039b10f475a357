// ABOUTME: Bind family PDUs: bind_transmitter/receiver/transceiver, their responses and outbind
// ABOUTME: All three bind operations share the same body layout per Section 4.1.1

use bytes::BytesMut;
use std::io::Cursor;

use crate::codec::{
    decode_cstring, decode_npi, decode_ton, decode_u8, encode_cstring, encode_u8, CodecError,
    Decodable, Encodable,
};
use crate::datatypes::{CommandId, InterfaceVersion, NumericPlanIndicator, Tlv, TypeOfNumber};

fn decode_interface_version(buf: &mut Cursor<&[u8]>) -> Result<InterfaceVersion, CodecError> {
    let raw = decode_u8(buf)?;
    match raw {
        0x34 => Ok(InterfaceVersion::SmppV34),
        // Anything below 0x34 advertises version 3.3 or earlier.
        v if v <= 0x33 => Ok(InterfaceVersion::SmppV33),
        v => Err(CodecError::FieldValidation {
            field: "interface_version",
            reason: format!("unsupported interface_version {v:#04x}"),
        }),
    }
}

macro_rules! declare_bind_pdu {
    ($(#[$doc:meta])* $req:ident, $resp:ident, $req_id:expr, $resp_id:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct $req {
            /// Identifies the ESME requesting to bind (max 15 chars).
            pub system_id: String,
            /// Password used to authenticate the ESME (max 8 chars).
            pub password: String,
            /// Categorizes the type of ESME binding (max 12 chars).
            pub system_type: String,
            /// SMPP version supported by the ESME.
            pub interface_version: InterfaceVersion,
            pub addr_ton: TypeOfNumber,
            pub addr_npi: NumericPlanIndicator,
            /// ESME address range served by this session (UNIX regex, max 40
            /// chars). Only meaningful for receiver-capable binds.
            pub address_range: String,
        }

        impl $req {
            /// The response PDU acknowledging this bind request.
            pub fn response(&self, system_id: impl Into<String>) -> $resp {
                $resp {
                    system_id: system_id.into(),
                    tlvs: Vec::new(),
                }
            }
        }

        impl Decodable for $req {
            fn command_id() -> CommandId {
                $req_id
            }

            fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
                Ok(Self {
                    system_id: decode_cstring(buf, 16, "system_id")?,
                    password: decode_cstring(buf, 9, "password")?,
                    system_type: decode_cstring(buf, 13, "system_type")?,
                    interface_version: decode_interface_version(buf)?,
                    addr_ton: decode_ton(buf, "addr_ton")?,
                    addr_npi: decode_npi(buf, "addr_npi")?,
                    address_range: decode_cstring(buf, 41, "address_range")?,
                })
            }
        }

        impl Encodable for $req {
            fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
                encode_cstring(buf, &self.system_id, 16, "system_id")?;
                encode_cstring(buf, &self.password, 9, "password")?;
                encode_cstring(buf, &self.system_type, 13, "system_type")?;
                encode_u8(buf, self.interface_version as u8);
                encode_u8(buf, self.addr_ton as u8);
                encode_u8(buf, self.addr_npi as u8);
                encode_cstring(buf, &self.address_range, 41, "address_range")?;
                Ok(())
            }
        }

        /// Response carrying the SMSC identifier (Section 4.1.2).
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct $resp {
            /// Identifies the SMSC that accepted the bind (max 15 chars).
            pub system_id: String,
            /// Optional parameters (e.g. sc_interface_version).
            pub tlvs: Vec<Tlv>,
        }

        impl Decodable for $resp {
            fn command_id() -> CommandId {
                $resp_id
            }

            fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
                Ok(Self {
                    system_id: decode_cstring(buf, 16, "system_id")?,
                    tlvs: Tlv::decode_all(buf)?,
                })
            }
        }

        impl Encodable for $resp {
            fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
                encode_cstring(buf, &self.system_id, 16, "system_id")?;
                for tlv in &self.tlvs {
                    tlv.encode(buf)?;
                }
                Ok(())
            }
        }
    };
}

declare_bind_pdu!(
    /// Bind as a transmitter: the ESME may submit short messages and query,
    /// cancel or replace previous submissions (Section 4.1.1).
    BindTransmitter,
    BindTransmitterResp,
    CommandId::BindTransmitter,
    CommandId::BindTransmitterResp
);

declare_bind_pdu!(
    /// Bind as a receiver: the SMSC may deliver short messages and alert
    /// notifications to the ESME (Section 4.1.1).
    BindReceiver,
    BindReceiverResp,
    CommandId::BindReceiver,
    CommandId::BindReceiverResp
);

declare_bind_pdu!(
    /// Bind as a transceiver: transmitter and receiver capabilities over a
    /// single session (Section 4.2.5).
    BindTransceiver,
    BindTransceiverResp,
    CommandId::BindTransceiver,
    CommandId::BindTransceiverResp
);

/// SMSC request asking the ESME to originate a bind_receiver (Section 4.1.4).
///
/// Sent by the SMSC on a connection it dialed itself; it does not change the
/// session state, which remains Open until the ESME binds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outbind {
    pub system_id: String,
    pub password: String,
}

impl Decodable for Outbind {
    fn command_id() -> CommandId {
        CommandId::Outbind
    }

    fn decode_body(buf: &mut Cursor<&[u8]>) -> Result<Self, CodecError> {
        Ok(Self {
            system_id: decode_cstring(buf, 16, "system_id")?,
            password: decode_cstring(buf, 9, "password")?,
        })
    }
}

impl Encodable for Outbind {
    fn encode_body(&self, buf: &mut BytesMut) -> Result<(), CodecError> {
        encode_cstring(buf, &self.system_id, 16, "system_id")?;
        encode_cstring(buf, &self.password, 9, "password")?;
        Ok(())
    }
}
