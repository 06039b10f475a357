// ABOUTME: This module provides macros to reduce boilerplate in SMPP PDU implementations
// ABOUTME: Includes the codec implementation for PDUs that carry no body

/// Macro for implementing codec traits on body-less PDUs.
///
/// Several SMPP operations (enquire_link, unbind, generic_nack, ...) consist
/// of the 16-byte header alone. This macro generates the complete
/// `Encodable`/`Decodable` implementations for such PDUs.
///
/// # Arguments
/// * `$pdu_type` - The PDU struct name (e.g., EnquireLink)
/// * `$command_id` - The CommandId variant (e.g., CommandId::EnquireLink)
macro_rules! impl_body_less_pdu {
    ($pdu_type:ident, $command_id:expr) => {
        impl $crate::codec::Decodable for $pdu_type {
            fn command_id() -> $crate::datatypes::CommandId {
                $command_id
            }

            fn decode_body(
                buf: &mut std::io::Cursor<&[u8]>,
            ) -> Result<Self, $crate::codec::CodecError> {
                use bytes::Buf;

                if buf.has_remaining() {
                    return Err($crate::codec::CodecError::FieldValidation {
                        field: concat!(stringify!($pdu_type), "_body"),
                        reason: concat!(stringify!($pdu_type), " PDU should have no body")
                            .to_string(),
                    });
                }

                Ok($pdu_type::default())
            }
        }

        impl $crate::codec::Encodable for $pdu_type {
            fn encode_body(
                &self,
                _buf: &mut bytes::BytesMut,
            ) -> Result<(), $crate::codec::CodecError> {
                Ok(())
            }

            fn encoded_size(&self) -> usize {
                0
            }
        }
    };
}

pub(crate) use impl_body_less_pdu;
