// ABOUTME: short_message field assembly: UDHL-prefixed headers and data_coding classification
// ABOUTME: Applies the 160/140 octet field limits by coding group

use thiserror::Error;

use crate::udh::{UdhError, UserDataHeader};

/// Coding family extracted from the GSM 03.38 data_coding octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCodingType {
    Ascii7Bit,
    Ascii8Bit,
    Binary,
    Ucs2,
}

const CODING_GROUP_BITS_MASK: u8 = 0xF0;
const ALPHABET_MASK: u8 = 0x0C;
const DATA_CODING_MASK: u8 = 0x0F;

const GENERAL_DATA_CODING_0: u8 = 0x00;
const GENERAL_DATA_CODING_1: u8 = 0x10;
const GENERAL_DATA_CODING_2: u8 = 0x20;
const GENERAL_DATA_CODING_3: u8 = 0x30;
const AUTOMATIC_DELETION_0: u8 = 0x40;
const AUTOMATIC_DELETION_1: u8 = 0x50;
const AUTOMATIC_DELETION_2: u8 = 0x60;
const AUTOMATIC_DELETION_3: u8 = 0x70;
const RESERVED_GROUP_0: u8 = 0x80;
const RESERVED_GROUP_1: u8 = 0x90;
const RESERVED_GROUP_2: u8 = 0xA0;
const RESERVED_GROUP_3: u8 = 0xB0;
const MWI_GROUP_DISCARD: u8 = 0xC0;
const MWI_GROUP_STORE_1: u8 = 0xD0;
const MWI_GROUP_STORE_2: u8 = 0xE0;
const DATA_CODING_MESSAGE_CLASS: u8 = 0xF0;

const ALPHABET_8BIT_DATA: u8 = 0x04;
const ALPHABET_UCS2: u8 = 0x08;

/// Classify a data_coding octet into its coding family per GSM 03.38
/// Section 4.
pub fn extract_coding(data_coding: u8) -> DataCodingType {
    match data_coding & CODING_GROUP_BITS_MASK {
        GENERAL_DATA_CODING_0 => match data_coding & DATA_CODING_MASK {
            0x00 | 0x01 | 0x03 | 0x05 | 0x06 | 0x07 | 0x0B | 0x0C | 0x0D | 0x0E | 0x0F => {
                DataCodingType::Ascii8Bit
            }
            0x02 | 0x04 | 0x09 | 0x0A => DataCodingType::Binary,
            0x08 => DataCodingType::Ucs2,
            _ => DataCodingType::Ascii7Bit,
        },
        GENERAL_DATA_CODING_1 | GENERAL_DATA_CODING_2 | GENERAL_DATA_CODING_3
        | AUTOMATIC_DELETION_0 | AUTOMATIC_DELETION_1 | AUTOMATIC_DELETION_2
        | AUTOMATIC_DELETION_3 => match data_coding & ALPHABET_MASK {
            ALPHABET_8BIT_DATA => DataCodingType::Binary,
            ALPHABET_UCS2 => DataCodingType::Ucs2,
            _ => DataCodingType::Ascii7Bit,
        },
        RESERVED_GROUP_0 | RESERVED_GROUP_1 | RESERVED_GROUP_2 | RESERVED_GROUP_3
        | MWI_GROUP_DISCARD | MWI_GROUP_STORE_1 => DataCodingType::Ascii7Bit,
        MWI_GROUP_STORE_2 => DataCodingType::Ucs2,
        DATA_CODING_MESSAGE_CLASS => {
            // Bit 2 selects the message coding: default alphabet or 8-bit.
            if data_coding & 0x04 != 0 {
                DataCodingType::Binary
            } else {
                DataCodingType::Ascii7Bit
            }
        }
        _ => DataCodingType::Ascii7Bit,
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShortMessageError {
    #[error("short_message length is larger than {limit}")]
    TooLong { limit: usize },
    #[error("UDH length is larger than short_message")]
    UdhOverflow,
    #[error(transparent)]
    Udh(#[from] UdhError),
}

fn field_limit(data_coding: u8) -> usize {
    // 8-bit ASCII content may fill the whole 160-octet field; every other
    // coding is limited to 140 octets.
    if extract_coding(data_coding) == DataCodingType::Ascii8Bit {
        160
    } else {
        140
    }
}

/// Assemble a short_message field: UDHL octet and serialized UDH (when any
/// elements are present) followed by the body, validated against the field
/// limit for this data_coding.
pub fn pack_short_message(
    udh: &UserDataHeader,
    body: &[u8],
    data_coding: u8,
) -> Result<Vec<u8>, ShortMessageError> {
    let serialized = udh.serialize();
    let mut short_message = Vec::with_capacity(1 + serialized.len() + body.len());
    if !serialized.is_empty() {
        short_message.push(serialized.len() as u8);
        short_message.extend_from_slice(&serialized);
    }
    short_message.extend_from_slice(body);

    let limit = field_limit(data_coding);
    if short_message.len() > limit {
        return Err(ShortMessageError::TooLong { limit });
    }
    Ok(short_message)
}

/// Split a received short_message field into its user data header and body.
///
/// The first octet is the UDHL; callers check the UDHI bit of esm_class
/// before calling this.
pub fn unpack_short_message(
    data_coding: u8,
    short_message: &[u8],
) -> Result<(UserDataHeader, Vec<u8>), ShortMessageError> {
    let limit = field_limit(data_coding);
    if short_message.len() > limit {
        return Err(ShortMessageError::TooLong { limit });
    }

    let udhl = short_message.first().copied().unwrap_or(0) as usize;
    if udhl >= short_message.len() {
        return Err(ShortMessageError::UdhOverflow);
    }

    let udh = UserDataHeader::deserialize(&short_message[1..1 + udhl])?;
    Ok((udh, short_message[1 + udhl..].to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::udh::MultiPartData;

    #[test]
    fn coding_groups() {
        assert_eq!(extract_coding(0x00), DataCodingType::Ascii8Bit);
        assert_eq!(extract_coding(0x04), DataCodingType::Binary);
        assert_eq!(extract_coding(0x08), DataCodingType::Ucs2);
        assert_eq!(extract_coding(0x18), DataCodingType::Ucs2);
        assert_eq!(extract_coding(0x44), DataCodingType::Binary);
        assert_eq!(extract_coding(0xE0), DataCodingType::Ucs2);
        assert_eq!(extract_coding(0xF4), DataCodingType::Binary);
        assert_eq!(extract_coding(0xF0), DataCodingType::Ascii7Bit);
    }

    #[test]
    fn pack_unpack_roundtrip() {
        let mut udh = UserDataHeader::new();
        udh.set_multipart_data(MultiPartData {
            reference: 7,
            total: 2,
            sequence: 1,
        });
        let body = b"segment one";

        let field = pack_short_message(&udh, body, 0x08).unwrap();
        assert_eq!(field[0], 5); // UDHL

        let (decoded_udh, decoded_body) = unpack_short_message(0x08, &field).unwrap();
        assert_eq!(decoded_udh, udh);
        assert_eq!(decoded_body, body);
    }

    #[test]
    fn pack_without_udh_has_no_length_octet() {
        let field = pack_short_message(&UserDataHeader::new(), b"plain", 0x00).unwrap();
        assert_eq!(field, b"plain");
    }

    #[test]
    fn field_limits_by_coding() {
        let body_150 = vec![b'a'; 150];
        // 8-bit ASCII allows up to 160 octets.
        assert!(pack_short_message(&UserDataHeader::new(), &body_150, 0x00).is_ok());
        // UCS-2 limits the field to 140 octets.
        assert_eq!(
            pack_short_message(&UserDataHeader::new(), &body_150, 0x08),
            Err(ShortMessageError::TooLong { limit: 140 })
        );
    }

    #[test]
    fn unpack_rejects_udhl_overflow() {
        let field = [0x20, 0x00, 0x03];
        assert_eq!(
            unpack_short_message(0x00, &field),
            Err(ShortMessageError::UdhOverflow)
        );
    }
}
