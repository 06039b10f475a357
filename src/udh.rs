// ABOUTME: User Data Header codec: information elements and concatenation metadata
// ABOUTME: Implements the 8-bit and 16-bit concatenated-SM reference schemes of 3GPP 23.040

use thiserror::Error;

/// IEI for concatenated short messages with an 8-bit reference number.
pub const CONCATENATED_SM_8BIT_REF: u8 = 0x00;
/// IEI for concatenated short messages with a 16-bit reference number.
pub const CONCATENATED_SM_16BIT_REF: u8 = 0x08;

/// Concatenation metadata of one segment of a multi-part message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiPartData {
    /// Concatenation reference number shared by all segments.
    pub reference: u16,
    /// Total number of segments.
    pub total: u8,
    /// Sequence number of this segment, starting at 1.
    pub sequence: u8,
}

impl Default for MultiPartData {
    fn default() -> Self {
        // A message with no concatenation element is its own single segment.
        Self {
            reference: 0,
            total: 1,
            sequence: 1,
        }
    }
}

/// One information element of a user data header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InformationElement {
    /// Information Element Identifier.
    pub id: u8,
    /// Information element data; its length is written on the wire as the
    /// IEDL octet.
    pub data: Vec<u8>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UdhError {
    #[error("user_data_header IEDL is bigger than available buf")]
    ElementOverflow,
    #[error("MultiPartData length in UDH is invalid")]
    InvalidConcatLength,
}

/// A User Data Header: the ordered set of information elements carried at
/// the front of a `short_message` when the UDHI bit of esm_class is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDataHeader {
    elements: Vec<InformationElement>,
}

impl UserDataHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the header carries any information elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The information elements in insertion order.
    pub fn elements(&self) -> &[InformationElement] {
        &self.elements
    }

    /// Data of the element with the given IEI, if present.
    pub fn get(&self, id: u8) -> Option<&[u8]> {
        self.elements
            .iter()
            .find(|ie| ie.id == id)
            .map(|ie| ie.data.as_slice())
    }

    /// Insert an element, replacing any existing element with the same IEI
    /// while keeping its position.
    pub fn insert(&mut self, id: u8, data: Vec<u8>) {
        match self.elements.iter_mut().find(|ie| ie.id == id) {
            Some(existing) => existing.data = data,
            None => self.elements.push(InformationElement { id, data }),
        }
    }

    /// Serialize to wire octets: `[iei, length, data]` per element, in
    /// insertion order. The leading UDHL octet is not included; callers
    /// prepend it when assembling a short_message.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.elements.iter().map(|ie| 2 + ie.data.len()).sum());
        for ie in &self.elements {
            buf.push(ie.id);
            buf.push(ie.data.len() as u8);
            buf.extend_from_slice(&ie.data);
        }
        buf
    }

    /// Deserialize from wire octets (without the leading UDHL octet).
    ///
    /// Each element's declared length must fit the remaining buffer, and
    /// concatenation elements must carry exactly 3 (8-bit reference) or 4
    /// (16-bit reference) data octets.
    pub fn deserialize(buf: &[u8]) -> Result<Self, UdhError> {
        let mut udh = UserDataHeader::new();
        let mut rest = buf;

        while rest.len() >= 2 {
            let iei = rest[0];
            let iedl = rest[1] as usize;
            if iedl > rest.len() - 2 {
                return Err(UdhError::ElementOverflow);
            }

            let data = &rest[2..2 + iedl];
            if (iei == CONCATENATED_SM_8BIT_REF && data.len() != 3)
                || (iei == CONCATENATED_SM_16BIT_REF && data.len() != 4)
            {
                return Err(UdhError::InvalidConcatLength);
            }

            udh.insert(iei, data.to_vec());
            rest = &rest[2 + iedl..];
        }

        Ok(udh)
    }

    /// Store concatenation metadata, choosing the 8-bit or 16-bit reference
    /// element by the width of the reference number.
    pub fn set_multipart_data(&mut self, mpd: MultiPartData) {
        if mpd.reference > 0xFF {
            self.insert(
                CONCATENATED_SM_16BIT_REF,
                vec![
                    (mpd.reference >> 8) as u8,
                    (mpd.reference & 0xFF) as u8,
                    mpd.total,
                    mpd.sequence,
                ],
            );
        } else {
            self.insert(
                CONCATENATED_SM_8BIT_REF,
                vec![mpd.reference as u8, mpd.total, mpd.sequence],
            );
        }
    }

    /// Concatenation metadata of this header. Prefers the 8-bit reference
    /// element, falls back to the 16-bit one, and defaults to a single
    /// segment when neither is present.
    pub fn multipart_data(&self) -> MultiPartData {
        if let Some(data) = self.get(CONCATENATED_SM_8BIT_REF) {
            return MultiPartData {
                reference: data[0] as u16,
                total: data[1],
                sequence: data[2],
            };
        }
        if let Some(data) = self.get(CONCATENATED_SM_16BIT_REF) {
            return MultiPartData {
                reference: ((data[0] as u16) << 8) | data[1] as u16,
                total: data[2],
                sequence: data[3],
            };
        }
        MultiPartData::default()
    }
}
