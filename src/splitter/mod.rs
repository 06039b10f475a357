// ABOUTME: SMS segmentation engine: coding detection, GSM-7 packing and UCS-2 splitting
// ABOUTME: Produces ready-to-send short_message payloads with concatenation UDHs

use rand::Rng;
use thiserror::Error;

mod gsm7;

use gsm7::{default_septet, extension_septet, ESCAPE};

/// Septet capacity of an unsegmented GSM-7 message.
pub const GSM7_SINGLE_SEGMENT_SEPTETS: usize = 160;
/// Septet capacity of one GSM-7 segment once the 6-octet UDH is in place.
pub const GSM7_SEGMENT_SEPTETS: usize = 153;
/// Octet capacity of an unsegmented UCS-2 message.
pub const UCS2_SINGLE_SEGMENT_OCTETS: usize = 140;
/// Code points per UCS-2 segment once the 6-octet UDH is in place.
pub const UCS2_SEGMENT_CHARS: usize = 67;

/// Data coding scheme selected for a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum DataCoding {
    /// GSM 7-bit default alphabet.
    #[default]
    Gsm7 = 0x00,
    /// UCS-2, big-endian on the wire.
    Ucs2 = 0x08,
}

impl DataCoding {
    /// The data_coding octet announcing this scheme in a submit_sm.
    pub fn octet(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("empty message")]
    EmptyMessage,
    #[error("invalid UDH length, expected 6 bytes")]
    InvalidUdhLength,
}

/// Detect the coding for `text`: GSM-7 when every character is covered by
/// the default alphabet or the extension table, UCS-2 otherwise.
pub fn detect_coding(text: &str) -> DataCoding {
    for c in text.chars() {
        if default_septet(c).is_none() && extension_septet(c).is_none() {
            return DataCoding::Ucs2;
        }
    }
    DataCoding::Gsm7
}

/// One random reference per message; collisions only matter inside the
/// receiver's reassembly buffer, so the thread-local generator is plenty.
fn random_reference() -> u8 {
    rand::rng().random()
}

/// Map text to septets. Extension characters expand to an escape pair;
/// anything outside both tables degrades to '?'.
fn text_septets(text: &str) -> Vec<u8> {
    let mut septets = Vec::with_capacity(text.len());
    for c in text.chars() {
        if let Some(code) = default_septet(c) {
            septets.push(code);
        } else if let Some(ext) = extension_septet(c) {
            septets.push(ESCAPE);
            septets.push(ext);
        } else {
            septets.push(b'?');
        }
    }
    septets
}

/// Split septets into chunks of at most `max`, never ending a chunk on an
/// escape septet: the escape and its extension character stay together.
fn chunk_septets(septets: &[u8], max: usize) -> Vec<Vec<u8>> {
    let mut chunks = Vec::new();
    let mut i = 0;
    while i < septets.len() {
        let mut limit = max.min(septets.len() - i);
        if limit > 1 && septets[i + limit - 1] == ESCAPE {
            limit -= 1;
        }
        chunks.push(septets[i..i + limit].to_vec());
        i += limit;
    }
    chunks
}

/// Pack 7-bit septets into octets, little-endian across the byte stream:
/// each septet lands at bit position `7 * i`, carrying into the next octet
/// when it straddles a byte boundary.
fn pack_septets(septets: &[u8]) -> Vec<u8> {
    let bit_len = septets.len() * 7;
    let mut octets = vec![0u8; bit_len.div_ceil(8)];
    for (i, &septet) in septets.iter().enumerate() {
        let bit_pos = i * 7;
        let (byte_pos, offset) = (bit_pos / 8, (bit_pos % 8) as u32);
        octets[byte_pos] |= septet << offset;
        if offset > 1 {
            octets[byte_pos + 1] |= septet >> (8 - offset);
        }
    }
    octets
}

fn concat_udh_bytes(reference: u8, total: usize, sequence: usize) -> [u8; 6] {
    [0x05, 0x00, 0x03, reference, total as u8, sequence as u8]
}

/// Encode characters as 16-bit big-endian values, truncating code points
/// above U+FFFF (the historical behavior; see [`split_ucs2_utf16`] for
/// surrogate-pair output).
fn encode_ucs2_truncated(chars: &[char]) -> Vec<u8> {
    let mut out = Vec::with_capacity(chars.len() * 2);
    for &c in chars {
        out.extend_from_slice(&(c as u32 as u16).to_be_bytes());
    }
    out
}

/// Build GSM-7 segments for `text`.
///
/// A message of up to 160 septets is returned as a single segment of raw
/// septets with no UDH. Longer messages are cut into chunks of at most 153
/// septets, packed to octets and prefixed with a shared-reference
/// concatenation UDH.
pub fn split_gsm7(text: &str) -> Vec<Vec<u8>> {
    let septets = text_septets(text);

    if septets.len() <= GSM7_SINGLE_SEGMENT_SEPTETS {
        return vec![septets];
    }

    let chunks = chunk_septets(&septets, GSM7_SEGMENT_SEPTETS);
    let reference = random_reference();
    let total = chunks.len();

    chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let mut segment = concat_udh_bytes(reference, total, i + 1).to_vec();
            segment.extend_from_slice(&pack_septets(chunk));
            segment
        })
        .collect()
}

/// Build UCS-2 segments for `text`.
///
/// A message whose UTF-16 length is at most 140 octets is returned as a
/// single segment without UDH. Longer messages are split into groups of 67
/// code points, each encoded big-endian behind a shared-reference
/// concatenation UDH. Code points above U+FFFF are written truncated to 16
/// bits; use [`split_ucs2_utf16`] for surrogate-pair output.
pub fn split_ucs2(text: &str) -> Vec<Vec<u8>> {
    let utf16_octets: usize = text.chars().map(|c| c.len_utf16() * 2).sum();
    if utf16_octets <= UCS2_SINGLE_SEGMENT_OCTETS {
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut segment = Vec::with_capacity(units.len() * 2);
        for unit in units {
            segment.extend_from_slice(&unit.to_be_bytes());
        }
        return vec![segment];
    }

    let chars: Vec<char> = text.chars().collect();
    let total = chars.len().div_ceil(UCS2_SEGMENT_CHARS);
    let reference = random_reference();

    (0..total)
        .map(|i| {
            let start = i * UCS2_SEGMENT_CHARS;
            let end = ((i + 1) * UCS2_SEGMENT_CHARS).min(chars.len());
            let mut segment = concat_udh_bytes(reference, total, i + 1).to_vec();
            segment.extend_from_slice(&encode_ucs2_truncated(&chars[start..end]));
            segment
        })
        .collect()
}

/// Build UCS-2 segments with conforming surrogate-pair output for code
/// points above U+FFFF.
///
/// Segments are bounded by 67 UTF-16 code units and a pair is never split
/// across segments, so every segment decodes on its own.
pub fn split_ucs2_utf16(text: &str) -> Vec<Vec<u8>> {
    let units: Vec<u16> = text.encode_utf16().collect();
    if units.len() * 2 <= UCS2_SINGLE_SEGMENT_OCTETS {
        let mut segment = Vec::with_capacity(units.len() * 2);
        for unit in units {
            segment.extend_from_slice(&unit.to_be_bytes());
        }
        return vec![segment];
    }

    let mut groups: Vec<&[u16]> = Vec::new();
    let mut start = 0;
    while start < units.len() {
        let mut end = (start + UCS2_SEGMENT_CHARS).min(units.len());
        if end < units.len() && (0xD800..=0xDBFF).contains(&units[end - 1]) {
            end -= 1;
        }
        groups.push(&units[start..end]);
        start = end;
    }

    let reference = random_reference();
    let total = groups.len();
    groups
        .iter()
        .enumerate()
        .map(|(i, group)| {
            let mut segment = concat_udh_bytes(reference, total, i + 1).to_vec();
            for unit in group.iter() {
                segment.extend_from_slice(&unit.to_be_bytes());
            }
            segment
        })
        .collect()
}

/// Split `text` into ready-to-send short_message payloads, detecting the
/// coding. Empty input is an error.
pub fn split(text: &str) -> Result<(Vec<Vec<u8>>, DataCoding), SplitError> {
    if text.is_empty() {
        return Err(SplitError::EmptyMessage);
    }

    let coding = detect_coding(text);
    let parts = match coding {
        DataCoding::Gsm7 => split_gsm7(text),
        DataCoding::Ucs2 => split_ucs2(text),
    };
    Ok((parts, coding))
}

/// The fixed 6-octet concatenation header prefixed to every segment of a
/// multi-part message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatUdh {
    /// User Data Header Length (always 0x05).
    pub udhl: u8,
    /// Information Element Identifier (0x00, 8-bit reference).
    pub iei: u8,
    /// Information Element Data Length (always 0x03).
    pub iedl: u8,
    /// Concatenation reference number.
    pub reference: u8,
    /// Total number of segments.
    pub total: u8,
    /// Sequence number of this segment, starting at 1.
    pub sequence: u8,
}

impl ConcatUdh {
    pub fn new(reference: u8, total: u8, sequence: u8) -> Self {
        Self {
            udhl: 0x05,
            iei: 0x00,
            iedl: 0x03,
            reference,
            total,
            sequence,
        }
    }

    /// Serialize into the 6 wire octets.
    pub fn pack(&self) -> [u8; 6] {
        [
            self.udhl,
            self.iei,
            self.iedl,
            self.reference,
            self.total,
            self.sequence,
        ]
    }

    /// Deserialize from exactly 6 wire octets.
    pub fn unpack(data: &[u8]) -> Result<Self, SplitError> {
        let [udhl, iei, iedl, reference, total, sequence] = *data else {
            return Err(SplitError::InvalidUdhLength);
        };
        Ok(Self {
            udhl,
            iei,
            iedl,
            reference,
            total,
            sequence,
        })
    }
}

/// Segments with headers and bodies kept apart, for callers that build
/// submit_sm PDUs with a distinct UDH / short_message separation.
///
/// Single-segment messages have one body and no headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitResult {
    /// Concatenation headers, one per body when the message was segmented.
    pub udhs: Vec<ConcatUdh>,
    /// Message bodies with the UDH excluded.
    pub bodies: Vec<Vec<u8>>,
    /// Detected coding scheme.
    pub coding: DataCoding,
}

/// Split `text` keeping UDHs and bodies separate. Empty input is an error.
pub fn split_with_udh(text: &str) -> Result<SplitResult, SplitError> {
    if text.is_empty() {
        return Err(SplitError::EmptyMessage);
    }

    let coding = detect_coding(text);
    let mut result = SplitResult {
        coding,
        ..Default::default()
    };

    match coding {
        DataCoding::Gsm7 => {
            let septets = text_septets(text);
            if septets.len() <= GSM7_SINGLE_SEGMENT_SEPTETS {
                result.bodies.push(septets);
                return Ok(result);
            }

            let chunks = chunk_septets(&septets, GSM7_SEGMENT_SEPTETS);
            let reference = random_reference();
            let total = chunks.len() as u8;
            for (i, chunk) in chunks.iter().enumerate() {
                result
                    .udhs
                    .push(ConcatUdh::new(reference, total, (i + 1) as u8));
                result.bodies.push(pack_septets(chunk));
            }
        }
        DataCoding::Ucs2 => {
            let utf16_octets: usize = text.chars().map(|c| c.len_utf16() * 2).sum();
            if utf16_octets <= UCS2_SINGLE_SEGMENT_OCTETS {
                let mut body = Vec::with_capacity(utf16_octets);
                for unit in text.encode_utf16() {
                    body.extend_from_slice(&unit.to_be_bytes());
                }
                result.bodies.push(body);
                return Ok(result);
            }

            let chars: Vec<char> = text.chars().collect();
            let total = chars.len().div_ceil(UCS2_SEGMENT_CHARS);
            let reference = random_reference();
            for i in 0..total {
                let start = i * UCS2_SEGMENT_CHARS;
                let end = ((i + 1) * UCS2_SEGMENT_CHARS).min(chars.len());
                result
                    .udhs
                    .push(ConcatUdh::new(reference, total as u8, (i + 1) as u8));
                result.bodies.push(encode_ucs2_truncated(&chars[start..end]));
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_coding_cases() {
        assert_eq!(detect_coding("Hello World!"), DataCoding::Gsm7);
        assert_eq!(detect_coding("price: 10€ {ok}"), DataCoding::Gsm7);
        assert_eq!(detect_coding("سلام دنیا"), DataCoding::Ucs2);
        assert_eq!(detect_coding("Hello 👋"), DataCoding::Ucs2);
    }

    #[test]
    fn split_empty_is_error() {
        assert_eq!(split("").unwrap_err(), SplitError::EmptyMessage);
        assert_eq!(split_with_udh("").unwrap_err(), SplitError::EmptyMessage);
    }

    #[test]
    fn gsm7_boundary_160_septets() {
        let text = "a".repeat(160);
        let parts = split_gsm7(&text);
        assert_eq!(parts.len(), 1);
        // Single segment carries raw septets, no UDH.
        assert_eq!(parts[0].len(), 160);
        assert!(parts[0].iter().all(|&s| s == b'a'));
    }

    #[test]
    fn gsm7_boundary_161_septets() {
        let text = "a".repeat(161);
        let parts = split_gsm7(&text);
        assert_eq!(parts.len(), 2);

        // 153 septets pack into 134 octets behind the 6-octet UDH.
        assert_eq!(parts[0].len(), 6 + 134);
        assert_eq!(&parts[0][..3], &[0x05, 0x00, 0x03]);
        assert_eq!(parts[0][4], 2); // total
        assert_eq!(parts[0][5], 1); // sequence
        assert_eq!(parts[1][5], 2);
        // Both segments share the reference drawn for this message.
        assert_eq!(parts[0][3], parts[1][3]);
    }

    #[test]
    fn gsm7_escape_never_ends_a_chunk() {
        // 152 plain septets, then '{' (escape pair) puts the ESC exactly at
        // the 153-septet chunk boundary; 10 more pad past 160 total.
        let text = format!("{}{{{}", "a".repeat(152), "b".repeat(10));
        let septets = text_septets(&text);
        assert_eq!(septets.len(), 164);

        let chunks = chunk_septets(&septets, GSM7_SEGMENT_SEPTETS);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 152);
        assert_eq!(chunks[1].len(), 12);
        assert_eq!(chunks[1][0], ESCAPE);
        assert_eq!(chunks[1][1], 0x28);

        // Chunking loses nothing.
        let rejoined: Vec<u8> = chunks.concat();
        assert_eq!(rejoined, septets);
    }

    #[test]
    fn chunk_septets_small_chunks() {
        let input = [0x01, 0x02, 0x03, 0x1B, 0x04, 0x05, 0x06, 0x07, 0x08];
        let chunks = chunk_septets(&input, 3);
        assert_eq!(
            chunks,
            vec![
                vec![0x01, 0x02, 0x03],
                vec![0x1B, 0x04, 0x05],
                vec![0x06, 0x07, 0x08],
            ]
        );
    }

    #[test]
    fn pack_septets_known_vector() {
        // "hellohello" is the classic 23.038 packing example.
        let septets = text_septets("hellohello");
        assert_eq!(
            pack_septets(&septets),
            vec![0xE8, 0x32, 0x9B, 0xFD, 0x46, 0x97, 0xD9, 0xEC, 0x37]
        );
    }

    #[test]
    fn unknown_character_degrades_to_question_mark() {
        let septets = text_septets("aбc");
        assert_eq!(septets, vec![b'a', b'?', b'c']);
    }

    #[test]
    fn ucs2_boundary_140_octets() {
        // 70 code points at two octets each sit exactly on the limit.
        let text = "س".repeat(70);
        let parts = split_ucs2(&text);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 140);
        assert_eq!(&parts[0][..2], &[0x06, 0x33]); // U+0633 big-endian
    }

    #[test]
    fn ucs2_past_140_octets_segments() {
        let text = "س".repeat(71);
        let parts = split_ucs2(&text);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].len(), 6 + UCS2_SEGMENT_CHARS * 2);
        assert_eq!(parts[1].len(), 6 + 4 * 2);
        assert_eq!(parts[0][3], parts[1][3]);
        assert_eq!((parts[0][4], parts[0][5]), (2, 1));
        assert_eq!((parts[1][4], parts[1][5]), (2, 2));
    }

    #[test]
    fn ucs2_long_text_reconstructs() {
        let text = "سلام دنیا ".repeat(20); // 200 code points
        let (parts, coding) = split(&text).unwrap();
        assert_eq!(coding, DataCoding::Ucs2);
        assert_eq!(parts.len(), 3);

        let mut decoded = String::new();
        for part in &parts {
            assert!(part.len() <= 140);
            let body = &part[6..];
            for pair in body.chunks_exact(2) {
                let unit = u16::from_be_bytes([pair[0], pair[1]]);
                decoded.push(char::from_u32(unit as u32).unwrap());
            }
        }
        assert_eq!(decoded, text);
    }

    #[test]
    fn ucs2_truncates_above_bmp_by_default() {
        let text = "😀".to_string().repeat(80); // forces segmentation
        let parts = split_ucs2(&text);
        // One (truncated) 16-bit value per code point.
        let payload: usize = parts.iter().map(|p| p.len() - 6).sum();
        assert_eq!(payload, 80 * 2);
    }

    #[test]
    fn ucs2_utf16_variant_keeps_pairs_together() {
        let text = "😀".to_string().repeat(80); // 160 UTF-16 code units
        let parts = split_ucs2_utf16(&text);
        assert!(parts.len() >= 3);

        let mut units = Vec::new();
        for part in &parts {
            let body = &part[6..];
            // A segment never starts with a low surrogate.
            let first = u16::from_be_bytes([body[0], body[1]]);
            assert!(!(0xDC00..=0xDFFF).contains(&first));
            for pair in body.chunks_exact(2) {
                units.push(u16::from_be_bytes([pair[0], pair[1]]));
            }
        }
        assert_eq!(String::from_utf16(&units).unwrap(), text);
    }

    #[test]
    fn split_with_udh_separates_headers() {
        let text = "Hello, this is a GSM7 test message. ".repeat(10);
        let result = split_with_udh(&text).unwrap();
        assert_eq!(result.coding, DataCoding::Gsm7);
        assert_eq!(result.udhs.len(), result.bodies.len());
        assert!(result.udhs.len() > 1);

        for (i, udh) in result.udhs.iter().enumerate() {
            assert_eq!(udh.pack().len(), 6);
            assert_eq!(udh.reference, result.udhs[0].reference);
            assert_eq!(udh.total as usize, result.udhs.len());
            assert_eq!(udh.sequence as usize, i + 1);
            assert!(!result.bodies[i].is_empty());
        }
    }

    #[test]
    fn split_with_udh_single_part_has_no_header() {
        let result = split_with_udh("Hello from GSM7!").unwrap();
        assert_eq!(result.coding, DataCoding::Gsm7);
        assert!(result.udhs.is_empty());
        assert_eq!(result.bodies.len(), 1);

        let result = split_with_udh("سلام دنیا").unwrap();
        assert_eq!(result.coding, DataCoding::Ucs2);
        assert!(result.udhs.is_empty());
        assert_eq!(result.bodies.len(), 1);
    }

    #[test]
    fn concat_udh_pack_unpack() {
        let udh = ConcatUdh::new(0x2A, 3, 2);
        let packed = udh.pack();
        assert_eq!(packed, [0x05, 0x00, 0x03, 0x2A, 0x03, 0x02]);
        assert_eq!(ConcatUdh::unpack(&packed).unwrap(), udh);
        assert_eq!(
            ConcatUdh::unpack(&packed[..4]).unwrap_err(),
            SplitError::InvalidUdhLength
        );
    }

    #[test]
    fn segment_payloads_fit_short_message_field() {
        let (parts, _) = split(&"word ".repeat(100)).unwrap();
        for part in parts {
            assert!(part.len() <= 140);
        }
    }
}
