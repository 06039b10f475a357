// ABOUTME: GSM 03.38 default alphabet and extension table lookups
// ABOUTME: Characters outside both tables force UCS-2 or map to '?' during packing

/// Escape septet announcing an extension-table character.
pub(crate) const ESCAPE: u8 = 0x1B;

/// Septet for `c` in the GSM-7 default alphabet, `None` when the character
/// is not part of it. Letters, digits and most ASCII punctuation map to
/// their ASCII values; the remaining positions hold the national and Greek
/// characters of 3GPP 23.038 Section 6.2.1.
pub(crate) fn default_septet(c: char) -> Option<u8> {
    let code = match c {
        '@' => 0x00,
        '£' => 0x01,
        '$' => 0x02,
        '¥' => 0x03,
        'è' => 0x04,
        'é' => 0x05,
        'ù' => 0x06,
        'ì' => 0x07,
        'ò' => 0x08,
        'Ç' => 0x09,
        '\n' => 0x0A,
        'Ø' => 0x0B,
        'ø' => 0x0C,
        '\r' => 0x0D,
        'Å' => 0x0E,
        'å' => 0x0F,
        'Δ' => 0x10,
        '_' => 0x11,
        'Φ' => 0x12,
        'Γ' => 0x13,
        'Λ' => 0x14,
        'Ω' => 0x15,
        'Π' => 0x16,
        'Ψ' => 0x17,
        'Σ' => 0x18,
        'Θ' => 0x19,
        'Ξ' => 0x1A,
        // 0x1B is the escape to the extension table
        'Æ' => 0x1C,
        'æ' => 0x1D,
        'ß' => 0x1E,
        'É' => 0x1F,
        ' ' | '!' | '"' | '#' | '%' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | '-' | '.'
        | '/' | ':' | ';' | '<' | '=' | '>' | '?' => c as u8,
        '0'..='9' | 'A'..='Z' | 'a'..='z' => c as u8,
        '¤' => 0x24,
        '¡' => 0x40,
        'Ä' => 0x5B,
        'Ö' => 0x5C,
        'Ñ' => 0x5D,
        'Ü' => 0x5E,
        '§' => 0x5F,
        '¿' => 0x60,
        'ä' => 0x7B,
        'ö' => 0x7C,
        'ñ' => 0x7D,
        'ü' => 0x7E,
        'à' => 0x7F,
        _ => return None,
    };
    Some(code)
}

/// Septet for `c` in the GSM-7 extension table (reached with the 0x1B
/// escape), `None` when the character is not part of it.
pub(crate) fn extension_septet(c: char) -> Option<u8> {
    let code = match c {
        '\x0C' => 0x0A, // form feed
        '^' => 0x14,
        '{' => 0x28,
        '}' => 0x29,
        '\\' => 0x2F,
        '[' => 0x3C,
        '~' => 0x3D,
        ']' => 0x3E,
        '|' => 0x40,
        '€' => 0x65,
        _ => return None,
    };
    Some(code)
}
