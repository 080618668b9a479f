// SPDX-License-Identifier: GPL-3.0-or-later

/*
 *  src/field.rs - Type/length-tagged FRU field decoder.
 *  Copyright (C) 2026  Forest Crossman <cyrozap@gmail.com>
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

/*!
 * # `field` Module
 *
 * Every string in a FRU info area is stored as a "type/length" field: a tag
 * byte whose top two bits select the encoding and whose low six bits give the
 * payload length, followed by the payload itself.
 *
 * ## Usage Example
 *
 * ```
 * use ipmi_fru::field::{FieldType, TaggedField};
 *
 * // 6-bit packed ASCII, 3 bytes long: "IPMI"
 * let data = [0x83, 0x29, 0xdc, 0xa6];
 * let field = TaggedField::from_bytes(&data, 0, false).unwrap();
 *
 * assert_eq!(field.field_type, FieldType::SixBitAscii);
 * assert_eq!(field.to_string(), "IPMI");
 * assert_eq!(field.encoded_len(), 4);
 * ```
 */

use std::fmt;

use crate::error::{FruError, take};

/// Tag byte that terminates the custom field list of an info area.
pub const END_OF_FIELDS: u8 = 0xc1;

/// Characters for each nibble of a BCD plus field. Codes 0xD-0xF are reserved
/// by IPMI and are rendered as `:`, `,` and `_`.
const BCD_PLUS: &[u8; 16] = b"0123456789 -.:,_";

/// Offset added to each 6-bit code to get its ASCII character.
const SIX_BIT_ASCII_BASE: u8 = 0x20;

/// The encoding selected by the top two bits of a field's tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Binary or unspecified data.
    Binary,
    /// BCD plus: two characters per byte.
    BcdPlus,
    /// 6-bit packed ASCII: four characters per three bytes.
    SixBitAscii,
    /// 8-bit text (or UTF-16, depending on the area's language code).
    Text,
}

impl FieldType {
    fn from_tag(tag: u8) -> Self {
        match tag >> 6 {
            0 => FieldType::Binary,
            1 => FieldType::BcdPlus,
            2 => FieldType::SixBitAscii,
            _ => FieldType::Text,
        }
    }
}

/// The decoded contents of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Binary(Vec<u8>),
    Text(String),
}

/// A single decoded type/length field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedField {
    /// The encoding declared by the tag byte.
    pub field_type: FieldType,
    /// The undecoded payload (without the tag byte).
    pub raw: Vec<u8>,
    /// The payload decoded according to `field_type`.
    pub value: FieldValue,
}

impl TaggedField {
    /// Decodes the field whose tag byte is at `data[offset]`.
    ///
    /// # Arguments
    ///
    /// * `data` - The buffer containing the field.
    /// * `offset` - The offset of the tag byte within `data`.
    /// * `force_text` - Decode the payload as text no matter what the tag
    ///   says. Serial numbers and FRU file IDs are commonly tagged with the
    ///   wrong type, so the info area decoders set this for them.
    ///
    /// # Returns
    ///
    /// A `Result` containing the decoded field, or [`FruError::Truncated`] if
    /// the payload runs past the end of `data`.
    pub fn from_bytes(data: &[u8], offset: usize, force_text: bool) -> Result<Self, FruError> {
        let tag = take(data, offset, 1, "field tag")?[0];
        let field_type = FieldType::from_tag(tag);
        let length = usize::from(tag & 0x3f);
        let raw = take(data, offset + 1, length, "field data")?.to_vec();

        let value = if force_text {
            FieldValue::Text(decode_text(&raw))
        } else {
            match field_type {
                FieldType::Binary => FieldValue::Binary(raw.clone()),
                FieldType::BcdPlus => FieldValue::Text(decode_bcd_plus(&raw)),
                FieldType::SixBitAscii => FieldValue::Text(decode_six_bit_ascii(&raw)),
                FieldType::Text => FieldValue::Text(decode_text(&raw)),
            }
        };

        Ok(Self {
            field_type,
            raw,
            value,
        })
    }

    /// Length of the payload in bytes.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Number of bytes the field occupies in the buffer, tag byte included.
    pub fn encoded_len(&self) -> usize {
        1 + self.raw.len()
    }

    /// The decoded text, or `None` for binary fields.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Text(s) => Some(s.as_str()),
            FieldValue::Binary(_) => None,
        }
    }
}

impl fmt::Display for TaggedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            FieldValue::Binary(bytes) => f.write_str(&hex_string(bytes)),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Formats bytes as space-separated lowercase hex pairs.
pub(crate) fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_bcd_plus(raw: &[u8]) -> String {
    let mut s = String::with_capacity(raw.len() * 2);
    for b in raw {
        s.push(char::from(BCD_PLUS[usize::from(b >> 4)]));
        s.push(char::from(BCD_PLUS[usize::from(b & 0x0f)]));
    }
    s
}

// Bits are consumed LSB first, so every 3 bytes unpack into 4 characters.
// A trailing group of fewer than 6 bits is padding and is dropped.
fn decode_six_bit_ascii(raw: &[u8]) -> String {
    let mut s = String::with_capacity(raw.len() * 4 / 3);
    let mut acc: u32 = 0;
    let mut bits = 0;

    for b in raw {
        acc |= u32::from(*b) << bits;
        bits += 8;
        while bits >= 6 {
            s.push(char::from(SIX_BIT_ASCII_BASE + (acc & 0x3f) as u8));
            acc >>= 6;
            bits -= 6;
        }
    }

    s
}

fn decode_text(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&raw[..end]).to_string()
}

#[cfg(test)]
pub(crate) fn pack_six_bit_ascii(text: &str) -> Vec<u8> {
    let mut out = Vec::new();
    let mut acc: u32 = 0;
    let mut bits = 0;

    for c in text.bytes() {
        acc |= u32::from((c - SIX_BIT_ASCII_BASE) & 0x3f) << bits;
        bits += 6;
        while bits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push(acc as u8);
    }

    out
}

/// Builds an encoded field from a type and payload.
#[cfg(test)]
pub(crate) fn encode_field(field_type: FieldType, payload: &[u8]) -> Vec<u8> {
    let type_bits = match field_type {
        FieldType::Binary => 0u8,
        FieldType::BcdPlus => 1,
        FieldType::SixBitAscii => 2,
        FieldType::Text => 3,
    };
    let mut out = vec![type_bits << 6 | (payload.len() as u8 & 0x3f)];
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_bit_ascii_ipmi() {
        assert_eq!(pack_six_bit_ascii("IPMI"), vec![0x29, 0xdc, 0xa6]);
        assert_eq!(decode_six_bit_ascii(&[0x29, 0xdc, 0xa6]), "IPMI");
    }

    #[test]
    fn test_six_bit_ascii_round_trip() {
        for text in [
            "",
            "ABCD",
            "SN 0123-4567",
            "!\"#$%&'()*+,-./0",
            "_^]\\[ZYX",
            "    ",
        ] {
            let packed = pack_six_bit_ascii(text);
            assert_eq!(packed.len(), text.len() / 4 * 3);
            assert_eq!(decode_six_bit_ascii(&packed), text);
        }
    }

    #[test]
    fn test_six_bit_ascii_padding() {
        // Five characters need 30 bits, which round up to 4 bytes; the two
        // leftover bits are dropped.
        let packed = pack_six_bit_ascii("HELLO");
        assert_eq!(packed.len(), 4);
        assert_eq!(decode_six_bit_ascii(&packed), "HELLO");

        // Three characters pad out to a fourth (space) character.
        let packed = pack_six_bit_ascii("ABC");
        assert_eq!(packed.len(), 3);
        assert_eq!(decode_six_bit_ascii(&packed), "ABC ");
    }

    #[test]
    fn test_bcd_plus() {
        assert_eq!(decode_bcd_plus(&[0x12, 0xab, 0xc3]), "12 -.3");
        assert_eq!(decode_bcd_plus(&[0xde, 0xf0]), ":,_0");
        assert_eq!(decode_bcd_plus(&[]), "");
    }

    #[test]
    fn test_text_strips_trailing_nul() {
        assert_eq!(decode_text(b"ABC\0\0"), "ABC");
        assert_eq!(decode_text(b"A\0B\0"), "A\0B");
        assert_eq!(decode_text(b"\0\0"), "");
    }

    #[test]
    fn test_binary_display() {
        let data = encode_field(FieldType::Binary, &[0x01, 0xab, 0xff]);
        let field = TaggedField::from_bytes(&data, 0, false).unwrap();
        assert_eq!(field.field_type, FieldType::Binary);
        assert_eq!(field.value, FieldValue::Binary(vec![0x01, 0xab, 0xff]));
        assert_eq!(field.to_string(), "01 ab ff");
        assert_eq!(field.as_str(), None);
    }

    #[test]
    fn test_dispatch_uses_field_type() {
        // Each field must be decoded by its own type bits, not fall through
        // to raw text.
        let data = encode_field(FieldType::BcdPlus, &[0x20, 0x24]);
        let field = TaggedField::from_bytes(&data, 0, false).unwrap();
        assert_eq!(field.as_str(), Some("2024"));

        let data = encode_field(FieldType::SixBitAscii, &[0x29, 0xdc, 0xa6]);
        let field = TaggedField::from_bytes(&data, 0, false).unwrap();
        assert_eq!(field.as_str(), Some("IPMI"));

        let data = encode_field(FieldType::Text, b"Acme\0");
        let field = TaggedField::from_bytes(&data, 0, false).unwrap();
        assert_eq!(field.as_str(), Some("Acme"));
    }

    #[test]
    fn test_force_text_overrides_type() {
        let data = encode_field(FieldType::SixBitAscii, b"SN42");
        let forced = TaggedField::from_bytes(&data, 0, true).unwrap();
        assert_eq!(forced.field_type, FieldType::SixBitAscii);
        assert_eq!(forced.as_str(), Some("SN42"));

        let data = encode_field(FieldType::Binary, b"1234");
        let forced = TaggedField::from_bytes(&data, 0, true).unwrap();
        assert_eq!(forced.to_string(), "1234");
    }

    #[test]
    fn test_offset_and_length() {
        let mut data = vec![0xaa, 0xbb];
        data.extend(encode_field(FieldType::Text, b"Widget"));
        data.push(END_OF_FIELDS);

        let field = TaggedField::from_bytes(&data, 2, false).unwrap();
        assert_eq!(field.len(), 6);
        assert_eq!(field.encoded_len(), 7);
        assert_eq!(data[2 + field.encoded_len()], END_OF_FIELDS);
    }

    #[test]
    fn test_empty_field() {
        let field = TaggedField::from_bytes(&[0xc0], 0, false).unwrap();
        assert!(field.is_empty());
        assert_eq!(field.encoded_len(), 1);
        assert_eq!(field.as_str(), Some(""));
    }

    #[test]
    fn test_truncated() {
        let data = [0xc5, b'a', b'b'];
        assert!(matches!(
            TaggedField::from_bytes(&data, 0, false),
            Err(FruError::Truncated { needed: 6, .. })
        ));
        assert!(matches!(
            TaggedField::from_bytes(&data, 3, false),
            Err(FruError::Truncated { .. })
        ));
    }
}
