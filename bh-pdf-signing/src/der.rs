// Copyright (C) 2020-2026  The Blockhouse Technology Limited (TBTL).
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public
// License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Minimal DER writer and reader for the RFC 3161 messages.

pub(crate) const TAG_BOOLEAN: u8 = 0x01;
pub(crate) const TAG_INTEGER: u8 = 0x02;
pub(crate) const TAG_OCTET_STRING: u8 = 0x04;
pub(crate) const TAG_NULL: u8 = 0x05;
pub(crate) const TAG_OID: u8 = 0x06;
pub(crate) const TAG_SEQUENCE: u8 = 0x30;

pub(crate) fn build_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut result = vec![tag];
    let len = content.len();

    if len < 0x80 {
        result.push(len as u8);
    } else {
        let len_bytes: Vec<u8> = len
            .to_be_bytes()
            .into_iter()
            .skip_while(|byte| *byte == 0)
            .collect();
        result.push(0x80 | len_bytes.len() as u8);
        result.extend(len_bytes);
    }

    result.extend(content);
    result
}

pub(crate) fn build_sequence(items: &[&[u8]]) -> Vec<u8> {
    let content: Vec<u8> = items.iter().flat_map(|item| item.iter().copied()).collect();
    build_tlv(TAG_SEQUENCE, &content)
}

/// Encodes an unsigned big-endian integer in its minimal form.
pub(crate) fn build_integer(value: &[u8]) -> Vec<u8> {
    let first = value.iter().position(|byte| *byte != 0).unwrap_or(value.len());
    let mut minimal = value[first..].to_vec();

    if minimal.first().map_or(true, |byte| byte & 0x80 != 0) {
        minimal.insert(0, 0);
    }

    build_tlv(TAG_INTEGER, &minimal)
}

pub(crate) fn build_octet_string(content: &[u8]) -> Vec<u8> {
    build_tlv(TAG_OCTET_STRING, content)
}

pub(crate) fn build_boolean(value: bool) -> Vec<u8> {
    build_tlv(TAG_BOOLEAN, &[if value { 0xFF } else { 0x00 }])
}

pub(crate) fn build_algorithm_identifier(oid: &[u8]) -> Vec<u8> {
    let oid = build_tlv(TAG_OID, oid);
    let null = build_tlv(TAG_NULL, &[]);
    build_sequence(&[&oid, &null])
}

/// Splits the first TLV off `input`, returning its tag, content and the
/// remaining bytes.
pub(crate) fn read_tlv(input: &[u8]) -> Option<(u8, &[u8], &[u8])> {
    let (&tag, rest) = input.split_first()?;
    let (&first, rest) = rest.split_first()?;

    let (len, rest) = if first < 0x80 {
        (first as usize, rest)
    } else {
        let count = (first & 0x7F) as usize;
        if count == 0 || count > std::mem::size_of::<usize>() || rest.len() < count {
            return None;
        }
        let len = rest[..count]
            .iter()
            .fold(0usize, |acc, byte| (acc << 8) | *byte as usize);
        (len, &rest[count..])
    };

    if rest.len() < len {
        return None;
    }

    Some((tag, &rest[..len], &rest[len..]))
}

/// Reads the first TLV of `input` and checks its tag.
pub(crate) fn expect_tlv(input: &[u8], expected: u8) -> Option<(&[u8], &[u8])> {
    match read_tlv(input)? {
        (tag, content, rest) if tag == expected => Some((content, rest)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_minimal() {
        assert_eq!(build_integer(&[0x00, 0x00, 0x12]), vec![0x02, 0x01, 0x12]);
        assert_eq!(build_integer(&[0x80]), vec![0x02, 0x02, 0x00, 0x80]);
        assert_eq!(build_integer(&[0x00]), vec![0x02, 0x01, 0x00]);
        assert_eq!(build_integer(&[]), vec![0x02, 0x01, 0x00]);
    }

    #[test]
    fn long_lengths() {
        let content = vec![0xAB; 300];
        let encoded = build_octet_string(&content);

        assert_eq!(&encoded[..4], &[0x04, 0x82, 0x01, 0x2C]);

        let (tag, read, rest) = read_tlv(&encoded).unwrap();
        assert_eq!(tag, TAG_OCTET_STRING);
        assert_eq!(read, content.as_slice());
        assert!(rest.is_empty());
    }

    #[test]
    fn truncated_input() {
        assert_eq!(read_tlv(&[]), None);
        assert_eq!(read_tlv(&[0x30]), None);
        assert_eq!(read_tlv(&[0x30, 0x05, 0x02]), None);
        assert_eq!(read_tlv(&[0x30, 0x82, 0x01]), None);
    }

    #[test]
    fn unexpected_tag() {
        let encoded = build_boolean(true);

        assert_eq!(expect_tlv(&encoded, TAG_INTEGER), None);
        assert_eq!(
            expect_tlv(&encoded, TAG_BOOLEAN),
            Some((&[0xFF][..], &[][..]))
        );
    }
}
