//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Attribute value sum type and Vendor-Specific Attribute sub-TLV
//! parsing/emission.
//!
//! A `Vendor-Specific` (26) attribute's value is `vendor_id(4) ||
//! [type(1) length(1) value(length-2)]+`. We flatten every sub-attribute of
//! every VSA attribute in a packet into one insertion-ordered list keyed by
//! `(vendor_id, type)`; nothing in this server needs to know which top-level
//! VSA attribute a given sub-attribute arrived in.

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::PacketDecodeError;

/// A single Vendor-Specific sub-attribute, as parsed out of a
/// `Vendor-Specific` attribute's value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vsa {
    pub vendor_id: u32,
    pub vendor_type: u8,
    pub value: Bytes,
}

/// Parses the value of a single `Vendor-Specific` (26) attribute into its
/// vendor id and sub-attributes. A zero-length sub-attribute value is
/// dropped rather than treated as a parse error, per the RADIUS convention
/// of tolerating empty VSAs.
pub fn parse_vsa(value: &[u8]) -> Result<(u32, Vec<Vsa>), PacketDecodeError> {
    if value.len() < 4 {
        return Err(PacketDecodeError::InvalidVsa);
    }
    let mut buf = Bytes::copy_from_slice(value);
    let vendor_id = buf.get_u32();

    let mut subs = Vec::new();
    while buf.has_remaining() {
        if buf.remaining() < 2 {
            return Err(PacketDecodeError::InvalidVsa);
        }
        let vendor_type = buf.get_u8();
        let sub_len = buf.get_u8() as usize;
        if sub_len < 2 || sub_len - 2 > buf.remaining() {
            return Err(PacketDecodeError::InvalidVsa);
        }
        let sub_value = buf.copy_to_bytes(sub_len - 2);
        if sub_value.is_empty() {
            // Zero-length VSA value: dropped, not a parse error.
            continue;
        }
        subs.push(Vsa {
            vendor_id,
            vendor_type,
            value: sub_value,
        });
    }
    Ok((vendor_id, subs))
}

/// Encodes a single vendor sub-attribute as a complete `Vendor-Specific`
/// (26) attribute: `vendor_id(4) type(1) length(1) value`.
pub fn encode_vsa(vendor_id: u32, vendor_type: u8, value: &[u8]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(6 + value.len());
    buf.put_u32(vendor_id);
    buf.put_u8(vendor_type);
    buf.put_u8((2 + value.len()) as u8);
    buf.put_slice(value);
    buf
}

/// A decoded attribute value, used by callers (and the admin API) that want
/// typed access instead of raw bytes. Decoding into this type is a
/// best-effort convenience; the codec itself stores and round-trips raw
/// bytes regardless of whether a typed view is requested.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Binary(Bytes),
    U32(u32),
    Ipv4(Ipv4Addr),
    Vsa { vendor_id: u32, vendor_type: u8, value: Bytes },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_single_sub_attribute() {
        let encoded = encode_vsa(14988, 8, b"10M/10M");
        let (vendor_id, subs) = parse_vsa(&encoded).unwrap();
        assert_eq!(vendor_id, 14988);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].vendor_type, 8);
        assert_eq!(&subs[0].value[..], b"10M/10M");
    }

    #[test]
    fn zero_length_sub_attribute_is_dropped() {
        // vendor_id=311, then one sub-attr: type=2, length=2 (empty value).
        let mut raw = BytesMut::new();
        raw.put_u32(311);
        raw.put_u8(2);
        raw.put_u8(2);
        let (vendor_id, subs) = parse_vsa(&raw).unwrap();
        assert_eq!(vendor_id, 311);
        assert!(subs.is_empty());
    }

    #[test]
    fn truncated_vsa_is_an_error() {
        let mut raw = BytesMut::new();
        raw.put_u32(311);
        raw.put_u8(1);
        raw.put_u8(10); // claims 8 bytes of value but none follow
        assert!(parse_vsa(&raw).is_err());
    }
}
