//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! RADIUS packet header, attribute table and Response-Authenticator /
//! User-Password codec (RFC 2865 §3/§4/§5.2, RFC 2866 §3/§4).

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use radius_crypto::hash::md5;
use radius_utils::bytes::BytesMutExt;

use crate::attribute::{self, Vsa};

/// Fixed RADIUS header length: Code(1) + Identifier(1) + Length(2) +
/// Authenticator(16).
pub const HEADER_LEN: usize = 20;

/// Maximum value length of a single attribute: 255 total minus the 2-byte
/// type/length prefix, minus one (the codec treats 253 as the practical
/// ceiling called out in the spec's boundary cases).
pub const MAX_ATTRIBUTE_VALUE_LEN: usize = 253;

/// RADIUS packet codes in scope: authentication and accounting only. CoA,
/// Disconnect and Status-Server are out of scope.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Code {
    AccessRequest,
    AccessAccept,
    AccessReject,
    AccountingRequest,
    AccountingResponse,
}

impl Code {
    pub fn as_u8(self) -> u8 {
        match self {
            Code::AccessRequest => 1,
            Code::AccessAccept => 2,
            Code::AccessReject => 3,
            Code::AccountingRequest => 4,
            Code::AccountingResponse => 5,
        }
    }

    pub fn from_u8(value: u8) -> Option<Code> {
        let code = match value {
            1 => Code::AccessRequest,
            2 => Code::AccessAccept,
            3 => Code::AccessReject,
            4 => Code::AccountingRequest,
            5 => Code::AccountingResponse,
            _ => return None,
        };
        Some(code)
    }
}

/// A decoded or in-progress RADIUS packet. Attributes are kept in an
/// insertion-ordered list keyed by raw code; Vendor-Specific sub-attributes
/// are flattened into a separate insertion-ordered list keyed by
/// `(vendor_id, vendor_type)`. Unknown attribute codes are preserved as raw
/// values -- the dictionary is a naming aid, not a filter.
#[derive(Clone, Debug)]
pub struct Packet {
    pub code: Code,
    pub identifier: u8,
    pub authenticator: [u8; 16],
    attributes: Vec<(u8, Bytes)>,
    vsas: Vec<Vsa>,
}

/// Packet decode errors. Per RFC 2865 §3, every one of these is a
/// silent-discard case: no reply is sent, the packet is simply dropped.
#[derive(Debug, Eq, PartialEq)]
pub enum PacketDecodeError {
    TooShort,
    InvalidLength(u16),
    InvalidCode(u8),
    AttributeOutOfBounds,
    InvalidVsa,
    ReadOutOfBounds,
}

impl std::fmt::Display for PacketDecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PacketDecodeError::TooShort => {
                write!(f, "packet shorter than the 20-byte header")
            }
            PacketDecodeError::InvalidLength(len) => {
                write!(f, "Length field {len} does not match the datagram")
            }
            PacketDecodeError::InvalidCode(code) => {
                write!(f, "unsupported packet code {code}")
            }
            PacketDecodeError::AttributeOutOfBounds => {
                write!(f, "attribute length exceeds remaining packet bytes")
            }
            PacketDecodeError::InvalidVsa => {
                write!(f, "malformed Vendor-Specific sub-attribute framing")
            }
            PacketDecodeError::ReadOutOfBounds => {
                write!(f, "attempt to read out of bounds")
            }
        }
    }
}

impl std::error::Error for PacketDecodeError {}

impl Packet {
    /// Builds a fresh packet (typically a response) with no attributes.
    /// `authenticator` is a placeholder for `AccessAccept`/`AccessReject`/
    /// `AccountingResponse` -- `encode_response` overwrites it with the
    /// computed Response-Authenticator.
    pub fn new(code: Code, identifier: u8, authenticator: [u8; 16]) -> Self {
        Packet {
            code,
            identifier,
            authenticator,
            attributes: Vec::new(),
            vsas: Vec::new(),
        }
    }

    /// Decodes a packet from a received datagram.
    pub fn decode(data: &[u8]) -> Result<Self, PacketDecodeError> {
        if data.len() < HEADER_LEN {
            return Err(PacketDecodeError::TooShort);
        }

        let mut buf = Bytes::copy_from_slice(data);
        let code = buf.get_u8();
        let Some(code) = Code::from_u8(code) else {
            return Err(PacketDecodeError::InvalidCode(code));
        };
        let identifier = buf.get_u8();
        let length = buf.get_u16();
        if (length as usize) < HEADER_LEN || length as usize > data.len() {
            return Err(PacketDecodeError::InvalidLength(length));
        }
        let mut authenticator = [0u8; 16];
        buf.copy_to_slice(&mut authenticator);

        // Attributes run exactly to `length`, ignoring any trailing padding
        // the datagram may carry.
        let mut remaining = length as usize - HEADER_LEN;
        let mut attributes = Vec::new();
        let mut vsas = Vec::new();
        while remaining > 0 {
            if remaining < 2 || buf.remaining() < 2 {
                return Err(PacketDecodeError::AttributeOutOfBounds);
            }
            let attr_code = buf.get_u8();
            let attr_len = buf.get_u8() as usize;
            if attr_len < 2 || attr_len - 2 > remaining - 2 || attr_len - 2 > buf.remaining() {
                return Err(PacketDecodeError::AttributeOutOfBounds);
            }
            let value = buf.copy_to_bytes(attr_len - 2);
            remaining -= attr_len;

            if attr_code == crate::dictionary::VENDOR_SPECIFIC {
                let (_, subs) = attribute::parse_vsa(&value)?;
                vsas.extend(subs);
            } else {
                attributes.push((attr_code, value));
            }
        }

        Ok(Packet {
            code,
            identifier,
            authenticator,
            attributes,
            vsas,
        })
    }

    // ===== attribute accessors =====

    pub fn push_attribute(&mut self, code: u8, value: impl Into<Bytes>) {
        self.attributes.push((code, value.into()));
    }

    pub fn push_string(&mut self, code: u8, value: &str) {
        self.push_attribute(code, Bytes::copy_from_slice(value.as_bytes()));
    }

    pub fn push_u32(&mut self, code: u8, value: u32) {
        let mut buf = BytesMut::with_capacity(4);
        buf.put_u32(value);
        self.push_attribute(code, buf.freeze());
    }

    pub fn push_ipv4(&mut self, code: u8, value: Ipv4Addr) {
        let mut buf = BytesMut::with_capacity(4);
        buf.put_ipv4(&value);
        self.push_attribute(code, buf.freeze());
    }

    pub fn push_vsa(&mut self, vendor_id: u32, vendor_type: u8, value: impl Into<Bytes>) {
        self.vsas.push(Vsa {
            vendor_id,
            vendor_type,
            value: value.into(),
        });
    }

    /// Returns the first attribute value for `code`, per the "take first for
    /// scalar" rule when multiple same-code attributes are present.
    pub fn get(&self, code: u8) -> Option<&Bytes> {
        self.attributes.iter().find(|(c, _)| *c == code).map(|(_, v)| v)
    }

    /// Returns every attribute value for `code`, in wire order.
    pub fn get_all(&self, code: u8) -> impl Iterator<Item = &Bytes> {
        self.attributes.iter().filter(move |(c, _)| *c == code).map(|(_, v)| v)
    }

    pub fn get_string(&self, code: u8) -> Option<String> {
        self.get(code).and_then(|v| String::from_utf8(v.to_vec()).ok())
    }

    pub fn get_u32(&self, code: u8) -> Option<u32> {
        self.get(code).filter(|v| v.len() == 4).map(|v| {
            let mut b = v.clone();
            b.get_u32()
        })
    }

    pub fn get_ipv4(&self, code: u8) -> Option<Ipv4Addr> {
        self.get(code).filter(|v| v.len() == 4).map(|v| {
            let octets: [u8; 4] = v[..4].try_into().expect("length checked above");
            Ipv4Addr::from(octets)
        })
    }

    /// Returns the first VSA value for `(vendor_id, vendor_type)`.
    pub fn get_vsa(&self, vendor_id: u32, vendor_type: u8) -> Option<&Bytes> {
        self.vsas
            .iter()
            .find(|v| v.vendor_id == vendor_id && v.vendor_type == vendor_type)
            .map(|v| &v.value)
    }

    pub fn has(&self, code: u8) -> bool {
        self.attributes.iter().any(|(c, _)| *c == code)
    }

    pub fn has_vsa(&self, vendor_id: u32, vendor_type: u8) -> bool {
        self.vsas
            .iter()
            .any(|v| v.vendor_id == vendor_id && v.vendor_type == vendor_type)
    }

    // ===== encode =====

    /// Serializes the header and attributes with `authenticator` in the
    /// authenticator field, without computing any hash. Used both for the
    /// final encode and as the hash input for Response/Request-Authenticator
    /// computation.
    fn encode_with(&self, authenticator: &[u8; 16]) -> BytesMut {
        let mut body = BytesMut::new();
        for (code, value) in &self.attributes {
            body.put_u8(*code);
            body.put_u8((2 + value.len()) as u8);
            body.put_slice(value);
        }
        for vsa in self.vsas_by_vendor() {
            body.put_slice(&vsa);
        }

        let total_len = HEADER_LEN + body.len();
        let mut buf = BytesMut::with_capacity(total_len);
        buf.put_u8(self.code.as_u8());
        buf.put_u8(self.identifier);
        buf.put_u16(total_len as u16);
        buf.put_slice(authenticator);
        buf.put_slice(&body);
        buf
    }

    /// Groups the flattened VSA list back into one `Vendor-Specific`
    /// attribute per distinct vendor id, preserving first-seen order, and
    /// encodes each as a complete TLV.
    fn vsas_by_vendor(&self) -> Vec<BytesMut> {
        let mut order: Vec<u32> = Vec::new();
        for vsa in &self.vsas {
            if !order.contains(&vsa.vendor_id) {
                order.push(vsa.vendor_id);
            }
        }
        order
            .into_iter()
            .map(|vendor_id| {
                let mut value = BytesMut::new();
                value.put_u32(vendor_id);
                for vsa in self.vsas.iter().filter(|v| v.vendor_id == vendor_id) {
                    value.put_u8(vsa.vendor_type);
                    value.put_u8((2 + vsa.value.len()) as u8);
                    value.put_slice(&vsa.value);
                }
                let mut attr = BytesMut::with_capacity(2 + value.len());
                attr.put_u8(crate::dictionary::VENDOR_SPECIFIC);
                attr.put_u8((2 + value.len()) as u8);
                attr.put_slice(&value);
                attr
            })
            .collect()
    }

    /// Encodes the packet as-is, with `self.authenticator` written verbatim.
    /// Used when the authenticator has already been finalized (e.g. for
    /// tests round-tripping a previously encoded response).
    pub fn encode(&self) -> BytesMut {
        self.encode_with(&self.authenticator)
    }

    /// Encodes this packet as a response to a request whose Request
    /// Authenticator was `request_authenticator`, computing and writing the
    /// Response-Authenticator: `MD5(Code || Id || Length ||
    /// RequestAuthenticator || Attributes || Secret)`.
    pub fn encode_response(
        &self,
        request_authenticator: &[u8; 16],
        secret: &[u8],
    ) -> BytesMut {
        let mut buf = self.encode_with(request_authenticator);
        let mut hash_input = Vec::with_capacity(buf.len() + secret.len());
        hash_input.extend_from_slice(&buf);
        hash_input.extend_from_slice(secret);
        let response_authenticator = md5(&hash_input);
        buf[4..20].copy_from_slice(&response_authenticator);
        buf
    }

    /// Verifies an Accounting-Request's Request Authenticator: `MD5(Code ||
    /// Id || Length || 16 zero bytes || Attributes || Secret)` must equal
    /// the authenticator carried on the wire (RFC 2866 §4).
    pub fn verify_accounting_authenticator(&self, secret: &[u8]) -> bool {
        let zero = [0u8; 16];
        let buf = self.encode_with(&zero);
        let mut hash_input = Vec::with_capacity(buf.len() + secret.len());
        hash_input.extend_from_slice(&buf);
        hash_input.extend_from_slice(secret);
        md5(&hash_input) == self.authenticator
    }
}

/// Decrypts a `User-Password` attribute value per RFC 2865 §5.2: iteratively
/// XOR 16-byte blocks with `MD5(secret || b_prev)` where `b_0` is the
/// Request Authenticator, then strip trailing NULs.
pub fn decrypt_user_password(
    encrypted: &[u8],
    secret: &[u8],
    request_authenticator: &[u8; 16],
) -> Vec<u8> {
    let mut plaintext = Vec::with_capacity(encrypted.len());
    let mut b_prev: Vec<u8> = request_authenticator.to_vec();
    for block in encrypted.chunks(16) {
        let mut hash_input = Vec::with_capacity(secret.len() + b_prev.len());
        hash_input.extend_from_slice(secret);
        hash_input.extend_from_slice(&b_prev);
        let mask = md5(&hash_input);
        let mut clear_block = Vec::with_capacity(block.len());
        for (i, byte) in block.iter().enumerate() {
            clear_block.push(byte ^ mask[i]);
        }
        b_prev = block.to_vec();
        plaintext.extend_from_slice(&clear_block);
    }
    while plaintext.last() == Some(&0) {
        plaintext.pop();
    }
    plaintext
}

/// Encrypts a cleartext password into a `User-Password` attribute value,
/// the inverse of [`decrypt_user_password`]. Used by tests and by any admin
/// tooling that needs to originate a RADIUS request.
pub fn encrypt_user_password(
    cleartext: &[u8],
    secret: &[u8],
    request_authenticator: &[u8; 16],
) -> Vec<u8> {
    let mut padded = cleartext.to_vec();
    let pad_to = padded.len().div_ceil(16).max(1) * 16;
    padded.resize(pad_to, 0);

    let mut ciphertext = Vec::with_capacity(padded.len());
    let mut b_prev: Vec<u8> = request_authenticator.to_vec();
    for block in padded.chunks(16) {
        let mut hash_input = Vec::with_capacity(secret.len() + b_prev.len());
        hash_input.extend_from_slice(secret);
        hash_input.extend_from_slice(&b_prev);
        let mask = md5(&hash_input);
        let mut cipher_block = Vec::with_capacity(block.len());
        for (i, byte) in block.iter().enumerate() {
            cipher_block.push(byte ^ mask[i]);
        }
        b_prev = cipher_block.clone();
        ciphertext.extend_from_slice(&cipher_block);
    }
    ciphertext
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::USER_NAME;

    #[test]
    fn user_password_round_trips() {
        let secret = b"xyzzy";
        let authenticator = [7u8; 16];
        let encrypted = encrypt_user_password(b"wonderland", secret, &authenticator);
        let decrypted = decrypt_user_password(&encrypted, secret, &authenticator);
        assert_eq!(decrypted, b"wonderland");
    }

    #[test]
    fn user_password_round_trips_for_128_byte_password() {
        let secret = b"anothersecret";
        let authenticator = [1u8; 16];
        let password = vec![b'x'; 128];
        let encrypted = encrypt_user_password(&password, secret, &authenticator);
        let decrypted = decrypt_user_password(&encrypted, secret, &authenticator);
        assert_eq!(decrypted, password);
    }

    #[test]
    fn decode_rejects_short_packets() {
        let data = [1u8; 10];
        assert_eq!(Packet::decode(&data), Err(PacketDecodeError::TooShort));
    }

    #[test]
    fn decode_rejects_length_past_datagram() {
        let mut data = vec![1u8, 1, 0, 40];
        data.extend_from_slice(&[0u8; 16]);
        assert_eq!(
            Packet::decode(&data),
            Err(PacketDecodeError::InvalidLength(40))
        );
    }

    #[test]
    fn encode_decode_round_trip_preserves_attributes() {
        let mut req = Packet::new(Code::AccessRequest, 42, [9u8; 16]);
        req.push_string(USER_NAME, "alice");
        req.push_vsa(14988, 3, Bytes::from_static(b"default"));
        let encoded = req.encode();

        let decoded = Packet::decode(&encoded).unwrap();
        assert_eq!(decoded.code, Code::AccessRequest);
        assert_eq!(decoded.identifier, 42);
        assert_eq!(decoded.get_string(USER_NAME).as_deref(), Some("alice"));
        assert_eq!(
            decoded.get_vsa(14988, 3).map(|v| &v[..]),
            Some(&b"default"[..])
        );
    }

    #[test]
    fn response_authenticator_is_deterministic_and_verifiable() {
        let request_authenticator = [3u8; 16];
        let secret = b"sharedsecret";

        let mut resp = Packet::new(Code::AccessAccept, 5, [0u8; 16]);
        resp.push_string(USER_NAME, "alice");
        let encoded = resp.encode_response(&request_authenticator, secret);

        // The encoded response decodes, and recomputing the hash over its
        // own bytes (with the request authenticator substituted back in)
        // reproduces the authenticator written into the header.
        let decoded = Packet::decode(&encoded).unwrap();
        let recomputed = decoded.encode_response(&request_authenticator, secret);
        assert_eq!(&encoded[..], &recomputed[..]);
    }

    #[test]
    fn multiple_same_code_attributes_keep_first_for_scalar_and_all_for_list() {
        let mut pkt = Packet::new(Code::AccessRequest, 1, [0u8; 16]);
        pkt.push_string(11, "first");
        pkt.push_string(11, "second");
        assert_eq!(pkt.get_string(11).as_deref(), Some("first"));
        assert_eq!(pkt.get_all(11).count(), 2);
    }

    #[test]
    fn zero_length_vsa_value_is_dropped_without_parse_error() {
        let mut req = Packet::new(Code::AccessRequest, 1, [0u8; 16]);
        // Build a Vendor-Specific attribute by hand with a zero-length
        // sub-attribute value.
        let mut value = BytesMut::new();
        value.put_u32(311);
        value.put_u8(2);
        value.put_u8(2);
        req.push_attribute(crate::dictionary::VENDOR_SPECIFIC, value.freeze());
        let encoded = req.encode();
        let decoded = Packet::decode(&encoded).unwrap();
        assert!(!decoded.has_vsa(311, 2));
    }

    #[test]
    fn accounting_authenticator_verifies() {
        let secret = b"xyzzy";
        let mut req = Packet::new(Code::AccountingRequest, 1, [0u8; 16]);
        req.push_string(USER_NAME, "alice");
        let zero_encoded = req.encode_with(&[0u8; 16]);
        let mut hash_input = Vec::new();
        hash_input.extend_from_slice(&zero_encoded);
        hash_input.extend_from_slice(secret);
        let authenticator = md5(&hash_input);

        let mut wire = Packet::new(Code::AccountingRequest, 1, authenticator);
        wire.push_string(USER_NAME, "alice");
        assert!(wire.verify_accounting_authenticator(secret));
    }
}
