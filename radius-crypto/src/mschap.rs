//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! MS-CHAP (RFC 2433) and MS-CHAPv2 (RFC 2759) response/verification
//! primitives built from the DES and hash primitives in this crate.

use crate::des::des_encrypt3;
use crate::hash::{nt_hash, sha1};

// RFC 2759 §8.6/8.7 magic constants.
const MAGIC_SERVER: &[u8] = b"Magic server to client signing constant";
const MAGIC_PAD: &[u8] = b"Pad to make it do more than one iteration";

/// RFC 2759 `ChallengeHash`: SHA-1 of `peer_challenge || auth_challenge ||
/// username`, truncated to its first 8 bytes. `username` is the raw
/// `User-Name` bytes as received, with no case-folding or domain stripping.
pub fn challenge_hash(
    peer_challenge: &[u8; 16],
    auth_challenge: &[u8; 16],
    username: &[u8],
) -> [u8; 8] {
    let mut buf = Vec::with_capacity(32 + username.len());
    buf.extend_from_slice(peer_challenge);
    buf.extend_from_slice(auth_challenge);
    buf.extend_from_slice(username);
    let digest = sha1(&buf);
    digest[..8].try_into().unwrap()
}

/// The MS-CHAP (v1) NT-Response: `DesEncrypt3(NTHash(password),
/// MS-CHAP-Challenge)`.
pub fn mschap_nt_response(challenge: &[u8; 8], password: &str) -> [u8; 24] {
    des_encrypt3(&nt_hash(password), challenge)
}

/// RFC 2759 `GenerateNTResponse`.
pub fn nt_response(
    auth_challenge: &[u8; 16],
    peer_challenge: &[u8; 16],
    username: &[u8],
    password: &str,
) -> [u8; 24] {
    let challenge = challenge_hash(peer_challenge, auth_challenge, username);
    des_encrypt3(&nt_hash(password), &challenge)
}

/// RFC 2759 `GenerateAuthenticatorResponse`: proves to the client that the
/// server also knows the password, without revealing it.
pub fn authenticator_response(
    password: &str,
    nt_response: &[u8; 24],
    peer_challenge: &[u8; 16],
    auth_challenge: &[u8; 16],
    username: &[u8],
) -> [u8; 20] {
    let password_hash_hash = crate::hash::md4(&nt_hash(password));

    let mut d_input =
        Vec::with_capacity(password_hash_hash.len() + nt_response.len() + MAGIC_SERVER.len());
    d_input.extend_from_slice(&password_hash_hash);
    d_input.extend_from_slice(nt_response);
    d_input.extend_from_slice(MAGIC_SERVER);
    let d = sha1(&d_input);

    let challenge = challenge_hash(peer_challenge, auth_challenge, username);

    let mut final_input = Vec::with_capacity(d.len() + challenge.len() + MAGIC_PAD.len());
    final_input.extend_from_slice(&d);
    final_input.extend_from_slice(&challenge);
    final_input.extend_from_slice(MAGIC_PAD);
    sha1(&final_input)
}

/// Formats an `AuthenticatorResponse` as the `"S=<uppercase-hex>"` payload
/// carried in the MS-CHAP2-Success attribute.
pub fn format_success_message(ident: u8, auth_response: &[u8; 20]) -> Vec<u8> {
    let mut hex = String::with_capacity(2 + auth_response.len() * 2);
    hex.push_str("S=");
    for byte in auth_response {
        hex.push_str(&format!("{byte:02X}"));
    }
    let mut out = Vec::with_capacity(1 + hex.len());
    out.push(ident);
    out.extend_from_slice(hex.as_bytes());
    out
}
