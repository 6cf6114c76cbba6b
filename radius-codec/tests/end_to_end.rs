//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Wire-level testable properties and end-to-end scenarios from the
//! protocol spec: packet round-trips, the User-Password cipher, and the
//! literal PAP/CHAP/MS-CHAPv2 scenarios, all at the codec/crypto layer
//! (the auth-decision and accounting scenarios that need a store live in
//! `radius-core`'s own tests instead).

use radius_codec::dictionary::{CHAP_CHALLENGE, CHAP_PASSWORD, USER_NAME, USER_PASSWORD};
use radius_codec::{decrypt_user_password, encrypt_user_password, Code, Packet};
use radius_crypto::chap::chap_response;
use radius_crypto::hash::md5;
use radius_crypto::mschap;

const SECRET: &[u8] = b"xyzzy";
const REQUEST_AUTHENTICATOR: [u8; 16] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10,
];

#[test]
fn response_round_trips_and_authenticator_validates() {
    let mut response = Packet::new(Code::AccessAccept, 42, [0u8; 16]);
    response.push_string(USER_NAME, "alice");
    let encoded = response.encode_response(&REQUEST_AUTHENTICATOR, SECRET);

    let decoded = Packet::decode(&encoded).unwrap();
    assert_eq!(decoded.code, Code::AccessAccept);
    assert_eq!(decoded.identifier, 42);
    assert_eq!(decoded.get_string(USER_NAME).as_deref(), Some("alice"));

    let mut hash_input = encoded[..20].to_vec();
    hash_input[4..20].copy_from_slice(&REQUEST_AUTHENTICATOR);
    hash_input.extend_from_slice(&encoded[20..]);
    hash_input.extend_from_slice(SECRET);
    assert_eq!(md5(&hash_input), decoded.authenticator);
}

#[test]
fn user_password_round_trips_for_lengths_up_to_128() {
    for len in [0, 1, 15, 16, 17, 63, 128] {
        let cleartext = vec![b'x'; len];
        let encrypted = encrypt_user_password(&cleartext, SECRET, &REQUEST_AUTHENTICATOR);
        let decrypted = decrypt_user_password(&encrypted, SECRET, &REQUEST_AUTHENTICATOR);
        assert_eq!(decrypted, cleartext, "round trip failed for length {len}");
    }
}

#[test]
fn mschap_v2_nt_response_matches_rfc2759_section_9_1_vector() {
    let auth_challenge: [u8; 16] = [
        0x5B, 0x5D, 0x7C, 0x7D, 0x7B, 0x3F, 0x2F, 0x3E, 0x3C, 0x2C, 0x60, 0x21, 0x32, 0x26, 0x26,
        0x28,
    ];
    let peer_challenge: [u8; 16] = [
        0x21, 0x40, 0x23, 0x24, 0x25, 0x5E, 0x26, 0x2A, 0x28, 0x29, 0x5F, 0x2B, 0x3A, 0x33, 0x7C,
        0x7E,
    ];
    let response =
        mschap::nt_response(&auth_challenge, &peer_challenge, b"User", "clientPass");
    assert_eq!(
        hex::encode_upper(response),
        "82309ECD8D708B5EA08FAA3981CD83544233114A3D85D6DF"
    );
}

#[test]
fn scenario_pap_accept_decrypts_to_the_expected_password() {
    let mut request = Packet::new(Code::AccessRequest, 1, REQUEST_AUTHENTICATOR);
    request.push_string(USER_NAME, "alice");
    let encrypted = encrypt_user_password(b"wonderland", SECRET, &REQUEST_AUTHENTICATOR);
    request.push_attribute(USER_PASSWORD, encrypted);
    let encoded = request.encode();

    let decoded = Packet::decode(&encoded).unwrap();
    assert_eq!(decoded.get_string(USER_NAME).as_deref(), Some("alice"));
    let password = decoded.get(USER_PASSWORD).unwrap();
    let decrypted = decrypt_user_password(password, SECRET, &decoded.authenticator);
    assert_eq!(decrypted, b"wonderland");
}

#[test]
fn scenario_pap_reject_decrypts_to_the_wrong_password() {
    let mut request = Packet::new(Code::AccessRequest, 1, REQUEST_AUTHENTICATOR);
    request.push_string(USER_NAME, "alice");
    let encrypted = encrypt_user_password(b"rabbit", SECRET, &REQUEST_AUTHENTICATOR);
    request.push_attribute(USER_PASSWORD, encrypted);
    let encoded = request.encode();

    let decoded = Packet::decode(&encoded).unwrap();
    let password = decoded.get(USER_PASSWORD).unwrap();
    let decrypted = decrypt_user_password(password, SECRET, &decoded.authenticator);
    assert_ne!(decrypted, b"wonderland");
}

#[test]
fn scenario_chap_accept_response_matches_the_supplied_challenge() {
    let challenge = [0xAAu8; 16];
    let chap_id = 7u8;
    let response = chap_response(chap_id, b"wonderland", &challenge);

    let mut request = Packet::new(Code::AccessRequest, 2, REQUEST_AUTHENTICATOR);
    request.push_string(USER_NAME, "alice");
    let mut chap_password = Vec::with_capacity(17);
    chap_password.push(chap_id);
    chap_password.extend_from_slice(&response);
    request.push_attribute(CHAP_PASSWORD, chap_password);
    request.push_attribute(CHAP_CHALLENGE, challenge.to_vec());
    let encoded = request.encode();

    let decoded = Packet::decode(&encoded).unwrap();
    let chap_password = decoded.get(CHAP_PASSWORD).unwrap();
    let expected = chap_response(chap_password[0], b"wonderland", &challenge);
    assert_eq!(&chap_password[1..], &expected[..]);
}

#[test]
fn multiple_same_code_attributes_take_first_for_scalar_but_keep_all_in_order() {
    let mut packet = Packet::new(Code::AccessRequest, 1, REQUEST_AUTHENTICATOR);
    packet.push_string(USER_NAME, "first");
    packet.push_string(USER_NAME, "second");
    let encoded = packet.encode();

    let decoded = Packet::decode(&encoded).unwrap();
    assert_eq!(decoded.get_string(USER_NAME).as_deref(), Some("first"));
    let all: Vec<_> = decoded.get_all(USER_NAME).map(|v| v.to_vec()).collect();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1], b"second");
}

#[test]
fn maximum_attribute_value_length_round_trips() {
    let value = vec![b'a'; radius_codec::MAX_ATTRIBUTE_VALUE_LEN];
    let mut packet = Packet::new(Code::AccessRequest, 1, REQUEST_AUTHENTICATOR);
    packet.push_attribute(USER_NAME, value.clone());
    let encoded = packet.encode();

    let decoded = Packet::decode(&encoded).unwrap();
    assert_eq!(decoded.get(USER_NAME).unwrap().to_vec(), value);
}
