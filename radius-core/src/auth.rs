//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Authentication state machine (§4.4): `Idle -> Decoded -> MethodSelected
//! -> Verified{Accept|Reject} -> Sent`. `Decoded` is the caller's
//! responsibility (the transport layer already holds a decoded `Packet`
//! when it calls [`handle`]); this module owns method selection,
//! per-method verification and accept/reject attribute construction.

use bytes::Bytes;
use radius_codec::{dictionary, Code, Packet};
use radius_crypto::{chap, mschap};
use radius_db::{Credential, NasClient, Store};
use tracing::{info, warn};

/// The method a request was resolved to, in the §4.4 selection order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Method {
    MsChapV2,
    MsChap,
    Chap,
    Pap,
}

/// Selects the authentication method for `request`, first match wins.
fn select_method(request: &Packet) -> Option<Method> {
    let has_ms_challenge = request.has_vsa(dictionary::VENDOR_MICROSOFT, dictionary::MS_CHAP_CHALLENGE);
    if has_ms_challenge
        && request.has_vsa(dictionary::VENDOR_MICROSOFT, dictionary::MS_CHAP2_RESPONSE)
    {
        return Some(Method::MsChapV2);
    }
    if has_ms_challenge
        && request.has_vsa(dictionary::VENDOR_MICROSOFT, dictionary::MS_CHAP_RESPONSE)
    {
        return Some(Method::MsChap);
    }
    if request.has(dictionary::CHAP_PASSWORD) {
        return Some(Method::Chap);
    }
    if request.has(dictionary::USER_PASSWORD) {
        return Some(Method::Pap);
    }
    None
}

/// Handles a decoded `Access-Request`, returning the `Access-Accept` or
/// `Access-Reject` to send back. The returned packet's `authenticator`
/// field is a placeholder; the caller computes the real
/// Response-Authenticator with [`Packet::encode_response`] using the
/// request's authenticator and the NAS secret.
pub async fn handle(store: &Store, nas: &NasClient, request: &Packet) -> Packet {
    let username = request.get_string(dictionary::USER_NAME);
    let Some(username) = username else {
        return reject(request, None);
    };

    let method = select_method(request);
    let Some(method) = method else {
        warn!(%username, "no supported authentication method in request");
        return reject(request, Some(&username));
    };

    let user = match store.get_user_by_username(&username).await {
        Ok(user) => user,
        Err(error) => {
            error.log();
            return reject(request, Some(&username));
        }
    };
    let Some(user) = user else {
        warn!(%username, "authentication failed: no such user");
        return reject(request, Some(&username));
    };
    if !user.is_active {
        warn!(%username, "authentication failed: user is inactive");
        return reject(request, Some(&username));
    }
    if let Some(expires_at) = user.expires_at {
        if expires_at < chrono::Utc::now() {
            warn!(%username, "authentication failed: user has expired");
            return reject(request, Some(&username));
        }
    }

    let credential = user.credential();
    let verified = match method {
        Method::Pap => verify_pap(request, nas, &credential),
        Method::Chap => verify_chap(request, &credential, &username),
        Method::MsChap => verify_mschap(request, &credential),
        Method::MsChapV2 => verify_mschap_v2(request, &credential, username.as_bytes()),
    };

    let ms_chap2_success = match &verified {
        Verification::MsChapV2Success(payload) => Some(payload.clone()),
        _ => None,
    };

    if !verified.accepted() {
        warn!(%username, method = ?method, "authentication failed: verification failed");
        return reject(request, Some(&username));
    }

    info!(%username, method = ?method, "authentication succeeded");
    let profile = match store.get_profile_by_name(&user.profile_name).await {
        Ok(profile) => profile,
        Err(error) => {
            error.log();
            None
        }
    };

    let mut response = Packet::new(Code::AccessAccept, request.identifier, [0u8; 16]);
    response.push_string(dictionary::USER_NAME, &username);

    if user.profile_name != radius_db::DEFAULT_PROFILE {
        response.push_string(dictionary::FILTER_ID, &user.profile_name);
        response.push_vsa(
            dictionary::VENDOR_MIKROTIK,
            dictionary::MIKROTIK_GROUP,
            Bytes::copy_from_slice(user.profile_name.as_bytes()),
        );
    }
    if let Some(profile) = &profile {
        if let Some(session_timeout) = profile.session_timeout {
            response.push_u32(dictionary::SESSION_TIMEOUT, session_timeout as u32);
        }
        if let Some(rate_limit) = &profile.rate_limit {
            response.push_vsa(
                dictionary::VENDOR_MIKROTIK,
                dictionary::MIKROTIK_RATE_LIMIT,
                Bytes::copy_from_slice(rate_limit.as_bytes()),
            );
        }
    }
    if let Some(payload) = ms_chap2_success {
        response.push_vsa(dictionary::VENDOR_MICROSOFT, dictionary::MS_CHAP2_SUCCESS, payload);
    }

    response
}

/// Builds an `Access-Reject` echoing `username` if one was decoded.
/// §4.4: no diagnostic attributes are ever attached to a reject.
fn reject(request: &Packet, username: Option<&str>) -> Packet {
    let mut response = Packet::new(Code::AccessReject, request.identifier, [0u8; 16]);
    if let Some(username) = username {
        response.push_string(dictionary::USER_NAME, username);
    }
    response
}

enum Verification {
    Accept,
    Reject,
    MsChapV2Success(Bytes),
}

impl Verification {
    fn accepted(&self) -> bool {
        !matches!(self, Verification::Reject)
    }
}

fn verify_pap(request: &Packet, nas: &NasClient, credential: &Credential) -> Verification {
    let Credential::Cleartext(expected) = credential else {
        warn!("PAP verification requires a cleartext credential, user only has an NT-hash");
        return Verification::Reject;
    };
    let Some(encrypted) = request.get(dictionary::USER_PASSWORD) else {
        return Verification::Reject;
    };
    let decrypted =
        radius_codec::decrypt_user_password(encrypted, nas.secret.as_bytes(), &request.authenticator);
    if decrypted == expected.as_bytes() {
        Verification::Accept
    } else {
        Verification::Reject
    }
}

fn verify_chap(request: &Packet, credential: &Credential, _username: &str) -> Verification {
    let Credential::Cleartext(password) = credential else {
        warn!("CHAP verification requires a cleartext credential, user only has an NT-hash");
        return Verification::Reject;
    };
    let Some(chap_password) = request.get(dictionary::CHAP_PASSWORD) else {
        return Verification::Reject;
    };
    if chap_password.len() != 17 {
        return Verification::Reject;
    }
    let chap_id = chap_password[0];
    let expected = &chap_password[1..17];

    // Open Question 2: absence of CHAP-Challenge falls back to the Request
    // Authenticator, the standards-correct behavior.
    let challenge: Vec<u8> = match request.get(dictionary::CHAP_CHALLENGE) {
        Some(challenge) => challenge.to_vec(),
        None => request.authenticator.to_vec(),
    };

    let computed = chap::chap_response(chap_id, password.as_bytes(), &challenge);
    if computed == expected {
        Verification::Accept
    } else {
        Verification::Reject
    }
}

fn verify_mschap(request: &Packet, credential: &Credential) -> Verification {
    let Credential::Cleartext(password) = credential else {
        warn!("MS-CHAP verification requires a cleartext credential");
        return Verification::Reject;
    };
    let Some(challenge) = request.get_vsa(dictionary::VENDOR_MICROSOFT, dictionary::MS_CHAP_CHALLENGE)
    else {
        return Verification::Reject;
    };
    let Some(ms_response) = request.get_vsa(dictionary::VENDOR_MICROSOFT, dictionary::MS_CHAP_RESPONSE)
    else {
        return Verification::Reject;
    };
    // ident(1) flags(1) LM-Response(24) NT-Response(24)
    if ms_response.len() != 50 || challenge.len() != 8 {
        return Verification::Reject;
    }
    let challenge: [u8; 8] = challenge[..8].try_into().expect("length checked above");
    let nt_response = &ms_response[26..50];

    let computed = mschap::mschap_nt_response(&challenge, password);
    if computed == nt_response {
        Verification::Accept
    } else {
        Verification::Reject
    }
}

fn verify_mschap_v2(request: &Packet, credential: &Credential, username: &[u8]) -> Verification {
    let Credential::Cleartext(password) = credential else {
        warn!("MS-CHAPv2 verification requires a cleartext credential");
        return Verification::Reject;
    };
    let Some(auth_challenge) =
        request.get_vsa(dictionary::VENDOR_MICROSOFT, dictionary::MS_CHAP_CHALLENGE)
    else {
        return Verification::Reject;
    };
    let Some(ms_response) = request.get_vsa(dictionary::VENDOR_MICROSOFT, dictionary::MS_CHAP2_RESPONSE)
    else {
        return Verification::Reject;
    };
    // ident(1) flags(1) PeerChallenge(16) reserved(8) NT-Response(24)
    if ms_response.len() != 50 || auth_challenge.len() != 16 {
        return Verification::Reject;
    }
    let ident = ms_response[0];
    let peer_challenge: [u8; 16] = ms_response[2..18].try_into().expect("length checked above");
    let nt_response = &ms_response[26..50];
    let auth_challenge: [u8; 16] = auth_challenge[..16].try_into().expect("length checked above");

    let computed = mschap::nt_response(&auth_challenge, &peer_challenge, username, password);
    if computed != nt_response {
        return Verification::Reject;
    }

    let auth_response = mschap::authenticator_response(
        password,
        &computed,
        &peer_challenge,
        &auth_challenge,
        username,
    );
    let payload = mschap::format_success_message(ident, &auth_response);
    Verification::MsChapV2Success(Bytes::from(payload))
}

#[cfg(test)]
mod tests {
    use radius_codec::Code;

    use super::*;

    async fn store_with_user(username: &str, credential: Credential) -> Store {
        let store = Store::connect(":memory:").await.unwrap();
        store
            .create_user(username, &credential, radius_db::DEFAULT_PROFILE, None)
            .await
            .unwrap();
        store
    }

    fn nas(secret: &str) -> NasClient {
        NasClient {
            id: 1,
            ip_address: "10.0.0.1".to_string(),
            secret: secret.to_string(),
            name: "router1".to_string(),
            vendor: "generic".to_string(),
            is_active: true,
        }
    }

    #[tokio::test]
    async fn pap_accept() {
        let store = store_with_user("alice", Credential::Cleartext("wonderland".to_string())).await;
        let nas = nas("xyzzy");
        let authenticator = [1u8; 16];
        let mut request = Packet::new(Code::AccessRequest, 1, authenticator);
        request.push_string(dictionary::USER_NAME, "alice");
        let encrypted = radius_codec::encrypt_user_password(
            b"wonderland",
            nas.secret.as_bytes(),
            &authenticator,
        );
        request.push_attribute(dictionary::USER_PASSWORD, Bytes::from(encrypted));

        let response = handle(&store, &nas, &request).await;
        assert_eq!(response.code, Code::AccessAccept);
        assert_eq!(response.identifier, 1);
    }

    #[tokio::test]
    async fn pap_reject_on_wrong_password() {
        let store = store_with_user("alice", Credential::Cleartext("wonderland".to_string())).await;
        let nas = nas("xyzzy");
        let authenticator = [1u8; 16];
        let mut request = Packet::new(Code::AccessRequest, 2, authenticator);
        request.push_string(dictionary::USER_NAME, "alice");
        let encrypted =
            radius_codec::encrypt_user_password(b"rabbit", nas.secret.as_bytes(), &authenticator);
        request.push_attribute(dictionary::USER_PASSWORD, Bytes::from(encrypted));

        let response = handle(&store, &nas, &request).await;
        assert_eq!(response.code, Code::AccessReject);
    }

    #[tokio::test]
    async fn chap_accept_with_explicit_challenge() {
        let store = store_with_user("alice", Credential::Cleartext("wonderland".to_string())).await;
        let nas = nas("xyzzy");
        let mut request = Packet::new(Code::AccessRequest, 3, [0u8; 16]);
        request.push_string(dictionary::USER_NAME, "alice");
        let challenge = [0xAAu8; 16];
        let response_bytes = chap::chap_response(7, b"wonderland", &challenge);
        let mut chap_password = vec![7u8];
        chap_password.extend_from_slice(&response_bytes);
        request.push_attribute(dictionary::CHAP_PASSWORD, Bytes::from(chap_password));
        request.push_attribute(dictionary::CHAP_CHALLENGE, Bytes::copy_from_slice(&challenge));

        let response = handle(&store, &nas, &request).await;
        assert_eq!(response.code, Code::AccessAccept);
    }

    #[tokio::test]
    async fn chap_falls_back_to_request_authenticator_when_challenge_absent() {
        let store = store_with_user("alice", Credential::Cleartext("wonderland".to_string())).await;
        let nas = nas("xyzzy");
        let authenticator = [5u8; 16];
        let mut request = Packet::new(Code::AccessRequest, 4, authenticator);
        request.push_string(dictionary::USER_NAME, "alice");
        let response_bytes = chap::chap_response(7, b"wonderland", &authenticator);
        let mut chap_password = vec![7u8];
        chap_password.extend_from_slice(&response_bytes);
        request.push_attribute(dictionary::CHAP_PASSWORD, Bytes::from(chap_password));

        let response = handle(&store, &nas, &request).await;
        assert_eq!(response.code, Code::AccessAccept);
    }

    #[tokio::test]
    async fn ms_chap_v2_accept_emits_success_vsa() {
        let store = store_with_user("User", Credential::Cleartext("clientPass".to_string())).await;
        let nas = nas("xyzzy");
        let auth_challenge: [u8; 16] = [
            0x5B, 0x5D, 0x7C, 0x7D, 0x7B, 0x3F, 0x2F, 0x3E, 0x3C, 0x2C, 0x60, 0x21, 0x32, 0x26,
            0x26, 0x28,
        ];
        let peer_challenge: [u8; 16] = [
            0x21, 0x40, 0x23, 0x24, 0x25, 0x5E, 0x26, 0x2A, 0x28, 0x29, 0x5F, 0x2B, 0x3A, 0x33,
            0x7C, 0x7E,
        ];
        let nt_response = mschap::nt_response(&auth_challenge, &peer_challenge, b"User", "clientPass");

        let mut request = Packet::new(Code::AccessRequest, 5, [0u8; 16]);
        request.push_string(dictionary::USER_NAME, "User");
        request.push_vsa(
            dictionary::VENDOR_MICROSOFT,
            dictionary::MS_CHAP_CHALLENGE,
            Bytes::copy_from_slice(&auth_challenge),
        );
        let mut ms_response = vec![1u8, 0u8];
        ms_response.extend_from_slice(&peer_challenge);
        ms_response.extend_from_slice(&[0u8; 8]);
        ms_response.extend_from_slice(&nt_response);
        request.push_vsa(
            dictionary::VENDOR_MICROSOFT,
            dictionary::MS_CHAP2_RESPONSE,
            Bytes::from(ms_response),
        );

        let response = handle(&store, &nas, &request).await;
        assert_eq!(response.code, Code::AccessAccept);
        let success = response
            .get_vsa(dictionary::VENDOR_MICROSOFT, dictionary::MS_CHAP2_SUCCESS)
            .unwrap();
        assert!(success.ends_with(b"407A5589115FD0D6209F510FE9C04566932CDA56"));
    }

    #[tokio::test]
    async fn unknown_user_is_rejected() {
        let store = Store::connect(":memory:").await.unwrap();
        let nas = nas("xyzzy");
        let mut request = Packet::new(Code::AccessRequest, 6, [0u8; 16]);
        request.push_string(dictionary::USER_NAME, "ghost");
        request.push_attribute(dictionary::USER_PASSWORD, Bytes::from_static(b"whatever"));

        let response = handle(&store, &nas, &request).await;
        assert_eq!(response.code, Code::AccessReject);
    }

    #[tokio::test]
    async fn no_supported_method_is_rejected() {
        let store = store_with_user("alice", Credential::Cleartext("wonderland".to_string())).await;
        let nas = nas("xyzzy");
        let mut request = Packet::new(Code::AccessRequest, 7, [0u8; 16]);
        request.push_string(dictionary::USER_NAME, "alice");

        let response = handle(&store, &nas, &request).await;
        assert_eq!(response.code, Code::AccessReject);
    }
}
