//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Accounting handler (§4.5): dispatches an `Accounting-Request` on
//! `Acct-Status-Type`, reconstructs 64-bit byte counters from the
//! gigaword-paired attributes, and always returns an `Accounting-Response`
//! -- even when the session update itself failed -- so a NAS never
//! retransmits indefinitely (§7 rule 5).

use chrono::Utc;
use radius_codec::{dictionary, Code, Packet};
use radius_db::Store;
use tracing::warn;

const STATUS_START: u32 = 1;
const STATUS_STOP: u32 = 2;
const STATUS_INTERIM_UPDATE: u32 = 3;

/// `logicalBytes = octets + gigawords * 2^32`, both reconstructed
/// independently for the input and output directions.
fn total_octets(octets: Option<u32>, gigawords: Option<u32>) -> i64 {
    let octets = octets.unwrap_or(0) as u64;
    let gigawords = gigawords.unwrap_or(0) as u64;
    (octets + gigawords * (1u64 << 32)) as i64
}

fn status_name(status_type: u32) -> &'static str {
    match status_type {
        STATUS_START => "Start",
        STATUS_STOP => "Stop",
        STATUS_INTERIM_UPDATE => "Interim-Update",
        _ => "Unknown",
    }
}

/// Handles a decoded `Accounting-Request`, returning the
/// `Accounting-Response` to send back. The returned packet's
/// `authenticator` field is a placeholder, as with [`crate::auth::handle`].
pub async fn handle(store: &Store, nas_ip_address: &str, request: &Packet) -> Packet {
    let now = Utc::now();
    let session_id = request.get_string(dictionary::ACCT_SESSION_ID).unwrap_or_default();
    let username = request.get_string(dictionary::USER_NAME).unwrap_or_default();
    let status_type = request.get_u32(dictionary::ACCT_STATUS_TYPE).unwrap_or(0);
    let session_time = request.get_u32(dictionary::ACCT_SESSION_TIME).unwrap_or(0) as i64;
    let input_octets = total_octets(
        request.get_u32(dictionary::ACCT_INPUT_OCTETS),
        request.get_u32(dictionary::ACCT_INPUT_GIGAWORDS),
    );
    let output_octets = total_octets(
        request.get_u32(dictionary::ACCT_OUTPUT_OCTETS),
        request.get_u32(dictionary::ACCT_OUTPUT_GIGAWORDS),
    );

    // The session-row update needs a real Acct-Session-Id to key off of, but
    // the accounting log below is unconditional -- a request with a missing
    // or empty id still gets exactly one row, per §7 rule 5.
    if !session_id.is_empty() {
        let result = match status_type {
            STATUS_START => {
                let framed_ip = request
                    .get_ipv4(dictionary::FRAMED_IP_ADDRESS)
                    .map(|ip| ip.to_string());
                let mac_address = request.get_string(dictionary::CALLING_STATION_ID);
                store
                    .accounting_start(
                        &session_id,
                        &username,
                        nas_ip_address,
                        framed_ip.as_deref(),
                        mac_address.as_deref(),
                        now,
                    )
                    .await
            }
            STATUS_INTERIM_UPDATE => {
                store
                    .accounting_interim(
                        &session_id,
                        &username,
                        nas_ip_address,
                        session_time,
                        input_octets,
                        output_octets,
                        now,
                    )
                    .await
            }
            STATUS_STOP => {
                let terminate_cause = request.get_string(dictionary::ACCT_TERMINATE_CAUSE);
                store
                    .accounting_stop(
                        &session_id,
                        session_time,
                        input_octets,
                        output_octets,
                        terminate_cause.as_deref(),
                        now,
                    )
                    .await
            }
            other => {
                warn!(status_type = other, "accounting request with unrecognized status type");
                Ok(())
            }
        };
        if let Err(error) = result {
            // Store error during accounting: still Ack, per §7 rule 5.
            error.log();
        }
    } else {
        warn!("accounting request with missing or empty Acct-Session-Id");
    }

    if let Err(error) = store
        .append_accounting_record(
            &session_id,
            &username,
            nas_ip_address,
            status_name(status_type),
            session_time,
            input_octets,
            output_octets,
            now,
        )
        .await
    {
        error.log();
    }

    Packet::new(Code::AccountingResponse, request.identifier, [0u8; 16])
}
