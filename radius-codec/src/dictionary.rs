//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Read-only attribute dictionary: code/name lookup for the standard
//! attributes this server understands, plus the vendor table for the two
//! Vendor-Specific Attribute spaces it parses (Microsoft, MikroTik).
//!
//! The dictionary never reflects on runtime attribute values; it is purely a
//! naming aid for logs and the admin API. Decoding never fails on an unknown
//! code -- unrecognized attributes are kept as raw values.

/// Standard (non-vendor) attribute codes this server has a name for.
pub const USER_NAME: u8 = 1;
pub const USER_PASSWORD: u8 = 2;
pub const CHAP_PASSWORD: u8 = 3;
pub const NAS_IP_ADDRESS: u8 = 4;
pub const NAS_PORT: u8 = 5;
pub const SERVICE_TYPE: u8 = 6;
pub const FRAMED_PROTOCOL: u8 = 7;
pub const FRAMED_IP_ADDRESS: u8 = 8;
pub const FILTER_ID: u8 = 11;
pub const VENDOR_SPECIFIC: u8 = 26;
pub const SESSION_TIMEOUT: u8 = 27;
pub const CALLED_STATION_ID: u8 = 30;
pub const CALLING_STATION_ID: u8 = 31;
pub const NAS_IDENTIFIER: u8 = 32;
pub const ACCT_STATUS_TYPE: u8 = 40;
pub const ACCT_INPUT_OCTETS: u8 = 42;
pub const ACCT_OUTPUT_OCTETS: u8 = 43;
pub const ACCT_SESSION_ID: u8 = 44;
pub const ACCT_SESSION_TIME: u8 = 46;
pub const ACCT_TERMINATE_CAUSE: u8 = 49;
pub const ACCT_INPUT_GIGAWORDS: u8 = 52;
pub const ACCT_OUTPUT_GIGAWORDS: u8 = 53;
pub const CHAP_CHALLENGE: u8 = 60;

/// Vendor-Id values for the two Vendor-Specific Attribute spaces in scope.
pub const VENDOR_MICROSOFT: u32 = 311;
pub const VENDOR_MIKROTIK: u32 = 14988;

/// Microsoft (311) vendor-type codes.
pub const MS_CHAP_RESPONSE: u8 = 1;
pub const MS_CHAP_ERROR: u8 = 2;
pub const MS_CHAP_CHALLENGE: u8 = 11;
pub const MS_CHAP2_RESPONSE: u8 = 25;
pub const MS_CHAP2_SUCCESS: u8 = 26;

/// MikroTik (14988) vendor-type codes.
pub const MIKROTIK_GROUP: u8 = 3;
pub const MIKROTIK_RATE_LIMIT: u8 = 8;

/// Returns the human-readable name of a standard attribute code, if known.
pub fn name_of(code: u8) -> Option<&'static str> {
    let name = match code {
        USER_NAME => "User-Name",
        USER_PASSWORD => "User-Password",
        CHAP_PASSWORD => "CHAP-Password",
        NAS_IP_ADDRESS => "NAS-IP-Address",
        NAS_PORT => "NAS-Port",
        SERVICE_TYPE => "Service-Type",
        FRAMED_PROTOCOL => "Framed-Protocol",
        FRAMED_IP_ADDRESS => "Framed-IP-Address",
        FILTER_ID => "Filter-Id",
        VENDOR_SPECIFIC => "Vendor-Specific",
        SESSION_TIMEOUT => "Session-Timeout",
        CALLED_STATION_ID => "Called-Station-Id",
        CALLING_STATION_ID => "Calling-Station-Id",
        NAS_IDENTIFIER => "NAS-Identifier",
        ACCT_STATUS_TYPE => "Acct-Status-Type",
        ACCT_INPUT_OCTETS => "Acct-Input-Octets",
        ACCT_OUTPUT_OCTETS => "Acct-Output-Octets",
        ACCT_SESSION_ID => "Acct-Session-Id",
        ACCT_SESSION_TIME => "Acct-Session-Time",
        ACCT_TERMINATE_CAUSE => "Acct-Terminate-Cause",
        ACCT_INPUT_GIGAWORDS => "Acct-Input-Gigawords",
        ACCT_OUTPUT_GIGAWORDS => "Acct-Output-Gigawords",
        CHAP_CHALLENGE => "CHAP-Challenge",
        _ => return None,
    };
    Some(name)
}

/// Returns the human-readable name of a vendor attribute `(vendor_id, type)`
/// pair, if known.
pub fn vendor_name_of(vendor_id: u32, vendor_type: u8) -> Option<&'static str> {
    let name = match (vendor_id, vendor_type) {
        (VENDOR_MICROSOFT, MS_CHAP_RESPONSE) => "MS-CHAP-Response",
        (VENDOR_MICROSOFT, MS_CHAP_ERROR) => "MS-CHAP-Error",
        (VENDOR_MICROSOFT, MS_CHAP_CHALLENGE) => "MS-CHAP-Challenge",
        (VENDOR_MICROSOFT, MS_CHAP2_RESPONSE) => "MS-CHAP2-Response",
        (VENDOR_MICROSOFT, MS_CHAP2_SUCCESS) => "MS-CHAP2-Success",
        (VENDOR_MIKROTIK, MIKROTIK_GROUP) => "Mikrotik-Group",
        (VENDOR_MIKROTIK, MIKROTIK_RATE_LIMIT) => "Mikrotik-Rate-Limit",
        _ => return None,
    };
    Some(name)
}
