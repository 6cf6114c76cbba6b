//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! RADIUS wire codec: packet header encode/decode, the attribute
//! dictionary, Vendor-Specific Attribute parsing, and the User-Password /
//! Response-Authenticator cryptographic framing defined by RFC 2865/2866.

pub mod attribute;
pub mod dictionary;
pub mod packet;

pub use attribute::Vsa;
pub use packet::{
    decrypt_user_password, encrypt_user_password, Code, Packet, PacketDecodeError,
    HEADER_LEN, MAX_ATTRIBUTE_VALUE_LEN,
};
