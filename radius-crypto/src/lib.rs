//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! Cryptographic primitives for RADIUS authentication: NT-Hash, CHAP,
//! MS-CHAP and MS-CHAPv2 response/verification, built on the DES, MD4, MD5
//! and SHA-1 block/digest primitives from RustCrypto.

pub mod chap;
pub mod des;
pub mod hash;
pub mod mschap;

pub use hash::nt_hash;
