//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! DES-ECB primitives used to build the MS-CHAP/MS-CHAPv2 NT-Response.
//!
//! RFC 2759 builds a 24-byte response out of three independent DES-ECB
//! encryptions, each keyed from a 7-byte slice of a 16-byte (zero-padded to
//! 21) key. The 7-byte slices aren't valid DES keys on their own: each one is
//! expanded to 8 bytes by spreading its 56 bits across 8 key bytes, the way
//! every MS-CHAP implementation since the original Microsoft RFC has done.

use des::Des;
use des::cipher::{BlockEncrypt, KeyInit};
use des::cipher::generic_array::GenericArray;

/// Expands a 7-byte half-key into the 8-byte form DES expects, with the low
/// bit of each output byte left as a zero parity placeholder.
pub fn des_key_7to8(k7: &[u8; 7]) -> [u8; 8] {
    let mut k8 = [0u8; 8];
    k8[0] = k7[0] >> 1;
    k8[1] = ((k7[0] & 0x01) << 6) | (k7[1] >> 2);
    k8[2] = ((k7[1] & 0x03) << 5) | (k7[2] >> 3);
    k8[3] = ((k7[2] & 0x07) << 4) | (k7[3] >> 4);
    k8[4] = ((k7[3] & 0x0F) << 3) | (k7[4] >> 5);
    k8[5] = ((k7[4] & 0x1F) << 2) | (k7[5] >> 6);
    k8[6] = ((k7[5] & 0x3F) << 1) | (k7[6] >> 7);
    k8[7] = k7[6] & 0x7F;
    for byte in &mut k8 {
        *byte = (*byte << 1) & 0xFE;
    }
    k8
}

/// Encrypts `data` (8 bytes) with the 7-byte DES half-key `key7`.
fn des_encrypt_block(key7: &[u8; 7], data: &[u8; 8]) -> [u8; 8] {
    let key8 = des_key_7to8(key7);
    let cipher = Des::new(GenericArray::from_slice(&key8));
    let mut block = GenericArray::clone_from_slice(data);
    cipher.encrypt_block(&mut block);
    block.into()
}

/// RFC 2759's `DesEncrypt`: zero-pads a 16-byte key to 21 bytes, splits it
/// into three 7-byte halves, and DES-ECB encrypts `data` under each half,
/// concatenating the three 8-byte ciphertexts into the 24-byte NT-Response.
pub fn des_encrypt3(key16: &[u8; 16], data: &[u8; 8]) -> [u8; 24] {
    let mut key21 = [0u8; 21];
    key21[..16].copy_from_slice(key16);

    let mut out = [0u8; 24];
    for (chunk, slot) in key21.chunks_exact(7).zip(out.chunks_exact_mut(8)) {
        let key7: [u8; 7] = chunk.try_into().unwrap();
        slot.copy_from_slice(&des_encrypt_block(&key7, data));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_expansion_sets_low_bit_zero() {
        let k7 = [0xFFu8; 7];
        let k8 = des_key_7to8(&k7);
        assert!(k8.iter().all(|b| b & 0x01 == 0));
    }

    #[test]
    fn encrypt3_produces_24_bytes_from_three_blocks() {
        let key = [0x11u8; 16];
        let data = [0x22u8; 8];
        let out = des_encrypt3(&key, &data);
        assert_eq!(out.len(), 24);
    }
}
