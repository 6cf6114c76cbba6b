//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, BytesMut, TryGetError};

/// Extension methods used by the RADIUS codec to read/write IPv4 addresses
/// in the big-endian wire format attributes use.
pub trait BytesMutExt {
    fn put_ipv4(&mut self, addr: &Ipv4Addr);
}

impl BytesMutExt for BytesMut {
    fn put_ipv4(&mut self, addr: &Ipv4Addr) {
        self.put_u32((*addr).into())
    }
}

pub trait BufExt: Buf {
    fn try_get_ipv4(&mut self) -> Result<Ipv4Addr, TryGetError> {
        let bytes = self.try_get_u32()?;
        Ok(Ipv4Addr::from(bytes))
    }
}

impl<T: Buf + ?Sized> BufExt for T {}
