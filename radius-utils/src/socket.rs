//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::SocketAddr;

use tokio::net::UdpSocket;

/// Binds a UDP socket with `SO_REUSEADDR` set, matching the teacher's
/// `bind_reuseaddr` convention for listener sockets that may be rebound
/// across restarts.
pub fn bind_reuseaddr(addr: SocketAddr) -> std::io::Result<UdpSocket> {
    let domain = if addr.is_ipv4() {
        socket2::Domain::IPV4
    } else {
        socket2::Domain::IPV6
    };
    let socket = socket2::Socket::new(
        domain,
        socket2::Type::DGRAM,
        Some(socket2::Protocol::UDP),
    )?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    UdpSocket::from_std(socket.into())
}
