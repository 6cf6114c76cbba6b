//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! UDP transport (§5): one socket for Access-Request traffic, one for
//! Accounting-Request traffic. Each receive loop dispatches one task per
//! datagram -- there is no per-request state to synchronize across
//! packets, so a `JoinSet` of ephemeral tasks is enough; `radius_utils::Task`
//! is reserved for the loop itself, which is a single long-lived task per
//! listener, not the per-datagram fan-out.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use radius_codec::{Code, Packet};
use radius_db::Store;
use tokio::net::UdpSocket;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::error::IoError;
use crate::{accounting, auth, nas};

/// Datagrams larger than this are not valid RADIUS (the wire Length field
/// is 16 bits), so the read buffer never needs to be bigger.
const MAX_DATAGRAM_LEN: usize = 4096;

/// How long [`Listener::shutdown`] waits for in-flight handler tasks to
/// finish before abandoning them, per §5's recommended grace period.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    Authentication,
    Accounting,
}

/// Owns a bound UDP socket and drives its receive loop until
/// [`Listener::shutdown`] is called.
pub struct Listener {
    kind: Kind,
    local_addr: SocketAddr,
    task: radius_utils::task::Task<()>,
    stop: Arc<tokio::sync::Notify>,
}

impl Listener {
    /// Binds `addr` and spawns its receive loop.
    pub fn spawn(kind: Kind, addr: SocketAddr, store: Arc<Store>) -> Result<Self, IoError> {
        let socket = radius_utils::socket::bind_reuseaddr(addr).map_err(IoError::UdpBindError)?;
        let local_addr = socket.local_addr().map_err(IoError::UdpBindError)?;
        let stop = Arc::new(tokio::sync::Notify::new());
        let stop_signal = stop.clone();
        let task = radius_utils::task::Task::spawn(receive_loop(kind, socket, store, stop_signal));
        Ok(Listener { kind, local_addr, task, stop })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signals the receive loop to stop accepting new datagrams and drain
    /// in-flight handlers, then waits (bounded by the grace period) for it
    /// to finish. If the grace period elapses first, dropping the still
    /// running `Task` aborts it.
    pub async fn shutdown(self) {
        self.stop.notify_one();
        if timeout(SHUTDOWN_GRACE_PERIOD, self.task).await.is_err() {
            warn!(kind = ?self.kind, "listener did not drain within the grace period");
        }
    }
}

async fn receive_loop(
    kind: Kind,
    socket: UdpSocket,
    store: Arc<Store>,
    stop: Arc<tokio::sync::Notify>,
) {
    let socket = Arc::new(socket);
    let mut handlers = JoinSet::new();
    let mut buf = vec![0u8; MAX_DATAGRAM_LEN];

    loop {
        tokio::select! {
            biased;
            _ = stop.notified() => break,
            result = socket.recv_from(&mut buf) => {
                match result {
                    Ok((len, source)) => {
                        let datagram = buf[..len].to_vec();
                        let socket = socket.clone();
                        let store = store.clone();
                        handlers.spawn(async move {
                            dispatch(kind, socket, store, source, datagram).await;
                        });
                    }
                    Err(error) => {
                        IoError::UdpRecvError(error).log();
                    }
                }
            }
        }
        // Bound the handler set's memory footprint: reap finished tasks
        // opportunistically instead of only at shutdown.
        while handlers.try_join_next().is_some() {}
    }

    let drained = timeout(SHUTDOWN_GRACE_PERIOD, async {
        while handlers.join_next().await.is_some() {}
    })
    .await
    .is_ok();
    if !drained {
        warn!(kind = ?kind, remaining = handlers.len(), "abandoning in-flight handlers past the shutdown grace period");
    }
}

async fn dispatch(
    kind: Kind,
    socket: Arc<UdpSocket>,
    store: Arc<Store>,
    source: SocketAddr,
    datagram: Vec<u8>,
) {
    let nas = match nas::resolve(&store, source.ip()).await {
        Ok(nas) => nas,
        Err(error) => {
            error.log();
            return;
        }
    };

    let request = match Packet::decode(&datagram) {
        Ok(packet) => packet,
        Err(error) => {
            crate::error::Error::from(error).log();
            return;
        }
    };

    let response = match (kind, request.code) {
        (Kind::Authentication, Code::AccessRequest) => auth::handle(&store, &nas, &request).await,
        (Kind::Accounting, Code::AccountingRequest) => {
            if !request.verify_accounting_authenticator(nas.secret.as_bytes()) {
                debug!(%source, "dropping accounting request with invalid Request Authenticator");
                return;
            }
            accounting::handle(&store, &nas.ip_address, &request).await
        }
        _ => {
            debug!(%source, code = ?request.code, "dropping datagram of unexpected code for this listener");
            return;
        }
    };

    let encoded = response.encode_response(&request.authenticator, nas.secret.as_bytes());
    if let Err(error) = socket.send_to(&encoded, source).await {
        IoError::UdpSendError(error).log();
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use radius_codec::dictionary;
    use radius_db::Credential;

    use super::*;

    #[tokio::test]
    async fn pap_access_request_round_trips_over_udp() {
        let store = Arc::new(Store::connect(":memory:").await.unwrap());
        store
            .create_nas("127.0.0.1", "xyzzy", "router1", "generic")
            .await
            .unwrap();
        store
            .create_user(
                "alice",
                &Credential::Cleartext("wonderland".to_string()),
                radius_db::DEFAULT_PROFILE,
                None,
            )
            .await
            .unwrap();

        let listener =
            Listener::spawn(Kind::Authentication, "127.0.0.1:0".parse().unwrap(), store)
                .unwrap();
        let server_addr = listener.local_addr();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(server_addr).await.unwrap();

        let authenticator = [9u8; 16];
        let mut request = Packet::new(Code::AccessRequest, 42, authenticator);
        request.push_string(dictionary::USER_NAME, "alice");
        let encrypted =
            radius_codec::encrypt_user_password(b"wonderland", b"xyzzy", &authenticator);
        request.push_attribute(dictionary::USER_PASSWORD, Bytes::from(encrypted));
        client.send(&request.encode()).await.unwrap();

        let mut buf = [0u8; 4096];
        let len = timeout(Duration::from_secs(1), client.recv(&mut buf))
            .await
            .expect("response within timeout")
            .unwrap();
        let response = Packet::decode(&buf[..len]).unwrap();
        assert_eq!(response.code, Code::AccessAccept);
        assert_eq!(response.identifier, 42);

        listener.shutdown().await;
    }

    #[tokio::test]
    async fn datagram_from_unregistered_nas_gets_no_reply() {
        let store = Arc::new(Store::connect(":memory:").await.unwrap());
        let listener =
            Listener::spawn(Kind::Authentication, "127.0.0.1:0".parse().unwrap(), store)
                .unwrap();
        let server_addr = listener.local_addr();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client.connect(server_addr).await.unwrap();
        let request = Packet::new(Code::AccessRequest, 1, [0u8; 16]);
        client.send(&request.encode()).await.unwrap();

        let mut buf = [0u8; 4096];
        let result = timeout(Duration::from_millis(200), client.recv(&mut buf)).await;
        assert!(result.is_err(), "expected no reply for an unknown NAS");

        listener.shutdown().await;
    }
}
