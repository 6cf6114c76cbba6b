//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::IpAddr;

use tracing::warn;

// RADIUS core errors. Every variant here is a "drop the packet, keep
// serving" condition (§7's taxonomy); nothing in this crate is fatal except
// the socket bind failures surfaced directly by `transport::Listener::spawn`.
#[derive(Debug)]
pub enum Error {
    IoError(IoError),
    UnknownNas(IpAddr),
    InactiveNas(IpAddr),
    MalformedPacket(radius_codec::PacketDecodeError),
    StoreError(radius_db::Error),
}

#[derive(Debug)]
pub enum IoError {
    UdpBindError(std::io::Error),
    UdpRecvError(std::io::Error),
    UdpSendError(std::io::Error),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::IoError(error) => error.log(),
            Error::UnknownNas(addr) => {
                warn!(%addr, "{}", self);
            }
            Error::InactiveNas(addr) => {
                warn!(%addr, "{}", self);
            }
            Error::MalformedPacket(error) => {
                warn!(error = %with_source(error), "{}", self);
            }
            Error::StoreError(error) => {
                tracing::error!(error = %with_source(error), "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(error) => error.fmt(f),
            Error::UnknownNas(..) => write!(f, "datagram from unregistered NAS"),
            Error::InactiveNas(..) => write!(f, "datagram from inactive NAS"),
            Error::MalformedPacket(..) => write!(f, "failed to decode RADIUS packet"),
            Error::StoreError(..) => write!(f, "store operation failed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(error) => Some(error),
            Error::MalformedPacket(error) => Some(error),
            Error::StoreError(error) => Some(error),
            Error::UnknownNas(..) | Error::InactiveNas(..) => None,
        }
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl From<radius_codec::PacketDecodeError> for Error {
    fn from(error: radius_codec::PacketDecodeError) -> Error {
        Error::MalformedPacket(error)
    }
}

impl From<radius_db::Error> for Error {
    fn from(error: radius_db::Error) -> Error {
        Error::StoreError(error)
    }
}

// ===== impl IoError =====

impl IoError {
    pub fn log(&self) {
        match self {
            IoError::UdpBindError(error) => {
                tracing::error!(error = %with_source(error), "{}", self);
            }
            IoError::UdpRecvError(error) | IoError::UdpSendError(error) => {
                warn!(error = %with_source(error), "{}", self);
            }
        }
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::UdpBindError(..) => write!(f, "failed to bind UDP socket"),
            IoError::UdpRecvError(..) => write!(f, "failed to receive UDP datagram"),
            IoError::UdpSendError(..) => write!(f, "failed to send UDP datagram"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::UdpBindError(error)
            | IoError::UdpRecvError(error)
            | IoError::UdpSendError(error) => Some(error),
        }
    }
}

fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}
