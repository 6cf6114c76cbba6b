//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! NAS dispatch, the authentication state machine, the accounting handler
//! and the UDP transport that ties them to a [`radius_db::Store`].

pub mod accounting;
pub mod auth;
pub mod error;
pub mod nas;
pub mod transport;

pub use error::Error;
pub use transport::{Kind, Listener};
