//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

//! NAS registry lookup (§4.3): every inbound datagram is attributed to a
//! NAS client by its UDP source address alone, never by a `NAS-IP-Address`
//! or `NAS-Identifier` attribute carried in the payload.

use std::net::IpAddr;

use radius_db::{NasClient, Store};

use crate::error::Error;

/// Looks up the NAS client for `source_ip`. Per §4.3, both an unregistered
/// source and a registered-but-inactive one get the same "drop, do not
/// reply" treatment at the call site; they are kept as distinct error
/// variants here only so the caller's log line says which happened.
pub async fn resolve(store: &Store, source_ip: IpAddr) -> Result<NasClient, Error> {
    let nas = store.get_nas_by_ip(&source_ip.to_string()).await?;
    match nas {
        None => Err(Error::UnknownNas(source_ip)),
        Some(nas) if !nas.is_active => Err(Error::InactiveNas(source_ip)),
        Some(nas) => Ok(nas),
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    async fn store() -> Store {
        Store::connect(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn unknown_source_is_rejected() {
        let store = store().await;
        let addr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 99));
        assert!(matches!(resolve(&store, addr).await, Err(Error::UnknownNas(_))));
    }

    #[tokio::test]
    async fn inactive_nas_is_rejected() {
        let store = store().await;
        store
            .create_nas("10.0.0.1", "xyzzy", "router1", "generic")
            .await
            .unwrap();
        store
            .update_nas("10.0.0.1", None, None, Some(false))
            .await
            .unwrap();
        let addr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        assert!(matches!(resolve(&store, addr).await, Err(Error::InactiveNas(_))));
    }

    #[tokio::test]
    async fn active_nas_resolves() {
        let store = store().await;
        store
            .create_nas("10.0.0.1", "xyzzy", "router1", "generic")
            .await
            .unwrap();
        let addr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1));
        let nas = resolve(&store, addr).await.unwrap();
        assert_eq!(nas.secret, "xyzzy");
    }
}
