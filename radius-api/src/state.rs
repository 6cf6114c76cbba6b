//
// Copyright (c) The radiusd Contributors
//
// SPDX-License-Identifier: MIT
//

use std::sync::Arc;
use std::time::Instant;

use radius_db::Store;

#[derive(Clone)]
pub struct AppState(Arc<Inner>);

struct Inner {
    pub store: Store,
    pub jwt_secret: Vec<u8>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: Store, jwt_secret: Vec<u8>) -> Self {
        AppState(Arc::new(Inner {
            store,
            jwt_secret,
            started_at: Instant::now(),
        }))
    }

    pub fn store(&self) -> &Store {
        &self.0.store
    }

    pub fn jwt_secret(&self) -> &[u8] {
        &self.0.jwt_secret
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.0.started_at.elapsed().as_secs()
    }
}
