//! Shared test helpers for `orbu-core` integration tests.
//!
//! In-memory adapters for every port plus a registry-backed fake of the
//! remote ERP client, so tests exercise the real pool, executor and
//! retention code without a database or network.

#![allow(dead_code)]

pub mod remote;
pub mod repositories;

use std::sync::Arc;
use std::time::Duration;

use orbu_common::{Clock, MockClock};
use orbu_core::ConnectionPool;
use orbu_domain::TenantId;

use self::remote::{FakeSessionFactory, StaticCredentials};

pub const IDLE_WINDOW: Duration = Duration::from_secs(30 * 60);

/// Pool over the fake remote client for the given tenants.
pub fn pool_for(
    tenants: &[TenantId],
    factory: Arc<FakeSessionFactory>,
    clock: Arc<MockClock>,
) -> Arc<ConnectionPool> {
    let clock: Arc<dyn Clock> = clock;
    Arc::new(ConnectionPool::new(
        Arc::new(StaticCredentials::new(tenants)),
        factory,
        clock,
        IDLE_WINDOW,
    ))
}
