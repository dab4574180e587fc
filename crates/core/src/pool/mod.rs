//! Per-tenant remote session pool
//!
//! Sessions are cached by tenant and replaced once they sit unused longer
//! than the idle window. Each tenant has its own async lock held across the
//! credential lookup and login, so concurrent first requests for the same
//! tenant share one login while different tenants never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use orbu_common::Clock;
use orbu_domain::{GatewayError, PoolStatus, PooledConnectionInfo, Result, TenantId};
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument, warn};

use crate::session_ports::{CredentialResolver, RemoteSession, SessionFactory};

struct PooledSession {
    session: Arc<dyn RemoteSession>,
    last_used: Instant,
}

type SessionSlot = Arc<AsyncMutex<Option<PooledSession>>>;

/// Tenant session cache with idle expiry.
pub struct ConnectionPool {
    credentials: Arc<dyn CredentialResolver>,
    factory: Arc<dyn SessionFactory>,
    clock: Arc<dyn Clock>,
    idle_window: Duration,
    slots: DashMap<TenantId, SessionSlot>,
    // Wall-clock last use per cached tenant, read by `pool_status` without
    // touching the per-tenant locks.
    activity: Mutex<HashMap<TenantId, DateTime<Utc>>>,
}

impl ConnectionPool {
    pub fn new(
        credentials: Arc<dyn CredentialResolver>,
        factory: Arc<dyn SessionFactory>,
        clock: Arc<dyn Clock>,
        idle_window: Duration,
    ) -> Self {
        Self {
            credentials,
            factory,
            clock,
            idle_window,
            slots: DashMap::new(),
            activity: Mutex::new(HashMap::new()),
        }
    }

    pub fn idle_window(&self) -> Duration {
        self.idle_window
    }

    /// Return a logged-in session for `tenant_id`, reusing a fresh cached one.
    ///
    /// A cached session idle for at least the idle window is logged out
    /// (best effort) and replaced. Nothing is cached when credentials or
    /// login fail.
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn get_connection(&self, tenant_id: TenantId) -> Result<Arc<dyn RemoteSession>> {
        let slot = self.slot(tenant_id);
        let mut cached = slot.lock().await;

        let now = self.clock.now();
        if let Some(pooled) = cached.as_mut() {
            if now.saturating_duration_since(pooled.last_used) < self.idle_window {
                pooled.last_used = now;
                self.touch(tenant_id);
                debug!("Reusing pooled session");
                return Ok(Arc::clone(&pooled.session));
            }
        }

        if let Some(stale) = cached.take() {
            info!("Pooled session expired, reconnecting");
            self.forget(tenant_id);
            logout_best_effort(tenant_id, stale.session.as_ref()).await;
        }

        let session = self.open_session(tenant_id).await?;
        *cached = Some(PooledSession { session: Arc::clone(&session), last_used: self.clock.now() });
        self.touch(tenant_id);

        info!("Opened new session");
        Ok(session)
    }

    /// Drop the cached session for a tenant, logging it out.
    ///
    /// Returns `true` when a session was cached.
    #[instrument(skip(self), fields(tenant_id = %tenant_id))]
    pub async fn disconnect(&self, tenant_id: TenantId) -> bool {
        let Some(slot) = self.slots.get(&tenant_id).map(|entry| Arc::clone(entry.value())) else {
            return false;
        };

        let mut cached = slot.lock().await;
        let Some(pooled) = cached.take() else {
            return false;
        };

        self.forget(tenant_id);
        logout_best_effort(tenant_id, pooled.session.as_ref()).await;
        info!("Disconnected session");
        true
    }

    /// Replace the cached session for a tenant with a new one.
    pub async fn refresh_connection(&self, tenant_id: TenantId) -> Result<Arc<dyn RemoteSession>> {
        self.disconnect(tenant_id).await;
        self.get_connection(tenant_id).await
    }

    /// Log out every cached session. Returns how many were dropped.
    pub async fn disconnect_all(&self) -> usize {
        let tenants: Vec<TenantId> = self.slots.iter().map(|entry| *entry.key()).collect();

        let mut disconnected = 0;
        for tenant_id in tenants {
            if self.disconnect(tenant_id).await {
                disconnected += 1;
            }
        }

        info!(disconnected, "Disconnected all pooled sessions");
        disconnected
    }

    /// Snapshot of cached sessions. May lag concurrent connects by one call.
    pub fn pool_status(&self) -> PoolStatus {
        let now = self.clock.utc_now();
        let activity = self.activity.lock();

        let mut connections: Vec<PooledConnectionInfo> = activity
            .iter()
            .map(|(tenant_id, last_used_at)| PooledConnectionInfo {
                tenant_id: *tenant_id,
                last_used_at: *last_used_at,
                age_minutes: (now - *last_used_at).num_milliseconds().max(0) as f64 / 60_000.0,
            })
            .collect();
        connections.sort_by_key(|info| info.tenant_id);

        PoolStatus { active_connections: connections.len(), connections }
    }

    fn slot(&self, tenant_id: TenantId) -> SessionSlot {
        self.slots.entry(tenant_id).or_insert_with(|| Arc::new(AsyncMutex::new(None))).clone()
    }

    fn touch(&self, tenant_id: TenantId) {
        self.activity.lock().insert(tenant_id, self.clock.utc_now());
    }

    fn forget(&self, tenant_id: TenantId) {
        self.activity.lock().remove(&tenant_id);
    }

    async fn open_session(&self, tenant_id: TenantId) -> Result<Arc<dyn RemoteSession>> {
        let params = self.credentials.resolve(tenant_id).await.map_err(|err| match err {
            GatewayError::NotFound(_) | GatewayError::ConnectionFailure(_) => err,
            other => GatewayError::ConnectionFailure(format!(
                "Failed to resolve credentials for tenant {tenant_id}: {other}"
            )),
        })?;

        let session = self.factory.create(&params).map_err(|err| {
            GatewayError::ConnectionFailure(format!(
                "Failed to create session for tenant {tenant_id}: {err}"
            ))
        })?;

        session.login().await.map_err(|err| {
            warn!(error = %err, "Login failed");
            GatewayError::ConnectionFailure(format!("Failed to login to tenant {tenant_id}: {err}"))
        })?;

        Ok(session)
    }
}

async fn logout_best_effort(tenant_id: TenantId, session: &dyn RemoteSession) {
    if let Err(err) = session.logout().await {
        warn!(tenant_id = %tenant_id, error = %err, "Logout failed, dropping session anyway");
    }
}
