//! Fake remote ERP client built on the method registry.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use orbu_core::{
    CredentialResolver, InvocationError, MethodRegistry, Parameters, RegistrySession,
    RemoteSession, SessionAuthenticator, SessionFactory,
};
use orbu_domain::{GatewayError, Result, TenantConnectionParams, TenantId};
use serde_json::{json, Value};

/// Login/logout counters shared by every session a factory creates.
#[derive(Debug, Default)]
pub struct RemoteStats {
    pub sessions_created: AtomicUsize,
    pub logins: AtomicUsize,
    pub logouts: AtomicUsize,
}

impl RemoteStats {
    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }

    pub fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::SeqCst)
    }
}

struct CountingAuthenticator {
    stats: Arc<RemoteStats>,
    login_delay: Duration,
    fail_login: bool,
}

#[async_trait]
impl SessionAuthenticator for CountingAuthenticator {
    async fn login(&self) -> Result<()> {
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }
        if self.fail_login {
            return Err(GatewayError::ExecutionError("invalid credentials".into()));
        }
        self.stats.logins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn logout(&self) -> Result<()> {
        self.stats.logouts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Creates registry-backed sessions and counts their logins.
pub struct FakeSessionFactory {
    registry: Arc<MethodRegistry>,
    stats: Arc<RemoteStats>,
    login_delay: Duration,
    fail_logins: AtomicBool,
}

impl FakeSessionFactory {
    pub fn new(registry: MethodRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            stats: Arc::new(RemoteStats::default()),
            login_delay: Duration::ZERO,
            fail_logins: AtomicBool::new(false),
        }
    }

    pub fn with_login_delay(mut self, delay: Duration) -> Self {
        self.login_delay = delay;
        self
    }

    pub fn fail_logins(&self, fail: bool) {
        self.fail_logins.store(fail, Ordering::SeqCst);
    }

    pub fn stats(&self) -> Arc<RemoteStats> {
        Arc::clone(&self.stats)
    }
}

impl SessionFactory for FakeSessionFactory {
    fn create(&self, _params: &TenantConnectionParams) -> Result<Arc<dyn RemoteSession>> {
        self.stats.sessions_created.fetch_add(1, Ordering::SeqCst);
        let authenticator = CountingAuthenticator {
            stats: Arc::clone(&self.stats),
            login_delay: self.login_delay,
            fail_login: self.fail_logins.load(Ordering::SeqCst),
        };
        Ok(Arc::new(RegistrySession::new(Arc::clone(&self.registry), Arc::new(authenticator))))
    }
}

/// Resolves credentials for a fixed set of tenants.
pub struct StaticCredentials {
    tenants: HashSet<TenantId>,
}

impl StaticCredentials {
    pub fn new(tenants: &[TenantId]) -> Self {
        Self { tenants: tenants.iter().copied().collect() }
    }
}

#[async_trait]
impl CredentialResolver for StaticCredentials {
    async fn resolve(&self, tenant_id: TenantId) -> Result<TenantConnectionParams> {
        if !self.tenants.contains(&tenant_id) {
            return Err(GatewayError::NotFound(format!("Tenant not found: {tenant_id}")));
        }
        Ok(TenantConnectionParams::new(tenant_id, "https://erp.test", "Company", "admin", "secret"))
    }
}

/// Registry with a `Contact` and a `SalesOrder` service.
pub fn contact_registry() -> MethodRegistry {
    let mut registry = MethodRegistry::new();
    registry
        .register(
            "Contact",
            "get_list(filter: str, top: int = 100) -> list[Contact]",
            |params: Parameters| async move {
                let filter = params.get("filter").cloned().unwrap_or(Value::Null);
                Ok::<_, InvocationError>(json!([{"id": "C-1", "filter": filter}]))
            },
        )
        .unwrap()
        .register("Contact", "get_by_id(id: str) -> Contact", |params: Parameters| async move {
            let id = params.get("id").cloned().unwrap_or(Value::Null);
            Ok::<_, InvocationError>(json!({"id": id, "name": "Acme"}))
        })
        .unwrap()
        .register("Contact", "count() -> int", |_params: Parameters| async {
            Ok::<_, InvocationError>(json!(3))
        })
        .unwrap()
        .register("Contact", "archive(id: str) -> bool", |_params: Parameters| async {
            Err::<Value, _>(InvocationError::Remote("record is locked".into()))
        })
        .unwrap()
        .register("SalesOrder", "get_by_id(id: str) -> SalesOrder", |_params: Parameters| async {
            Ok::<_, InvocationError>(json!({"id": "SO-1"}))
        })
        .unwrap();
    registry
}
