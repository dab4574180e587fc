//! Gateway runtime - dependency wiring for the SQLite-backed gateway

use std::sync::Arc;
use std::time::Duration;

use orbu_common::{Clock, SystemClock};
use orbu_core::{
    ConnectionPool, CredentialResolver, EndpointExecutor, EndpointRegistrar, EndpointResolver,
    ExecutionLog, LogRetentionService, SchemaIntrospector, ServiceDeployer, SessionFactory,
};
use orbu_domain::{GatewayConfig, Result};
use tracing::{error, info, warn};

use crate::database::{
    DbManager, SqliteEndpointRepository, SqliteExecutionLog, SqliteTenantRepository,
};
use crate::scheduling::{RetentionScheduler, RetentionSchedulerConfig};

/// Every gateway service, wired against one database.
pub struct GatewayRuntime {
    pub config: GatewayConfig,
    pub db: Arc<DbManager>,
    pub tenants: Arc<SqliteTenantRepository>,
    pub endpoints: Arc<SqliteEndpointRepository>,
    pub executions: Arc<SqliteExecutionLog>,
    pub pool: Arc<ConnectionPool>,
    pub executor: Arc<EndpointExecutor>,
    pub deployer: Arc<ServiceDeployer>,
    pub introspector: SchemaIntrospector,
    pub retention: Arc<LogRetentionService>,
    retention_scheduler: Option<RetentionScheduler>,
}

impl GatewayRuntime {
    /// Open the database, apply migrations and build the services.
    ///
    /// The retention scheduler is started when enabled in `config`.
    pub async fn build(config: GatewayConfig, session_factory: Arc<dyn SessionFactory>) -> Result<Self> {
        let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
        db.run_migrations()?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let tenants = Arc::new(SqliteTenantRepository::new(Arc::clone(&db)));
        let endpoints = Arc::new(SqliteEndpointRepository::new(Arc::clone(&db)));
        let executions = Arc::new(SqliteExecutionLog::new(Arc::clone(&db)));

        let pool = Arc::new(ConnectionPool::new(
            Arc::clone(&tenants) as Arc<dyn CredentialResolver>,
            session_factory,
            Arc::clone(&clock),
            Duration::from_secs(config.pool.idle_timeout_secs),
        ));
        let executor = Arc::new(EndpointExecutor::new(
            Arc::clone(&endpoints) as Arc<dyn EndpointResolver>,
            Arc::clone(&pool),
            Arc::clone(&executions) as Arc<dyn ExecutionLog>,
            Arc::clone(&clock),
        ));
        let deployer = Arc::new(ServiceDeployer::new(
            Arc::clone(&pool),
            Arc::clone(&endpoints) as Arc<dyn EndpointRegistrar>,
        ));
        let retention = Arc::new(LogRetentionService::new(
            Arc::clone(&endpoints) as Arc<dyn EndpointResolver>,
            Arc::clone(&executions) as Arc<dyn ExecutionLog>,
            clock,
        ));

        let retention_scheduler = if config.retention.enabled {
            let mut scheduler = RetentionScheduler::new(
                RetentionSchedulerConfig::from(&config.retention),
                Arc::clone(&retention),
            );
            scheduler.start().await.inspect_err(|err| {
                error!(error = %err, "failed to start retention scheduler");
            })?;
            Some(scheduler)
        } else {
            info!("Log retention scheduler disabled");
            None
        };

        info!(db_path = %db.path().display(), "Gateway runtime ready");

        Ok(Self {
            config,
            db,
            tenants,
            endpoints,
            executions,
            pool,
            executor,
            deployer,
            introspector: SchemaIntrospector::new(),
            retention,
            retention_scheduler,
        })
    }

    pub fn retention_scheduler_running(&self) -> bool {
        self.retention_scheduler.as_ref().is_some_and(RetentionScheduler::is_running)
    }

    /// Stop the retention scheduler and log out every pooled session.
    pub async fn shutdown(&mut self) {
        if let Some(mut scheduler) = self.retention_scheduler.take() {
            if let Err(err) = scheduler.stop().await {
                warn!(error = %err, "Retention scheduler did not stop cleanly");
            }
        }

        let disconnected = self.pool.disconnect_all().await;
        info!(disconnected, "Gateway runtime shut down");
    }
}
