//! Connection pool behaviour against the fake remote client.

mod support;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use orbu_common::MockClock;
use orbu_domain::GatewayError;
use support::remote::{contact_registry, FakeSessionFactory};
use support::{pool_for, IDLE_WINDOW};
use uuid::Uuid;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_requests_share_one_login() {
    let tenant = Uuid::now_v7();
    let factory =
        Arc::new(FakeSessionFactory::new(contact_registry()).with_login_delay(Duration::from_millis(50)));
    let stats = factory.stats();
    let pool = pool_for(&[tenant], factory, Arc::new(MockClock::new()));

    let results = join_all((0..8).map(|_| {
        let pool = Arc::clone(&pool);
        async move { pool.get_connection(tenant).await }
    }))
    .await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(stats.logins(), 1);
    assert_eq!(stats.sessions_created(), 1);

    let first = results[0].as_ref().unwrap();
    for other in &results[1..] {
        assert!(Arc::ptr_eq(first, other.as_ref().unwrap()));
    }
}

#[tokio::test]
async fn tenants_get_independent_sessions() {
    let (a, b) = (Uuid::now_v7(), Uuid::now_v7());
    let factory = Arc::new(FakeSessionFactory::new(contact_registry()));
    let stats = factory.stats();
    let pool = pool_for(&[a, b], factory, Arc::new(MockClock::new()));

    let (first, second) = tokio::join!(pool.get_connection(a), pool.get_connection(b));

    assert!(!Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
    assert_eq!(stats.logins(), 2);
    assert_eq!(pool.pool_status().active_connections, 2);
}

#[tokio::test]
async fn session_reused_just_inside_idle_window() {
    let tenant = Uuid::now_v7();
    let clock = Arc::new(MockClock::new());
    let factory = Arc::new(FakeSessionFactory::new(contact_registry()));
    let stats = factory.stats();
    let pool = pool_for(&[tenant], factory, Arc::clone(&clock));

    let first = pool.get_connection(tenant).await.unwrap();
    clock.advance(IDLE_WINDOW - Duration::from_secs(1));
    let second = pool.get_connection(tenant).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(stats.logins(), 1);
    assert_eq!(stats.logouts(), 0);
}

#[tokio::test]
async fn session_replaced_once_idle_window_elapses() {
    let tenant = Uuid::now_v7();
    let clock = Arc::new(MockClock::new());
    let factory = Arc::new(FakeSessionFactory::new(contact_registry()));
    let stats = factory.stats();
    let pool = pool_for(&[tenant], factory, Arc::clone(&clock));

    let first = pool.get_connection(tenant).await.unwrap();
    clock.advance(IDLE_WINDOW);
    let second = pool.get_connection(tenant).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(stats.logins(), 2);
    assert_eq!(stats.logouts(), 1);
}

#[tokio::test]
async fn each_use_restarts_the_idle_window() {
    let tenant = Uuid::now_v7();
    let clock = Arc::new(MockClock::new());
    let factory = Arc::new(FakeSessionFactory::new(contact_registry()));
    let stats = factory.stats();
    let pool = pool_for(&[tenant], factory, Arc::clone(&clock));

    pool.get_connection(tenant).await.unwrap();
    for _ in 0..3 {
        clock.advance(Duration::from_secs(20 * 60));
        pool.get_connection(tenant).await.unwrap();
    }

    assert_eq!(stats.logins(), 1);
}

#[tokio::test]
async fn disconnect_logs_out_exactly_once() {
    let tenant = Uuid::now_v7();
    let factory = Arc::new(FakeSessionFactory::new(contact_registry()));
    let stats = factory.stats();
    let pool = pool_for(&[tenant], factory, Arc::new(MockClock::new()));

    pool.get_connection(tenant).await.unwrap();

    assert!(pool.disconnect(tenant).await);
    assert!(!pool.disconnect(tenant).await);
    assert_eq!(stats.logouts(), 1);
    assert_eq!(pool.pool_status().active_connections, 0);
}

#[tokio::test]
async fn failed_login_is_not_cached() {
    let tenant = Uuid::now_v7();
    let factory = Arc::new(FakeSessionFactory::new(contact_registry()));
    let stats = factory.stats();
    let pool = pool_for(&[tenant], Arc::clone(&factory), Arc::new(MockClock::new()));

    factory.fail_logins(true);
    let err = pool.get_connection(tenant).await.err().unwrap();
    assert!(matches!(err, GatewayError::ConnectionFailure(_)));
    assert_eq!(err.status_code(), 500);
    assert_eq!(pool.pool_status().active_connections, 0);

    factory.fail_logins(false);
    pool.get_connection(tenant).await.unwrap();
    assert_eq!(stats.logins(), 1);
    assert_eq!(stats.sessions_created(), 2);
}

#[tokio::test]
async fn unknown_tenant_is_not_found() {
    let factory = Arc::new(FakeSessionFactory::new(contact_registry()));
    let stats = factory.stats();
    let pool = pool_for(&[], factory, Arc::new(MockClock::new()));

    let err = pool.get_connection(Uuid::now_v7()).await.err().unwrap();

    assert!(matches!(err, GatewayError::NotFound(_)));
    assert_eq!(stats.sessions_created(), 0);
}

#[tokio::test]
async fn refresh_replaces_the_session() {
    let tenant = Uuid::now_v7();
    let factory = Arc::new(FakeSessionFactory::new(contact_registry()));
    let stats = factory.stats();
    let pool = pool_for(&[tenant], factory, Arc::new(MockClock::new()));

    let first = pool.get_connection(tenant).await.unwrap();
    let second = pool.refresh_connection(tenant).await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(stats.logins(), 2);
    assert_eq!(stats.logouts(), 1);
}

#[tokio::test]
async fn disconnect_all_drains_the_pool() {
    let tenants = [Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7()];
    let factory = Arc::new(FakeSessionFactory::new(contact_registry()));
    let stats = factory.stats();
    let pool = pool_for(&tenants, factory, Arc::new(MockClock::new()));

    for tenant in tenants {
        pool.get_connection(tenant).await.unwrap();
    }

    assert_eq!(pool.disconnect_all().await, 3);
    assert_eq!(stats.logouts(), 3);
    assert_eq!(pool.pool_status().active_connections, 0);
}
