use std::sync::Arc;
use std::time::Duration;

use kubeapi::Services;
use kubeapi_application::{SnapshotCache, shutdown_channel};
use kubeapi_domain::{ClusterIdentity, KubeapiConfig};
use kubeapi_ports::fake::FakeClusterReader;
use kubeapi_ports::{InMemorySnapshotCache, SnapshotCachePort, StaticIdentity};

fn config() -> KubeapiConfig {
    KubeapiConfig::from_yaml(
        r#"
redis:
  addr: 127.0.0.1:6379
  keyPrefix: "kubeapi:cluster:"
sync:
  intervalSecs: 60
  callTimeoutSecs: 5
  ttlSecs: 3600
"#,
    )
    .unwrap()
}

fn services(reader: &FakeClusterReader) -> Services {
    Services::new(
        config(),
        Arc::new(reader.clone()),
        Arc::new(StaticIdentity(
            ClusterIdentity::new("c-42", "prod", "eu-west-1").unwrap(),
        )),
    )
}

#[tokio::test(start_paused = true)]
async fn scheduler_publishes_readable_snapshot() {
    let reader = FakeClusterReader::with_layout(&[("ns1", &["svc-a"]), ("ns2", &[])]);
    let store = InMemorySnapshotCache::new();
    let services = services(&reader);
    let (trigger, shutdown) = shutdown_channel();

    let handle = tokio::spawn(services.scheduler(Arc::new(store.clone())).run(shutdown));
    tokio::time::sleep(Duration::from_secs(1)).await;
    trigger.trigger();
    let stats = handle.await.unwrap();
    assert_eq!(stats.published, 1);

    let cache = services.snapshot_cache(Arc::new(store.clone()));
    let snapshot = cache.fetch("c-42").await.unwrap().expect("snapshot published");
    assert_eq!(snapshot.cluster_region_id, "eu-west-1");
    assert_eq!(snapshot.namespaces.len(), 2);
    assert_eq!(snapshot.services.len(), 1);
    assert_eq!(snapshot.services[0].service_id, "c-42/ns1/svc-a");
    assert!(snapshot.dangling_services().is_empty());
    assert_eq!(store.ttl("kubeapi:cluster:c-42"), Some(Duration::from_secs(3599)));
}

#[tokio::test(start_paused = true)]
async fn partial_failure_is_published_and_live_query_fails() {
    let reader =
        FakeClusterReader::with_layout(&[("ns1", &["a"]), ("broken", &["b"]), ("ns3", &["c"])])
            .failing_services_in("broken");
    let store = InMemorySnapshotCache::new();
    let services = services(&reader);

    let outcome = services
        .scheduler(Arc::new(store.clone()))
        .sync_once(&kubeapi_application::Shutdown::never())
        .await
        .unwrap();
    assert_eq!(outcome.namespaces, 3);
    assert_eq!(outcome.services, 2);

    let live = services.query().get_services().await;
    assert!(!live.is_ok());
    assert!(live.message.contains("broken"));
}

#[tokio::test]
async fn live_query_does_not_read_cache() {
    let reader = FakeClusterReader::new()
        .with_namespace("default", "Active", &["web"])
        .with_namespace("old", "Terminating", &[]);
    let store = InMemorySnapshotCache::new();
    store
        .set_with_ttl("kubeapi:cluster:c-42", b"not json".to_vec(), Duration::from_secs(60))
        .await
        .unwrap();
    let services = services(&reader);

    let namespaces = services.query().get_namespaces().await;
    assert!(namespaces.is_ok());
    assert_eq!(namespaces.data.unwrap().len(), 1);
    assert_eq!(reader.namespace_calls(), 1);

    let cache: SnapshotCache = services.snapshot_cache(Arc::new(store));
    assert!(cache.fetch("c-42").await.is_err());
}
