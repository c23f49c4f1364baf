//! Scripted cluster reader for tests.

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Service};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::ClusterReaderPort;

pub const FAKE_CREATED_AT: &str = "2024-03-05T07:08:09Z";

pub fn namespace(name: &str, phase: &str) -> Namespace {
    serde_json::from_value(json!({
        "metadata": { "name": name, "creationTimestamp": FAKE_CREATED_AT },
        "status": { "phase": phase },
    }))
    .expect("valid namespace fixture")
}

pub fn service(namespace: &str, name: &str) -> Service {
    serde_json::from_value(json!({
        "metadata": {
            "name": name,
            "namespace": namespace,
            "creationTimestamp": FAKE_CREATED_AT,
        },
        "spec": {
            "type": "ClusterIP",
            "clusterIP": "10.96.0.10",
            "ports": [
                { "name": "http", "protocol": "TCP", "port": 80, "targetPort": 8080 },
            ],
            "selector": { "app": name },
        },
    }))
    .expect("valid service fixture")
}

#[derive(Default)]
struct Counters {
    version_calls: AtomicUsize,
    namespace_calls: AtomicUsize,
    service_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// In-memory cluster with optional per-namespace failures and latency.
#[derive(Clone, Default)]
pub struct FakeClusterReader {
    version: Option<String>,
    namespaces: Vec<Namespace>,
    services: HashMap<String, Vec<Service>>,
    failing_namespaces: HashSet<String>,
    fail_namespace_list: bool,
    latency: Option<Duration>,
    counters: Arc<Counters>,
}

impl FakeClusterReader {
    pub fn new() -> Self {
        Self {
            version: Some("v1.30.2".to_string()),
            ..Self::default()
        }
    }

    /// Active namespaces, each with the named services.
    pub fn with_layout(layout: &[(&str, &[&str])]) -> Self {
        layout
            .iter()
            .fold(Self::new(), |reader, (ns, services)| {
                reader.with_namespace(ns, "Active", services)
            })
    }

    pub fn with_namespace(mut self, name: &str, phase: &str, services: &[&str]) -> Self {
        self.namespaces.push(namespace(name, phase));
        self.services.insert(
            name.to_string(),
            services.iter().map(|svc| service(name, svc)).collect(),
        );
        self
    }

    pub fn failing_services_in(mut self, namespace: &str) -> Self {
        self.failing_namespaces.insert(namespace.to_string());
        self
    }

    pub fn failing_namespace_list(mut self) -> Self {
        self.fail_namespace_list = true;
        self
    }

    pub fn without_version(mut self) -> Self {
        self.version = None;
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn version_calls(&self) -> usize {
        self.counters.version_calls.load(Ordering::SeqCst)
    }

    pub fn namespace_calls(&self) -> usize {
        self.counters.namespace_calls.load(Ordering::SeqCst)
    }

    pub fn service_calls(&self) -> usize {
        self.counters.service_calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were ever running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.counters.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> InFlight<'_> {
        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlight(&self.counters);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        guard
    }
}

struct InFlight<'a>(&'a Counters);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ClusterReaderPort for FakeClusterReader {
    async fn server_version(&self) -> Result<String> {
        self.counters.version_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.enter().await;
        self.version
            .clone()
            .ok_or_else(|| anyhow!("version endpoint unavailable"))
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        self.counters.namespace_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.enter().await;
        if self.fail_namespace_list {
            bail!("namespaces is forbidden");
        }
        Ok(self.namespaces.clone())
    }

    async fn list_services(&self, namespace: &str) -> Result<Vec<Service>> {
        self.counters.service_calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.enter().await;
        if self.failing_namespaces.contains(namespace) {
            bail!("services is forbidden in namespace {namespace}");
        }
        Ok(self.services.get(namespace).cloned().unwrap_or_default())
    }
}
