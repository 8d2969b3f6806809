//! Shared fixtures for the gateway integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use chrono::Utc;
use tower::ServiceExt;

use notify_gateway::{build_router, AppState};
use notify_model::{
    Alert, AlertSpec, CrossNamespaceObjectReference, Event, InvolvedObject, LocalObjectReference,
    ObjectMeta, Provider, ProviderKind, ProviderSpec, Receiver, ReceiverKind, ReceiverSpec, Secret,
    Severity,
};
use notify_store::MemoryStore;

pub fn app(store: Arc<MemoryStore>) -> Router {
    build_router(AppState::new(store, false))
}

pub fn app_without_cross_namespace(store: Arc<MemoryStore>) -> Router {
    build_router(AppState::new(store, true))
}

pub async fn post(router: Router, path: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    router.oneshot(request).await.unwrap()
}

pub async fn post_event(router: Router, event: &Event) -> StatusCode {
    post(router, "/", serde_json::to_vec(event).unwrap())
        .await
        .status()
}

pub fn meta(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: name.into(),
        namespace: namespace.into(),
        uid: format!("{namespace}-{name}-uid"),
        generation: 1,
        ..Default::default()
    }
}

pub fn event(kind: &str, namespace: &str, name: &str) -> Event {
    Event {
        involved_object: InvolvedObject {
            api_version: "helm.toolkit.fluxcd.io/v2beta1".into(),
            kind: kind.into(),
            namespace: namespace.into(),
            name: name.into(),
            uid: "obj-uid".into(),
            resource_version: "1".into(),
        },
        severity: Severity::Info,
        timestamp: Utc::now(),
        message: "install ok".into(),
        reason: "InstallSucceeded".into(),
        metadata: BTreeMap::new(),
        reporting_controller: "helm-controller".into(),
        reporting_instance: String::new(),
    }
}

pub fn alert(namespace: &str, provider: &str, kind: &str) -> Alert {
    Alert {
        metadata: meta("on-call", namespace),
        spec: AlertSpec {
            provider_ref: LocalObjectReference {
                name: provider.into(),
            },
            event_sources: vec![CrossNamespaceObjectReference {
                kind: kind.into(),
                name: "*".into(),
                ..Default::default()
            }],
            event_severity: Severity::Info,
            exclusion_list: Vec::new(),
            summary: None,
            suspend: false,
        },
        status: Default::default(),
    }
}

pub fn provider(name: &str, namespace: &str, kind: ProviderKind, address: &str) -> Provider {
    Provider {
        metadata: meta(name, namespace),
        spec: ProviderSpec {
            kind,
            interval: None,
            channel: String::new(),
            username: String::new(),
            address: address.into(),
            timeout_secs: None,
            proxy: String::new(),
            secret_ref: None,
            cert_secret_ref: None,
            suspend: false,
        },
        status: Default::default(),
    }
}

pub fn receiver(
    name: &str,
    namespace: &str,
    kind: ReceiverKind,
    resources: Vec<CrossNamespaceObjectReference>,
) -> Receiver {
    Receiver {
        metadata: meta(name, namespace),
        spec: ReceiverSpec {
            kind,
            interval: None,
            events: Vec::new(),
            resources,
            secret_ref: LocalObjectReference {
                name: format!("{name}-token"),
            },
            suspend: false,
        },
        status: Default::default(),
    }
}

pub fn token_secret(name: &str, namespace: &str, token: &str) -> Secret {
    let mut secret = Secret::default();
    secret.metadata = meta(name, namespace);
    secret.data.insert("token".into(), token.as_bytes().to_vec());
    secret
}

/// Wait until the stub endpoint has received `expected` calls, or fail.
///
/// Deliveries run on detached tasks after the handler already answered, so
/// assertions on the stub must poll.
pub async fn await_hits(mock: &httpmock::Mock<'_>, expected: usize) {
    for _ in 0..100 {
        if mock.hits() >= expected {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    panic!(
        "stub endpoint received {} calls, expected {expected}",
        mock.hits()
    );
}
