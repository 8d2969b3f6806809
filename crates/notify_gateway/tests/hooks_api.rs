//! Integration tests for the webhook plane.

mod common;

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use common::{app, receiver, token_secret};
use notify_model::{CrossNamespaceObjectReference, NamespacedName, ReceiverKind};
use notify_store::{MemoryStore, RECONCILE_REQUEST_ANNOTATION};

fn git_repository(name: &str) -> CrossNamespaceObjectReference {
    CrossNamespaceObjectReference {
        kind: "GitRepository".into(),
        name: name.into(),
        ..Default::default()
    }
}

fn sign(token: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(token.as_bytes()).unwrap();
    mac.update(body);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}

async fn seeded_store(kind: ReceiverKind) -> (Arc<MemoryStore>, String) {
    let store = Arc::new(MemoryStore::new());
    let r = receiver("r1", "n1", kind, vec![git_repository("podinfo")]);
    let path = r.webhook_path("t");
    store.insert_receiver(r).await;
    store.insert_secret(token_secret("r1-token", "n1", "t")).await;
    (store, path)
}

#[tokio::test]
async fn derived_digest_routes_to_the_receiver() {
    let (store, path) = seeded_store(ReceiverKind::GenericHmac).await;
    let body = br#"{"ref":"refs/heads/main"}"#.to_vec();
    let signature = sign("t", &body);

    let request = Request::builder()
        .method("POST")
        .uri(&path)
        .header("X-Signature", signature)
        .body(axum::body::Body::from(body))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app(store.clone()), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let annotated = store
        .annotation_of(
            "GitRepository",
            &NamespacedName::new("n1", "podinfo"),
            RECONCILE_REQUEST_ANNOTATION,
        )
        .await;
    assert!(annotated.is_some(), "resource must carry the reconcile request");
}

#[tokio::test]
async fn unknown_digest_is_not_found() {
    let (store, _) = seeded_store(ReceiverKind::Generic).await;
    let response = common::post(app(store), "/hook/deadbeef", Vec::new()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rotated_token_rotates_the_path() {
    let store = Arc::new(MemoryStore::new());
    let r = receiver("r1", "n1", ReceiverKind::Generic, vec![git_repository("podinfo")]);
    let old_path = r.webhook_path("old-token");
    store.insert_receiver(r).await;
    // The store now holds the rotated token.
    store.insert_secret(token_secret("r1-token", "n1", "new-token")).await;

    let response = common::post(app(store), &old_path, Vec::new()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_signature_is_unauthorized() {
    let (store, path) = seeded_store(ReceiverKind::GenericHmac).await;
    let body = br#"{"ref":"refs/heads/main"}"#.to_vec();

    let request = Request::builder()
        .method("POST")
        .uri(&path)
        .header("X-Signature", sign("wrong-token", &body))
        .body(axum::body::Body::from(body))
        .unwrap();
    let response = tower::ServiceExt::oneshot(app(store), request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn gitlab_event_filter_skips_unlisted_events() {
    let store = Arc::new(MemoryStore::new());
    let mut r = receiver("r1", "n1", ReceiverKind::GitLab, vec![git_repository("podinfo")]);
    r.spec.events = vec!["Push Hook".into()];
    let path = r.webhook_path("t");
    store.insert_receiver(r).await;
    store.insert_secret(token_secret("r1-token", "n1", "t")).await;

    let request = Request::builder()
        .method("POST")
        .uri(&path)
        .header("X-Gitlab-Token", "t")
        .header("X-Gitlab-Event", "Tag Push Hook")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app(store.clone()), request)
        .await
        .unwrap();
    // Filtered events acknowledge without annotating anything.
    assert_eq!(response.status(), StatusCode::OK);
    let annotated = store
        .annotation_of(
            "GitRepository",
            &NamespacedName::new("n1", "podinfo"),
            RECONCILE_REQUEST_ANNOTATION,
        )
        .await;
    assert!(annotated.is_none());
}

#[tokio::test]
async fn suspended_receiver_does_not_resolve() {
    let store = Arc::new(MemoryStore::new());
    let mut r = receiver("r1", "n1", ReceiverKind::Generic, vec![git_repository("podinfo")]);
    r.spec.suspend = true;
    let path = r.webhook_path("t");
    store.insert_receiver(r).await;
    store.insert_secret(token_secret("r1-token", "n1", "t")).await;

    let response = common::post(app(store), &path, Vec::new()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn annotation_timestamp_is_rfc3339() {
    let (store, path) = seeded_store(ReceiverKind::Generic).await;
    let response = common::post(app(store.clone()), &path, Vec::new()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let stamped = store
        .annotation_of(
            "GitRepository",
            &NamespacedName::new("n1", "podinfo"),
            RECONCILE_REQUEST_ANNOTATION,
        )
        .await
        .unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(&stamped).is_ok());
}
