use std::collections::BTreeMap;

use chrono::Utc;

use notify_model::{Event, InvolvedObject, Severity};

pub(crate) fn sample_event() -> Event {
    Event {
        involved_object: InvolvedObject {
            api_version: "kustomize.toolkit.fluxcd.io/v1".into(),
            kind: "Kustomization".into(),
            namespace: "flux-system".into(),
            name: "podinfo".into(),
            uid: "b0a1c2d3".into(),
            resource_version: "1".into(),
        },
        severity: Severity::Info,
        timestamp: Utc::now(),
        message: "applied revision main@sha1:5394cb7f".into(),
        reason: "ReconciliationSucceeded".into(),
        metadata: BTreeMap::new(),
        reporting_controller: "kustomize-controller".into(),
        reporting_instance: String::new(),
    }
}

pub(crate) fn event_with_revision(revision: &str) -> Event {
    let mut event = sample_event();
    event
        .metadata
        .insert("revision".to_string(), revision.to_string());
    event
}
