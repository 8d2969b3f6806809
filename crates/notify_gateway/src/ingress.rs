//! Ingress plane: decodes reported events and schedules deliveries.

use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use tracing::{error, info};

use notify_model::{Alert, Event, NamespacedName};
use notify_senders::redact::mask_token;
use notify_senders::SendError;

use crate::matcher;
use crate::notifiers::build_notifier;
use crate::state::AppState;

/// Deadline for the matching phase; deliveries get their own.
const MATCH_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) async fn handle_event(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let mut event: Event = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            error!(error = %err, "decoding the request body failed");
            return StatusCode::BAD_REQUEST;
        }
    };
    if event.involved_object.kind.is_empty() || event.involved_object.namespace.is_empty() {
        error!("event is missing the involved object kind or namespace");
        return StatusCode::BAD_REQUEST;
    }

    cleanup_metadata(&mut event);

    let alerts = match tokio::time::timeout(
        MATCH_TIMEOUT,
        matcher::alerts_for_event(&state, &event),
    )
    .await
    {
        Ok(Ok(alerts)) => alerts,
        Ok(Err(err)) => {
            error!(error = %err, "failed to get alerts for the event");
            Vec::new()
        }
        Err(_) => {
            error!("matching timed out");
            Vec::new()
        }
    };

    if alerts.is_empty() {
        info!(
            kind = %event.involved_object.kind,
            name = %event.involved_object.name,
            namespace = %event.involved_object.namespace,
            "Discarding event, no alerts found for the involved object"
        );
        return StatusCode::ACCEPTED;
    }

    info!(
        kind = %event.involved_object.kind,
        name = %event.involved_object.name,
        namespace = %event.involved_object.namespace,
        "Dispatching event: {}", event.message
    );

    for alert in &alerts {
        if let Err(err) = dispatch_notification(&state, &event, alert).await {
            error!(
                provider = %alert.spec.provider_ref.name,
                namespace = %alert.metadata.namespace,
                error_kind = err.kind(),
                error = %err,
                "failed to dispatch notification to provider"
            );
        }
    }

    StatusCode::ACCEPTED
}

/// Build the alert's notifier and hand the event to a detached delivery
/// task. The handler never awaits the delivery; cancelling the client
/// connection must not abort a partially fanned-out dispatch.
async fn dispatch_notification(
    state: &AppState,
    event: &Event,
    alert: &Alert,
) -> Result<(), SendError> {
    if state.no_cross_namespace_refs
        && event.involved_object.namespace != alert.metadata.namespace
    {
        return Err(SendError::ConfigInvalid(format!(
            "alert '{}' can't process event from '{}/{}/{}', cross-namespace references have been blocked",
            alert.metadata.namespaced_name(),
            event.involved_object.kind,
            event.involved_object.namespace,
            event.involved_object.name,
        )));
    }

    let provider_name = NamespacedName::new(
        alert.metadata.namespace.clone(),
        alert.spec.provider_ref.name.clone(),
    );
    let provider = state
        .store
        .get_provider(&provider_name)
        .await
        .map_err(|e| SendError::Internal(format!("failed to read provider: {e}")))?;

    if provider.spec.suspend {
        return Ok(());
    }

    let timeout = provider.timeout();
    let (notifier, token) = build_notifier(state.store.as_ref(), &provider).await?;

    let mut notification = event.clone();
    if let Some(summary) = &alert.spec.summary {
        notification
            .metadata
            .insert("summary".to_string(), summary.clone());
    }

    tokio::spawn(async move {
        let outcome = tokio::time::timeout(timeout, notifier.post(&notification)).await;
        let err = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err,
            Err(_) => SendError::RemoteUnavailable(format!(
                "delivery timed out after {}s",
                timeout.as_secs()
            )),
        };
        error!(
            kind = %notification.involved_object.kind,
            name = %notification.involved_object.name,
            namespace = %notification.involved_object.namespace,
            error_kind = err.kind(),
            error = %mask_token(&err.to_string(), &token),
            "failed to send notification"
        );
    });

    Ok(())
}

/// Keep only metadata entries namespaced by the involved object's group,
/// dropping the checksum entry and stripping the group prefix.
///
/// Keys without any prefix are kept as-is, which makes the pass idempotent:
/// applying it to already-cleaned metadata changes nothing.
fn cleanup_metadata(event: &mut Event) {
    let group = event.involved_object.group().to_string();
    let prefix = format!("{group}/");
    let checksum_key = format!("{group}/checksum");

    let metadata = std::mem::take(&mut event.metadata);
    event.metadata = metadata
        .into_iter()
        .filter_map(|(key, value)| {
            if key.eq_ignore_ascii_case(&checksum_key) {
                None
            } else if let Some(stripped) = key.strip_prefix(&prefix) {
                Some((stripped.to_string(), value))
            } else if !key.contains('/') {
                Some((key, value))
            } else {
                None
            }
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use notify_model::{InvolvedObject, Severity};

    use super::*;

    fn event_with_metadata(metadata: BTreeMap<String, String>) -> Event {
        Event {
            involved_object: InvolvedObject {
                api_version: "helm.toolkit.fluxcd.io/v2beta1".into(),
                kind: "HelmRelease".into(),
                namespace: "ns1".into(),
                name: "podinfo".into(),
                uid: "uid".into(),
                resource_version: "1".into(),
            },
            severity: Severity::Info,
            timestamp: Utc::now(),
            message: "install ok".into(),
            reason: "InstallSucceeded".into(),
            metadata,
            reporting_controller: "helm-controller".into(),
            reporting_instance: String::new(),
        }
    }

    #[test]
    fn cleanup_keeps_group_keys_and_drops_the_rest() {
        let mut event = event_with_metadata(BTreeMap::from([
            ("helm.toolkit.fluxcd.io/revision".to_string(), "1.0".to_string()),
            ("helm.toolkit.fluxcd.io/checksum".to_string(), "abc".to_string()),
            ("other/x".to_string(), "y".to_string()),
        ]));
        cleanup_metadata(&mut event);
        assert_eq!(
            event.metadata,
            BTreeMap::from([("revision".to_string(), "1.0".to_string())])
        );
    }

    #[test]
    fn cleanup_is_idempotent() {
        let mut event = event_with_metadata(BTreeMap::from([
            ("helm.toolkit.fluxcd.io/revision".to_string(), "1.0".to_string()),
            ("other/x".to_string(), "y".to_string()),
        ]));
        cleanup_metadata(&mut event);
        let after_first = event.metadata.clone();
        cleanup_metadata(&mut event);
        assert_eq!(event.metadata, after_first);
        assert_eq!(
            after_first,
            BTreeMap::from([("revision".to_string(), "1.0".to_string())])
        );
    }

    #[test]
    fn cleanup_leaves_no_group_separator_in_keys() {
        let mut event = event_with_metadata(BTreeMap::from([
            ("helm.toolkit.fluxcd.io/revision".to_string(), "1.0".to_string()),
            ("helm.toolkit.fluxcd.io/summary".to_string(), "hi".to_string()),
        ]));
        cleanup_metadata(&mut event);
        assert!(event
            .metadata
            .keys()
            .all(|key| !key.contains("helm.toolkit.fluxcd.io")));
    }
}
