//! Selects the alerts an incoming event should notify.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tokio::sync::Mutex;
use tracing::warn;

use notify_model::{Alert, CrossNamespaceObjectReference, Event, NamespacedName, Severity};
use notify_store::StoreError;

use crate::state::AppState;

/// Compiled exclusion regexes, cached per alert generation so they are not
/// rebuilt on every event.
#[derive(Default)]
pub(crate) struct ExclusionCache {
    inner: Mutex<HashMap<(String, i64), Arc<Vec<Regex>>>>,
}

impl ExclusionCache {
    async fn compiled(&self, alert: &Alert) -> Arc<Vec<Regex>> {
        let key = (cache_key(alert), alert.metadata.generation);
        let mut inner = self.inner.lock().await;
        if let Some(hit) = inner.get(&key) {
            return hit.clone();
        }
        let mut compiled = Vec::with_capacity(alert.spec.exclusion_list.len());
        for expression in &alert.spec.exclusion_list {
            match Regex::new(expression) {
                Ok(regex) => compiled.push(regex),
                // An invalid expression must not exclude events or abort
                // evaluation of the remaining entries.
                Err(err) => warn!(
                    alert = %alert.metadata.namespaced_name(),
                    expression = %expression,
                    error = %err,
                    "failed to compile exclusion regex"
                ),
            }
        }
        let compiled = Arc::new(compiled);
        inner.insert(key, compiled.clone());
        compiled
    }
}

fn cache_key(alert: &Alert) -> String {
    if alert.metadata.uid.is_empty() {
        alert.metadata.namespaced_name().to_string()
    } else {
        alert.metadata.uid.clone()
    }
}

/// All alerts admitting the event, in store order.
pub(crate) async fn alerts_for_event(
    state: &AppState,
    event: &Event,
) -> Result<Vec<Alert>, StoreError> {
    let alerts = state.store.list_alerts().await?;
    let mut results = Vec::new();
    for alert in alerts {
        if alert.spec.suspend {
            continue;
        }
        if !event_matches_sources(state, event, &alert).await {
            continue;
        }
        if message_is_excluded(state, &event.message, &alert).await {
            continue;
        }
        results.push(alert);
    }
    Ok(results)
}

async fn event_matches_sources(state: &AppState, event: &Event, alert: &Alert) -> bool {
    for source in &alert.spec.event_sources {
        let namespace = if source.namespace.is_empty() {
            alert.metadata.namespace.as_str()
        } else {
            source.namespace.as_str()
        };
        if matches_source(state, event, source, namespace, alert.spec.event_severity).await {
            return true;
        }
    }
    false
}

async fn matches_source(
    state: &AppState,
    event: &Event,
    source: &CrossNamespaceObjectReference,
    namespace: &str,
    severity: Severity,
) -> bool {
    if event.involved_object.namespace != namespace || event.involved_object.kind != source.kind {
        return false;
    }

    // `info` subsumes every severity; anything else matches exactly.
    if event.severity != severity && severity != Severity::Info {
        return false;
    }

    if source.name != "*" && source.name != event.involved_object.name {
        return false;
    }

    if source.match_labels.is_empty() {
        return true;
    }

    let object_name = NamespacedName::new(
        event.involved_object.namespace.clone(),
        event.involved_object.name.clone(),
    );
    match state
        .store
        .get_labels(&event.involved_object.kind, &object_name)
        .await
    {
        Ok(labels) => source
            .match_labels
            .iter()
            .all(|(key, value)| labels.get(key) == Some(value)),
        Err(err) => {
            warn!(
                kind = %event.involved_object.kind,
                object = %object_name,
                error = %err,
                "error getting object for label matching"
            );
            false
        }
    }
}

async fn message_is_excluded(state: &AppState, message: &str, alert: &Alert) -> bool {
    if alert.spec.exclusion_list.is_empty() {
        return false;
    }
    state
        .exclusions
        .compiled(alert)
        .await
        .iter()
        .any(|regex| regex.is_match(message))
}
