use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

use notify_model::Event;

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{parse_address, post_json, HttpOptions};
use crate::Notifier;

/// Fires alerts into a Prometheus Alertmanager v2 endpoint.
#[derive(Debug)]
pub(crate) struct AlertManager {
    url: Url,
    opts: HttpOptions,
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PostableAlert {
    status: &'static str,
    labels: BTreeMap<String, String>,
    annotations: BTreeMap<String, String>,
    starts_at: String,
}

impl AlertManager {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        let base = parse_address(&config.address)?;
        let url = if base.path().ends_with("/api/v2/alerts") {
            base
        } else {
            base.join("api/v2/alerts").map_err(|e| {
                SendError::ConfigInvalid(format!("invalid alertmanager address: {e}"))
            })?
        };
        Ok(Self {
            url,
            opts: config.http_options()?,
            token: config.token,
        })
    }
}

#[async_trait]
impl Notifier for AlertManager {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let mut labels = BTreeMap::new();
        labels.insert("alertname".to_string(), format!("Flux{}", event.reason));
        labels.insert("severity".to_string(), event.severity.to_string());
        labels.insert("reason".to_string(), event.reason.clone());
        labels.insert("kind".to_string(), event.involved_object.kind.clone());
        labels.insert("name".to_string(), event.involved_object.name.clone());
        labels.insert(
            "namespace".to_string(),
            event.involved_object.namespace.clone(),
        );
        for (k, v) in &event.metadata {
            labels.insert(k.clone(), v.clone());
        }

        let mut annotations = BTreeMap::new();
        annotations.insert("message".to_string(), event.message.clone());

        let payload = vec![PostableAlert {
            status: "firing",
            labels,
            annotations,
            starts_at: event.timestamp.to_rfc3339(),
        }];

        let mut headers = Vec::new();
        if !self.token.is_empty() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", self.token)));
        }
        post_json(&self.opts, &self.url, &headers, &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_path_is_appended_when_missing() {
        let config = NotifierConfig {
            address: "https://alertmanager.example.com".into(),
            ..Default::default()
        };
        let am = AlertManager::new(config).unwrap();
        assert_eq!(am.url.path(), "/api/v2/alerts");

        let config = NotifierConfig {
            address: "https://alertmanager.example.com/api/v2/alerts".into(),
            ..Default::default()
        };
        let am = AlertManager::new(config).unwrap();
        assert_eq!(am.url.path(), "/api/v2/alerts");
    }
}
