use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use notify_model::Event;

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{parse_address, post_json, HttpOptions};
use crate::util::{basic_auth, involved_ident};
use crate::Notifier;

/// Writes events to the Grafana annotations API.
#[derive(Debug)]
pub(crate) struct Grafana {
    url: Url,
    opts: HttpOptions,
    token: String,
    username: String,
    password: String,
}

#[derive(Serialize)]
struct GrafanaAnnotation {
    text: String,
    tags: Vec<String>,
}

impl Grafana {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        let base = parse_address(&config.address)?;
        let url = base
            .join("api/annotations")
            .map_err(|e| SendError::ConfigInvalid(format!("invalid grafana address: {e}")))?;
        Ok(Self {
            url,
            opts: config.http_options()?,
            token: config.token,
            username: config.username,
            password: config.password,
        })
    }
}

#[async_trait]
impl Notifier for Grafana {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let mut tags = vec![
            "flux".to_string(),
            format!("kind: {}", event.involved_object.kind),
            format!("name: {}", event.involved_object.name),
            format!("namespace: {}", event.involved_object.namespace),
        ];
        tags.extend(event.metadata.iter().map(|(k, v)| format!("{k}: {v}")));

        let payload = GrafanaAnnotation {
            text: format!("{}: {}", involved_ident(event), event.message),
            tags,
        };

        let mut headers = Vec::new();
        if !self.token.is_empty() {
            headers.push(("Authorization".to_string(), format!("Bearer {}", self.token)));
        } else if !self.username.is_empty() {
            headers.push(basic_auth(&self.username, &self.password));
        }
        post_json(&self.opts, &self.url, &headers, &payload).await
    }
}
