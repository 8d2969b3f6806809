use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

use notify_model::Event;

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{parse_address, post_json, HttpOptions};
use crate::util::involved_ident;
use crate::Notifier;

/// Opsgenie caps alert messages at 130 characters.
const MESSAGE_LIMIT: usize = 130;

#[derive(Debug)]
pub(crate) struct Opsgenie {
    url: Url,
    opts: HttpOptions,
    token: String,
}

#[derive(Serialize)]
struct OpsgenieAlert {
    message: String,
    description: String,
    details: BTreeMap<String, String>,
}

impl Opsgenie {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        if config.token.is_empty() {
            return Err(SendError::SecretMissing(
                "opsgenie provider requires an API key".into(),
            ));
        }
        Ok(Self {
            url: parse_address(&config.address)?,
            opts: config.http_options()?,
            token: config.token,
        })
    }
}

#[async_trait]
impl Notifier for Opsgenie {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let mut details = event.metadata.clone();
        details.insert("severity".to_string(), event.severity.to_string());
        details.insert("involvedObject".to_string(), involved_ident(event));

        let payload = OpsgenieAlert {
            message: event.message.chars().take(MESSAGE_LIMIT).collect(),
            description: event.message.clone(),
            details,
        };
        let headers = vec![(
            "Authorization".to_string(),
            format!("GenieKey {}", self.token),
        )];
        post_json(&self.opts, &self.url, &headers, &payload).await
    }
}
