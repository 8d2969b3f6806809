use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use notify_model::Event;

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{parse_address, post_json, HttpOptions};
use crate::util::involved_ident;
use crate::Notifier;

#[derive(Debug)]
pub(crate) struct Matrix {
    url: Url,
    opts: HttpOptions,
    token: String,
}

#[derive(Serialize)]
struct MatrixMessage {
    msgtype: &'static str,
    body: String,
}

impl Matrix {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        if config.token.is_empty() {
            return Err(SendError::SecretMissing(
                "matrix provider requires an access token".into(),
            ));
        }
        if config.channel.is_empty() {
            return Err(SendError::ConfigInvalid(
                "matrix provider requires a room id in the channel field".into(),
            ));
        }
        let base = parse_address(&config.address)?;
        let url = base
            .join(&format!(
                "_matrix/client/r0/rooms/{}/send/m.room.message",
                config.channel
            ))
            .map_err(|e| SendError::ConfigInvalid(format!("invalid room id: {e}")))?;
        Ok(Self {
            url,
            opts: config.http_options()?,
            token: config.token,
        })
    }
}

#[async_trait]
impl Notifier for Matrix {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let mut body = format!("{}\n{}", involved_ident(event), event.message);
        for (k, v) in &event.metadata {
            body.push_str(&format!("\n{k}: {v}"));
        }
        let payload = MatrixMessage {
            msgtype: "m.text",
            body,
        };
        let headers = vec![("Authorization".to_string(), format!("Bearer {}", self.token))];
        post_json(&self.opts, &self.url, &headers, &payload).await
    }
}
