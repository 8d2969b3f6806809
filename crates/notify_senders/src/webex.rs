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
pub(crate) struct Webex {
    url: Url,
    opts: HttpOptions,
    room_id: String,
    token: String,
}

#[derive(Serialize)]
struct WebexPayload {
    #[serde(rename = "roomId")]
    room_id: String,
    markdown: String,
}

impl Webex {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        if config.token.is_empty() {
            return Err(SendError::SecretMissing(
                "webex provider requires a bot token".into(),
            ));
        }
        Ok(Self {
            url: parse_address(&config.address)?,
            opts: config.http_options()?,
            room_id: config.channel,
            token: config.token,
        })
    }
}

#[async_trait]
impl Notifier for Webex {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let mut markdown = format!("**{}**\n\n{}", involved_ident(event), event.message);
        for (k, v) in &event.metadata {
            markdown.push_str(&format!("\n>**{k}**: {v}"));
        }

        let payload = WebexPayload {
            room_id: self.room_id.clone(),
            markdown,
        };
        let headers = vec![("Authorization".to_string(), format!("Bearer {}", self.token))];
        post_json(&self.opts, &self.url, &headers, &payload).await
    }
}
