use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use url::Url;

use notify_model::{Event, Severity};

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{parse_address, post_json, HttpOptions};
use crate::util::involved_ident;
use crate::Notifier;

#[derive(Debug)]
pub(crate) struct Lark {
    url: Url,
    opts: HttpOptions,
}

#[derive(Serialize)]
struct LarkPayload {
    msg_type: &'static str,
    content: serde_json::Value,
}

impl Lark {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        Ok(Self {
            url: parse_address(&config.address)?,
            opts: config.http_options()?,
        })
    }
}

#[async_trait]
impl Notifier for Lark {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let emoji = match event.severity {
            Severity::Error => "💥",
            _ => "💫",
        };
        let mut lines = vec![vec![json!({"tag": "text", "text": event.message})]];
        for (k, v) in &event.metadata {
            lines.push(vec![json!({"tag": "text", "text": format!("{k}: {v}")})]);
        }

        let payload = LarkPayload {
            msg_type: "post",
            content: json!({
                "post": {
                    "en_us": {
                        "title": format!("{emoji} {}", involved_ident(event)),
                        "content": lines,
                    }
                }
            }),
        };
        post_json(&self.opts, &self.url, &[], &payload).await
    }
}
