use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use notify_model::{Event, Severity};

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{post_json, HttpOptions};
use crate::util::involved_ident;
use crate::Notifier;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Sends messages through the Telegram Bot API.
#[derive(Debug)]
pub(crate) struct Telegram {
    url: Url,
    opts: HttpOptions,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage {
    chat_id: String,
    text: String,
}

impl Telegram {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        if config.token.is_empty() {
            return Err(SendError::SecretMissing(
                "telegram provider requires a bot token".into(),
            ));
        }
        if config.channel.is_empty() {
            return Err(SendError::ConfigInvalid(
                "telegram provider requires a chat id in the channel field".into(),
            ));
        }
        let base = if config.address.is_empty() {
            DEFAULT_API_BASE.to_string()
        } else {
            config.address.clone()
        };
        let url = Url::parse(&format!(
            "{}/bot{}/sendMessage",
            base.trim_end_matches('/'),
            config.token
        ))
        .map_err(|e| SendError::ConfigInvalid(format!("invalid telegram address: {e}")))?;
        Ok(Self {
            url,
            opts: config.http_options()?,
            chat_id: config.channel,
        })
    }
}

#[async_trait]
impl Notifier for Telegram {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let emoji = match event.severity {
            Severity::Error => "🚨",
            _ => "💫",
        };
        let mut text = format!("{emoji} {}\n{}", involved_ident(event), event.message);
        for (k, v) in &event.metadata {
            text.push_str(&format!("\n{k}: {v}"));
        }
        let payload = SendMessage {
            chat_id: self.chat_id.clone(),
            text,
        };
        post_json(&self.opts, &self.url, &[], &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_url_embeds_the_token() {
        let config = NotifierConfig {
            token: "123:abc".into(),
            channel: "@flux".into(),
            ..Default::default()
        };
        let telegram = Telegram::new(config).unwrap();
        assert_eq!(
            telegram.url.as_str(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }

    #[test]
    fn chat_id_is_mandatory() {
        let config = NotifierConfig {
            token: "123:abc".into(),
            ..Default::default()
        };
        assert!(matches!(
            Telegram::new(config),
            Err(SendError::ConfigInvalid(_))
        ));
    }
}
