use async_trait::async_trait;
use url::Url;

use notify_model::Event;

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::slack::slack_payload;
use crate::transport::{parse_address, post_json, HttpOptions};
use crate::Notifier;

/// Discord webhooks understand the Slack payload when addressed through
/// their `/slack` compatibility endpoint.
#[derive(Debug)]
pub(crate) struct Discord {
    url: Url,
    opts: HttpOptions,
    username: String,
}

impl Discord {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        let mut url = parse_address(&config.address)?;
        if !url.path().ends_with("/slack") {
            let path = format!("{}/slack", url.path().trim_end_matches('/'));
            url.set_path(&path);
        }
        Ok(Self {
            url,
            opts: config.http_options()?,
            username: config.username,
        })
    }
}

#[async_trait]
impl Notifier for Discord {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        // Discord rejects the channel field on webhook posts.
        let payload = slack_payload(event, "", &self.username);
        post_json(&self.opts, &self.url, &[], &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slack_suffix_is_appended_once() {
        let config = NotifierConfig {
            address: "https://discord.com/api/webhooks/1/abc".into(),
            ..Default::default()
        };
        let discord = Discord::new(config).unwrap();
        assert_eq!(discord.url.path(), "/api/webhooks/1/abc/slack");

        let config = NotifierConfig {
            address: "https://discord.com/api/webhooks/1/abc/slack".into(),
            ..Default::default()
        };
        let discord = Discord::new(config).unwrap();
        assert_eq!(discord.url.path(), "/api/webhooks/1/abc/slack");
    }
}
