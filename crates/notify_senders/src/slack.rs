use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use notify_model::{Event, Severity};

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{parse_address, post_json, HttpOptions};
use crate::util::involved_ident;
use crate::Notifier;

#[derive(Debug)]
pub(crate) struct Slack {
    url: Url,
    opts: HttpOptions,
    channel: String,
    username: String,
    token: String,
}

#[derive(Serialize)]
pub(crate) struct SlackPayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub channel: String,
    pub username: String,
    pub attachments: Vec<SlackAttachment>,
}

#[derive(Serialize)]
pub(crate) struct SlackAttachment {
    pub color: String,
    pub author_name: String,
    pub text: String,
    pub mrkdwn_in: Vec<String>,
    pub fields: Vec<SlackField>,
}

#[derive(Serialize)]
pub(crate) struct SlackField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

impl Slack {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        let url = parse_address(&config.address)?;
        let opts = config.http_options()?;
        Ok(Self {
            url,
            opts,
            channel: config.channel,
            username: config.username,
            token: config.token,
        })
    }

    /// Rocket.Chat incoming webhooks accept the Slack payload shape.
    pub(crate) fn rocket(config: NotifierConfig) -> Result<Self, SendError> {
        Self::new(config)
    }
}

/// Build the Slack-compatible attachment payload shared by several chat
/// providers.
pub(crate) fn slack_payload(event: &Event, channel: &str, username: &str) -> SlackPayload {
    let username = if username.is_empty() {
        event.reporting_controller.clone()
    } else {
        username.to_string()
    };

    let fields = event
        .metadata
        .iter()
        .map(|(k, v)| SlackField {
            title: k.clone(),
            value: v.clone(),
            short: false,
        })
        .collect();

    SlackPayload {
        channel: channel.to_string(),
        username,
        attachments: vec![SlackAttachment {
            color: severity_color(event.severity).to_string(),
            author_name: involved_ident(event),
            text: event.message.clone(),
            mrkdwn_in: vec!["text".to_string()],
            fields,
        }],
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "danger",
        _ => "good",
    }
}

#[async_trait]
impl Notifier for Slack {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let payload = slack_payload(event, &self.channel, &self.username);
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
    use crate::testutil::sample_event;

    #[test]
    fn payload_carries_identity_message_and_metadata() {
        let mut event = sample_event();
        event.metadata.insert("revision".into(), "main@sha1:5394cb7f".into());

        let payload = slack_payload(&event, "general", "");
        assert_eq!(payload.channel, "general");
        assert_eq!(payload.username, "kustomize-controller");
        let attachment = &payload.attachments[0];
        assert_eq!(attachment.author_name, "flux-system/podinfo.Kustomization");
        assert_eq!(attachment.color, "good");
        assert_eq!(attachment.fields.len(), 1);
    }

    #[test]
    fn error_events_color_danger() {
        let mut event = sample_event();
        event.severity = Severity::Error;
        let payload = slack_payload(&event, "", "flux");
        assert_eq!(payload.attachments[0].color, "danger");
    }
}
