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
pub(crate) struct MsTeams {
    url: Url,
    opts: HttpOptions,
}

#[derive(Serialize)]
struct MessageCard {
    #[serde(rename = "@type")]
    card_type: &'static str,
    #[serde(rename = "@context")]
    context: &'static str,
    #[serde(rename = "themeColor")]
    theme_color: &'static str,
    summary: String,
    sections: Vec<CardSection>,
}

#[derive(Serialize)]
struct CardSection {
    #[serde(rename = "activityTitle")]
    activity_title: String,
    #[serde(rename = "activitySubtitle")]
    activity_subtitle: String,
    facts: Vec<CardFact>,
}

#[derive(Serialize)]
struct CardFact {
    name: String,
    value: String,
}

impl MsTeams {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        Ok(Self {
            url: parse_address(&config.address)?,
            opts: config.http_options()?,
        })
    }
}

#[async_trait]
impl Notifier for MsTeams {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let ident = involved_ident(event);
        let facts = event
            .metadata
            .iter()
            .map(|(k, v)| CardFact {
                name: k.clone(),
                value: v.clone(),
            })
            .collect();

        let payload = MessageCard {
            card_type: "MessageCard",
            context: "http://schema.org/extensions",
            theme_color: match event.severity {
                Severity::Error => "ff0000",
                _ => "0076d7",
            },
            summary: ident.clone(),
            sections: vec![CardSection {
                activity_title: event.message.clone(),
                activity_subtitle: ident,
                facts,
            }],
        };
        post_json(&self.opts, &self.url, &[], &payload).await
    }
}
