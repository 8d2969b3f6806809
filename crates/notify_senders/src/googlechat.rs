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
pub(crate) struct GoogleChat {
    url: Url,
    opts: HttpOptions,
}

#[derive(Serialize)]
struct ChatCardPayload {
    cards: Vec<Card>,
}

#[derive(Serialize)]
struct Card {
    header: CardHeader,
    sections: Vec<Section>,
}

#[derive(Serialize)]
struct CardHeader {
    title: String,
    subtitle: String,
}

#[derive(Serialize)]
struct Section {
    widgets: Vec<Widget>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Widget {
    TextParagraph {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    KeyValue {
        top_label: String,
        content: String,
    },
}

impl GoogleChat {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        Ok(Self {
            url: parse_address(&config.address)?,
            opts: config.http_options()?,
        })
    }
}

#[async_trait]
impl Notifier for GoogleChat {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let mut sections = vec![Section {
            widgets: vec![Widget::TextParagraph {
                text: event.message.clone(),
            }],
        }];
        if !event.metadata.is_empty() {
            sections.push(Section {
                widgets: event
                    .metadata
                    .iter()
                    .map(|(k, v)| Widget::KeyValue {
                        top_label: k.clone(),
                        content: v.clone(),
                    })
                    .collect(),
            });
        }

        let payload = ChatCardPayload {
            cards: vec![Card {
                header: CardHeader {
                    title: event.reason.clone(),
                    subtitle: involved_ident(event),
                },
                sections,
            }],
        };
        post_json(&self.opts, &self.url, &[], &payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_serialization_uses_chat_field_names() {
        let widget = Widget::KeyValue {
            top_label: "revision".into(),
            content: "main@sha1:5394cb7f".into(),
        };
        let json = serde_json::to_value(&widget).unwrap();
        assert!(json.get("keyValue").is_some());
        assert_eq!(json["keyValue"]["topLabel"], "revision");
    }
}
