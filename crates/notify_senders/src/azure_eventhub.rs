use async_trait::async_trait;
use url::Url;

use notify_model::Event;

use crate::error::SendError;
use crate::factory::NotifierConfig;
use crate::transport::{post_json, HttpOptions};
use crate::Notifier;

/// Posts events to an Azure Event Hub over its HTTPS ingestion endpoint.
///
/// The token is a pre-signed SharedAccessSignature for the hub.
#[derive(Debug)]
pub(crate) struct AzureEventHub {
    url: Url,
    opts: HttpOptions,
    sas_token: String,
}

impl AzureEventHub {
    pub(crate) fn new(config: NotifierConfig) -> Result<Self, SendError> {
        if config.token.is_empty() {
            return Err(SendError::SecretMissing(
                "azureeventhub provider requires a shared access signature".into(),
            ));
        }
        let base = Url::parse(&config.address).map_err(|e| {
            SendError::ConfigInvalid(format!("invalid event hub address: {e}"))
        })?;
        let url = Url::parse(&format!(
            "{}/messages?api-version=2014-01",
            base.as_str().trim_end_matches('/')
        ))
        .map_err(|e| SendError::ConfigInvalid(format!("invalid event hub address: {e}")))?;
        Ok(Self {
            url,
            opts: config.http_options()?,
            sas_token: config.token,
        })
    }
}

#[async_trait]
impl Notifier for AzureEventHub {
    async fn post(&self, event: &Event) -> Result<(), SendError> {
        let headers = vec![("Authorization".to_string(), self.sas_token.clone())];
        post_json(&self.opts, &self.url, &headers, event).await
    }
}
