//! The Infobip HTTP transport.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mailbridge_message::Message;
use mailbridge_transport::{Listeners, SendListener, Transport, number_of_recipients};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

use crate::config::InfobipConfig;
use crate::error::Result;
use crate::payload::Payload;
use crate::response::Delivery;

/// Path of the send endpoint, relative to the account base URL.
const SEND_PATH: &str = "email/1/send";

/// Sends messages through the Infobip `/email/1/send` API.
///
/// Stateless after construction; share it behind an `Arc`.
#[derive(Clone)]
pub struct InfobipTransport {
    client: Client,
    api_key: String,
    endpoint: Url,
    http_errors: bool,
    listeners: Listeners,
}

impl InfobipTransport {
    /// Name the transport is registered under.
    pub const NAME: &'static str = "infobip";

    /// Creates a transport from a ready client, API key and base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL cannot be built from `base_url`.
    pub fn new(client: Client, api_key: impl Into<String>, base_url: &Url) -> Result<Self> {
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: send_endpoint(base_url)?,
            http_errors: true,
            listeners: Listeners::new(),
        })
    }

    /// Creates a transport from configuration, applying the default connect
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `api_key` or `base_url` is missing,
    /// or an error if the HTTP client cannot be built.
    pub fn from_config(config: &InfobipConfig) -> Result<Self> {
        let config = config.validate()?;
        let client = config.http.build_client()?;

        Ok(Self::new(client, config.api_key, &config.base_url)?
            .with_http_errors(config.http.http_errors()))
    }

    /// Sets whether non-2xx responses are returned as errors.
    #[must_use]
    pub const fn with_http_errors(mut self, http_errors: bool) -> Self {
        self.http_errors = http_errors;
        self
    }

    /// Registers a send listener.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn SendListener>) -> Self {
        self.listeners.register(listener);
        self
    }

    /// Replaces the send listeners.
    #[must_use]
    pub fn with_listeners(mut self, listeners: Listeners) -> Self {
        self.listeners = listeners;
        self
    }

    /// The full send endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends a message and keeps the provider response.
    ///
    /// The recipient count is the same one [`Transport::send`] returns; the
    /// body is not inspected. Use [`Delivery::provider_response`] to look
    /// for recipients the provider rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if the message has no sender or recipients, the
    /// request fails, or (with `http_errors`) the status is not 2xx.
    pub async fn send_with_response(&self, message: &Message) -> Result<Delivery> {
        let response = self.dispatch(message).await?;
        let status = response.status();
        let body = response.text().await?;

        Ok(Delivery {
            recipients: number_of_recipients(message),
            status,
            body,
        })
    }

    async fn dispatch(&self, message: &Message) -> Result<Response> {
        let payload = Payload::from_message(message)?;
        let attachments = payload.attachment_count();
        let form = payload.into_form()?;

        self.listeners.before_send(message);

        debug!(
            "Sending to {} ({} recipients, {attachments} attachments)",
            self.endpoint,
            number_of_recipients(message),
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, format!("App {}", self.api_key))
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await?;

        debug!("Infobip responded with {}", response.status());

        let response = if self.http_errors {
            response.error_for_status()?
        } else {
            response
        };

        self.listeners.send_performed(message);

        Ok(response)
    }
}

#[async_trait]
impl Transport for InfobipTransport {
    type Error = crate::Error;

    async fn send(&self, message: &Message) -> Result<usize> {
        self.dispatch(message).await?;
        Ok(number_of_recipients(message))
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

impl fmt::Debug for InfobipTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfobipTransport")
            .field("endpoint", &self.endpoint.as_str())
            .field("http_errors", &self.http_errors)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

/// `{base_url}/email/1/send`, keeping any path prefix on the base URL.
fn send_endpoint(base_url: &Url) -> Result<Url> {
    let base = base_url.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/{SEND_PATH}"))?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_send_endpoint() {
        assert_eq!(
            send_endpoint(&url("https://xyz.api.infobip.com")).unwrap().as_str(),
            "https://xyz.api.infobip.com/email/1/send"
        );
        assert_eq!(
            send_endpoint(&url("https://xyz.api.infobip.com/")).unwrap().as_str(),
            "https://xyz.api.infobip.com/email/1/send"
        );
        assert_eq!(
            send_endpoint(&url("http://localhost:8080/proxy/")).unwrap().as_str(),
            "http://localhost:8080/proxy/email/1/send"
        );
    }

    #[test]
    fn test_from_config_missing_base_url() {
        let config = InfobipConfig {
            api_key: Some("secret".into()),
            ..InfobipConfig::default()
        };
        assert!(matches!(
            InfobipTransport::from_config(&config),
            Err(Error::MissingConfig("base_url"))
        ));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let transport =
            InfobipTransport::from_config(&InfobipConfig::new("super-secret", "https://x.test"))
                .unwrap();
        let debug = format!("{transport:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("https://x.test/email/1/send"));
        assert_eq!(Transport::name(&transport), "infobip");
    }

    #[tokio::test]
    async fn test_malformed_message_fails_before_request() {
        // Unroutable; a network attempt would surface as Error::Http.
        let transport =
            InfobipTransport::from_config(&InfobipConfig::new("secret", "http://192.0.2.1:9"))
                .unwrap();

        let message = Message::builder().to("c@y.com".parse().unwrap()).build();
        let err = Transport::send(&transport, &message).await.unwrap_err();
        assert!(matches!(err, Error::MissingSender));
    }
}
