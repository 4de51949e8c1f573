//! # mailbridge-infobip
//!
//! Infobip email API transport for mailbridge.
//!
//! A [`Message`](mailbridge_message::Message) is turned into an ordered
//! `multipart/form-data` POST against `{base_url}/email/1/send`:
//!
//! | Field | Count | Value |
//! |-------|-------|-------|
//! | `from` | 1 | sender, else first from mailbox (`Name <addr>` or `addr`) |
//! | `subject` | 1 | subject line |
//! | `html` | 1 | HTML body |
//! | `to` | one per recipient | to, then cc, then bcc addresses |
//! | `replyTo` | 0 or 1 | first reply-to address |
//! | `attachment` | one per attachment | file content with filename and content type |
//!
//! Requests carry `Authorization: App <api_key>` and
//! `Accept: application/json`. A successful exchange returns the recipient
//! count; the response body is only parsed on request through
//! [`InfobipTransport::send_with_response`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailbridge_infobip::{InfobipConfig, register};
//! use mailbridge_transport::TransportManager;
//!
//! let manager = TransportManager::new();
//! register(&manager, InfobipConfig::from_env()?);
//!
//! // Constructed here, on first resolution.
//! let transport = manager.transport("infobip")?;
//! let recipients = transport.send(&message).await?;
//! ```
//!
//! ## Configuration
//!
//! | Key | Required | Description |
//! |-----|----------|-------------|
//! | `api_key` | Yes | Infobip API key |
//! | `base_url` | Yes | Account base URL (`https://` assumed without a scheme) |
//! | `http.connect_timeout` | No | Seconds (default: 60) |
//! | `http.timeout` | No | Seconds, whole request |
//! | `http.http_errors` | No | Treat non-2xx as errors (default: true) |
//! | `http.proxy` | No | Proxy URL |
//! | `http.user_agent` | No | `User-Agent` header |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod config;
mod error;
pub mod payload;
mod response;
mod transport;

pub use config::{DEFAULT_CONNECT_TIMEOUT, HttpOptions, InfobipConfig, ValidatedConfig};
pub use error::{Error, Result};
pub use payload::{Field, FieldValue, Payload};
pub use response::{Delivery, MessageResult, MessageStatus, REJECTED_GROUP, SendResponse};
pub use transport::InfobipTransport;

use mailbridge_transport::{Listeners, TransportManager};
use tracing::debug;

/// Registers the `infobip` transport.
///
/// Nothing is validated or built until the transport is first resolved;
/// a missing `api_key` or `base_url` then fails the resolution before any
/// request is made.
pub fn register(manager: &TransportManager, config: InfobipConfig) {
    register_with_listeners(manager, config, Listeners::new());
}

/// Registers the `infobip` transport with send listeners attached to the
/// constructed instance.
pub fn register_with_listeners(
    manager: &TransportManager,
    config: InfobipConfig,
    listeners: Listeners,
) {
    debug!("Registering {} transport", InfobipTransport::NAME);

    manager.extend(InfobipTransport::NAME, move || {
        InfobipTransport::from_config(&config)
            .map(|transport| transport.with_listeners(listeners.clone()))
    });
}
