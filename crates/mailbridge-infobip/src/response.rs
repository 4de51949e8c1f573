//! Send results and the Infobip response body.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Status group Infobip assigns to messages it refused.
pub const REJECTED_GROUP: &str = "REJECTED";

/// Outcome of one send request.
///
/// `recipients` is the to + cc + bcc count of the message, the same value
/// [`Transport::send`](mailbridge_transport::Transport::send) returns. The
/// response body is kept as-is; nothing about it affects `recipients`.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Number of recipients the message was addressed to.
    pub recipients: usize,
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Raw response body.
    pub body: String,
}

impl Delivery {
    /// Parses the response body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not an Infobip send response.
    pub fn provider_response(&self) -> Result<SendResponse> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Body of a `/email/1/send` response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    /// Bulk identifier, present when several messages were created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bulk_id: Option<String>,
    /// Per-recipient results.
    #[serde(default)]
    pub messages: Vec<MessageResult>,
}

impl SendResponse {
    /// Recipients whose message landed in the `REJECTED` status group.
    pub fn rejected_recipients(&self) -> impl Iterator<Item = &str> {
        self.messages
            .iter()
            .filter(|message| message.status.group_name == REJECTED_GROUP)
            .map(|message| message.to.as_str())
    }
}

/// Result for one recipient.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResult {
    /// Recipient address.
    pub to: String,
    /// Message identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Delivery status.
    pub status: MessageStatus,
}

/// Infobip message status.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageStatus {
    /// Status group id.
    pub group_id: i64,
    /// Status group name, e.g. `PENDING` or `REJECTED`.
    pub group_name: String,
    /// Status id.
    pub id: i64,
    /// Status name, e.g. `PENDING_ACCEPTED`.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
