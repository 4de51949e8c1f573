//! Message to multipart payload translation.
//!
//! The Infobip `/email/1/send` endpoint takes `multipart/form-data` with
//! repeated fields instead of arrays. Field order:
//!
//! ```text
//! from, subject, html, to (one per recipient), replyTo (optional),
//! attachment (one per attachment)
//! ```

use bytes::Bytes;
use mailbridge_message::{Address, ContentType, Message};
use reqwest::Body;
use reqwest::multipart::{Form, Part};
use tracing::warn;

use crate::error::{Error, Result};

const OCTET_STREAM: &str = "application/octet-stream";

/// Filename used for attachments that have none.
const DEFAULT_FILENAME: &str = "attachment";

/// Value of one multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Plain text field.
    Text(String),
    /// File field.
    File {
        /// Raw file content.
        content: Bytes,
        /// Filename sent in the `Content-Disposition` header.
        filename: String,
        /// Content type of the file part.
        content_type: ContentType,
    },
}

/// One named multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Form field name.
    pub name: &'static str,
    /// Field value.
    pub value: FieldValue,
}

impl Field {
    fn text(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: FieldValue::Text(value.into()),
        }
    }
}

/// Ordered multipart fields for one send request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    fields: Vec<Field>,
}

impl Payload {
    /// Builds the payload for a message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSender`] if the message has neither a sender
    /// nor a from address, or [`Error::NoRecipients`] if it has no to, cc
    /// or bcc addresses.
    pub fn from_message(message: &Message) -> Result<Self> {
        let from = from_field(message)?;

        let recipients = recipients(message);
        if recipients.is_empty() {
            return Err(Error::NoRecipients);
        }

        let mut fields = vec![
            Field::text("from", from),
            Field::text("subject", message.subject()),
            Field::text("html", message.html_body()),
        ];

        fields.extend(recipients.into_iter().map(|to| Field::text("to", to.as_str())));

        if let Some(reply_to) = reply_to_field(message) {
            fields.push(Field::text("replyTo", reply_to.as_str()));
        }

        fields.extend(attachments(message).map(|value| Field {
            name: "attachment",
            value,
        }));

        Ok(Self { fields })
    }

    /// Fields in wire order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Text values of every field named `name`, in order.
    #[must_use]
    pub fn texts(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|field| field.name == name)
            .filter_map(|field| match &field.value {
                FieldValue::Text(text) => Some(text.as_str()),
                FieldValue::File { .. } => None,
            })
            .collect()
    }

    /// Number of `attachment` fields.
    #[must_use]
    pub fn attachment_count(&self) -> usize {
        self.fields
            .iter()
            .filter(|field| matches!(field.value, FieldValue::File { .. }))
            .count()
    }

    /// Converts the payload into a `reqwest` multipart form, keeping field
    /// order, filenames and content types.
    ///
    /// Attachments carry their `type/subtype` only. A content type that is
    /// not a valid MIME type is sent as application/octet-stream.
    ///
    /// # Errors
    ///
    /// Returns an error if a multipart part cannot be built.
    pub fn into_form(self) -> Result<Form> {
        self.fields.into_iter().try_fold(Form::new(), |form, field| -> Result<Form> {
            let part = match field.value {
                FieldValue::Text(text) => Part::text(text),
                FieldValue::File {
                    content,
                    filename,
                    content_type,
                } => file_part(&content, &filename, &content_type)?,
            };
            Ok(form.part(field.name, part))
        })
    }
}

fn file_part(content: &Bytes, filename: &str, content_type: &ContentType) -> Result<Part> {
    let untyped = || {
        Part::stream_with_length(Body::from(content.clone()), content.len() as u64)
            .file_name(filename.to_string())
    };

    let essence = content_type.essence();
    let part = untyped().mime_str(&essence).or_else(|_| {
        warn!("Attachment {filename} has invalid content type {essence}, sending as octet-stream");
        untyped().mime_str(OCTET_STREAM)
    })?;
    Ok(part)
}

/// The `from` field: sender if set, else the first from mailbox, rendered
/// as `Name <address>` or the bare address.
///
/// # Errors
///
/// Returns [`Error::MissingSender`] if neither is present.
pub fn from_field(message: &Message) -> Result<String> {
    message
        .sender()
        .or_else(|| message.from().first())
        .map(ToString::to_string)
        .ok_or(Error::MissingSender)
}

/// Every to, cc and bcc address, in that order.
#[must_use]
pub fn recipients(message: &Message) -> Vec<&Address> {
    message
        .to()
        .addresses()
        .chain(message.cc().addresses())
        .chain(message.bcc().addresses())
        .collect()
}

/// The first reply-to address, if any.
#[must_use]
pub fn reply_to_field(message: &Message) -> Option<&Address> {
    message.reply_to().first().map(|mailbox| &mailbox.address)
}

/// File fields for every attachment and embedded image, in child order.
pub fn attachments(message: &Message) -> impl Iterator<Item = FieldValue> + '_ {
    message.attachments().map(|part| FieldValue::File {
        content: part.body().clone(),
        filename: part.filename().unwrap_or(DEFAULT_FILENAME).to_string(),
        content_type: part.content_type().clone(),
    })
}
