//! Outbound message structure and builder.

use crate::address::{AddressList, Mailbox};
use crate::part::Part;

/// A composed outbound email.
///
/// Messages are immutable once built; transports only read them.
#[derive(Debug, Clone, Default)]
pub struct Message {
    sender: Option<Mailbox>,
    from: AddressList,
    to: AddressList,
    cc: AddressList,
    bcc: AddressList,
    reply_to: AddressList,
    subject: String,
    html_body: String,
    children: Vec<Part>,
}

impl Message {
    /// Creates a new message builder.
    #[must_use]
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// The `Sender` mailbox, if set.
    #[must_use]
    pub const fn sender(&self) -> Option<&Mailbox> {
        self.sender.as_ref()
    }

    /// The `From` mailboxes.
    #[must_use]
    pub const fn from(&self) -> &AddressList {
        &self.from
    }

    /// Primary recipients.
    #[must_use]
    pub const fn to(&self) -> &AddressList {
        &self.to
    }

    /// Carbon copy recipients.
    #[must_use]
    pub const fn cc(&self) -> &AddressList {
        &self.cc
    }

    /// Blind carbon copy recipients.
    #[must_use]
    pub const fn bcc(&self) -> &AddressList {
        &self.bcc
    }

    /// Reply-to mailboxes.
    #[must_use]
    pub const fn reply_to(&self) -> &AddressList {
        &self.reply_to
    }

    /// Subject line.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// HTML body.
    #[must_use]
    pub fn html_body(&self) -> &str {
        &self.html_body
    }

    /// Child parts in the order they were added.
    #[must_use]
    pub fn children(&self) -> &[Part] {
        &self.children
    }

    /// Child parts that are file attachments or embedded images.
    pub fn attachments(&self) -> impl Iterator<Item = &Part> {
        self.children.iter().filter(|part| part.is_attachment())
    }
}

/// Builder for constructing [`Message`] instances.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    /// Sets the `Sender` mailbox.
    #[must_use]
    pub fn sender(mut self, mailbox: Mailbox) -> Self {
        self.message.sender = Some(mailbox);
        self
    }

    /// Adds a `From` mailbox.
    #[must_use]
    pub fn from(mut self, mailbox: Mailbox) -> Self {
        self.message.from.insert(mailbox);
        self
    }

    /// Adds a primary recipient.
    #[must_use]
    pub fn to(mut self, mailbox: Mailbox) -> Self {
        self.message.to.insert(mailbox);
        self
    }

    /// Adds multiple primary recipients.
    #[must_use]
    pub fn to_many(mut self, mailboxes: impl IntoIterator<Item = Mailbox>) -> Self {
        self.message.to.extend(mailboxes);
        self
    }

    /// Adds a CC recipient.
    #[must_use]
    pub fn cc(mut self, mailbox: Mailbox) -> Self {
        self.message.cc.insert(mailbox);
        self
    }

    /// Adds a BCC recipient.
    #[must_use]
    pub fn bcc(mut self, mailbox: Mailbox) -> Self {
        self.message.bcc.insert(mailbox);
        self
    }

    /// Adds a reply-to mailbox.
    #[must_use]
    pub fn reply_to(mut self, mailbox: Mailbox) -> Self {
        self.message.reply_to.insert(mailbox);
        self
    }

    /// Sets the subject line.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.message.subject = subject.into();
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.message.html_body = html.into();
        self
    }

    /// Appends a child part (attachment, image or other part).
    #[must_use]
    pub fn attach(mut self, part: Part) -> Self {
        self.message.children.push(part);
        self
    }

    /// Finishes the message.
    ///
    /// Sender and recipient presence is checked by the transport at send
    /// time, not here.
    #[must_use]
    pub fn build(self) -> Message {
        self.message
    }
}
