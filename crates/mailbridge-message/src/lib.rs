//! # mailbridge-message
//!
//! Outbound email message model shared by the mailbridge transports.
//!
//! ## Features
//!
//! - **Mailboxes**: validated addresses with optional display names
//! - **Recipient lists**: ordered address to display-name mappings for
//!   `to`, `cc`, `bcc` and `reply-to`
//! - **Child parts**: file attachments, embedded images and other parts,
//!   kept in insertion order
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailbridge_message::{ContentType, Message, Part};
//!
//! let message = Message::builder()
//!     .from("Bob <bob@example.com>".parse()?)
//!     .to("carol@example.com".parse()?)
//!     .subject("Quarterly report")
//!     .html("<p>See attached.</p>")
//!     .attach(Part::attachment_from_path("report.pdf")?)
//!     .build();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod content_type;
mod error;
mod message;
mod part;

pub use address::{Address, AddressList, Mailbox};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use message::{Message, MessageBuilder};
pub use part::{Part, PartKind};
