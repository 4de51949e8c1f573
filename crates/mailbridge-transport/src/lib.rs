//! # mailbridge-transport
//!
//! Pluggable mail transports and the registry that hands them out.
//!
//! ## Features
//!
//! - **[`Transport`]**: one `send(message) -> recipient count` operation per
//!   backend
//! - **Send hooks**: [`SendListener`]s run before and after each exchange
//! - **Registry**: [`TransportManager`] stores named factories and constructs
//!   each transport once, on first resolution
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailbridge_transport::TransportManager;
//!
//! let manager = TransportManager::new();
//! mailbridge_infobip::register(&manager, config);
//!
//! let transport = manager.transport("infobip")?;
//! let recipients = transport.send(&message).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod manager;
mod transport;

pub use error::{BoxError, Error, Result};
pub use manager::TransportManager;
pub use transport::{DynTransport, Listeners, SendListener, Transport, number_of_recipients};
