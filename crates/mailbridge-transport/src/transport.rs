//! The transport trait and send hooks.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mailbridge_message::Message;

/// A mail-sending backend.
///
/// Implementations are constructed once and shared; `send` takes `&self`
/// and may be called concurrently.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Error returned by [`Transport::send`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Sends a message and returns the number of recipients it was
    /// addressed to.
    async fn send(&self, message: &Message) -> Result<usize, Self::Error>;

    /// Short name of the backend, e.g. `infobip`.
    fn name(&self) -> &str;
}

/// Object-safe view of a [`Transport`] with the error type erased.
///
/// This is what the registry hands out.
#[async_trait]
pub trait DynTransport: Send + Sync + 'static {
    /// Sends a message and returns the number of recipients.
    async fn send(&self, message: &Message) -> Result<usize, crate::BoxError>;

    /// Short name of the backend.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: Transport> DynTransport for T {
    async fn send(&self, message: &Message) -> Result<usize, crate::BoxError> {
        Transport::send(self, message).await.map_err(Into::into)
    }

    fn name(&self) -> &str {
        Transport::name(self)
    }
}

/// Hooks invoked around each send.
///
/// Both methods default to no-ops.
pub trait SendListener: Send + Sync {
    /// Called before the request is issued.
    fn before_send(&self, _message: &Message) {}

    /// Called after a successful exchange.
    fn send_performed(&self, _message: &Message) {}
}

/// Ordered set of registered [`SendListener`]s.
#[derive(Clone, Default)]
pub struct Listeners {
    listeners: Vec<Arc<dyn SendListener>>,
}

impl Listeners {
    /// Creates an empty listener set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Listeners run in registration order.
    pub fn register(&mut self, listener: Arc<dyn SendListener>) {
        self.listeners.push(listener);
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Runs every listener's `before_send` hook.
    pub fn before_send(&self, message: &Message) {
        for listener in &self.listeners {
            listener.before_send(message);
        }
    }

    /// Runs every listener's `send_performed` hook.
    pub fn send_performed(&self, message: &Message) {
        for listener in &self.listeners {
            listener.send_performed(message);
        }
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Total number of recipients: to + cc + bcc.
#[must_use]
pub fn number_of_recipients(message: &Message) -> usize {
    message.to().len() + message.cc().len() + message.bcc().len()
}
