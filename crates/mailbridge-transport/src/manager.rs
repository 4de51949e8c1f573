//! Named transport registry with lazy construction.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use crate::error::{BoxError, Error, Result};
use crate::transport::{DynTransport, Transport};

type Factory = Arc<dyn Fn() -> std::result::Result<Arc<dyn DynTransport>, BoxError> + Send + Sync>;

/// Registry of transport factories keyed by name.
///
/// Factories run on first resolution; the constructed transport is cached
/// and the same instance is returned afterwards. A failed construction is
/// not cached, so the next resolution runs the factory again.
#[derive(Default)]
pub struct TransportManager {
    factories: RwLock<HashMap<String, Factory>>,
    resolved: RwLock<HashMap<String, Arc<dyn DynTransport>>>,
    default: RwLock<Option<String>>,
}

impl TransportManager {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `name`.
    ///
    /// Registering a name again replaces its factory and drops any cached
    /// instance.
    pub fn extend<F, T, E>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
        T: Transport,
        E: Into<BoxError>,
    {
        let name = name.into();
        let factory: Factory = Arc::new(move || {
            factory()
                .map(|transport| Arc::new(transport) as Arc<dyn DynTransport>)
                .map_err(Into::into)
        });

        write(&self.factories).insert(name.clone(), factory);
        write(&self.resolved).remove(&name);
        debug!("Registered transport factory {name}");
    }

    /// Returns true if a factory is registered under `name`.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        read(&self.factories).contains_key(name)
    }

    /// Resolves a transport, constructing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTransport`] if nothing is registered under
    /// `name`, or [`Error::Construction`] if the factory fails.
    pub fn transport(&self, name: &str) -> Result<Arc<dyn DynTransport>> {
        if let Some(transport) = read(&self.resolved).get(name) {
            return Ok(Arc::clone(transport));
        }

        // Hold the write lock across construction so concurrent first
        // resolutions share one instance.
        let mut resolved = write(&self.resolved);
        if let Some(transport) = resolved.get(name) {
            return Ok(Arc::clone(transport));
        }

        // Looked up under the lock; a concurrent `extend` evicts whatever
        // this builds.
        let factory = read(&self.factories)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownTransport(name.to_string()))?;

        let transport = factory().map_err(|source| Error::Construction {
            name: name.to_string(),
            source,
        })?;

        info!("Constructed transport {name}");
        resolved.insert(name.to_string(), Arc::clone(&transport));
        Ok(transport)
    }

    /// Sets the transport returned by [`TransportManager::default_transport`].
    pub fn set_default(&self, name: impl Into<String>) {
        *write(&self.default) = Some(name.into());
    }

    /// Resolves the default transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoDefault`] if no default is set, otherwise the same
    /// errors as [`TransportManager::transport`].
    pub fn default_transport(&self) -> Result<Arc<dyn DynTransport>> {
        let name = read(&self.default).clone().ok_or(Error::NoDefault)?;
        self.transport(&name)
    }

    /// Drops the cached instance for `name`, if any. The factory stays
    /// registered.
    pub fn forget(&self, name: &str) {
        write(&self.resolved).remove(name);
    }
}

impl fmt::Debug for TransportManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut registered: Vec<String> = read(&self.factories).keys().cloned().collect();
        registered.sort();
        let mut resolved: Vec<String> = read(&self.resolved).keys().cloned().collect();
        resolved.sort();

        f.debug_struct("TransportManager")
            .field("registered", &registered)
            .field("resolved", &resolved)
            .field("default", &*read(&self.default))
            .finish()
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mailbridge_message::Message;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("missing api key")]
    struct MissingKey;

    struct Counting;

    #[async_trait]
    impl Transport for Counting {
        type Error = MissingKey;

        async fn send(&self, message: &Message) -> std::result::Result<usize, MissingKey> {
            Ok(crate::number_of_recipients(message))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn counting_manager(builds: &Arc<AtomicUsize>) -> TransportManager {
        let manager = TransportManager::new();
        let builds = Arc::clone(builds);
        manager.extend("counting", move || {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok::<_, MissingKey>(Counting)
        });
        manager
    }

    #[test]
    fn test_factory_runs_lazily_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let manager = counting_manager(&builds);
        assert_eq!(builds.load(Ordering::SeqCst), 0);

        let first = manager.transport("counting").unwrap();
        let second = manager.transport("counting").unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "counting");
    }

    #[test]
    fn test_forget_rebuilds() {
        let builds = Arc::new(AtomicUsize::new(0));
        let manager = counting_manager(&builds);

        manager.transport("counting").unwrap();
        manager.forget("counting");
        manager.transport("counting").unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_extend_replaces_factory_and_evicts() {
        let first_builds = Arc::new(AtomicUsize::new(0));
        let manager = counting_manager(&first_builds);
        let first = manager.transport("counting").unwrap();

        let second_builds = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&second_builds);
        manager.extend("counting", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, MissingKey>(Counting)
        });

        let second = manager.transport("counting").unwrap();
        let again = manager.transport("counting").unwrap();

        assert_eq!(first_builds.load(Ordering::SeqCst), 1);
        assert_eq!(second_builds.load(Ordering::SeqCst), 1);
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &again));
    }

    struct Tagged(String);

    #[async_trait]
    impl Transport for Tagged {
        type Error = MissingKey;

        async fn send(&self, _message: &Message) -> std::result::Result<usize, MissingKey> {
            Ok(0)
        }

        fn name(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn test_concurrent_extend_never_keeps_stale_instance() {
        let manager = Arc::new(TransportManager::new());
        manager.extend("tagged", || Ok::<_, MissingKey>(Tagged("gen-0".into())));

        let resolvers: Vec<_> = (0..4)
            .map(|_| {
                let manager = Arc::clone(&manager);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        manager.transport("tagged").unwrap();
                    }
                })
            })
            .collect();

        for generation in 1..=200 {
            manager.extend("tagged", move || {
                Ok::<_, MissingKey>(Tagged(format!("gen-{generation}")))
            });
        }
        for resolver in resolvers {
            resolver.join().unwrap();
        }

        assert_eq!(manager.transport("tagged").unwrap().name(), "gen-200");
    }

    #[test]
    fn test_unknown_transport() {
        let manager = TransportManager::new();
        assert!(!manager.has("nope"));
        assert!(matches!(
            manager.transport("nope"),
            Err(Error::UnknownTransport(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_construction_failure_is_not_cached() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let manager = TransportManager::new();
        let counter = Arc::clone(&attempts);
        manager.extend("broken", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<Counting, _>(MissingKey)
        });

        for _ in 0..2 {
            let err = manager.transport("broken").err().unwrap();
            assert!(matches!(err, Error::Construction { ref name, .. } if name == "broken"));
            assert!(err.to_string().contains("missing api key"));
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_default_transport() {
        let builds = Arc::new(AtomicUsize::new(0));
        let manager = counting_manager(&builds);
        assert!(matches!(manager.default_transport(), Err(Error::NoDefault)));

        manager.set_default("counting");
        assert_eq!(manager.default_transport().unwrap().name(), "counting");
    }

    #[tokio::test]
    async fn test_resolved_transport_sends() {
        let builds = Arc::new(AtomicUsize::new(0));
        let manager = counting_manager(&builds);
        let message = Message::builder()
            .to("a@x.com".parse().unwrap())
            .cc("b@x.com".parse().unwrap())
            .build();

        let sent = manager.transport("counting").unwrap().send(&message).await.unwrap();
        assert_eq!(sent, 2);
    }
}
