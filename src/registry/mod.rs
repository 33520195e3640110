//! Typed capability registry.
//!
//! A [`Registry`] maps names to shared capabilities (`Arc<C>`, where `C` is
//! usually a trait object). Each name is addressed through a [`Key<C>`] that
//! fixes the capability type, so resolution is a checked cast rather than a
//! caller-side downcast. The registry is meant to be wrapped in an `Arc` and
//! carried as a chain's dependency context.

mod error;

pub use error::RegistryError;

use parking_lot::RwLock;
use std::any::{self, Any};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Typed name of a capability of type `C`.
///
/// ```rust
/// use catena::Key;
///
/// trait Clock: Send + Sync {
///     fn now(&self) -> u64;
/// }
///
/// const CLOCK: Key<dyn Clock> = Key::new("clock");
/// assert_eq!(CLOCK.name(), "clock");
/// ```
pub struct Key<C: ?Sized> {
    name: &'static str,
    _capability: PhantomData<fn() -> Arc<C>>,
}

impl<C: ?Sized> Key<C> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _capability: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<C: ?Sized> Clone for Key<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for Key<C> {}

impl<C: ?Sized> fmt::Debug for Key<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

/// Name to capability map guarded by a reader/writer lock.
///
/// Registration and resolution may run concurrently from any thread.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<&'static str, Box<dyn Any + Send + Sync>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `capability` under `key`, returning the capability it
    /// replaced (if the previous entry had the same type).
    pub fn register<C>(&self, key: &Key<C>, capability: Arc<C>) -> Option<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let previous = self.entries.write().insert(key.name, Box::new(capability));
        debug!(key = key.name, replaced = previous.is_some(), "capability registered");
        previous.and_then(|entry| entry.downcast::<Arc<C>>().ok().map(|boxed| *boxed))
    }

    /// Resolve the capability registered under `key`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use catena::{Key, Registry};
    /// use std::sync::Arc;
    ///
    /// trait Greeter: Send + Sync {
    ///     fn greet(&self) -> String;
    /// }
    ///
    /// struct English;
    ///
    /// impl Greeter for English {
    ///     fn greet(&self) -> String {
    ///         "hello".to_string()
    ///     }
    /// }
    ///
    /// const GREETER: Key<dyn Greeter> = Key::new("greeter");
    ///
    /// let registry = Registry::new();
    /// registry.register(&GREETER, Arc::new(English));
    ///
    /// let greeter = registry.resolve(&GREETER).unwrap();
    /// assert_eq!(greeter.greet(), "hello");
    /// ```
    pub fn resolve<C>(&self, key: &Key<C>) -> Result<Arc<C>, RegistryError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let entries = self.entries.read();
        let entry = entries
            .get(key.name)
            .ok_or(RegistryError::NotFound { key: key.name })?;

        (**entry)
            .downcast_ref::<Arc<C>>()
            .cloned()
            .ok_or(RegistryError::TypeMismatch {
                key: key.name,
                expected: any::type_name::<C>(),
            })
    }

    /// Whether an entry exists under `key`'s name, whatever its type.
    pub fn contains<C: ?Sized>(&self, key: &Key<C>) -> bool {
        self.entries.read().contains_key(key.name)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        let mut names: Vec<_> = entries.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("entries", &names).finish()
    }
}
