//! Singleton registry: stores constructed instances for one session.
//!
//! The registry maps [`DependencyKey`] to type-erased handles. It holds no
//! construction logic: the [`Resolver`](crate::resolver::Resolver) decides
//! what goes in, the registry only keeps it.
//!
//! On creation the registry registers itself, and a resolver paired with it
//! registers itself too, so both can be injected like any other class. These
//! two slots hold weak handles, so an untouched session is freed with its
//! last outside handle. A stored singleton that injected `Arc<Registry>` or
//! `Arc<Resolver>` holds a strong handle from inside the registry, and from
//! then on the session is never freed. There is no teardown.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::entity::{Entity, Instance};
use crate::error::SijillError;
use crate::key::DependencyKey;
use crate::kind::EntityKind;
use crate::resolver::Arguments;
use crate::shape::Shape;

enum Slot {
    Held(Instance),
    Session(Weak<dyn Any + Send + Sync>),
}

impl Slot {
    fn is_live(&self) -> bool {
        match self {
            Slot::Held(_) => true,
            Slot::Session(session) => session.strong_count() > 0,
        }
    }
}

/// Type-keyed store of singletons.
///
/// One slot per key; the last write wins. The internal lock only guards the
/// map itself: a lookup followed by an insert is not atomic.
///
/// Injecting `Arc<Registry>` into a singleton ties the registry's lifetime
/// to its own contents: it stays allocated until the process exits.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use sijill_container::prelude::*;
///
/// let registry = Registry::new();
/// let itself = registry.get::<Registry>().unwrap();
/// assert!(Arc::ptr_eq(&registry, &itself));
/// ```
pub struct Registry {
    slots: RwLock<HashMap<DependencyKey, Slot>>,
}

impl Registry {
    /// Creates a registry holding only its own handle.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Registry>| {
            let this: Weak<dyn Any + Send + Sync> = this.clone();
            let mut slots = HashMap::new();
            slots.insert(DependencyKey::of::<Registry>(), Slot::Session(this));
            Registry {
                slots: RwLock::new(slots),
            }
        })
    }

    /// Looks up the handle stored under `key`.
    pub fn lookup(&self, key: &DependencyKey) -> Option<Instance> {
        let slots = self.slots.read();
        match slots.get(key)? {
            Slot::Held(instance) => Some(Arc::clone(instance)),
            Slot::Session(session) => session.upgrade(),
        }
    }

    /// Stores `instance` under `key`, replacing whatever was there.
    ///
    /// No check is made that `instance` matches the keyed type.
    pub fn insert(&self, key: DependencyKey, instance: Instance) {
        debug!(key = %key, "Stored instance");
        // The replaced instance is dropped after the lock is released.
        let _replaced = self.slots.write().insert(key, Slot::Held(instance));
    }

    /// Returns `true` if `key` holds a live handle.
    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.lookup(key).is_some()
    }

    /// Returns the handle stored for `T`.
    ///
    /// For records this is the shared [`Ref`](crate::entity::Ref), never a copy.
    ///
    /// # Panics
    /// If the slot holds a handle of another type, which only a raw
    /// [`insert`](Self::insert) can cause.
    pub fn get<T: ?Sized + Entity>(&self) -> Option<T::Handle> {
        let key = T::key();
        let instance = self.lookup(&key)?;
        match T::restore(&instance) {
            Some(handle) => Some(handle),
            None => panic!(
                "{}",
                SijillError::TypeMismatch {
                    key,
                    expected: type_name::<T::Handle>(),
                }
            ),
        }
    }

    /// Stores `handle` as the singleton for `T`.
    ///
    /// The registry's and resolver's own slots are rejected at compile time:
    ///
    /// ```compile_fail
    /// use sijill_container::prelude::*;
    ///
    /// let registry = Registry::new();
    /// registry.set::<Registry>(Registry::new());
    /// ```
    pub fn set<T: ?Sized + Entity>(&self, handle: T::Handle) {
        const { assert!(!T::RESERVED, "the Registry and Resolver slots are reserved") };
        self.store::<T>(handle);
    }

    /// Returns `true` if a handle for `T` is stored.
    pub fn has<T: ?Sized + Entity>(&self) -> bool {
        self.contains(&T::key())
    }

    /// Unchecked typed store; reserved entities are kept weakly.
    pub(crate) fn store<T: ?Sized + Entity>(&self, handle: T::Handle) {
        let key = T::key();
        let instance = T::erase(handle);
        if T::RESERVED {
            trace!(key = %key, "Stored session handle");
            let _replaced = self.slots.write().insert(key, Slot::Session(Arc::downgrade(&instance)));
        } else {
            self.insert(key, instance);
        }
    }

    /// Returns the number of slots holding a live handle, the registry's own
    /// slot included.
    ///
    /// The slot of a dropped resolver is not counted, matching [`contains`](Self::contains).
    pub fn len(&self) -> usize {
        self.slots.read().values().filter(|slot| slot.is_live()).count()
    }

    /// Returns true if no slot holds a live handle.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the keys of all slots holding a live handle.
    pub fn keys(&self) -> Vec<DependencyKey> {
        self.slots
            .read()
            .iter()
            .filter(|(_, slot)| slot.is_live())
            .map(|(key, _)| *key)
            .collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry").field("slots", &self.len()).finish()
    }
}

impl Shape for Registry {
    const KIND: EntityKind = EntityKind::Class;
}

impl Entity for Registry {
    type Handle = Arc<Registry>;

    const RESERVED: bool = true;

    fn erase(handle: Self::Handle) -> Instance {
        handle
    }

    fn restore(instance: &Instance) -> Option<Self::Handle> {
        Arc::clone(instance).downcast::<Registry>().ok()
    }

    fn build(args: &Arguments<'_>) -> Self::Handle {
        Arc::clone(args.resolver().registry())
    }
}
