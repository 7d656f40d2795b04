//! Registry slot keys.
//!
//! [`DependencyKey`] uniquely identifies a registry slot.
//! Classes and interfaces are keyed by their own [`TypeId`]; records are
//! keyed by the [`TypeId`] of their handle type [`Ref<T>`], so a record and
//! a handle to that record always share one slot.

use std::any::{TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use sijill_support::rendering::slot_name;

use crate::entity::Ref;

/// Uniquely identifies a singleton slot in the registry.
///
/// # Examples
/// ```
/// use sijill_container::key::DependencyKey;
///
/// struct Database;
/// let key = DependencyKey::of::<Database>();
/// assert!(key.type_name().ends_with("Database"));
/// assert!(!key.is_record());
///
/// #[derive(Clone)]
/// struct Config;
/// let key = DependencyKey::record::<Config>();
/// assert!(key.is_record());
/// assert_ne!(key, DependencyKey::of::<Config>());
/// ```
#[derive(Clone, Copy)]
pub struct DependencyKey {
    type_id: TypeId,
    type_name: &'static str,
    record: bool,
}

impl DependencyKey {
    /// Creates the key of a class, interface or any other plain type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            record: false,
        }
    }

    /// Creates the pointer-to-record key of a value type `T`.
    ///
    /// Identical to the key of [`Ref<T>`], the handle the registry stores.
    #[inline]
    pub fn record<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<Ref<T>>(),
            type_name: type_name::<T>(),
            record: true,
        }
    }

    /// Returns the [`TypeId`] indexing the slot.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the human-readable name of the keyed type.
    ///
    /// For record keys this is the record's name, not the handle's.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` for pointer-to-record keys.
    #[inline]
    pub fn is_record(&self) -> bool {
        self.record
    }

    /// Short display form used in rendered resolution paths.
    pub fn short_name(&self) -> String {
        slot_name(self.type_name, self.record)
    }
}

// Only the TypeId matters; record keys already use the handle's TypeId.
impl PartialEq for DependencyKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for DependencyKey {}

impl Hash for DependencyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.record {
            write!(f, "DependencyKey(&{})", self.type_name)
        } else {
            write!(f, "DependencyKey({})", self.type_name)
        }
    }
}

impl fmt::Display for DependencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.record {
            write!(f, "&{}", self.type_name)
        } else {
            write!(f, "{}", self.type_name)
        }
    }
}
