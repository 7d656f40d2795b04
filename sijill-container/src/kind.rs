//! Entity kinds and parameter passing modes.
//!
//! Every type the resolver can talk about falls into one [`EntityKind`]:
//! - [`EntityKind::Class`]: reference type, shared as `Arc<T>`
//! - [`EntityKind::Interface`]: trait object, shared as `Arc<dyn Trait>`
//! - [`EntityKind::Record`]: value type, stored behind a `Ref<T>` handle
//! - [`EntityKind::Unsupported`]: primitives, strings, collections, raw pointers
//!
//! Unsupported shapes must be wrapped in a record to take part in injection.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a type as a dependency.
///
/// # Examples
/// ```
/// use sijill_container::kind::EntityKind;
///
/// assert!(EntityKind::Class.is_supported());
/// assert!(!EntityKind::Unsupported("primitive").is_supported());
/// assert!(!EntityKind::Interface.is_instantiable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    /// Reference type with shared identity.
    Class,
    /// Trait object; needs a bound implementation.
    Interface,
    /// Value type; injected by handle or by copy.
    Record,
    /// Anything else. Carries a short description of what the type is.
    Unsupported(&'static str),
}

impl EntityKind {
    /// Returns `true` if values of this kind can be injected at all.
    #[inline]
    pub fn is_supported(&self) -> bool {
        !matches!(self, EntityKind::Unsupported(_))
    }

    /// Returns `true` if the resolver may construct values of this kind itself.
    #[inline]
    pub fn is_instantiable(&self) -> bool {
        matches!(self, EntityKind::Class | EntityKind::Record)
    }

    /// Short label used in rendered chains.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Class => "Class",
            EntityKind::Interface => "Interface",
            EntityKind::Record => "Record",
            EntityKind::Unsupported(_) => "Unsupported",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Unsupported(what) => write!(f, "Unsupported ({what})"),
            other => f.write_str(other.label()),
        }
    }
}

/// How a constructor parameter receives its dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Passing {
    /// `Arc<T>` of a class or interface; the singleton itself.
    Shared,
    /// `Ref<T>` of a record; the singleton's handle.
    Handle,
    /// A record by value; an independent clone of the singleton.
    Copy,
    /// Not injectable.
    Unsupported,
}

impl Passing {
    pub fn label(&self) -> &'static str {
        match self {
            Passing::Shared => "shared",
            Passing::Handle => "handle",
            Passing::Copy => "copy",
            Passing::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for Passing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
