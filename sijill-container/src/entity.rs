//! Storable entities and how they are built.
//!
//! An [`Entity`] is a [`Shape`] the registry can hold. It fixes the handle
//! type stored in its slot and how that handle is erased to an [`Instance`]
//! and restored again:
//!
//! | kind        | handle            | declared with     |
//! |-------------|-------------------|-------------------|
//! | class       | `Arc<T>`          | [`class!`]        |
//! | interface   | `Arc<dyn Trait>`  | [`interface!`]    |
//! | record      | [`Ref<T>`]        | [`record!`]       |
//!
//! Classes and records also implement [`Injectable`], which declares their
//! constructor and builds a value from resolved [`Arguments`].
//!
//! [`class!`]: crate::class
//! [`interface!`]: crate::interface
//! [`record!`]: crate::record

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

use crate::key::DependencyKey;
use crate::kind::Passing;
use crate::resolver::Arguments;
use crate::shape::{Param, ParamShape, Shape, Signature};

/// Type-erased handle as stored in a registry slot.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// A type the registry can store a singleton for.
pub trait Entity: Shape + Send + Sync {
    /// What callers receive from `resolve`.
    type Handle: Clone + Send + Sync + 'static;

    /// Reserved entities can never be registered manually.
    const RESERVED: bool = false;

    /// The slot this entity lives in.
    fn key() -> DependencyKey {
        DependencyKey::of::<Self>()
    }

    /// Erases a handle for storage.
    fn erase(handle: Self::Handle) -> Instance;

    /// Recovers a handle from storage; `None` if the slot holds something else.
    fn restore(instance: &Instance) -> Option<Self::Handle>;

    /// Builds a fresh value. Only called after a clean constructability verdict.
    fn build(args: &Arguments<'_>) -> Self::Handle;
}

/// A class or record the resolver can construct.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use sijill_container::prelude::*;
///
/// struct Database;
/// impl Injectable for Database {
///     fn construct(_: &Arguments<'_>) -> Self { Database }
/// }
///
/// struct UserRepository {
///     db: Arc<Database>,
/// }
/// impl Injectable for UserRepository {
///     fn signatures() -> Vec<Signature> {
///         vec![Signature::new().param::<Arc<Database>>()]
///     }
///     fn construct(args: &Arguments<'_>) -> Self {
///         UserRepository { db: args.inject() }
///     }
/// }
///
/// sijill_container::class!(Database, UserRepository);
///
/// let resolver = Resolver::new();
/// let repo = resolver.resolve::<UserRepository>();
/// assert!(Arc::ptr_eq(&repo.db, &resolver.resolve::<Database>()));
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Signatures of the declared constructors.
    ///
    /// Leave empty for types constructed without arguments.
    fn signatures() -> Vec<Signature> {
        Vec::new()
    }

    /// Invokes the single constructor, pulling arguments in declaration order.
    fn construct(args: &Arguments<'_>) -> Self;
}

/// A parameter type the resolver can produce.
pub trait Inject: Param + Sized {
    fn inject(args: &Arguments<'_>) -> Self;
}

/// Binds a class to an interface it implements.
///
/// Generated by [`implements!`](crate::implements).
pub trait Implements<I: ?Sized + Entity<Handle = Arc<I>>>: Entity<Handle = Arc<Self>> + Sized {
    fn upcast(this: Arc<Self>) -> Arc<I>;
}

impl<T> Param for Arc<T>
where
    T: ?Sized + Entity<Handle = Arc<T>>,
{
    fn describe() -> ParamShape {
        ParamShape::of::<T>(Passing::Shared)
    }
}

impl<T> Inject for Arc<T>
where
    T: ?Sized + Entity<Handle = Arc<T>>,
{
    fn inject(args: &Arguments<'_>) -> Self {
        args.resolve_passed::<T>(Passing::Shared)
    }
}

impl<T> Param for Ref<T>
where
    T: Entity<Handle = Ref<T>>,
{
    fn describe() -> ParamShape {
        ParamShape::of::<T>(Passing::Handle)
    }
}

impl<T> Inject for Ref<T>
where
    T: Entity<Handle = Ref<T>>,
{
    fn inject(args: &Arguments<'_>) -> Self {
        args.resolve_passed::<T>(Passing::Handle)
    }
}

/// Shared handle to a record singleton.
///
/// Cloning the handle does not clone the record; use [`Ref::get`] for an
/// independent copy.
pub struct Ref<T>(Arc<RwLock<T>>);

impl<T> Ref<T> {
    pub fn new(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    /// Locks the record for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Locks the record for writing. Every holder of this handle sees the change.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Copies the record out.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.read().clone()
    }

    /// Returns `true` if both handles point at the same record.
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Arc::ptr_eq(&this.0, &other.0)
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref").field(&*self.0.read()).finish()
    }
}

/// Erasure helpers used by the declaration macros.
#[doc(hidden)]
pub mod glue {
    use super::*;

    pub fn erase_shared<T: Send + Sync + 'static>(handle: Arc<T>) -> Instance {
        handle
    }

    pub fn restore_shared<T: Send + Sync + 'static>(instance: &Instance) -> Option<Arc<T>> {
        Arc::clone(instance).downcast::<T>().ok()
    }

    // Trait objects cannot be upcast to `dyn Any`, so they are stored boxed once more.
    pub fn erase_interface<I: ?Sized + Send + Sync + 'static>(handle: Arc<I>) -> Instance {
        Arc::new(handle)
    }

    pub fn restore_interface<I: ?Sized + Send + Sync + 'static>(instance: &Instance) -> Option<Arc<I>> {
        (**instance).downcast_ref::<Arc<I>>().cloned()
    }

    pub fn erase_record<T: Send + Sync + 'static>(handle: Ref<T>) -> Instance {
        handle.0
    }

    pub fn restore_record<T: Send + Sync + 'static>(instance: &Instance) -> Option<Ref<T>> {
        Arc::clone(instance).downcast::<RwLock<T>>().ok().map(Ref)
    }

    /// Warns once for every record parameter `owner` takes by value.
    ///
    /// The declaration macros call this the first time a type's constructors
    /// are read in the process.
    pub fn report_copied_records(owner: &'static str, declared: &[Signature]) {
        for signature in declared {
            for (index, param) in signature.params().iter().enumerate() {
                if param.passing() == Passing::Copy {
                    warn!(
                        owner,
                        index,
                        record = %param.key(),
                        "Record declared as a by-value parameter; the constructor receives a copy, not the singleton"
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Limits {
        max: u32,
    }

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct English;
    impl Greeter for English {
        fn greet(&self) -> String {
            "hello".to_string()
        }
    }

    #[test]
    fn ref_clone_shares_the_record() {
        let a = Ref::new(Limits { max: 1 });
        let b = a.clone();
        b.write().max = 5;
        assert_eq!(a.read().max, 5);
        assert!(Ref::ptr_eq(&a, &b));
    }

    #[test]
    fn ref_get_is_an_independent_copy() {
        let handle = Ref::new(Limits { max: 1 });
        let mut copy = handle.get();
        copy.max = 9;
        assert_eq!(handle.read().max, 1);
    }

    #[test]
    fn shared_round_trip() {
        let original = Arc::new(English);
        let instance = glue::erase_shared(original.clone());
        let restored = glue::restore_shared::<English>(&instance).unwrap();
        assert!(Arc::ptr_eq(&original, &restored));
        assert!(glue::restore_shared::<Limits>(&instance).is_none());
    }

    #[test]
    fn interface_round_trip_keeps_identity() {
        let original: Arc<dyn Greeter> = Arc::new(English);
        let instance = glue::erase_interface(original.clone());
        let restored = glue::restore_interface::<dyn Greeter>(&instance).unwrap();
        assert!(Arc::ptr_eq(&original, &restored));
        assert_eq!(restored.greet(), "hello");
    }

    #[test]
    fn record_round_trip_keeps_identity() {
        let original = Ref::new(Limits { max: 3 });
        let instance = glue::erase_record(original.clone());
        let restored = glue::restore_record::<Limits>(&instance).unwrap();
        assert!(Ref::ptr_eq(&original, &restored));
    }

    #[test]
    fn ref_debug() {
        let handle = Ref::new(Limits { max: 2 });
        assert_eq!(format!("{handle:?}"), "Ref(Limits { max: 2 })");
    }
}
