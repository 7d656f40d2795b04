//! Declaration macros wiring types into the resolver.
//!
//! - [`class!`]: reference types, shared as `Arc<T>`
//! - [`record!`]: value types, stored behind `Ref<T>` and injectable by copy
//! - [`interface!`]: trait objects, resolvable only after a binding
//! - [`implements!`]: lets a class be bound to an interface
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use sijill_container::prelude::*;
//! use sijill_container::{class, implements, interface};
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, msg: &str);
//! }
//!
//! struct ConsoleLogger;
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) { println!("{msg}"); }
//! }
//! impl Injectable for ConsoleLogger {
//!     fn construct(_: &Arguments<'_>) -> Self { ConsoleLogger }
//! }
//!
//! class!(ConsoleLogger);
//! interface!(dyn Logger);
//! implements!(ConsoleLogger => dyn Logger);
//!
//! let resolver = Resolver::new();
//! resolver.bind::<dyn Logger, ConsoleLogger>();
//! resolver.resolve::<dyn Logger>().log("wired");
//! ```

/// Declares one or more [`Injectable`](crate::entity::Injectable) types as classes.
#[macro_export]
macro_rules! class {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::shape::Shape for $ty {
                const KIND: $crate::kind::EntityKind = $crate::kind::EntityKind::Class;

                fn constructors() -> ::std::vec::Vec<$crate::shape::Signature> {
                    static DECLARED: ::std::sync::Once = ::std::sync::Once::new();
                    let declared = <$ty as $crate::entity::Injectable>::signatures();
                    DECLARED.call_once(|| {
                        $crate::entity::glue::report_copied_records(::std::any::type_name::<$ty>(), &declared)
                    });
                    declared
                }
            }

            impl $crate::entity::Entity for $ty {
                type Handle = ::std::sync::Arc<$ty>;

                fn erase(handle: Self::Handle) -> $crate::entity::Instance {
                    $crate::entity::glue::erase_shared(handle)
                }

                fn restore(instance: &$crate::entity::Instance) -> ::std::option::Option<Self::Handle> {
                    $crate::entity::glue::restore_shared::<$ty>(instance)
                }

                fn build(args: &$crate::resolver::Arguments<'_>) -> Self::Handle {
                    ::std::sync::Arc::new(<$ty as $crate::entity::Injectable>::construct(args))
                }
            }
        )+
    };
}

/// Declares one or more [`Injectable`](crate::entity::Injectable) `Clone` types as records.
///
/// Records live behind a [`Ref`](crate::entity::Ref) handle and may also be
/// injected by value, in which case the constructor receives a copy.
#[macro_export]
macro_rules! record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::shape::Shape for $ty {
                const KIND: $crate::kind::EntityKind = $crate::kind::EntityKind::Record;

                fn constructors() -> ::std::vec::Vec<$crate::shape::Signature> {
                    static DECLARED: ::std::sync::Once = ::std::sync::Once::new();
                    let declared = <$ty as $crate::entity::Injectable>::signatures();
                    DECLARED.call_once(|| {
                        $crate::entity::glue::report_copied_records(::std::any::type_name::<$ty>(), &declared)
                    });
                    declared
                }
            }

            impl $crate::entity::Entity for $ty {
                type Handle = $crate::entity::Ref<$ty>;

                fn key() -> $crate::key::DependencyKey {
                    $crate::key::DependencyKey::record::<$ty>()
                }

                fn erase(handle: Self::Handle) -> $crate::entity::Instance {
                    $crate::entity::glue::erase_record(handle)
                }

                fn restore(instance: &$crate::entity::Instance) -> ::std::option::Option<Self::Handle> {
                    $crate::entity::glue::restore_record::<$ty>(instance)
                }

                fn build(args: &$crate::resolver::Arguments<'_>) -> Self::Handle {
                    $crate::entity::Ref::new(<$ty as $crate::entity::Injectable>::construct(args))
                }
            }

            impl $crate::shape::Param for $ty {
                fn describe() -> $crate::shape::ParamShape {
                    $crate::shape::ParamShape::of::<$ty>($crate::kind::Passing::Copy)
                }
            }

            impl $crate::entity::Inject for $ty {
                fn inject(args: &$crate::resolver::Arguments<'_>) -> Self {
                    args.resolve_passed::<$ty>($crate::kind::Passing::Copy).get()
                }
            }
        )+
    };
}

/// Declares trait object types as interfaces.
///
/// The trait must have `Send + Sync` as supertraits.
#[macro_export]
macro_rules! interface {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::shape::Shape for $ty {
                const KIND: $crate::kind::EntityKind = $crate::kind::EntityKind::Interface;
            }

            impl $crate::entity::Entity for $ty {
                type Handle = ::std::sync::Arc<$ty>;

                fn erase(handle: Self::Handle) -> $crate::entity::Instance {
                    $crate::entity::glue::erase_interface::<$ty>(handle)
                }

                fn restore(instance: &$crate::entity::Instance) -> ::std::option::Option<Self::Handle> {
                    $crate::entity::glue::restore_interface::<$ty>(instance)
                }

                fn build(_: &$crate::resolver::Arguments<'_>) -> Self::Handle {
                    unreachable!("interfaces never pass the constructability check")
                }
            }
        )+
    };
}

/// Declares that a class implements one or more interfaces.
///
/// Each pair is also listed in the [catalog](crate::catalog::implementors).
#[macro_export]
macro_rules! implements {
    ($ty:ty => $($iface:ty),+ $(,)?) => {
        $(
            impl $crate::entity::Implements<$iface> for $ty {
                fn upcast(this: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$iface> {
                    this
                }
            }

            $crate::__private::inventory::submit! {
                $crate::catalog::Implementation::new::<$iface, $ty>()
            }
        )+
    };
}
