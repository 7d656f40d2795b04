//! # Sijill: singleton dependency resolver for Rust
//!
//! Ask for a type and get back its fully wired singleton: constructor
//! parameters are resolved recursively from a shared registry and built on
//! demand, once per session.
//!
//! ```rust
//! use std::sync::Arc;
//! use sijill::prelude::*;
//!
//! #[derive(Injectable)]
//! struct Database;
//!
//! #[derive(Injectable)]
//! struct UserRepository {
//!     #[inject]
//!     db: Arc<Database>,
//! }
//!
//! let resolver = Resolver::new();
//! let repo = resolver.resolve::<UserRepository>();
//! assert!(Arc::ptr_eq(&repo.db, &resolver.resolve::<Database>()));
//! ```

extern crate self as sijill;

pub use sijill_container::*;
pub use sijill_derive::*;
pub use sijill_support::*;

pub mod prelude {
    pub use sijill_container::prelude::*;
    pub use sijill_derive::Injectable;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::prelude::*;

    #[derive(Injectable)]
    struct Clock;

    #[derive(Debug, Clone, Default, PartialEq, Injectable)]
    #[injectable(record)]
    struct Limits {
        max: u32,
    }

    trait Notifier: Send + Sync {
        fn channel(&self) -> &'static str;
    }

    #[derive(Injectable)]
    struct EmailNotifier {
        #[inject]
        clock: Arc<Clock>,
    }

    impl Notifier for EmailNotifier {
        fn channel(&self) -> &'static str {
            "email"
        }
    }

    crate::interface!(dyn Notifier);
    crate::implements!(EmailNotifier => dyn Notifier);

    #[derive(Injectable)]
    struct Billing {
        #[inject]
        clock: Arc<Clock>,
        #[inject(copy)]
        limits: Limits,
        #[inject]
        shared: Ref<Limits>,
        #[inject]
        notifier: Arc<dyn Notifier>,
        charges: AtomicU64,
    }

    impl Billing {
        fn charge(&self) -> u64 {
            self.charges.fetch_add(1, Ordering::SeqCst) + 1
        }
    }

    #[test]
    fn derive_declares_one_constructor_in_field_order() {
        let signatures = Billing::signatures();
        assert_eq!(signatures.len(), 1);

        let passing: Vec<Passing> = signatures[0].params().iter().map(|p| p.passing()).collect();
        assert_eq!(
            passing,
            vec![Passing::Shared, Passing::Copy, Passing::Handle, Passing::Shared]
        );
        assert_eq!(constructability::<Billing>(), None);
    }

    #[test]
    fn derive_kinds() {
        assert_eq!(<Clock as Shape>::KIND, EntityKind::Class);
        assert_eq!(<Limits as Shape>::KIND, EntityKind::Record);
        assert_eq!(<dyn Notifier as Shape>::KIND, EntityKind::Interface);
        assert!(Clock::signatures()[0].is_empty());
    }

    #[test]
    fn derived_graph_resolves() {
        let resolver = Resolver::new();
        resolver.bind::<dyn Notifier, EmailNotifier>();

        let billing = resolver.resolve::<Billing>();
        assert_eq!(billing.notifier.channel(), "email");
        assert!(Arc::ptr_eq(&billing.clock, &resolver.resolve::<EmailNotifier>().clock));
        assert_eq!(billing.charge(), 1);
        assert_eq!(resolver.resolve::<Billing>().charge(), 2);
    }

    #[test]
    fn derived_record_fields_use_default() {
        let resolver = Resolver::new();
        resolver.bind::<dyn Notifier, EmailNotifier>();
        let billing = resolver.resolve::<Billing>();

        assert_eq!(billing.limits, Limits::default());
        billing.shared.write().max = 7;
        assert_eq!(resolver.resolve::<Limits>().read().max, 7);
        assert_eq!(billing.limits.max, 0);
    }

    #[test]
    fn derived_types_are_catalogued() {
        let findings = crate::catalog::audit();
        for name in [
            std::any::type_name::<Clock>(),
            std::any::type_name::<Limits>(),
            std::any::type_name::<EmailNotifier>(),
            std::any::type_name::<Billing>(),
        ] {
            let finding = findings.iter().find(|f| f.type_name == name).unwrap();
            assert!(finding.is_constructable(), "{name}: {:?}", finding.reason);
        }
    }

    #[test]
    fn support_helpers_are_reexported() {
        assert_eq!(crate::rendering::short_type_name(std::any::type_name::<Billing>()), "Billing");
    }
}
