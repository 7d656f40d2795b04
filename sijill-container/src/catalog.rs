//! Link-time catalog of declared injectables.
//!
//! `#[derive(Injectable)]` submits a [`Declaration`] for every type it
//! expands on. [`audit`] walks them all and reports each type's
//! constructability verdict, so a test or a startup check can reject a
//! broken wiring before anything is resolved.
//!
//! Types declared by hand can join the catalog with
//! `inventory::submit!(Declaration::new::<MyType>())`.
//!
//! [`implements!`](crate::implements) submits an [`Implementation`] for
//! every class/interface pair, which is where the resolver looks for
//! classes to suggest when an interface is requested before it is bound.

use std::any::type_name;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::entity::{Entity, Implements};
use crate::error::Unconstructable;
use crate::key::DependencyKey;
use crate::kind::EntityKind;
use crate::shape::{Shape, constructability};

/// One catalog entry.
pub struct Declaration {
    type_name: fn() -> &'static str,
    kind: EntityKind,
    verdict: fn() -> Option<Unconstructable>,
}

impl Declaration {
    pub const fn new<T: ?Sized + Shape>() -> Self {
        Self {
            type_name: type_name::<T>,
            kind: T::KIND,
            verdict: constructability::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn verdict(&self) -> Option<Unconstructable> {
        (self.verdict)()
    }
}

inventory::collect!(Declaration);

/// Audit result for one declared type.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub type_name: &'static str,
    pub kind: EntityKind,
    /// `None` when the type can be auto-constructed.
    pub reason: Option<String>,
}

impl Finding {
    pub fn is_constructable(&self) -> bool {
        self.reason.is_none()
    }
}

/// Every declared type with its verdict, sorted by type name.
pub fn audit() -> Vec<Finding> {
    let mut findings: Vec<Finding> = Vec::new();
    for declaration in inventory::iter::<Declaration> {
        findings.push(Finding {
            type_name: declaration.type_name(),
            kind: declaration.kind(),
            reason: declaration.verdict().map(|reason| reason.to_string()),
        });
    }
    findings.sort_by(|a, b| a.type_name.cmp(b.type_name));

    debug!(declared = findings.len(), "Catalog audited");
    findings
}

/// Only the declared types that cannot be auto-constructed.
pub fn unconstructable() -> Vec<Finding> {
    audit().into_iter().filter(|finding| !finding.is_constructable()).collect()
}

/// A class that may be bound to an interface.
pub struct Implementation {
    interface: fn() -> DependencyKey,
    class: fn() -> DependencyKey,
}

impl Implementation {
    pub const fn new<I, C>() -> Self
    where
        I: ?Sized + Entity<Handle = Arc<I>>,
        C: Implements<I>,
    {
        Self {
            interface: <I as Entity>::key,
            class: <C as Entity>::key,
        }
    }

    pub fn interface(&self) -> DependencyKey {
        (self.interface)()
    }

    pub fn class(&self) -> DependencyKey {
        (self.class)()
    }
}

inventory::collect!(Implementation);

/// Classes declared to implement `interface`, sorted by type name.
pub fn implementors(interface: DependencyKey) -> Vec<DependencyKey> {
    let mut classes: Vec<DependencyKey> = inventory::iter::<Implementation>
        .into_iter()
        .filter(|implementation| implementation.interface() == interface)
        .map(Implementation::class)
        .collect();
    classes.sort_by_key(|class| class.type_name());
    classes.dedup();
    classes
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entity::Injectable;
    use crate::resolver::Arguments;
    use crate::shape::Signature;

    struct Listed;
    impl Injectable for Listed {
        fn construct(_: &Arguments<'_>) -> Self {
            Listed
        }
    }

    struct Broken;
    impl Injectable for Broken {
        fn signatures() -> Vec<Signature> {
            vec![Signature::new().param::<Arc<Listed>>().param::<String>()]
        }
        fn construct(_: &Arguments<'_>) -> Self {
            Broken
        }
    }

    crate::class!(Listed, Broken);

    inventory::submit!(Declaration::new::<Listed>());
    inventory::submit!(Declaration::new::<Broken>());

    trait Sink: Send + Sync {}
    trait Unused: Send + Sync {}
    impl Sink for Listed {}
    impl Sink for Broken {}

    crate::interface!(dyn Sink, dyn Unused);
    crate::implements!(Listed => dyn Sink);
    crate::implements!(Broken => dyn Sink);

    fn find(findings: &[Finding], name: &str) -> Option<Finding> {
        findings.iter().find(|f| f.type_name == name).cloned()
    }

    #[test]
    fn audit_lists_submitted_types() {
        let findings = audit();

        let listed = find(&findings, type_name::<Listed>()).unwrap();
        assert!(listed.is_constructable());
        assert_eq!(listed.kind, EntityKind::Class);

        let broken = find(&findings, type_name::<Broken>()).unwrap();
        assert!(broken.reason.unwrap().contains("String"));
    }

    #[test]
    fn unconstructable_filters_clean_types() {
        let names: Vec<&str> = unconstructable().iter().map(|f| f.type_name).collect();
        assert!(names.contains(&type_name::<Broken>()));
        assert!(!names.contains(&type_name::<Listed>()));
    }

    #[test]
    fn findings_serialize() {
        let finding = find(&audit(), type_name::<Listed>()).unwrap();
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["kind"], "Class");
        assert!(json["reason"].is_null());
    }

    #[test]
    fn implementors_are_listed_per_interface() {
        let mut expected = vec![DependencyKey::of::<Broken>(), DependencyKey::of::<Listed>()];
        expected.sort_by_key(|key| key.type_name());

        assert_eq!(implementors(DependencyKey::of::<dyn Sink>()), expected);
        assert!(implementors(DependencyKey::of::<dyn Unused>()).is_empty());
    }
}
