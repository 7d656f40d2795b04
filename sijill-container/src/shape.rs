//! Static shape descriptors and the constructability verdict.
//!
//! Rust has no constructor reflection, so every type describes itself:
//! [`Shape`] gives its [`EntityKind`] and declared constructors, and
//! [`Param`] describes how a constructor parameter type would be injected.
//! From those, [`constructability`] decides whether the resolver may build
//! the type on its own, without looking at any registry.
//!
//! Primitives, strings, collections, options and raw pointers implement
//! both traits as [`EntityKind::Unsupported`], so a constructor declaring
//! such a parameter is rejected with a reason instead of being silently
//! skipped.

use std::any::type_name;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::entity::Entity;
use crate::error::Unconstructable;
use crate::key::DependencyKey;
use crate::kind::{EntityKind, Passing};

/// Static description of a type: what kind of entity it is and which
/// constructors it declares.
pub trait Shape: 'static {
    /// The entity kind of this type.
    const KIND: EntityKind;

    /// Declared constructors in declaration order.
    ///
    /// Empty means no declared constructor: the implicit default one is used.
    fn constructors() -> Vec<Signature> {
        Vec::new()
    }
}

/// Describes a type appearing in a constructor parameter list.
pub trait Param: 'static {
    /// How this parameter would be injected.
    fn describe() -> ParamShape;
}

/// One parameter of a declared constructor.
#[derive(Debug, Clone)]
pub struct ParamShape {
    key: DependencyKey,
    kind: EntityKind,
    passing: Passing,
    constructors: fn() -> Vec<Signature>,
}

impl ParamShape {
    /// Describes a parameter receiving entity `T` with the given passing mode.
    pub fn of<T: ?Sized + Entity>(passing: Passing) -> Self {
        Self {
            key: T::key(),
            kind: T::KIND,
            passing,
            constructors: <T as Shape>::constructors,
        }
    }

    /// Describes a parameter type the resolver cannot inject.
    pub fn unsupported<T: ?Sized + 'static>(what: &'static str) -> Self {
        Self {
            key: DependencyKey::of::<T>(),
            kind: EntityKind::Unsupported(what),
            passing: Passing::Unsupported,
            constructors: Vec::new,
        }
    }

    /// Key of the entity this parameter resolves to.
    pub fn key(&self) -> DependencyKey {
        self.key
    }

    /// Name of the parameter's entity type.
    pub fn type_name(&self) -> &'static str {
        self.key.type_name()
    }

    /// Entity kind of the parameter type.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// How the argument is handed to the constructor.
    pub fn passing(&self) -> Passing {
        self.passing
    }

    /// Constructors declared by the parameter's entity type.
    pub fn constructors(&self) -> Vec<Signature> {
        (self.constructors)()
    }

    pub(crate) fn constructors_fn(&self) -> fn() -> Vec<Signature> {
        self.constructors
    }
}

/// Parameter list of one declared constructor.
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
/// sijill_container::class!(Database);
///
/// let signature = Signature::new().param::<Arc<Database>>().param::<u16>();
/// assert_eq!(signature.len(), 2);
/// assert!(!signature.params()[1].kind().is_supported());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<ParamShape>,
}

impl Signature {
    /// Starts an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter of type `P`.
    pub fn param<P: Param>(mut self) -> Self {
        self.params.push(P::describe());
        self
    }

    /// Parameters in declaration order.
    pub fn params(&self) -> &[ParamShape] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Is `T` a class, interface or record?
pub fn is_supported<T: ?Sized + Shape>() -> bool {
    T::KIND.is_supported()
}

/// Can `P` appear as an injected constructor parameter?
pub fn is_dependency<P: Param>() -> bool {
    P::describe().kind.is_supported()
}

/// Decides whether `T` can be auto-constructed.
///
/// Returns `None` when it can, or the single reason it cannot.
///
/// # Examples
/// ```
/// use sijill_container::shape::constructability;
/// use sijill_container::error::Unconstructable;
///
/// assert!(matches!(
///     constructability::<u32>(),
///     Some(Unconstructable::UnsupportedKind { what: "primitive", .. })
/// ));
/// ```
pub fn constructability<T: ?Sized + Shape>() -> Option<Unconstructable> {
    verdict(type_name::<T>(), T::KIND, <T as Shape>::constructors)
}

/// Human-readable form of [`constructability`].
pub fn reason<T: ?Sized + Shape>() -> Option<String> {
    constructability::<T>().map(|reason| reason.to_string())
}

pub(crate) fn verdict(
    type_name: &'static str,
    kind: EntityKind,
    constructors: fn() -> Vec<Signature>,
) -> Option<Unconstructable> {
    if let EntityKind::Unsupported(what) = kind {
        return Some(Unconstructable::UnsupportedKind { type_name, what });
    }
    if !kind.is_instantiable() {
        return Some(Unconstructable::Interface { type_name });
    }

    let declared = constructors();
    if declared.len() > 1 {
        return Some(Unconstructable::AmbiguousConstructor {
            type_name,
            count: declared.len(),
        });
    }

    declared
        .first()?
        .params()
        .iter()
        .enumerate()
        .find_map(|(index, param)| match param.kind {
            EntityKind::Unsupported(what) => Some(Unconstructable::UnsupportedParameter {
                type_name,
                index,
                parameter: param.type_name(),
                what,
            }),
            _ => None,
        })
}

macro_rules! unsupported {
    ($what:literal => $($ty:ty),+ $(,)?) => {
        $(
            impl Shape for $ty {
                const KIND: EntityKind = EntityKind::Unsupported($what);
            }

            impl Param for $ty {
                fn describe() -> ParamShape {
                    ParamShape::unsupported::<$ty>($what)
                }
            }
        )+
    };
}

unsupported!("primitive" =>
    bool, char, (),
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64,
);

unsupported!("string" => String, &'static str);

macro_rules! unsupported_generic {
    ($what:literal => $($ty:ident<$($param:ident),+>),+ $(,)?) => {
        $(
            impl<$($param: 'static),+> Shape for $ty<$($param),+> {
                const KIND: EntityKind = EntityKind::Unsupported($what);
            }

            impl<$($param: 'static),+> Param for $ty<$($param),+> {
                fn describe() -> ParamShape {
                    ParamShape::unsupported::<$ty<$($param),+>>($what)
                }
            }
        )+
    };
}

unsupported_generic!("collection" =>
    Vec<T>, VecDeque<T>, HashSet<T, S>, BTreeSet<T>, HashMap<K, V, S>, BTreeMap<K, V>,
);

unsupported_generic!("option" => Option<T>);

impl<T: ?Sized + 'static> Shape for *const T {
    const KIND: EntityKind = EntityKind::Unsupported("raw pointer");
}

impl<T: ?Sized + 'static> Param for *const T {
    fn describe() -> ParamShape {
        ParamShape::unsupported::<*const T>("raw pointer")
    }
}

impl<T: ?Sized + 'static> Shape for *mut T {
    const KIND: EntityKind = EntityKind::Unsupported("raw pointer");
}

impl<T: ?Sized + 'static> Param for *mut T {
    fn describe() -> ParamShape {
        ParamShape::unsupported::<*mut T>("raw pointer")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entity::{Injectable, Ref};
    use crate::resolver::Arguments;

    #[derive(Default)]
    struct Plain;
    impl Injectable for Plain {
        fn construct(_: &Arguments<'_>) -> Self {
            Plain
        }
    }
    crate::class!(Plain);

    #[derive(Clone, Default)]
    struct Tuning;
    impl Injectable for Tuning {
        fn construct(_: &Arguments<'_>) -> Self {
            Tuning
        }
    }
    crate::record!(Tuning);

    struct Wired;
    impl Injectable for Wired {
        fn signatures() -> Vec<Signature> {
            vec![Signature::new()
                .param::<Arc<Plain>>()
                .param::<Ref<Tuning>>()
                .param::<Tuning>()]
        }
        fn construct(args: &Arguments<'_>) -> Self {
            let _: Arc<Plain> = args.inject();
            let _: Ref<Tuning> = args.inject();
            let _: Tuning = args.inject();
            Wired
        }
    }
    crate::class!(Wired);

    struct Twice;
    impl Injectable for Twice {
        fn signatures() -> Vec<Signature> {
            vec![Signature::new(), Signature::new().param::<Arc<Plain>>()]
        }
        fn construct(_: &Arguments<'_>) -> Self {
            Twice
        }
    }
    crate::class!(Twice);

    struct Port;
    impl Injectable for Port {
        fn signatures() -> Vec<Signature> {
            vec![Signature::new().param::<Arc<Plain>>().param::<u16>()]
        }
        fn construct(_: &Arguments<'_>) -> Self {
            Port
        }
    }
    crate::class!(Port);

    trait Clock: Send + Sync {}
    crate::interface!(dyn Clock);

    #[test]
    fn implicit_constructor_is_constructable() {
        assert!(Plain::constructors().is_empty());
        assert_eq!(constructability::<Plain>(), None);
        assert_eq!(reason::<Tuning>(), None);
    }

    #[test]
    fn single_supported_constructor_is_constructable() {
        assert_eq!(constructability::<Wired>(), None);
    }

    #[test]
    fn signature_keeps_declaration_order_and_passing() {
        let declared = Wired::constructors();
        let params = declared[0].params();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].passing(), Passing::Shared);
        assert_eq!(params[1].passing(), Passing::Handle);
        assert_eq!(params[2].passing(), Passing::Copy);
        assert_eq!(params[1].key(), params[2].key());
        assert!(params[1].key().is_record());
    }

    #[test]
    fn unsupported_kind_is_rejected() {
        assert!(matches!(
            constructability::<String>(),
            Some(Unconstructable::UnsupportedKind { what: "string", .. })
        ));
        assert!(matches!(
            constructability::<Vec<Plain>>(),
            Some(Unconstructable::UnsupportedKind { what: "collection", .. })
        ));
        assert!(!is_supported::<*const Plain>());
    }

    #[test]
    fn interface_is_rejected() {
        assert!(is_supported::<dyn Clock>());
        assert!(matches!(
            constructability::<dyn Clock>(),
            Some(Unconstructable::Interface { .. })
        ));
    }

    #[test]
    fn two_constructors_are_rejected() {
        assert_eq!(
            constructability::<Twice>(),
            Some(Unconstructable::AmbiguousConstructor {
                type_name: std::any::type_name::<Twice>(),
                count: 2,
            })
        );
    }

    #[test]
    fn primitive_parameter_is_rejected() {
        match constructability::<Port>() {
            Some(Unconstructable::UnsupportedParameter { index, parameter, what, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(parameter, "u16");
                assert_eq!(what, "primitive");
            }
            other => panic!("Expected UnsupportedParameter, got: {other:?}"),
        }
        assert!(reason::<Port>().unwrap().contains("u16"));
    }

    #[test]
    fn dependency_shapes() {
        assert!(is_dependency::<Arc<Plain>>());
        assert!(is_dependency::<Arc<dyn Clock>>());
        assert!(is_dependency::<Ref<Tuning>>());
        assert!(is_dependency::<Tuning>());
        assert!(!is_dependency::<u16>());
        assert!(!is_dependency::<&'static str>());
        assert!(!is_dependency::<HashMap<String, u8>>());
        assert!(!is_dependency::<Option<Arc<Plain>>>());
    }
}
