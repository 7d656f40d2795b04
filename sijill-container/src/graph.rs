//! Static construction plans.
//!
//! Walks declared constructor signatures depth-first, without constructing
//! anything, and reports:
//! - the order in which `resolve` would build each missing entity
//! - the first entity that cannot be auto-constructed, with its path
//! - constructor cycles
//!
//! Planning is diagnostics only. `resolve` never consults it.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use crate::entity::Entity;
use crate::error::{CircularDependencyError, Result, SijillError, UnresolvableError};
use crate::key::DependencyKey;
use crate::kind::EntityKind;
use crate::shape::{ParamShape, Signature, verdict};

/// One entity in the dependency graph.
#[derive(Clone)]
pub(crate) struct Node {
    key: DependencyKey,
    kind: EntityKind,
    constructors: fn() -> Vec<Signature>,
}

impl Node {
    pub fn of<T: ?Sized + Entity>() -> Self {
        Self {
            key: T::key(),
            kind: T::KIND,
            constructors: T::constructors,
        }
    }
}

impl From<&ParamShape> for Node {
    fn from(param: &ParamShape) -> Self {
        Self {
            key: param.key(),
            kind: param.kind(),
            constructors: param.constructors_fn(),
        }
    }
}

/// Depth-first planner over constructor signatures.
///
/// `satisfied` tells which keys already hold an instance; those are neither
/// inspected nor planned, which is how bound interfaces pass.
pub(crate) struct GraphValidator<F> {
    satisfied: F,
    /// Currently being visited (for cycle detection)
    visiting: HashSet<DependencyKey>,
    /// Already planned or satisfied
    planned: HashSet<DependencyKey>,
    /// Current DFS path (for error reporting)
    path: Vec<DependencyKey>,
    order: Vec<DependencyKey>,
}

impl<F> GraphValidator<F>
where
    F: Fn(&DependencyKey) -> bool,
{
    pub fn new(satisfied: F) -> Self {
        Self {
            satisfied,
            visiting: HashSet::new(),
            planned: HashSet::new(),
            path: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Plans the construction of `root`.
    ///
    /// Returns the keys to construct, dependencies first, in the order
    /// `resolve` would build them.
    ///
    /// # Errors
    /// - [`SijillError::Unresolvable`]: an entity on the way cannot be auto-constructed
    /// - [`SijillError::CircularDependency`]: constructor cycle
    #[instrument(skip_all, fields(root = %root.key), name = "graph_plan")]
    pub fn plan(mut self, root: Node) -> Result<Vec<DependencyKey>> {
        self.visit(&root)?;
        debug!(steps = self.order.len(), "Construction plan ready ✓");
        Ok(self.order)
    }

    fn visit(&mut self, node: &Node) -> Result<()> {
        let key = node.key;
        if self.planned.contains(&key) {
            return Ok(());
        }

        if (self.satisfied)(&key) {
            self.planned.insert(key);
            return Ok(());
        }

        if self.visiting.contains(&key) {
            let start = self.path.iter().position(|k| *k == key).unwrap_or(0);
            let mut chain = self.path[start..].to_vec();
            chain.push(key);

            let names: Vec<String> = chain.iter().map(DependencyKey::short_name).collect();
            warn!(cycle = ?names, "Circular dependency detected!");
            return Err(SijillError::CircularDependency(CircularDependencyError { chain }));
        }

        if let Some(reason) = verdict(key.type_name(), node.kind, node.constructors) {
            let mut path = self.path.clone();
            path.push(key);
            return Err(SijillError::Unresolvable(UnresolvableError {
                key,
                reason,
                path,
                suggestions: Vec::new(),
            }));
        }

        self.visiting.insert(key);
        self.path.push(key);

        if let Some(signature) = (node.constructors)().first() {
            for param in signature.params() {
                self.visit(&Node::from(param))?;
            }
        }

        self.path.pop();
        self.visiting.remove(&key);
        self.planned.insert(key);
        self.order.push(key);

        Ok(())
    }
}

/// Plans the construction of `T` in an empty session.
///
/// See [`Resolver::plan`](crate::resolver::Resolver::plan) to take the
/// instances of a live session into account.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use sijill_container::prelude::*;
///
/// struct Base;
/// impl Injectable for Base {
///     fn construct(_: &Arguments<'_>) -> Self { Base }
/// }
///
/// struct Top(Arc<Base>);
/// impl Injectable for Top {
///     fn signatures() -> Vec<Signature> {
///         vec![Signature::new().param::<Arc<Base>>()]
///     }
///     fn construct(args: &Arguments<'_>) -> Self { Top(args.inject()) }
/// }
///
/// sijill_container::class!(Base, Top);
///
/// let order = sijill_container::graph::plan::<Top>().unwrap();
/// assert_eq!(order, vec![DependencyKey::of::<Base>(), DependencyKey::of::<Top>()]);
/// ```
pub fn plan<T: ?Sized + Entity>() -> Result<Vec<DependencyKey>> {
    GraphValidator::new(|_: &DependencyKey| false).plan(Node::of::<T>())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entity::{Injectable, Ref};
    use crate::error::Unconstructable;
    use crate::resolver::Arguments;

    struct Database;
    impl Injectable for Database {
        fn construct(_: &Arguments<'_>) -> Self {
            Database
        }
    }

    #[derive(Clone, Default)]
    struct Config;
    impl Injectable for Config {
        fn construct(_: &Arguments<'_>) -> Self {
            Config
        }
    }

    struct UserRepo;
    impl Injectable for UserRepo {
        fn signatures() -> Vec<Signature> {
            vec![Signature::new().param::<Arc<Database>>().param::<Ref<Config>>()]
        }
        fn construct(_: &Arguments<'_>) -> Self {
            UserRepo
        }
    }

    struct AuditLog;
    impl Injectable for AuditLog {
        fn signatures() -> Vec<Signature> {
            vec![Signature::new().param::<Arc<Database>>()]
        }
        fn construct(_: &Arguments<'_>) -> Self {
            AuditLog
        }
    }

    struct UserService;
    impl Injectable for UserService {
        fn signatures() -> Vec<Signature> {
            vec![Signature::new().param::<Arc<UserRepo>>().param::<Arc<AuditLog>>()]
        }
        fn construct(_: &Arguments<'_>) -> Self {
            UserService
        }
    }

    trait Clock: Send + Sync {}

    struct Scheduler;
    impl Injectable for Scheduler {
        fn signatures() -> Vec<Signature> {
            vec![Signature::new().param::<Arc<Database>>().param::<Arc<dyn Clock>>()]
        }
        fn construct(_: &Arguments<'_>) -> Self {
            Scheduler
        }
    }

    struct Ping;
    impl Injectable for Ping {
        fn signatures() -> Vec<Signature> {
            vec![Signature::new().param::<Arc<Pong>>()]
        }
        fn construct(_: &Arguments<'_>) -> Self {
            Ping
        }
    }

    struct Pong;
    impl Injectable for Pong {
        fn signatures() -> Vec<Signature> {
            vec![Signature::new().param::<Arc<Ping>>()]
        }
        fn construct(_: &Arguments<'_>) -> Self {
            Pong
        }
    }

    crate::class!(Database, UserRepo, AuditLog, UserService, Scheduler, Ping, Pong);
    crate::record!(Config);
    crate::interface!(dyn Clock);

    #[test]
    fn leaf_plan_is_itself() {
        assert_eq!(plan::<Database>().unwrap(), vec![DependencyKey::of::<Database>()]);
    }

    #[test]
    fn diamond_plans_shared_dependency_once() {
        //   UserService
        //    /       \
        // UserRepo  AuditLog
        //    \       /
        //    Database
        let order = plan::<UserService>().unwrap();
        assert_eq!(
            order,
            vec![
                DependencyKey::of::<Database>(),
                DependencyKey::record::<Config>(),
                DependencyKey::of::<UserRepo>(),
                DependencyKey::of::<AuditLog>(),
                DependencyKey::of::<UserService>(),
            ]
        );
    }

    #[test]
    fn unbound_interface_is_reported_with_its_path() {
        match plan::<Scheduler>() {
            Err(SijillError::Unresolvable(err)) => {
                assert_eq!(err.key, DependencyKey::of::<dyn Clock>());
                assert!(matches!(err.reason, Unconstructable::Interface { .. }));
                assert_eq!(err.required_by(), Some(&DependencyKey::of::<Scheduler>()));
            }
            other => panic!("Expected Unresolvable, got: {other:?}"),
        }
    }

    #[test]
    fn satisfied_keys_are_skipped() {
        let clock = DependencyKey::of::<dyn Clock>();
        let database = DependencyKey::of::<Database>();
        let order = GraphValidator::new(|key: &DependencyKey| *key == clock || *key == database)
            .plan(Node::of::<Scheduler>())
            .unwrap();
        assert_eq!(order, vec![DependencyKey::of::<Scheduler>()]);
    }

    #[test]
    fn detect_circular_dependency() {
        match plan::<Ping>() {
            Err(SijillError::CircularDependency(err)) => {
                assert_eq!(
                    err.chain,
                    vec![
                        DependencyKey::of::<Ping>(),
                        DependencyKey::of::<Pong>(),
                        DependencyKey::of::<Ping>(),
                    ]
                );
            }
            other => panic!("Expected CircularDependency, got: {other:?}"),
        }
    }
}
