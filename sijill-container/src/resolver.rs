//! # The Resolver: heart of Sijill
//!
//! Produces fully constructed singletons by recursively resolving each
//! constructor parameter from the session's [`Registry`], building what is
//! missing on demand.
//!
//! # Architecture
//! ```text
//! ResolverBuilder ──build()──> Arc<Resolver> ──owns──> Arc<Registry>
//!                                   │
//!                             resolve::<T>()
//!                                   │
//!                   registry hit? ──yes──> stored handle
//!                                   │ no
//!                              make_new::<T>()
//!                                   │
//!                verdict ─> resolve each parameter ─> construct ─> store
//! ```
//!
//! # Examples
//! ```rust
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
//! struct UserService {
//!     logger: Arc<dyn Logger>,
//! }
//! impl Injectable for UserService {
//!     fn signatures() -> Vec<Signature> {
//!         vec![Signature::new().param::<Arc<dyn Logger>>()]
//!     }
//!     fn construct(args: &Arguments<'_>) -> Self {
//!         UserService { logger: args.inject() }
//!     }
//! }
//!
//! class!(ConsoleLogger, UserService);
//! interface!(dyn Logger);
//! implements!(ConsoleLogger => dyn Logger);
//!
//! let resolver = Resolver::new();
//! resolver.bind::<dyn Logger, ConsoleLogger>();
//!
//! let service = resolver.resolve::<UserService>();
//! service.logger.log("ready");
//! assert!(Arc::ptr_eq(&service, &resolver.resolve::<UserService>()));
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use sijill_support::rendering::{Implementor, PathStep, render_steps, suggest_bindings};
use tracing::{debug, info, instrument, trace, warn};

use crate::entity::{Entity, Implements, Inject, Instance};
use crate::error::{CircularDependencyError, Result, SijillError, Unconstructable, UnresolvableError};
use crate::graph::{GraphValidator, Node};
use crate::key::DependencyKey;
use crate::catalog;
use crate::kind::{EntityKind, Passing};
use crate::provider::Provider;
use crate::registry::Registry;
use crate::settings::Settings;
use crate::shape::{Shape, constructability};

const MAX_SUGGESTIONS: usize = 3;

// ============================================================
// ResolverBuilder
// ============================================================

/// Configures and creates a [`Resolver`].
///
/// # Examples
/// ```rust
/// use sijill_container::prelude::*;
///
/// let shared = Registry::new();
/// let resolver = Resolver::builder()
///     .registry(shared.clone())
///     .detect_cycles(true)
///     .build();
///
/// assert!(resolver.settings().detect_cycles);
/// assert!(std::sync::Arc::ptr_eq(resolver.registry(), &shared));
/// ```
#[derive(Default)]
pub struct ResolverBuilder {
    registry: Option<Arc<Registry>>,
    settings: Settings,
    providers: Vec<Box<dyn Provider>>,
}

impl ResolverBuilder {
    /// Use an externally supplied registry instead of a fresh one.
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Fail on constructor cycles instead of overflowing the stack.
    pub fn detect_cycles(mut self, enabled: bool) -> Self {
        self.settings.detect_cycles = enabled;
        self
    }

    /// Add a [`Provider`] module, applied when the resolver is built.
    pub fn add_provider(mut self, provider: impl Provider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Create the resolver, register it in its registry and apply providers
    /// in insertion order.
    #[instrument(skip(self), name = "resolver_build")]
    pub fn build(self) -> Arc<Resolver> {
        let registry = self.registry.unwrap_or_else(Registry::new);
        let settings = self.settings;

        let resolver = Arc::new_cyclic(|this: &Weak<Resolver>| Resolver {
            registry,
            settings,
            this: this.clone(),
        });
        resolver.registry.store::<Resolver>(Arc::clone(&resolver));

        info!(
            instances = resolver.registry.len(),
            providers = self.providers.len(),
            detect_cycles = settings.detect_cycles,
            "Building resolver"
        );

        for provider in &self.providers {
            info!(provider = provider.name(), "Applying provider");
            provider.register(&resolver);
        }

        info!("Resolver ready ✓");
        resolver
    }
}

impl fmt::Debug for ResolverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverBuilder")
            .field("shared_registry", &self.registry.is_some())
            .field("settings", &self.settings)
            .field("providers", &self.providers.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Resolver
// ═══════════════════════════════════════════

/// Resolves and constructs singletons for one session.
///
/// Stateless beyond its registry and settings: everything a resolution pass
/// needs lives on the call stack.
///
/// The registry only keeps a weak handle to its resolver. Once a stored
/// singleton injects `Arc<Resolver>` (or `Arc<Registry>`), the session owns
/// itself and dropping the last outside handle no longer frees it.
pub struct Resolver {
    registry: Arc<Registry>,
    settings: Settings,
    this: Weak<Resolver>,
}

impl Resolver {
    /// Creates a resolver together with a fresh registry.
    pub fn new() -> Arc<Self> {
        Self::builder().build()
    }

    /// Creates a resolver over an existing, possibly shared, registry.
    pub fn with_registry(registry: Arc<Registry>) -> Arc<Self> {
        Self::builder().registry(registry).build()
    }

    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::default()
    }

    /// The registry this resolver reads and writes.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the singleton for `T`, constructing it on first use.
    ///
    /// A stored instance always wins, whether it was constructed earlier or
    /// registered manually.
    ///
    /// # Panics
    /// If `T`, or anything it transitively depends on, cannot be
    /// auto-constructed. The message names the reason and the resolution
    /// path. Interfaces panic unless bound first.
    pub fn resolve<T: ?Sized + Entity>(&self) -> T::Handle {
        self.resolve_from::<T>(None, None)
    }

    fn resolve_from<T: ?Sized + Entity>(&self, parent: Option<&Frame<'_>>, passing: Option<Passing>) -> T::Handle {
        if let Some(handle) = self.registry.get::<T>() {
            trace!(key = %T::key(), "Registry hit");
            return handle;
        }

        // Stored only after construction completes; a cycle is not broken here.
        let handle = self.construct::<T>(parent, passing);
        self.registry.store::<T>(handle.clone());
        handle
    }

    /// Constructs a fresh `T`, resolving its parameters as singletons.
    ///
    /// The new instance itself is not stored.
    ///
    /// # Panics
    /// On a negative [`constructability`] verdict for `T` or any dependency
    /// that has to be built, and on a cycle when cycle detection is enabled.
    pub fn make_new<T: ?Sized + Entity>(&self) -> T::Handle {
        self.construct::<T>(None, None)
    }

    fn construct<T: ?Sized + Entity>(&self, parent: Option<&Frame<'_>>, passing: Option<Passing>) -> T::Handle {
        let key = T::key();

        if let Some(reason) = constructability::<T>() {
            let mut path = parent.map(Frame::path).unwrap_or_default();
            path.push(key);
            let suggestions = match reason {
                Unconstructable::Interface { .. } => self.suggestions(&key),
                _ => Vec::new(),
            };
            panic!(
                "{}",
                SijillError::Unresolvable(UnresolvableError {
                    key,
                    reason,
                    path,
                    suggestions,
                })
            );
        }

        if self.settings.detect_cycles
            && let Some(parent) = parent
            && parent.contains(&key)
        {
            let path = parent.path();
            let start = path.iter().position(|k| *k == key).unwrap_or(0);
            let mut chain = path[start..].to_vec();
            chain.push(key);

            warn!(key = %key, depth = chain.len(), "Circular dependency detected!\n{}", parent.render());
            panic!("{}", SijillError::CircularDependency(CircularDependencyError { chain }));
        }

        let frame = Frame {
            key,
            kind: T::KIND,
            passing,
            parent,
        };
        debug!(key = %key, depth = frame.depth(), "Constructing");
        T::build(&Arguments {
            resolver: self,
            frame: &frame,
        })
    }

    /// Stores `handle` as the singleton for `T`, replacing any existing one.
    ///
    /// Dependents built earlier keep the instance they were given.
    pub fn register<T: ?Sized + Entity>(&self, handle: T::Handle) {
        self.registry.set::<T>(handle);
    }

    /// Binds `instance` to interface `I`: afterwards both `I` and `C` resolve
    /// to it.
    pub fn register_interface<I, C>(&self, instance: Arc<C>)
    where
        I: ?Sized + Entity<Handle = Arc<I>>,
        C: Implements<I>,
    {
        debug!(interface = %I::key(), implementation = %C::key(), "Binding interface");
        self.registry.set::<C>(Arc::clone(&instance));
        self.registry.set::<I>(<C as Implements<I>>::upcast(instance));
    }

    /// Resolves `C`, constructing it if needed, and binds it to `I`.
    pub fn bind<I, C>(&self) -> Arc<I>
    where
        I: ?Sized + Entity<Handle = Arc<I>>,
        C: Implements<I>,
    {
        let instance = self.resolve::<C>();
        self.register_interface::<I, C>(Arc::clone(&instance));
        <C as Implements<I>>::upcast(instance)
    }

    /// Plans how `T` would be constructed in this session without building
    /// anything.
    ///
    /// Returns the keys `resolve::<T>()` would construct, dependencies first.
    /// Keys already stored count as satisfied.
    ///
    /// # Errors
    /// - [`SijillError::Unresolvable`]: the first entity that cannot be built
    /// - [`SijillError::CircularDependency`]: constructor cycle
    pub fn plan<T: ?Sized + Entity>(&self) -> Result<Vec<DependencyKey>> {
        let result = GraphValidator::new(|key: &DependencyKey| self.registry.contains(key)).plan(Node::of::<T>());

        match result {
            Err(SijillError::Unresolvable(mut err)) => {
                if let Unconstructable::Interface { .. } = err.reason {
                    err.suggestions = self.suggestions(&err.key);
                }
                Err(SijillError::Unresolvable(err))
            }
            other => other,
        }
    }

    fn handle(&self) -> Arc<Resolver> {
        match self.this.upgrade() {
            Some(this) => this,
            None => unreachable!("a resolver only exists inside the Arc created by its builder"),
        }
    }

    fn suggestions(&self, key: &DependencyKey) -> Vec<String> {
        let implementors: Vec<Implementor<'_>> = catalog::implementors(*key)
            .iter()
            .map(|class| Implementor {
                type_name: class.type_name(),
                stored: self.registry.contains(class),
            })
            .collect();
        suggest_bindings(key.type_name(), &implementors, MAX_SUGGESTIONS)
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("instances", &self.registry.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Shape for Resolver {
    const KIND: EntityKind = EntityKind::Class;
}

impl Entity for Resolver {
    type Handle = Arc<Resolver>;

    const RESERVED: bool = true;

    fn erase(handle: Self::Handle) -> Instance {
        handle
    }

    fn restore(instance: &Instance) -> Option<Self::Handle> {
        Arc::clone(instance).downcast::<Resolver>().ok()
    }

    fn build(args: &Arguments<'_>) -> Self::Handle {
        args.resolver().handle()
    }
}

// ═══════════════════════════════════════════
// Arguments and Frame
// ═══════════════════════════════════════════

/// Produces constructor arguments during one construction.
///
/// Each [`inject`](Arguments::inject) call resolves the next parameter as a
/// singleton; call it once per declared parameter, in declaration order.
pub struct Arguments<'a> {
    resolver: &'a Resolver,
    frame: &'a Frame<'a>,
}

impl<'a> Arguments<'a> {
    /// Resolves a parameter of type `P`.
    pub fn inject<P: Inject>(&self) -> P {
        P::inject(self)
    }

    /// Resolves the singleton handle of entity `T`.
    pub fn resolve<T: ?Sized + Entity>(&self) -> T::Handle {
        self.resolver.resolve_from::<T>(Some(self.frame), None)
    }

    /// Like [`resolve`](Arguments::resolve), recording how the parameter is
    /// handed to the constructor so failure paths can show it.
    pub fn resolve_passed<T: ?Sized + Entity>(&self, passing: Passing) -> T::Handle {
        self.resolver.resolve_from::<T>(Some(self.frame), Some(passing))
    }

    /// The resolver performing this construction.
    pub fn resolver(&self) -> &'a Resolver {
        self.resolver
    }

    /// The entity being constructed.
    pub fn frame(&self) -> &'a Frame<'a> {
        self.frame
    }
}

impl fmt::Debug for Arguments<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments").field("frame", self.frame).finish()
    }
}

/// One construction in progress, linked to the construction that needs it.
///
/// Frames live on the call stack for the duration of one `resolve`.
pub struct Frame<'a> {
    key: DependencyKey,
    kind: EntityKind,
    passing: Option<Passing>,
    parent: Option<&'a Frame<'a>>,
}

impl<'a> Frame<'a> {
    pub fn key(&self) -> DependencyKey {
        self.key
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// How this entity is handed to the parent's constructor, when known.
    pub fn passing(&self) -> Option<Passing> {
        self.passing
    }

    /// The construction that requested this one.
    pub fn parent(&self) -> Option<&'a Frame<'a>> {
        self.parent
    }

    /// Keys from the outermost request down to this frame.
    pub fn path(&self) -> Vec<DependencyKey> {
        let mut path: Vec<DependencyKey> = self.ancestors().map(|frame| frame.key).collect();
        path.reverse();
        path
    }

    /// Returns `true` if `key` is being constructed on this chain.
    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.ancestors().any(|frame| frame.key == *key)
    }

    /// Number of frames on this chain, this one included.
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    /// Renders this chain as a tree, outermost request first, with entity
    /// kinds, record markers and passing modes.
    pub fn render(&self) -> String {
        let mut steps: Vec<PathStep<'_>> = self
            .ancestors()
            .map(|frame| PathStep {
                type_name: frame.key.type_name(),
                kind: frame.kind.label(),
                record: frame.key.is_record(),
                passing: frame.passing.map(|passing| passing.label()),
            })
            .collect();
        steps.reverse();
        render_steps(&steps, Some("constructing"))
    }

    fn ancestors(&self) -> impl Iterator<Item = &Frame<'a>> {
        std::iter::successors(Some(self), |frame| frame.parent)
    }
}

impl fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("depth", &self.depth())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{Arguments, Resolver, ResolverBuilder};
    pub use crate::entity::{Entity, Implements, Inject, Injectable, Ref};
    pub use crate::error::{Result, SijillError, Unconstructable};
    pub use crate::key::DependencyKey;
    pub use crate::kind::{EntityKind, Passing};
    pub use crate::provider::Provider;
    pub use crate::registry::Registry;
    pub use crate::settings::Settings;
    pub use crate::shape::{Param, Shape, Signature, constructability, is_dependency, is_supported, reason};
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
