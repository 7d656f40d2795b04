//! Error types for Sijill resolution.
//!
//! Resolution failures are programmer errors: [`Resolver::resolve`] panics
//! with the `Display` form of these types. Diagnostic entry points such as
//! [`Resolver::plan`] return them as values instead.
//!
//! [`Resolver::resolve`]: crate::resolver::Resolver::resolve
//! [`Resolver::plan`]: crate::resolver::Resolver::plan

use std::fmt;

use sijill_support::rendering::render_path;

use crate::key::DependencyKey;

/// Main error type for Sijill diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum SijillError {
    /// A type on the resolution path cannot be auto-constructed.
    #[error("{}", .0)]
    Unresolvable(UnresolvableError),

    /// A constructor cycle was found.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A registry slot holds a handle of the wrong type.
    #[error("Registry slot {key} does not hold a {expected}\n  Hint: raw Registry::insert calls must store the entity's own handle type")]
    TypeMismatch {
        key: DependencyKey,
        expected: &'static str,
    },
}

/// Why a type cannot be auto-constructed.
///
/// The constructability verdict: a pure function of the type's declared shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unconstructable {
    /// The type is not a class, interface or record.
    #[error("{type_name} is not a supported entity kind ({what})")]
    UnsupportedKind {
        type_name: &'static str,
        what: &'static str,
    },

    /// Interfaces are only ever resolved through a binding.
    #[error("{type_name} is an interface and cannot be instantiated directly")]
    Interface { type_name: &'static str },

    /// More than one declared constructor.
    #[error("{type_name} declares {count} constructors, expected at most one")]
    AmbiguousConstructor { type_name: &'static str, count: usize },

    /// A constructor parameter is not a supported entity kind.
    #[error("parameter #{index} of {type_name} has unsupported type {parameter} ({what})")]
    UnsupportedParameter {
        type_name: &'static str,
        index: usize,
        parameter: &'static str,
        what: &'static str,
    },
}

impl Unconstructable {
    /// Name of the type the verdict is about.
    pub fn type_name(&self) -> &'static str {
        match self {
            Unconstructable::UnsupportedKind { type_name, .. }
            | Unconstructable::Interface { type_name }
            | Unconstructable::AmbiguousConstructor { type_name, .. }
            | Unconstructable::UnsupportedParameter { type_name, .. } => type_name,
        }
    }
}

/// A negative verdict met while resolving, with where it was met.
#[derive(Debug)]
pub struct UnresolvableError {
    /// The type that could not be constructed.
    pub key: DependencyKey,
    /// The verdict.
    pub reason: Unconstructable,
    /// Resolution path from the outermost request down to `key`.
    pub path: Vec<DependencyKey>,
    /// Classes declared to implement the interface, best candidates first.
    pub suggestions: Vec<String>,
}

impl UnresolvableError {
    /// The type that asked for `key`, if any.
    pub fn required_by(&self) -> Option<&DependencyKey> {
        self.path.iter().rev().nth(1)
    }
}

impl fmt::Display for UnresolvableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cannot construct {}: {}", self.key, self.reason)?;

        if let Some(parent) = self.required_by() {
            write!(f, "\n  Required by: {parent}")?;
        }

        if self.path.len() > 1 {
            let names: Vec<String> = self.path.iter().map(|k| k.short_name()).collect();
            write!(f, "\n  Resolution path: {}", render_path(&names))?;
        }

        if !self.suggestions.is_empty() {
            write!(f, "\n  Declared implementations:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        match self.reason {
            Unconstructable::Interface { type_name } => write!(
                f,
                "\n  Hint: call .register_interface::<{type_name}, _>(..) or .bind::<{type_name}, _>() before resolving"
            ),
            Unconstructable::AmbiguousConstructor { .. } => {
                write!(f, "\n  Hint: keep a single constructor, or register an instance manually")
            }
            Unconstructable::UnsupportedKind { .. } | Unconstructable::UnsupportedParameter { .. } => {
                write!(f, "\n  Hint: wrap primitives, strings and collections in a record")
            }
        }
    }
}

/// A constructor cycle.
///
/// Shows the full chain so you can see WHERE the cycle is.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// The chain of dependencies that forms the cycle.
    /// Example: ["A", "B", "A"]
    pub chain: Vec<DependencyKey>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  ")?;

        let chain_str: Vec<String> = self.chain.iter().map(|k| k.short_name()).collect();
        write!(f, "{}", render_path(&chain_str))?;

        write!(
            f,
            "\n  Hint: register one of these types manually before resolving, or restructure the constructors"
        )
    }
}

/// Convenient Result type for Sijill diagnostics.
pub type Result<T> = std::result::Result<T, SijillError>;
