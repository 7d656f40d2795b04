//! Core resolver implementation for Sijill DI.

#[macro_use]
mod macros;

pub mod catalog;
pub mod entity;
pub mod error;
pub mod graph;
pub mod key;
pub mod kind;
pub mod provider;
pub mod registry;
pub mod resolver;
pub mod settings;
pub mod shape;

pub use entity::{Entity, Implements, Inject, Injectable, Instance, Ref};
pub use error::{Result, SijillError, Unconstructable};
pub use key::DependencyKey;
pub use kind::{EntityKind, Passing};
pub use registry::Registry;
pub use resolver::{Arguments, Resolver, ResolverBuilder, prelude};
pub use settings::Settings;
pub use shape::{Param, ParamShape, Shape, Signature, constructability, is_dependency, is_supported, reason};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
