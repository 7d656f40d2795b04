//! Provider trait: a module of related bootstrap registrations.
//!
//! Providers group the `register`/`bind` calls of one area of an
//! application, so a session can be seeded module by module instead of
//! from one long block.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use sijill_container::prelude::*;
//! use sijill_container::{class, implements, interface};
//!
//! trait Mailer: Send + Sync {
//!     fn send(&self, to: &str) -> bool;
//! }
//!
//! struct SmtpMailer;
//! impl Mailer for SmtpMailer {
//!     fn send(&self, _: &str) -> bool { true }
//! }
//! impl Injectable for SmtpMailer {
//!     fn construct(_: &Arguments<'_>) -> Self { SmtpMailer }
//! }
//! class!(SmtpMailer);
//! interface!(dyn Mailer);
//! implements!(SmtpMailer => dyn Mailer);
//!
//! struct MailProvider;
//! impl Provider for MailProvider {
//!     fn register(&self, resolver: &Resolver) {
//!         resolver.bind::<dyn Mailer, SmtpMailer>();
//!     }
//! }
//!
//! let resolver = Resolver::builder().add_provider(MailProvider).build();
//! assert!(resolver.resolve::<dyn Mailer>().send("ops@example.com"));
//! ```

use crate::resolver::Resolver;

/// A module that seeds a resolver with related registrations.
///
/// Applied once, in insertion order, by
/// [`ResolverBuilder::build`](crate::resolver::ResolverBuilder::build).
pub trait Provider: Send + Sync {
    /// Registers or binds this module's entities.
    fn register(&self, resolver: &Resolver);

    /// Human-readable name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
