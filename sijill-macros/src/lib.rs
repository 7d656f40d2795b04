//! Procedural macros for Sijill.
//!
//! * `#[derive(Injectable)]` - synthesizes the single constructor of a struct
//!   from its `#[inject]` fields and declares it to the resolver

use proc_macro::TokenStream;

mod injectable;

/// Derives `Injectable` and declares the struct as a class (or record).
///
/// Fields marked `#[inject]` become constructor parameters, in field order;
/// every other field is initialized with `Default::default()`.
///
/// Attributes:
/// * `#[injectable(record)]` - declare a value type; the struct must be `Clone`
/// * `#[injectable(crate = "path")]` - path of the `sijill` facade (default `::sijill`)
/// * `#[inject(copy)]` - accept a record injected by value; without it such a
///   field raises a deprecation warning, since the constructor only gets a copy
///
/// ```ignore
/// #[derive(Injectable)]
/// struct UserService {
///     #[inject]
///     repo: Arc<UserRepository>,
///     #[inject]
///     logger: Arc<dyn Logger>,
///     requests: AtomicU64,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}
