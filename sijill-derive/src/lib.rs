//! Derive macros for Sijill.
//!
//! Re-exported by the `sijill` facade; depend on this crate directly only
//! when pairing the derive with `sijill-container` and
//! `#[injectable(crate = "...")]`.

pub use sijill_macros::Injectable;
