//! # Sijill Support
//!
//! Display helpers shared by the Sijill crates: short type names, record
//! slot markers, resolution path trees and binding suggestions.

pub mod rendering;
