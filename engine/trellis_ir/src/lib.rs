//! Trellis IR - pattern tree and interning for the Trellis match engine.
//!
//! This crate provides:
//! - Interned names (`Name`, `StringInterner`, `SharedInterner`, `StringLookup`)
//! - Opaque host-expression handles (`ExprId`)
//! - The immutable pattern AST (`Pattern` and friends)
//! - Construction-time validation (`validate`, `ConstructError`)
//!
//! Patterns reference embedded host expressions (literals, pin expressions,
//! constant guards) by `ExprId` only; the expression arena that resolves
//! those ids lives in `trellis_eval`. This keeps the AST crate free of the
//! value model.

mod expr_id;
mod interner;
mod name;
mod pattern;
pub mod validate;

pub use expr_id::ExprId;
pub use interner::{InternError, SharedInterner, StringInterner, StringLookup};
pub use name::Name;
pub use pattern::{binding_names, ArrayElement, HashEntry, Pattern, PinSource, RestPattern};
pub use validate::{check_pattern, ConstructError};
