//! Trellis Value - runtime value model for the Trellis match engine.
//!
//! This crate provides:
//! - Runtime values (`Value`, `Heap`, `MapValue`, `RangeValue`, `TypeTag`,
//!   `PredicateValue`, `ObjectValue`)
//! - Case-equality (`case_eq`), the "matches-against" predicate used by
//!   value patterns and constant guards
//! - Match error types (`MatchError`, `MatchErrorKind`, `EvalResult`) with
//!   factory constructors
//!
//! # Value Model
//!
//! All heap allocations go through `Value::` factory methods; the `Heap<T>`
//! wrapper's constructor is crate-private, so there is exactly one code
//! path per composite shape. Custom objects expose positional or keyed
//! structure through two *optional* deconstruction hooks - absence of a
//! hook is an `Option::None` slot, never a reflection probe.

mod case_eq;
mod errors;
mod heap;
mod object;
mod range;
mod value;

pub use case_eq::case_eq;
pub use errors::{
    mapping_hook_type, no_matching_pattern, sequence_hook_type, unbound_pin, EvalResult,
    MatchError, MatchErrorKind,
};
pub use heap::Heap;
pub use object::{MappingHook, ObjectBuilder, ObjectValue, SequenceHook};
pub use range::RangeValue;
pub use value::{MapValue, PredicateValue, TypeTag, Value};

// Re-export the name types values are keyed by.
pub use trellis_ir::{Name, StringLookup};
