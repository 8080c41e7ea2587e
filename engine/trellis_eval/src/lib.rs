//! Trellis Eval - match evaluation for the Trellis engine.
//!
//! This crate provides the evaluation half of the engine:
//! - `Environment`: binding scopes with a scope stack and scratch-commit
//!   discipline
//! - `ExprArena`: pre-compiled host expression thunks, addressed by
//!   `ExprId`
//! - the recursive matcher (internal; reached through dispatch)
//! - `Case` / `CaseArm` / `Guard`: the case dispatcher, plus the
//!   standalone `matches` and `match_strict` forms
//!
//! # Re-exports
//!
//! The pattern AST from `trellis_ir` and the value model from
//! `trellis_value` are re-exported so most consumers need only this crate.

mod dispatch;
mod environment;
mod exprs;
mod matcher;

pub use dispatch::{match_strict, matches, Case, CaseArm, Guard, GuardKind};
pub use environment::{BindingState, Environment, LocalScope, Scope};
pub use exprs::ExprArena;

// Re-export the pattern AST
pub use trellis_ir::{
    binding_names, check_pattern, ArrayElement, ConstructError, ExprId, HashEntry, InternError,
    Name, Pattern, PinSource, RestPattern, SharedInterner, StringInterner, StringLookup,
};

// Re-export the value model
pub use trellis_value::{
    case_eq, mapping_hook_type, no_matching_pattern, sequence_hook_type, unbound_pin, EvalResult,
    Heap, MapValue, MappingHook, MatchError, MatchErrorKind, ObjectBuilder, ObjectValue,
    PredicateValue, RangeValue, SequenceHook, TypeTag, Value,
};
