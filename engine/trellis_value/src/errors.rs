//! Error types for match evaluation.
//!
//! `MatchErrorKind` provides typed categories for programmatic matching;
//! factory functions are the public construction API and populate both
//! `kind` and `message`.

use std::fmt;

use trellis_ir::StringLookup;

use crate::Value;

/// Result of evaluating a host expression or a case statement.
pub type EvalResult = Result<Value, MatchError>;

/// Typed error category.
///
/// Only `NoMatchingPattern` is an expected failure mode of a well-formed
/// case statement; everything else indicates a misbehaving deconstruction
/// implementation, an unresolvable pin, or a user-code failure inside a
/// thunk or hook.
#[derive(Clone, Debug, PartialEq)]
pub enum MatchErrorKind {
    /// Case statement exhausted with no else clause. Carries the original
    /// subject for diagnostics.
    NoMatchingPattern { subject: Value },
    /// A deconstruction hook returned the wrong container shape.
    /// Fatal for the whole statement, never downgraded to no-match.
    DeconstructType {
        hook: &'static str,
        expected: &'static str,
    },
    /// A pinned variable reference resolved against a name that is not
    /// bound on the current evaluation path.
    UnboundPin { name: String },
    /// User-code failure propagated from a thunk or hook.
    Custom { message: String },
}

impl fmt::Display for MatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatchingPattern { .. } => write!(f, "no matching pattern"),
            Self::DeconstructType { hook, expected } => {
                write!(f, "{hook} must return {expected}")
            }
            Self::UnboundPin { name } => {
                write!(f, "{name}: no such bound variable for pin")
            }
            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Match evaluation error.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchError {
    /// Structured category.
    pub kind: MatchErrorKind,
    /// Human-readable message. For factory-created errors this is the
    /// kind's rendering, enriched with subject text where an interner was
    /// available at the construction site.
    pub message: String,
}

impl MatchError {
    /// Create a user error with just a message. Thunks and hooks use this
    /// to propagate arbitrary host failures.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        MatchError {
            kind: MatchErrorKind::Custom {
                message: message.clone(),
            },
            message,
        }
    }

    fn from_kind(kind: MatchErrorKind) -> Self {
        let message = kind.to_string();
        MatchError { kind, message }
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for MatchError {}

// Factory constructors

/// Case statement exhausted with no else clause.
pub fn no_matching_pattern(subject: Value, names: &dyn StringLookup) -> MatchError {
    let message = format!("no pattern matched {}", subject.display_with(names));
    MatchError {
        kind: MatchErrorKind::NoMatchingPattern { subject },
        message,
    }
}

/// The sequence hook returned something other than a list.
pub fn sequence_hook_type() -> MatchError {
    MatchError::from_kind(MatchErrorKind::DeconstructType {
        hook: "decompose_sequence",
        expected: "a list",
    })
}

/// The mapping hook returned something other than a map.
pub fn mapping_hook_type() -> MatchError {
    MatchError::from_kind(MatchErrorKind::DeconstructType {
        hook: "decompose_mapping",
        expected: "a map",
    })
}

/// A pin referenced a variable that is not bound on this path.
pub fn unbound_pin(name: &str) -> MatchError {
    MatchError::from_kind(MatchErrorKind::UnboundPin {
        name: name.to_owned(),
    })
}
