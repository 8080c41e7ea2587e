//! Case-equality: the "matches-against" predicate for guard values.

use crate::Value;

/// Test `subject` against `guard` with the guard value's own semantics.
///
/// Ranges test containment, type tags test instance-of, predicates are
/// invoked on the subject; every other guard falls back to value equality.
/// Value patterns and the constant guards of array/find/hash patterns both
/// go through here.
pub fn case_eq(guard: &Value, subject: &Value) -> bool {
    match guard {
        Value::Range(range) => match subject {
            Value::Int(n) => range.contains(*n),
            _ => false,
        },
        Value::Type(tag) => subject.is_instance(tag),
        Value::Predicate(pred) => pred.test(subject),
        _ => guard == subject,
    }
}
