//! Case dispatch: candidate arms tried in order against one subject.
//!
//! The subject expression is evaluated exactly once, up front. Every
//! capture name in every arm is declared (as nil) in the enclosing scope
//! before the first arm runs, so names stay visible after the statement
//! even for arms that never executed. Each arm matches against a scratch
//! scope; only the winning arm's bindings commit.

use tracing::trace;

use trellis_ir::{binding_names, check_pattern, ConstructError, ExprId, Pattern, StringLookup};
use trellis_value::{no_matching_pattern, EvalResult, MatchError, Value};

use crate::matcher::{match_pattern, DeconstructCache, MatchCtx};
use crate::{Environment, ExprArena};

/// Polarity of an arm guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardKind {
    /// Arm is taken when the guard is truthy.
    If,
    /// Arm is taken when the guard is falsy.
    Unless,
}

/// Guard expression attached to an arm.
///
/// Evaluated only after the pattern structurally matches; the arm's fresh
/// bindings are visible to it. A rejecting guard discards the arm's
/// scratch bindings and moves on to the next arm.
#[derive(Clone, Copy, Debug)]
pub struct Guard {
    pub kind: GuardKind,
    pub cond: ExprId,
}

/// One candidate arm: pattern, optional guard, body.
#[derive(Clone, Debug)]
pub struct CaseArm {
    pub pattern: Pattern,
    pub guard: Option<Guard>,
    pub body: ExprId,
}

impl CaseArm {
    /// Unguarded arm.
    pub fn new(pattern: Pattern, body: ExprId) -> Self {
        CaseArm {
            pattern,
            guard: None,
            body,
        }
    }

    /// Attach a guard.
    #[must_use]
    pub fn with_guard(mut self, kind: GuardKind, cond: ExprId) -> Self {
        self.guard = Some(Guard { kind, cond });
        self
    }
}

/// A compiled case statement: candidate arms plus an optional else body.
#[derive(Clone, Debug)]
pub struct Case {
    arms: Vec<CaseArm>,
    else_body: Option<ExprId>,
}

impl Case {
    /// Build a case statement, validating every arm's pattern.
    ///
    /// Construction is the last point where a malformed tree (duplicate
    /// captures, captures inside alternatives, multiple splats, duplicate
    /// keys) can be rejected; matching assumes validity.
    pub fn new(
        arms: Vec<CaseArm>,
        else_body: Option<ExprId>,
        names: &dyn StringLookup,
    ) -> Result<Self, ConstructError> {
        for arm in &arms {
            check_pattern(&arm.pattern, names)?;
        }
        Ok(Case { arms, else_body })
    }

    /// Evaluate the statement against a subject expression.
    ///
    /// Fails with `NoMatchingPattern` (carrying the subject) when every
    /// arm rejects and there is no else clause. Hook, thunk, and pin
    /// failures abort the whole statement.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn eval(
        &self,
        subject: ExprId,
        exprs: &ExprArena,
        env: &mut Environment,
        names: &dyn StringLookup,
    ) -> EvalResult {
        let subject = exprs.eval(subject, env)?;
        self.eval_subject(subject, exprs, env, names)
    }

    /// Evaluate the statement against an already-computed subject value.
    pub fn eval_subject(
        &self,
        subject: Value,
        exprs: &ExprArena,
        env: &mut Environment,
        names: &dyn StringLookup,
    ) -> EvalResult {
        declare_all(self.arms.iter().map(|arm| &arm.pattern), env);

        let mut cache = DeconstructCache::default();
        let base_depth = env.depth();

        for (index, arm) in self.arms.iter().enumerate() {
            env.push_scope();
            let mut ctx = MatchCtx {
                exprs,
                names,
                cache: &mut cache,
            };
            let matched = match match_pattern(&mut ctx, &arm.pattern, &subject, env) {
                Ok(matched) => matched,
                Err(e) => {
                    unwind(env, base_depth);
                    return Err(e);
                }
            };
            if !matched {
                env.pop_scope();
                continue;
            }

            if let Some(guard) = &arm.guard {
                let verdict = match exprs.eval(guard.cond, env) {
                    Ok(value) => value.is_truthy(),
                    Err(e) => {
                        unwind(env, base_depth);
                        return Err(e);
                    }
                };
                let pass = match guard.kind {
                    GuardKind::If => verdict,
                    GuardKind::Unless => !verdict,
                };
                if !pass {
                    trace!(arm = index, "guard rejected structural match");
                    env.pop_scope();
                    continue;
                }
            }

            trace!(arm = index, "arm selected");
            env.commit_scope();
            return exprs.eval(arm.body, env);
        }

        match self.else_body {
            Some(body) => exprs.eval(body, env),
            None => Err(no_matching_pattern(subject, names)),
        }
    }
}

/// Standalone non-raising form: does the subject match the pattern?
///
/// Bindings commit on success; either way, every capture name in the
/// pattern ends up declared (as nil) in the enclosing scope. The pattern
/// is assumed validated (`check_pattern`) at construction time.
#[tracing::instrument(level = "debug", skip_all)]
pub fn matches(
    pattern: &Pattern,
    subject: &Value,
    exprs: &ExprArena,
    env: &mut Environment,
    names: &dyn StringLookup,
) -> Result<bool, MatchError> {
    declare_all(std::iter::once(pattern), env);

    let mut cache = DeconstructCache::default();
    let base_depth = env.depth();
    env.push_scope();
    let mut ctx = MatchCtx {
        exprs,
        names,
        cache: &mut cache,
    };
    match match_pattern(&mut ctx, pattern, subject, env) {
        Ok(true) => {
            env.commit_scope();
            Ok(true)
        }
        Ok(false) => {
            env.pop_scope();
            Ok(false)
        }
        Err(e) => {
            unwind(env, base_depth);
            Err(e)
        }
    }
}

/// Standalone strict form: bind, or fail with `NoMatchingPattern`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn match_strict(
    pattern: &Pattern,
    subject: &Value,
    exprs: &ExprArena,
    env: &mut Environment,
    names: &dyn StringLookup,
) -> Result<(), MatchError> {
    if matches(pattern, subject, exprs, env, names)? {
        Ok(())
    } else {
        Err(no_matching_pattern(subject.clone(), names))
    }
}

/// Pre-declaration pass: every capture name of every pattern, registered
/// in the enclosing scope before any matching starts.
fn declare_all<'a>(patterns: impl Iterator<Item = &'a Pattern>, env: &mut Environment) {
    for pattern in patterns {
        for name in binding_names(pattern) {
            env.declare(name);
        }
    }
}

fn unwind(env: &mut Environment, depth: usize) {
    while env.depth() > depth {
        env.pop_scope();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trellis_ir::StringInterner;
    use trellis_value::{MatchErrorKind, Value};

    fn int_list(items: &[i64]) -> Value {
        Value::list(items.iter().copied().map(Value::int).collect())
    }

    #[test]
    fn test_first_matching_arm_wins() {
        let interner = StringInterner::new();
        let mut exprs = ExprArena::new();
        let mut env = Environment::new();

        use trellis_ir::ArrayElement;
        let arm1 = CaseArm::new(
            Pattern::array(vec![ArrayElement::Pattern(Pattern::Value(
                exprs.constant(Value::int(0)),
            ))]),
            exprs.constant(Value::string("foo")),
        );
        let arm2 = CaseArm::new(
            Pattern::array(vec![
                ArrayElement::Pattern(Pattern::Value(exprs.constant(Value::int(0)))),
                ArrayElement::Pattern(Pattern::Value(exprs.constant(Value::int(1)))),
            ]),
            exprs.constant(Value::string("bar")),
        );
        let arm3 = CaseArm::new(
            Pattern::array(vec![
                ArrayElement::Pattern(Pattern::Value(exprs.constant(Value::int(0)))),
                ArrayElement::Pattern(Pattern::Value(exprs.constant(Value::int(1)))),
            ]),
            exprs.constant(Value::string("baz")),
        );

        let subject = exprs.constant(int_list(&[0, 1]));
        let case = Case::new(vec![arm1, arm2, arm3], None, &interner)
            .map_err(|e| e.to_string())
            .and_then(|case| {
                case.eval(subject, &exprs, &mut env, &interner)
                    .map_err(|e| e.to_string())
            });
        assert_eq!(case, Ok(Value::string("bar")));
    }

    #[test]
    fn test_else_taken_when_no_arm_matches() {
        let interner = StringInterner::new();
        let mut exprs = ExprArena::new();
        let mut env = Environment::new();

        let arm = CaseArm::new(
            Pattern::Value(exprs.constant(Value::int(0))),
            exprs.constant(Value::Bool(true)),
        );
        let else_body = exprs.constant(Value::Bool(false));
        let subject = exprs.constant(Value::int(1));

        let result = Case::new(vec![arm], Some(else_body), &interner)
            .ok()
            .and_then(|case| case.eval(subject, &exprs, &mut env, &interner).ok());
        assert_eq!(result, Some(Value::Bool(false)));
    }

    #[test]
    fn test_exhaustion_without_else_carries_subject() {
        let interner = StringInterner::new();
        let mut exprs = ExprArena::new();
        let mut env = Environment::new();

        let arm = CaseArm::new(
            Pattern::Value(exprs.constant(Value::int(0))),
            exprs.constant(Value::Bool(true)),
        );
        let subject = exprs.constant(int_list(&[0, 1]));

        let Ok(case) = Case::new(vec![arm], None, &interner) else {
            panic!("construction failed")
        };
        let Err(err) = case.eval(subject, &exprs, &mut env, &interner) else {
            panic!("expected NoMatchingPattern")
        };
        assert_eq!(err.message, "no pattern matched [0, 1]");
        assert!(matches!(
            err.kind,
            MatchErrorKind::NoMatchingPattern { subject } if subject == int_list(&[0, 1])
        ));
    }

    #[test]
    fn test_construction_rejects_bad_arm() {
        let interner = StringInterner::new();
        let a = interner.intern("a");
        let mut exprs = ExprArena::new();

        use trellis_ir::ArrayElement;
        // [a, a] is malformed; Case::new must reject it before matching.
        let arm = CaseArm::new(
            Pattern::array(vec![
                ArrayElement::Pattern(Pattern::Variable(a)),
                ArrayElement::Pattern(Pattern::Variable(a)),
            ]),
            exprs.constant(Value::Nil),
        );
        assert!(matches!(
            Case::new(vec![arm], None, &interner),
            Err(ConstructError::DuplicateBinding { .. })
        ));
    }

    #[test]
    fn test_standalone_matches_binds_and_reports() {
        let interner = StringInterner::new();
        let e = interner.intern("e");
        let mut exprs = ExprArena::new();
        let mut env = Environment::new();

        use trellis_ir::ArrayElement;
        let pattern = Pattern::array(vec![
            ArrayElement::Pattern(Pattern::Value(exprs.constant(Value::int(1)))),
            ArrayElement::Pattern(Pattern::Variable(e)),
        ]);

        let ok = matches(&pattern, &int_list(&[1, 2]), &exprs, &mut env, &interner);
        assert_eq!(ok, Ok(true));
        assert_eq!(env.lookup(e), Some(Value::int(2)));

        let mut env = Environment::new();
        let ok = matches(&pattern, &int_list(&[2, 2]), &exprs, &mut env, &interner);
        assert_eq!(ok, Ok(false));
        // Declared but never bound: reads as nil.
        assert_eq!(env.lookup(e), Some(Value::Nil));
    }

    #[test]
    fn test_standalone_strict_raises_on_mismatch() {
        let interner = StringInterner::new();
        let mut exprs = ExprArena::new();
        let mut env = Environment::new();

        let pattern = Pattern::Value(exprs.constant(Value::int(0)));
        assert!(match_strict(&pattern, &Value::int(0), &exprs, &mut env, &interner).is_ok());

        let err = match_strict(&pattern, &Value::int(1), &exprs, &mut env, &interner);
        assert!(matches!(
            err,
            Err(MatchError {
                kind: MatchErrorKind::NoMatchingPattern { .. },
                ..
            })
        ));
    }
}
