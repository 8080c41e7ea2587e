//! Pre-compiled host expressions.
//!
//! Patterns and case arms embed host-language expressions (literal values,
//! pin expressions, constant guards, arm guards, arm bodies) by `ExprId`
//! only. An external compiler - or a test - registers the corresponding
//! thunks here. The matcher's contract only requires "evaluates to a
//! Value"; guard truthiness uses `Value::is_truthy`.

use std::fmt;

use trellis_ir::ExprId;
use trellis_value::{EvalResult, MatchError, Value};

use crate::Environment;

type Thunk = Box<dyn Fn(&Environment) -> EvalResult>;

/// Arena of pre-compiled host expressions, addressed by `ExprId`.
#[derive(Default)]
pub struct ExprArena {
    thunks: Vec<Thunk>,
}

impl ExprArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        ExprArena { thunks: Vec::new() }
    }

    /// Register a constant expression.
    pub fn constant(&mut self, value: Value) -> ExprId {
        self.closure(move |_| Ok(value.clone()))
    }

    /// Register an arbitrary expression, evaluated against the scope in
    /// effect at evaluation time. Thunks may fail; a failure aborts the
    /// whole enclosing case statement.
    pub fn closure(&mut self, f: impl Fn(&Environment) -> EvalResult + 'static) -> ExprId {
        let id = ExprId::new(u32::try_from(self.thunks.len()).unwrap_or(u32::MAX));
        self.thunks.push(Box::new(f));
        id
    }

    /// Evaluate an expression.
    pub fn eval(&self, id: ExprId, env: &Environment) -> EvalResult {
        match self.thunks.get(id.index()) {
            Some(thunk) => thunk(env),
            None => Err(MatchError::new(format!(
                "expression {} not registered in this arena",
                id.raw()
            ))),
        }
    }

    /// Number of registered expressions.
    pub fn len(&self) -> usize {
        self.thunks.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.thunks.is_empty()
    }
}

impl fmt::Debug for ExprArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExprArena")
            .field("thunks", &self.thunks.len())
            .finish()
    }
}
