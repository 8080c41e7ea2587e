//! Binding environment for match evaluation.
//!
//! Uses a scope stack (not cloning): the dispatcher pushes a scratch scope
//! per candidate arm and either discards it (`pop_scope`) or merges it into
//! the enclosing scope (`commit_scope`). Alternative-pattern branches use
//! the same primitives one level deeper.

use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use trellis_ir::Name;
use trellis_value::Value;

/// How a name entered the scope.
///
/// The pre-declaration pass registers every capture name of a case
/// statement before any arm runs; those names read as nil but are invisible
/// to pin resolution until an actual capture sets them. That distinction is
/// what turns `[^n, n]` into an unbound-pin error while `[n, ^n]` works.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingState {
    /// Registered with a nil placeholder by the pre-declaration pass.
    Declared,
    /// Set by a capture or by host code.
    Bound,
}

/// A single-threaded scope handle for reference-counted interior
/// mutability.
///
/// Wraps `Rc<RefCell<T>>` so parent links and the scope stack can share
/// scopes without cloning bindings. Not thread-safe: the environment is
/// exclusively owned by one in-flight evaluation.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    /// Create a new `LocalScope` wrapping the given value.
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    /// Borrow the inner value immutably.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the inner value mutably.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T: Default> Default for LocalScope<T> {
    fn default() -> Self {
        LocalScope::new(T::default())
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A variable binding.
#[derive(Clone, Debug)]
struct Binding {
    value: Value,
    state: BindingState,
}

/// A single scope containing variable bindings.
#[derive(Clone, Debug)]
pub struct Scope {
    /// Variable bindings in this scope.
    bindings: FxHashMap<Name, Binding>,
    /// Parent scope (for lexical scoping).
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    /// Create a new empty scope with no parent.
    pub fn new() -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: None,
        }
    }

    /// Create a new scope with a parent.
    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            bindings: FxHashMap::default(),
            parent: Some(parent),
        }
    }

    /// Register a name with a nil placeholder. Idempotent: a name already
    /// visible anywhere on the chain (declared or bound) is left alone.
    pub fn declare(&mut self, name: Name) {
        if self.is_known(name) {
            return;
        }
        self.bindings.insert(
            name,
            Binding {
                value: Value::Nil,
                state: BindingState::Declared,
            },
        );
    }

    /// Set a binding in this scope.
    #[inline]
    pub fn bind(&mut self, name: Name, value: Value) {
        self.bindings.insert(
            name,
            Binding {
                value,
                state: BindingState::Bound,
            },
        );
    }

    /// Look up a variable by name. Declared-but-unset names read as nil.
    pub fn lookup(&self, name: Name) -> Option<Value> {
        if let Some(binding) = self.bindings.get(&name) {
            return Some(binding.value.clone());
        }
        if let Some(parent) = &self.parent {
            return parent.borrow().lookup(name);
        }
        None
    }

    /// Look up a variable, seeing only *bound* names. The nearest
    /// occurrence on the chain decides: a declared-but-unset shadow hides
    /// nothing, but yields `None`.
    pub fn lookup_bound(&self, name: Name) -> Option<Value> {
        if let Some(binding) = self.bindings.get(&name) {
            return match binding.state {
                BindingState::Bound => Some(binding.value.clone()),
                BindingState::Declared => None,
            };
        }
        if let Some(parent) = &self.parent {
            return parent.borrow().lookup_bound(name);
        }
        None
    }

    fn is_known(&self, name: Name) -> bool {
        if self.bindings.contains_key(&name) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow().is_known(name),
            None => false,
        }
    }

    /// Take ownership of another scope's bindings, overwriting any of the
    /// same names here.
    fn absorb(&mut self, bindings: FxHashMap<Name, Binding>) {
        for (name, binding) in bindings {
            self.bindings.insert(name, binding);
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

/// Binding environment using a scope stack.
///
/// Instead of cloning environments, a stack of scopes is pushed and popped;
/// a scratch scope can also be *committed* - merged into its parent - which
/// is how a winning arm's bindings reach the enclosing scope.
pub struct Environment {
    /// Stack of scopes, with the current scope at the top.
    scopes: Vec<LocalScope<Scope>>,
    /// Global scope (always at the bottom).
    global: LocalScope<Scope>,
}

impl Environment {
    /// Create a new environment with a global scope.
    pub fn new() -> Self {
        let global = LocalScope::new(Scope::new());
        Environment {
            scopes: vec![global.clone()],
            global,
        }
    }

    /// Get the current scope depth.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a new scope onto the stack.
    #[inline]
    pub fn push_scope(&mut self) {
        let parent = self.current_scope();
        let new_scope = LocalScope::new(Scope::with_parent(parent));
        self.scopes.push(new_scope);
    }

    /// Pop the current scope from the stack, discarding its bindings.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Merge the top scope's bindings into its parent, then pop.
    ///
    /// The scratch scope of a successful arm (or alternative branch)
    /// commits through here; a failed attempt just pops.
    pub fn commit_scope(&mut self) {
        if self.scopes.len() <= 1 {
            return;
        }
        let bindings = match self.scopes.pop() {
            Some(top) => std::mem::take(&mut top.borrow_mut().bindings),
            None => return,
        };
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .absorb(bindings);
    }

    /// Get the current scope.
    #[inline]
    fn current_scope(&self) -> LocalScope<Scope> {
        self.scopes.last().unwrap_or(&self.global).clone()
    }

    /// Register a name with a nil placeholder in the current scope chain.
    #[inline]
    pub fn declare(&mut self, name: Name) {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .declare(name);
    }

    /// Bind a variable in the current scope.
    #[inline]
    pub fn bind(&mut self, name: Name, value: Value) {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow_mut()
            .bind(name, value);
    }

    /// Look up a variable by name. Declared-but-unset names read as nil.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<Value> {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow()
            .lookup(name)
    }

    /// Look up a variable, seeing only bound names. Pin resolution goes
    /// through here.
    #[inline]
    pub fn lookup_bound(&self, name: Name) -> Option<Value> {
        self.scopes
            .last()
            .unwrap_or(&self.global)
            .borrow()
            .lookup_bound(name)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
