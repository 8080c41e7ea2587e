//! Custom objects with optional deconstruction capabilities.

use std::fmt;

use trellis_ir::Name;

use crate::{MatchError, Value};

/// Positional deconstruction hook. Must evaluate to a `Value::List`;
/// anything else is a hard type mismatch at match time.
pub type SequenceHook = Box<dyn Fn() -> Result<Value, MatchError>>;

/// Keyed deconstruction hook. `None` means "return everything"; `Some(keys)`
/// means "at most these keys" - the restriction exists so implementations
/// can skip materializing expensive fields. Must evaluate to a `Value::Map`.
pub type MappingHook = Box<dyn Fn(Option<&[Name]>) -> Result<Value, MatchError>>;

/// A custom object: a class name plus two optional capability slots.
///
/// Hook absence is a first-class state (`None` slot). The matcher reports a
/// plain no-match for a shape the object does not expose; it never probes
/// or reflects.
pub struct ObjectValue {
    class: Name,
    sequence_hook: Option<SequenceHook>,
    mapping_hook: Option<MappingHook>,
}

impl ObjectValue {
    /// Start building an object of the given class.
    pub fn builder(class: Name) -> ObjectBuilder {
        ObjectBuilder {
            class,
            sequence_hook: None,
            mapping_hook: None,
        }
    }

    /// The object's class name, matched by `TypeTag::Object` guards.
    pub fn class(&self) -> Name {
        self.class
    }

    /// Whether the object exposes positional structure.
    pub fn has_sequence_hook(&self) -> bool {
        self.sequence_hook.is_some()
    }

    /// Whether the object exposes keyed structure.
    pub fn has_mapping_hook(&self) -> bool {
        self.mapping_hook.is_some()
    }

    /// Invoke the sequence hook, if present.
    ///
    /// Hooks are arbitrary user code and may be effectful; callers are
    /// responsible for the at-most-once contract (see the deconstruction
    /// cache in `trellis_eval`).
    pub fn decompose_sequence(&self) -> Option<Result<Value, MatchError>> {
        self.sequence_hook.as_ref().map(|hook| hook())
    }

    /// Invoke the mapping hook, if present.
    pub fn decompose_mapping(
        &self,
        requested: Option<&[Name]>,
    ) -> Option<Result<Value, MatchError>> {
        self.mapping_hook.as_ref().map(|hook| hook(requested))
    }
}

impl fmt::Debug for ObjectValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectValue")
            .field("class", &self.class)
            .field("sequence_hook", &self.sequence_hook.is_some())
            .field("mapping_hook", &self.mapping_hook.is_some())
            .finish()
    }
}

/// Builder for [`ObjectValue`].
pub struct ObjectBuilder {
    class: Name,
    sequence_hook: Option<SequenceHook>,
    mapping_hook: Option<MappingHook>,
}

impl ObjectBuilder {
    /// Expose positional structure.
    #[must_use]
    pub fn on_sequence(
        mut self,
        hook: impl Fn() -> Result<Value, MatchError> + 'static,
    ) -> Self {
        self.sequence_hook = Some(Box::new(hook));
        self
    }

    /// Expose keyed structure.
    #[must_use]
    pub fn on_mapping(
        mut self,
        hook: impl Fn(Option<&[Name]>) -> Result<Value, MatchError> + 'static,
    ) -> Self {
        self.mapping_hook = Some(Box::new(hook));
        self
    }

    /// Finish, wrapping the object as a [`Value`].
    pub fn build(self) -> Value {
        Value::object(ObjectValue {
            class: self.class,
            sequence_hook: self.sequence_hook,
            mapping_hook: self.mapping_hook,
        })
    }
}
