//! Runtime values for the Trellis match engine.
//!
//! All heap allocations go through factory methods on `Value`; `Heap<T>`
//! has a crate-private constructor, so external code cannot allocate
//! composites directly.

use std::fmt;
use std::rc::Rc;

use trellis_ir::{Name, StringLookup};

use crate::{Heap, ObjectValue, RangeValue};

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    // Scalars (inline, no heap allocation)
    /// Nil value.
    Nil,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Interned symbol. Symbols are the only legal hash-pattern keys.
    Symbol(Name),

    // Heap shapes
    /// String value.
    Str(Heap<String>),
    /// Native ordered sequence.
    List(Heap<Vec<Value>>),
    /// Native insertion-ordered mapping.
    Map(Heap<MapValue>),

    // Guard values
    /// Integer range; case-equality is containment.
    Range(RangeValue),
    /// Type tag; case-equality is an instance check.
    Type(TypeTag),
    /// Host predicate; case-equality invokes it on the subject.
    Predicate(PredicateValue),

    /// Custom object with optional deconstruction hooks.
    Object(Heap<ObjectValue>),
}

/// Type tag used by `Value::Type` guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeTag {
    Nil,
    Bool,
    Int,
    Float,
    Str,
    Symbol,
    List,
    Map,
    Range,
    /// Custom object class, matched by name.
    Object(Name),
}

impl TypeTag {
    /// Human-readable tag name for diagnostics.
    fn name<'a>(&self, names: &'a dyn StringLookup) -> &'a str {
        match self {
            TypeTag::Nil => "nil",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "str",
            TypeTag::Symbol => "symbol",
            TypeTag::List => "list",
            TypeTag::Map => "map",
            TypeTag::Range => "range",
            TypeTag::Object(name) => names.lookup(*name),
        }
    }
}

/// Host predicate used as a guard value.
#[derive(Clone)]
pub struct PredicateValue(Rc<dyn Fn(&Value) -> bool>);

impl PredicateValue {
    pub(crate) fn new(f: impl Fn(&Value) -> bool + 'static) -> Self {
        PredicateValue(Rc::new(f))
    }

    /// Invoke the predicate on a subject.
    pub fn test(&self, subject: &Value) -> bool {
        (self.0)(subject)
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        // Fn pointees are unsized; compare thin data addresses.
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for PredicateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<predicate>")
    }
}

/// Insertion-ordered association list keyed by `Value`.
///
/// Keys stay arbitrary values: mapping-hook results may carry non-symbol
/// keys, and the matcher must be able to observe them (soft no-match
/// rule). Association order is preserved so rest captures come out in the
/// subject's order. Lookup is linear; pattern key sets are small.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapValue {
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    /// Empty mapping.
    pub fn new() -> Self {
        MapValue {
            entries: Vec::new(),
        }
    }

    /// Build from key/value pairs, later duplicates replacing earlier ones.
    pub fn from_pairs(pairs: Vec<(Value, Value)>) -> Self {
        let mut map = MapValue::new();
        for (key, value) in pairs {
            map.insert(key, value);
        }
        map
    }

    /// Insert or replace.
    pub fn insert(&mut self, key: Value, value: Value) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up by key.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &(Value, Value)> {
        self.entries.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }
}

// Factory Methods (the only way to construct heap values)

impl Value {
    /// Create an integer value.
    #[inline]
    pub fn int(n: i64) -> Self {
        Value::Int(n)
    }

    /// Create a string value.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    /// Create a symbol value.
    #[inline]
    pub fn symbol(name: Name) -> Self {
        Value::Symbol(name)
    }

    /// Create a list value.
    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    /// Create a map value.
    #[inline]
    pub fn map(map: MapValue) -> Self {
        Value::Map(Heap::new(map))
    }

    /// Create a map value from key/value pairs.
    #[inline]
    pub fn map_from_pairs(pairs: Vec<(Value, Value)>) -> Self {
        Value::map(MapValue::from_pairs(pairs))
    }

    /// Create a predicate guard value.
    #[inline]
    pub fn predicate(f: impl Fn(&Value) -> bool + 'static) -> Self {
        Value::Predicate(PredicateValue::new(f))
    }

    /// Create a custom object value. Usually reached through
    /// [`ObjectValue::builder`].
    #[inline]
    pub fn object(object: ObjectValue) -> Self {
        Value::Object(Heap::new(object))
    }

    /// Truthiness: everything except `Nil` and `false`.
    #[inline]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// Instance check against a type tag.
    pub fn is_instance(&self, tag: &TypeTag) -> bool {
        match (tag, self) {
            (TypeTag::Nil, Value::Nil)
            | (TypeTag::Bool, Value::Bool(_))
            | (TypeTag::Int, Value::Int(_))
            | (TypeTag::Float, Value::Float(_))
            | (TypeTag::Str, Value::Str(_))
            | (TypeTag::Symbol, Value::Symbol(_))
            | (TypeTag::List, Value::List(_))
            | (TypeTag::Map, Value::Map(_))
            | (TypeTag::Range, Value::Range(_)) => true,
            (TypeTag::Object(class), Value::Object(object)) => object.class() == *class,
            _ => false,
        }
    }

    /// Render for diagnostics. Symbols and object classes need the
    /// interner, so display is interner-assisted rather than a plain
    /// `Display` impl.
    pub fn display_with(&self, names: &dyn StringLookup) -> String {
        let mut out = String::new();
        self.write_display(&mut out, names);
        out
    }

    fn write_display(&self, out: &mut String, names: &dyn StringLookup) {
        use std::fmt::Write as _;
        match self {
            Value::Nil => out.push_str("nil"),
            Value::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            Value::Int(n) => {
                let _ = write!(out, "{n}");
            }
            Value::Float(x) => {
                let _ = write!(out, "{x}");
            }
            Value::Symbol(name) => {
                let _ = write!(out, ":{}", names.lookup(*name));
            }
            Value::Str(s) => {
                let _ = write!(out, "{:?}", s.as_str());
            }
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_display(out, names);
                }
                out.push(']');
            }
            Value::Map(map) => {
                out.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    if let Value::Symbol(name) = key {
                        let _ = write!(out, "{}: ", names.lookup(*name));
                    } else {
                        key.write_display(out, names);
                        out.push_str(" => ");
                    }
                    value.write_display(out, names);
                }
                out.push('}');
            }
            Value::Range(range) => {
                let _ = write!(out, "{range}");
            }
            Value::Type(tag) => out.push_str(tag.name(names)),
            Value::Predicate(_) => out.push_str("#<predicate>"),
            Value::Object(object) => {
                let _ = write!(out, "#<{}>", names.lookup(object.class()));
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            // Predicates and objects compare by identity.
            (Value::Predicate(a), Value::Predicate(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => Heap::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Symbol(name) => write!(f, "Symbol({})", name.raw()),
            Value::Str(s) => write!(f, "Str({:?})", s.as_str()),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Value::Range(range) => write!(f, "Range({range})"),
            Value::Type(tag) => write!(f, "Type({tag:?})"),
            Value::Predicate(_) => write!(f, "Predicate"),
            Value::Object(object) => object.fmt(f),
        }
    }
}
