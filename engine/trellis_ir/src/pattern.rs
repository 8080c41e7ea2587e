//! Pattern AST for structural matching.
//!
//! The tree is immutable: produced once (by an external parser, or by hand
//! in tests), validated by [`crate::validate::check_pattern`], then consumed
//! read-only by the matcher - once per candidate-arm evaluation.

use smallvec::SmallVec;

use crate::{ExprId, Name};

/// A structural pattern.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// Literal or guard expression, matched with case-equality.
    Value(ExprId),
    /// Always matches; binds the subject to the name.
    Variable(Name),
    /// Matches by value equality against an externally computed value.
    /// Never introduces a binding.
    Pin(PinSource),
    /// Positional pattern. At most one splat element is legal; the
    /// validator rejects more.
    Array {
        /// Optional constant guard, checked with case-equality *before*
        /// the subject is deconstructed.
        guard: Option<ExprId>,
        elements: Vec<ArrayElement>,
    },
    /// Double-splat search form: `[*pre, mid..., *post]`. Scans for the
    /// leftmost window where every `mid` pattern matches; `pre` and `post`
    /// capture the elements around it.
    Find {
        guard: Option<ExprId>,
        /// Capture name for elements before the window (`None` = anonymous).
        pre: Option<Name>,
        /// Fixed-length window of element patterns; contains no splat.
        mid: Vec<Pattern>,
        /// Capture name for elements after the window (`None` = anonymous).
        post: Option<Name>,
    },
    /// Keyed pattern.
    Hash {
        guard: Option<ExprId>,
        entries: Vec<HashEntry>,
        /// `None` means no rest marker: explicit entries match partially,
        /// except that an entry-less pattern matches only an empty mapping.
        rest: Option<RestPattern>,
    },
    /// First matching branch wins. Branches may not introduce
    /// non-underscore captures; the validator rejects them.
    Alternative(Vec<Pattern>),
    /// Matches the inner pattern, then binds the whole subject to the name.
    Binding { pattern: Box<Pattern>, name: Name },
}

/// One element of an array pattern's child list.
#[derive(Clone, Debug)]
pub enum ArrayElement {
    /// An element pattern matched positionally.
    Pattern(Pattern),
    /// Variable-length capture of the middle run (`None` = anonymous).
    Splat(Option<Name>),
}

/// One `key: pattern` entry of a hash pattern.
#[derive(Clone, Debug)]
pub struct HashEntry {
    pub key: Name,
    /// `None` is the shorthand form: bind the key's value directly to a
    /// variable named after the key.
    pub pattern: Option<Pattern>,
}

/// Rest policy of a hash pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestPattern {
    /// `**` / `**name`: extra keys permitted; a name captures the
    /// sub-mapping of unlisted keys.
    Capture(Option<Name>),
    /// `**nil`: no keys beyond the explicit entries are allowed.
    Forbidden,
}

/// Where a pin pattern gets its comparison value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinSource {
    /// `^name`: a variable already bound on the current evaluation path.
    Variable(Name),
    /// `^(expr)`: an arbitrary host expression evaluated in the enclosing
    /// scope.
    Expr(ExprId),
}

impl Pattern {
    /// Positional pattern without a constant guard.
    pub fn array(elements: Vec<ArrayElement>) -> Self {
        Pattern::Array {
            guard: None,
            elements,
        }
    }

    /// Keyed pattern without a constant guard.
    pub fn hash(entries: Vec<HashEntry>, rest: Option<RestPattern>) -> Self {
        Pattern::Hash {
            guard: None,
            entries,
            rest,
        }
    }

    /// Find pattern without a constant guard.
    pub fn find(pre: Option<Name>, mid: Vec<Pattern>, post: Option<Name>) -> Self {
        Pattern::Find {
            guard: None,
            pre,
            mid,
            post,
        }
    }

    /// Binding ("as") pattern.
    pub fn binding(pattern: Pattern, name: Name) -> Self {
        Pattern::Binding {
            pattern: Box::new(pattern),
            name,
        }
    }
}

/// Collect every capture name in a pattern tree, in left-to-right order.
///
/// Used by the dispatcher's pre-declaration pass: every name that *could*
/// bind must be visible (as nil) in the enclosing scope before any arm is
/// tried. Duplicates are preserved; declaration is idempotent anyway.
pub fn binding_names(pattern: &Pattern) -> SmallVec<[Name; 8]> {
    let mut out = SmallVec::new();
    collect(pattern, &mut out);
    out
}

fn collect(pattern: &Pattern, out: &mut SmallVec<[Name; 8]>) {
    match pattern {
        Pattern::Value(_) | Pattern::Pin(_) => {}
        Pattern::Variable(name) => out.push(*name),
        Pattern::Array { elements, .. } => {
            for element in elements {
                match element {
                    ArrayElement::Pattern(p) => collect(p, out),
                    ArrayElement::Splat(Some(name)) => out.push(*name),
                    ArrayElement::Splat(None) => {}
                }
            }
        }
        Pattern::Find {
            pre, mid, post, ..
        } => {
            if let Some(name) = pre {
                out.push(*name);
            }
            for p in mid {
                collect(p, out);
            }
            if let Some(name) = post {
                out.push(*name);
            }
        }
        Pattern::Hash { entries, rest, .. } => {
            for entry in entries {
                match &entry.pattern {
                    Some(p) => collect(p, out),
                    None => out.push(entry.key),
                }
            }
            if let Some(RestPattern::Capture(Some(name))) = rest {
                out.push(*name);
            }
        }
        Pattern::Alternative(branches) => {
            for branch in branches {
                collect(branch, out);
            }
        }
        Pattern::Binding { pattern, name } => {
            collect(pattern, out);
            out.push(*name);
        }
    }
}
