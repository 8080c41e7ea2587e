//! Construction-time validation of pattern trees.
//!
//! These checks run when a pattern tree is built - before any matching -
//! and reject the shapes the surface grammar could never produce: duplicate
//! capture names, captures inside alternative branches, more than one splat
//! in an array pattern, and duplicate hash keys.
//!
//! Underscore-prefixed names (`_`, `_x`) are exempt from the duplicate and
//! alternative checks and may repeat; each occurrence simply rebinds.

use rustc_hash::FxHashSet;
use std::fmt;

use crate::{ArrayElement, Name, Pattern, RestPattern, StringLookup};

/// Error detected while building a pattern tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructError {
    /// The same capture name appears twice in one pattern.
    DuplicateBinding { name: String },
    /// A non-underscore capture appears inside an alternative branch.
    /// Which branch bound the name would be ambiguous, so none may.
    BindingInAlternative { name: String },
    /// More than one splat in one array pattern's direct child list.
    MultipleSplats,
    /// The same key appears twice in one hash pattern.
    DuplicateKey { name: String },
}

impl fmt::Display for ConstructError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructError::DuplicateBinding { name } => {
                write!(f, "duplicated variable name: {name}")
            }
            ConstructError::BindingInAlternative { name } => {
                write!(f, "illegal variable in alternative pattern: {name}")
            }
            ConstructError::MultipleSplats => {
                write!(f, "array pattern allows at most one splat")
            }
            ConstructError::DuplicateKey { name } => {
                write!(f, "duplicated key name: {name}")
            }
        }
    }
}

impl std::error::Error for ConstructError {}

/// Validate one pattern tree (one case arm, or one standalone pattern).
pub fn check_pattern(
    pattern: &Pattern,
    names: &dyn StringLookup,
) -> Result<(), ConstructError> {
    let mut seen = FxHashSet::default();
    check(pattern, names, &mut seen, false)
}

fn check(
    pattern: &Pattern,
    names: &dyn StringLookup,
    seen: &mut FxHashSet<Name>,
    in_alternative: bool,
) -> Result<(), ConstructError> {
    match pattern {
        Pattern::Value(_) | Pattern::Pin(_) => Ok(()),
        Pattern::Variable(name) => capture(*name, names, seen, in_alternative),
        Pattern::Array { elements, .. } => {
            let mut splats = 0;
            for element in elements {
                match element {
                    ArrayElement::Pattern(p) => check(p, names, seen, in_alternative)?,
                    ArrayElement::Splat(splat_name) => {
                        splats += 1;
                        if splats > 1 {
                            return Err(ConstructError::MultipleSplats);
                        }
                        if let Some(name) = splat_name {
                            capture(*name, names, seen, in_alternative)?;
                        }
                    }
                }
            }
            Ok(())
        }
        Pattern::Find {
            pre, mid, post, ..
        } => {
            if let Some(name) = pre {
                capture(*name, names, seen, in_alternative)?;
            }
            for p in mid {
                check(p, names, seen, in_alternative)?;
            }
            if let Some(name) = post {
                capture(*name, names, seen, in_alternative)?;
            }
            Ok(())
        }
        Pattern::Hash { entries, rest, .. } => {
            let mut keys = FxHashSet::default();
            for entry in entries {
                if !keys.insert(entry.key) {
                    return Err(ConstructError::DuplicateKey {
                        name: names.lookup(entry.key).to_owned(),
                    });
                }
                match &entry.pattern {
                    Some(p) => check(p, names, seen, in_alternative)?,
                    None => capture(entry.key, names, seen, in_alternative)?,
                }
            }
            if let Some(RestPattern::Capture(Some(name))) = rest {
                capture(*name, names, seen, in_alternative)?;
            }
            Ok(())
        }
        Pattern::Alternative(branches) => {
            for branch in branches {
                check(branch, names, seen, true)?;
            }
            Ok(())
        }
        Pattern::Binding { pattern, name } => {
            check(pattern, names, seen, in_alternative)?;
            capture(*name, names, seen, in_alternative)
        }
    }
}

/// Record one capture name, enforcing the alternative and duplicate rules.
fn capture(
    name: Name,
    names: &dyn StringLookup,
    seen: &mut FxHashSet<Name>,
    in_alternative: bool,
) -> Result<(), ConstructError> {
    let text = names.lookup(name);
    if text.starts_with('_') {
        // Underscore names may repeat anywhere; last write wins.
        return Ok(());
    }
    if in_alternative {
        return Err(ConstructError::BindingInAlternative {
            name: text.to_owned(),
        });
    }
    if !seen.insert(name) {
        return Err(ConstructError::DuplicateBinding {
            name: text.to_owned(),
        });
    }
    Ok(())
}
