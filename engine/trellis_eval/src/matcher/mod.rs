//! The recursive matcher.
//!
//! `match_pattern` evaluates one pattern node against one subject,
//! side-effecting the environment with captures on the path taken.
//! `Ok(false)` is a soft no-match; `Err` is fatal for the whole enclosing
//! case statement (misbehaving hooks, unresolvable pins, thunk failures).
//!
//! Captures land in whatever scope is on top of the environment's stack.
//! The dispatcher pushes a scratch scope per candidate arm; alternative
//! branches and find-pattern window attempts push their own and commit or
//! discard them atomically.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use trellis_ir::{ArrayElement, ExprId, HashEntry, Name, Pattern, PinSource, RestPattern, StringLookup};
use trellis_value::{
    case_eq, mapping_hook_type, sequence_hook_type, unbound_pin, Heap, MapValue, MatchError,
    Value,
};

use crate::{Environment, ExprArena};

/// Per-statement deconstruction cache.
///
/// Hooks are arbitrary user code that callers depend on being invoked at
/// most once per case statement: sequence hooks take no arguments, so one
/// result serves every candidate arm; mapping hooks are keyed by the
/// requested-key signature, so structurally compatible sibling patterns
/// share one invocation while candidates requesting different keys each
/// get their own. Keys are object identities (`Heap::addr`), which are
/// stable for the lifetime of the cached entry it maps to.
#[derive(Default)]
pub(crate) struct DeconstructCache {
    sequences: FxHashMap<usize, Heap<Vec<Value>>>,
    mappings: FxHashMap<(usize, Option<Vec<Name>>), Heap<MapValue>>,
}

/// Everything the matcher threads through recursion besides the subject
/// and the environment.
pub(crate) struct MatchCtx<'a> {
    pub exprs: &'a ExprArena,
    pub names: &'a dyn StringLookup,
    pub cache: &'a mut DeconstructCache,
}

/// Evaluate one pattern against one subject.
pub(crate) fn match_pattern(
    ctx: &mut MatchCtx<'_>,
    pattern: &Pattern,
    subject: &Value,
    env: &mut Environment,
) -> Result<bool, MatchError> {
    match pattern {
        Pattern::Value(expr) => {
            let guard = ctx.exprs.eval(*expr, env)?;
            Ok(case_eq(&guard, subject))
        }
        Pattern::Variable(name) => {
            env.bind(*name, subject.clone());
            Ok(true)
        }
        Pattern::Pin(source) => {
            let expected = match source {
                PinSource::Variable(name) => env
                    .lookup_bound(*name)
                    .ok_or_else(|| unbound_pin(ctx.names.lookup(*name)))?,
                PinSource::Expr(expr) => ctx.exprs.eval(*expr, env)?,
            };
            Ok(expected == *subject)
        }
        Pattern::Array { guard, elements } => {
            match_array(ctx, *guard, elements, subject, env)
        }
        Pattern::Find {
            guard,
            pre,
            mid,
            post,
        } => match_find(ctx, *guard, *pre, mid, *post, subject, env),
        Pattern::Hash {
            guard,
            entries,
            rest,
        } => match_hash(ctx, *guard, entries, *rest, subject, env),
        Pattern::Alternative(branches) => {
            for branch in branches {
                env.push_scope();
                match match_pattern(ctx, branch, subject, env) {
                    Ok(true) => {
                        env.commit_scope();
                        return Ok(true);
                    }
                    Ok(false) => env.pop_scope(),
                    Err(e) => {
                        env.pop_scope();
                        return Err(e);
                    }
                }
            }
            Ok(false)
        }
        Pattern::Binding { pattern, name } => {
            if match_pattern(ctx, pattern, subject, env)? {
                env.bind(*name, subject.clone());
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }
}

/// Evaluate a constant guard (the `Const` in `Const[...]` forms) with
/// case-equality. Checked *before* decomposition: a rejecting guard means
/// the deconstruction hook is never invoked.
fn check_guard(
    ctx: &mut MatchCtx<'_>,
    guard: Option<ExprId>,
    subject: &Value,
    env: &Environment,
) -> Result<bool, MatchError> {
    match guard {
        Some(expr) => {
            let guard_value = ctx.exprs.eval(expr, env)?;
            Ok(case_eq(&guard_value, subject))
        }
        None => Ok(true),
    }
}

/// Expose the subject's positional structure, or `None` for a soft
/// no-match (no capability, or not sequence-shaped at all).
///
/// An object with a sequence hook is decomposed through the hook even if a
/// native sequence could stand in - custom objects may override their
/// shape. A hook returning anything but a list is a hard type mismatch.
fn decompose_sequence(
    ctx: &mut MatchCtx<'_>,
    subject: &Value,
) -> Result<Option<Heap<Vec<Value>>>, MatchError> {
    match subject {
        Value::List(items) => Ok(Some(items.clone())),
        Value::Object(object) => {
            if !object.has_sequence_hook() {
                return Ok(None);
            }
            let key = Heap::addr(object);
            if let Some(cached) = ctx.cache.sequences.get(&key) {
                return Ok(Some(cached.clone()));
            }
            let value = match object.decompose_sequence() {
                Some(result) => result?,
                None => return Ok(None),
            };
            match value {
                Value::List(items) => {
                    ctx.cache.sequences.insert(key, items.clone());
                    Ok(Some(items))
                }
                _ => Err(sequence_hook_type()),
            }
        }
        _ => Ok(None),
    }
}

/// Expose the subject's keyed structure, or `None` for a soft no-match.
///
/// A hook-returned map containing any non-symbol key is the explicitly
/// soft failure: the enclosing match reports no-match, not an error.
/// Native maps are exempt - their arbitrary keys are simply never found by
/// symbol entries, and a rest capture collects them.
fn decompose_mapping(
    ctx: &mut MatchCtx<'_>,
    subject: &Value,
    requested: Option<&[Name]>,
) -> Result<Option<Heap<MapValue>>, MatchError> {
    match subject {
        Value::Map(map) => Ok(Some(map.clone())),
        Value::Object(object) => {
            if !object.has_mapping_hook() {
                return Ok(None);
            }
            let key = (Heap::addr(object), requested.map(<[Name]>::to_vec));
            let cached = ctx.cache.mappings.get(&key).cloned();
            let map = if let Some(map) = cached {
                map
            } else {
                let value = match object.decompose_mapping(requested) {
                    Some(result) => result?,
                    None => return Ok(None),
                };
                let Value::Map(map) = value else {
                    return Err(mapping_hook_type());
                };
                ctx.cache.mappings.insert(key, map.clone());
                map
            };
            if map.keys().any(|k| !matches!(k, Value::Symbol(_))) {
                return Ok(None);
            }
            Ok(Some(map))
        }
        _ => Ok(None),
    }
}

fn match_array(
    ctx: &mut MatchCtx<'_>,
    guard: Option<ExprId>,
    elements: &[ArrayElement],
    subject: &Value,
    env: &mut Environment,
) -> Result<bool, MatchError> {
    if !check_guard(ctx, guard, subject, env)? {
        return Ok(false);
    }
    let Some(items) = decompose_sequence(ctx, subject)? else {
        return Ok(false);
    };

    let splat_pos = elements
        .iter()
        .position(|e| matches!(e, ArrayElement::Splat(_)));

    let Some(pos) = splat_pos else {
        // Fixed arity: lengths must agree exactly.
        if items.len() != elements.len() {
            return Ok(false);
        }
        for (element, value) in elements.iter().zip(items.iter()) {
            if let ArrayElement::Pattern(p) = element {
                if !match_pattern(ctx, p, value, env)? {
                    return Ok(false);
                }
            }
        }
        return Ok(true);
    };

    let head = &elements[..pos];
    let tail = &elements[pos + 1..];
    if items.len() < head.len() + tail.len() {
        return Ok(false);
    }

    // Left to right: prefix, splat capture, then suffix, so pins in the
    // suffix can reference earlier captures.
    for (element, value) in head.iter().zip(items.iter()) {
        if let ArrayElement::Pattern(p) = element {
            if !match_pattern(ctx, p, value, env)? {
                return Ok(false);
            }
        }
    }

    let tail_start = items.len() - tail.len();
    if let ArrayElement::Splat(Some(name)) = &elements[pos] {
        let middle = items[pos..tail_start].to_vec();
        env.bind(*name, Value::list(middle));
    }

    for (element, value) in tail.iter().zip(items[tail_start..].iter()) {
        if let ArrayElement::Pattern(p) = element {
            if !match_pattern(ctx, p, value, env)? {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn match_find(
    ctx: &mut MatchCtx<'_>,
    guard: Option<ExprId>,
    pre: Option<Name>,
    mid: &[Pattern],
    post: Option<Name>,
    subject: &Value,
    env: &mut Environment,
) -> Result<bool, MatchError> {
    if !check_guard(ctx, guard, subject, env)? {
        return Ok(false);
    }
    let Some(items) = decompose_sequence(ctx, subject)? else {
        return Ok(false);
    };
    if items.len() < mid.len() {
        return Ok(false);
    }

    // Leftmost window wins. Each attempt gets its own scratch scope so a
    // failed window leaves no captures behind.
    for offset in 0..=(items.len() - mid.len()) {
        env.push_scope();
        let mut matched = true;
        let mut failure = None;
        for (k, pattern) in mid.iter().enumerate() {
            match match_pattern(ctx, pattern, &items[offset + k], env) {
                Ok(true) => {}
                Ok(false) => {
                    matched = false;
                    break;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }
        if let Some(e) = failure {
            env.pop_scope();
            return Err(e);
        }
        if matched {
            if let Some(name) = pre {
                env.bind(name, Value::list(items[..offset].to_vec()));
            }
            if let Some(name) = post {
                env.bind(name, Value::list(items[offset + mid.len()..].to_vec()));
            }
            env.commit_scope();
            return Ok(true);
        }
        env.pop_scope();
    }
    Ok(false)
}

fn match_hash(
    ctx: &mut MatchCtx<'_>,
    guard: Option<ExprId>,
    entries: &[HashEntry],
    rest: Option<RestPattern>,
    subject: &Value,
    env: &mut Environment,
) -> Result<bool, MatchError> {
    if !check_guard(ctx, guard, subject, env)? {
        return Ok(false);
    }

    let explicit: SmallVec<[Name; 8]> = entries.iter().map(|e| e.key).collect();
    // A named rest capture must know the remainder, so the hook fetches
    // everything; every other form restricts to the explicit keys.
    let requested: Option<&[Name]> = match rest {
        Some(RestPattern::Capture(Some(_))) => None,
        _ => Some(explicit.as_slice()),
    };

    let Some(map) = decompose_mapping(ctx, subject, requested)? else {
        return Ok(false);
    };

    // An entry-less pattern without a rest marker matches only an empty
    // mapping; with entries, unmentioned keys are permitted.
    if entries.is_empty() && rest.is_none() {
        return Ok(map.is_empty());
    }

    for entry in entries {
        let key_value = Value::symbol(entry.key);
        let Some(value) = map.get(&key_value) else {
            return Ok(false);
        };
        match &entry.pattern {
            Some(p) => {
                if !match_pattern(ctx, p, value, env)? {
                    return Ok(false);
                }
            }
            // Shorthand entry: bind the key's name directly.
            None => env.bind(entry.key, value.clone()),
        }
    }

    match rest {
        Some(RestPattern::Forbidden) => {
            // Every key accounted for by an explicit entry, nothing more.
            Ok(map.len() == entries.len())
        }
        Some(RestPattern::Capture(Some(name))) => {
            let mut remainder = MapValue::new();
            for (key, value) in map.iter() {
                let listed = matches!(key, Value::Symbol(s) if explicit.contains(s));
                if !listed {
                    remainder.insert(key.clone(), value.clone());
                }
            }
            env.bind(name, Value::map(remainder));
            Ok(true)
        }
        Some(RestPattern::Capture(None)) | None => Ok(true),
    }
}
