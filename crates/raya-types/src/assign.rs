//! Reference conversion, assignability, subtyping, and the same-type test.

use std::slice;

use rustc_hash::FxHashSet;

use crate::descriptor::{EntityId, TypeDescriptor, TypeVarId, WildcardType};
use crate::erase::{erase, is_primitive};
use crate::store::{EntityCatalog, EntityKind};
use crate::supertype::resolve_super_type;

/// Widening/boxing-aware assignability: can a value of type `from` be
/// assigned to a location of type `to`, permitting unchecked (raw)
/// conversions?
pub fn is_assignable(
    cat: &dyn EntityCatalog,
    to: &TypeDescriptor,
    from: &TypeDescriptor,
) -> bool {
    assignable_reference(cat, to, from, true) || primitive_fallback(cat, to, from)
}

/// Assignability with no unchecked-conversion leniency and no primitive
/// widening or boxing.
pub fn is_assignable_strict(
    cat: &dyn EntityCatalog,
    to: &TypeDescriptor,
    from: &TypeDescriptor,
) -> bool {
    assignable_reference(cat, to, from, false)
}

pub fn is_subtype(cat: &dyn EntityCatalog, sub: &TypeDescriptor, sup: &TypeDescriptor) -> bool {
    is_assignable(cat, sup, sub)
}

pub fn is_subtype_strict(
    cat: &dyn EntityCatalog,
    sub: &TypeDescriptor,
    sup: &TypeDescriptor,
) -> bool {
    is_assignable_strict(cat, sup, sub)
}

/// Whether `a` and `b` are provably the same type.
///
/// Stricter than equality: a wildcard stands for an unknown type, so any
/// wildcard anywhere in either descriptor makes the two unprovably equal,
/// even when the bounds match structurally.
pub fn is_same_type(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    match (a, b) {
        (TypeDescriptor::Wildcard(_), _) | (_, TypeDescriptor::Wildcard(_)) => false,
        (TypeDescriptor::Parameterized(x), TypeDescriptor::Parameterized(y)) => {
            x.entity == y.entity
                && match (x.owner.as_deref(), y.owner.as_deref()) {
                    (None, None) => true,
                    (Some(xo), Some(yo)) => is_same_type(xo, yo),
                    _ => false,
                }
                && x.args.len() == y.args.len()
                && x.args.iter().zip(&y.args).all(|(p, q)| is_same_type(p, q))
        }
        (TypeDescriptor::Array(x), TypeDescriptor::Array(y)) => is_same_type(x, y),
        _ => a == b,
    }
}

/// The reference-conversion test.
///
/// `allow_unchecked` controls whether a raw use of a generic entity may
/// stand in for a parameterized one (the unchecked conversion a compiler
/// warns about).
pub fn assignable_reference(
    cat: &dyn EntityCatalog,
    to: &TypeDescriptor,
    from: &TypeDescriptor,
    allow_unchecked: bool,
) -> bool {
    let mut seen_vars = FxHashSet::default();
    assignable_inner(cat, to, from, allow_unchecked, &mut seen_vars)
}

fn assignable_inner(
    cat: &dyn EntityCatalog,
    to: &TypeDescriptor,
    from: &TypeDescriptor,
    unchecked: bool,
    seen_vars: &mut FxHashSet<TypeVarId>,
) -> bool {
    if to == from {
        return true;
    }
    let wk = cat.well_known();
    if *to == TypeDescriptor::Raw(wk.object) && !is_primitive(cat, from) {
        return true;
    }

    // A variable or wildcard source is known only through its upper bounds.
    match from {
        TypeDescriptor::Variable(var) => {
            if !seen_vars.insert(*var) {
                return false;
            }
            let ok = cat.type_param(*var).is_some_and(|tp| {
                tp.upper_bounds
                    .iter()
                    .any(|bound| assignable_inner(cat, to, bound, unchecked, seen_vars))
            });
            seen_vars.remove(var);
            return ok;
        }
        TypeDescriptor::Wildcard(w) => {
            return w
                .upper_bounds
                .iter()
                .any(|bound| assignable_inner(cat, to, bound, unchecked, seen_vars));
        }
        _ => {}
    }

    match to {
        TypeDescriptor::Raw(te) => entity_assignable(cat, *te, erase(cat, from)),
        TypeDescriptor::Parameterized(tp) => {
            if !entity_assignable(cat, tp.entity, erase(cat, from)) {
                return false;
            }
            match resolve_super_type(cat, from, tp.entity) {
                Some(TypeDescriptor::Parameterized(fp)) => {
                    if tp.args.len() != fp.args.len() {
                        return false;
                    }
                    tp.args.iter().zip(&fp.args).all(|(ta, fa)| match ta {
                        TypeDescriptor::Wildcard(w) => {
                            wildcard_contains(cat, w, fa, unchecked, seen_vars)
                        }
                        // Plain argument positions are invariant.
                        _ => ta == fa,
                    })
                }
                // The source reaches the target entity only in raw form:
                // argument information is gone.
                Some(_) => unchecked,
                None => false,
            }
        }
        TypeDescriptor::Array(tc) => match from {
            TypeDescriptor::Array(fc) => assignable_inner(cat, tc, fc, unchecked, seen_vars),
            TypeDescriptor::Raw(fe) => cat.array_component(*fe).is_some_and(|fc| {
                assignable_inner(cat, tc, &TypeDescriptor::Raw(fc), unchecked, seen_vars)
            }),
            _ => false,
        },
        // Only a lower-bounded wildcard names types a value can be assigned
        // into; upper-bounded ones denote unknowable targets.
        TypeDescriptor::Wildcard(w) => {
            !w.lower_bounds.is_empty()
                && w.lower_bounds
                    .iter()
                    .all(|l| assignable_inner(cat, l, from, unchecked, seen_vars))
        }
        TypeDescriptor::Variable(_) => false,
    }
}

/// Containment of a type argument by a wildcard argument position (JLS 4.5.1).
fn wildcard_contains(
    cat: &dyn EntityCatalog,
    w: &WildcardType,
    arg: &TypeDescriptor,
    unchecked: bool,
    seen_vars: &mut FxHashSet<TypeVarId>,
) -> bool {
    let wk = cat.well_known();
    let arg_uppers: &[TypeDescriptor] = match arg {
        TypeDescriptor::Wildcard(aw) => &aw.upper_bounds,
        other => slice::from_ref(other),
    };
    let arg_lowers: &[TypeDescriptor] = match arg {
        TypeDescriptor::Wildcard(aw) => &aw.lower_bounds,
        other => slice::from_ref(other),
    };

    for upper in &w.upper_bounds {
        if *upper == TypeDescriptor::Raw(wk.object) {
            continue;
        }
        if !arg_uppers
            .iter()
            .all(|au| assignable_inner(cat, upper, au, unchecked, seen_vars))
        {
            return false;
        }
    }
    for lower in &w.lower_bounds {
        if arg_lowers.is_empty() {
            return false;
        }
        if !arg_lowers
            .iter()
            .all(|al| assignable_inner(cat, al, lower, unchecked, seen_vars))
        {
            return false;
        }
    }
    true
}

/// Erased subclass check between two raw entities. Arrays are covariant in
/// their (reference) components and convert to Object, Cloneable, and
/// Serializable; primitives convert only to themselves.
pub(crate) fn entity_assignable(cat: &dyn EntityCatalog, to: EntityId, from: EntityId) -> bool {
    if to == from {
        return true;
    }
    if cat.primitive_kind(to).is_some() || cat.primitive_kind(from).is_some() {
        return false;
    }
    let wk = cat.well_known();
    if to == wk.object {
        return true;
    }
    if let Some(fc) = cat.array_component(from) {
        if to == wk.serializable || to == wk.cloneable {
            return true;
        }
        if let Some(tc) = cat.array_component(to) {
            if cat.primitive_kind(fc).is_some() || cat.primitive_kind(tc).is_some() {
                return false;
            }
            return entity_assignable(cat, tc, fc);
        }
        return false;
    }
    if cat.array_component(to).is_some() {
        return false;
    }

    let mut visited: FxHashSet<EntityId> = FxHashSet::default();
    let mut queue = vec![from];
    visited.insert(from);
    while let Some(current) = queue.pop() {
        let Some(def) = cat.entity(current) else {
            continue;
        };
        let mut push = |id: EntityId, queue: &mut Vec<EntityId>| {
            if visited.insert(id) {
                queue.push(id);
            }
        };
        if let Some(sc) = &def.super_class {
            push(erase(cat, sc), &mut queue);
        } else if def.kind != EntityKind::Interface && current != wk.object {
            push(wk.object, &mut queue);
        }
        for iface in &def.interfaces {
            push(erase(cat, iface), &mut queue);
        }
        if visited.contains(&to) {
            return true;
        }
    }
    false
}

fn primitive_fallback(
    cat: &dyn EntityCatalog,
    to: &TypeDescriptor,
    from: &TypeDescriptor,
) -> bool {
    let TypeDescriptor::Raw(fe) = from else {
        return false;
    };
    let wk = cat.well_known();
    if let Some(fk) = cat.primitive_kind(*fe) {
        match to {
            TypeDescriptor::Raw(te) => {
                if let Some(tk) = cat.primitive_kind(*te) {
                    return fk.widens_to(tk);
                }
                // Box, then convert by reference.
                entity_assignable(cat, *te, wk.boxed(fk))
            }
            TypeDescriptor::Parameterized(_) => {
                assignable_reference(cat, to, &TypeDescriptor::Raw(wk.boxed(fk)), true)
            }
            _ => false,
        }
    } else if let Some(fk) = wk.unboxed(*fe) {
        // Unbox, then widen if needed.
        if let TypeDescriptor::Raw(te) = to {
            if let Some(tk) = cat.primitive_kind(*te) {
                return fk == tk || fk.widens_to(tk);
            }
        }
        false
    } else {
        false
    }
}
