//! Direct-supertype computation, the supertype closure, and resolving a
//! descriptor as a generic ancestor.

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::descriptor::{EntityId, TypeDescriptor, TypeVarId};
use crate::erase::erase;
use crate::store::{EntityCatalog, EntityKind};
use crate::subst::{instantiation_bindings, substitute};

/// The direct supertypes of `ty`, in declaration order: superclass first,
/// then interfaces.
///
/// Primitives follow the widening order; a parameterized type additionally
/// has its own erased raw form as a direct supertype; an interface with no
/// super-interfaces has Object as its sole direct supertype.
pub fn direct_supertypes(cat: &dyn EntityCatalog, ty: &TypeDescriptor) -> Vec<TypeDescriptor> {
    match ty {
        TypeDescriptor::Raw(entity) => raw_entity_supertypes(cat, *entity),
        TypeDescriptor::Parameterized(p) => {
            let mut out = Vec::new();
            if let Some(def) = cat.entity(p.entity) {
                let bindings = instantiation_bindings(cat, p);
                match &def.super_class {
                    Some(sc) => out.push(substitute(cat, sc, &bindings)),
                    None if def.kind != EntityKind::Interface => {
                        out.push(TypeDescriptor::Raw(cat.well_known().object));
                    }
                    None => {}
                }
                for iface in &def.interfaces {
                    out.push(substitute(cat, iface, &bindings));
                }
                if def.kind == EntityKind::Interface && def.interfaces.is_empty() {
                    out.push(TypeDescriptor::Raw(cat.well_known().object));
                }
            }
            // The erased form is one conversion step looser than the
            // instantiation.
            out.push(TypeDescriptor::Raw(p.entity));
            out
        }
        TypeDescriptor::Array(component) => direct_supertypes(cat, component)
            .into_iter()
            .map(|s| match s {
                TypeDescriptor::Raw(se) => TypeDescriptor::Raw(cat.array_entity(se)),
                other => TypeDescriptor::Array(Box::new(other)),
            })
            .collect(),
        TypeDescriptor::Variable(var) => cat
            .type_param(*var)
            .map(|tp| tp.upper_bounds.clone())
            .filter(|bounds| !bounds.is_empty())
            .unwrap_or_else(|| vec![TypeDescriptor::Raw(cat.well_known().object)]),
        TypeDescriptor::Wildcard(w) => w.upper_bounds.clone(),
    }
}

fn raw_entity_supertypes(cat: &dyn EntityCatalog, entity: EntityId) -> Vec<TypeDescriptor> {
    let wk = cat.well_known();
    if let Some(component) = cat.array_component(entity) {
        if component == wk.object || cat.primitive_kind(component).is_some() {
            return vec![
                TypeDescriptor::Raw(wk.object),
                TypeDescriptor::Raw(wk.serializable),
                TypeDescriptor::Raw(wk.cloneable),
            ];
        }
        return raw_entity_supertypes(cat, component)
            .into_iter()
            .map(|s| match s {
                TypeDescriptor::Raw(se) => TypeDescriptor::Raw(cat.array_entity(se)),
                other => TypeDescriptor::Array(Box::new(other)),
            })
            .collect();
    }
    let Some(def) = cat.entity(entity) else {
        return Vec::new();
    };
    if let EntityKind::Primitive(kind) = def.kind {
        return kind
            .widening_supers()
            .iter()
            .map(|k| TypeDescriptor::Raw(wk.primitive(*k)))
            .collect();
    }

    // A raw use of a generic entity keeps losing generic information: its
    // supertypes are the erased forms.
    let raw_use = !def.type_params.is_empty();
    let project = |s: &TypeDescriptor| {
        if raw_use {
            TypeDescriptor::Raw(erase(cat, s))
        } else {
            s.clone()
        }
    };

    let mut out = Vec::new();
    match &def.super_class {
        Some(sc) => out.push(project(sc)),
        None if def.kind != EntityKind::Interface && entity != wk.object => {
            out.push(TypeDescriptor::Raw(wk.object));
        }
        None => {}
    }
    for iface in &def.interfaces {
        out.push(project(iface));
    }
    if def.kind == EntityKind::Interface && def.interfaces.is_empty() {
        out.push(TypeDescriptor::Raw(wk.object));
    }
    out
}

/// Every supertype of `ty`, closer-first, deduplicated, excluding `ty`
/// itself.
pub fn all_supertypes(cat: &dyn EntityCatalog, ty: &TypeDescriptor) -> Vec<TypeDescriptor> {
    let mut closure = supertype_closure(cat, ty);
    closure.remove(0);
    closure
}

/// Breadth-first supertype closure including `ty` itself as the first
/// element.
pub(crate) fn supertype_closure(
    cat: &dyn EntityCatalog,
    ty: &TypeDescriptor,
) -> Vec<TypeDescriptor> {
    let mut seen: FxHashSet<TypeDescriptor> = FxHashSet::default();
    let mut order = Vec::new();
    let mut queue: VecDeque<TypeDescriptor> = VecDeque::new();
    seen.insert(ty.clone());
    queue.push_back(ty.clone());
    while let Some(current) = queue.pop_front() {
        for s in direct_supertypes(cat, &current) {
            if seen.insert(s.clone()) {
                queue.push_back(s);
            }
        }
        order.push(current);
    }
    order
}

/// View `ty` as `target`, recovering type arguments along the way.
///
/// Walks from `ty`'s erasure toward `target` (superclass chain first, then
/// depth-first over interfaces), substituting at each parameterized ancestor
/// so the declared variables of `target` come back filled in. A raw use of a
/// generic entity on the path deliberately discards argument information for
/// that branch. Returns `None` when `target` is not an ancestor.
pub fn resolve_super_type(
    cat: &dyn EntityCatalog,
    ty: &TypeDescriptor,
    target: EntityId,
) -> Option<TypeDescriptor> {
    tracing::trace!(target_entity = %cat.entity_name(target), "resolve_super_type");
    let mut seen_vars = FxHashSet::default();
    resolve_inner(cat, ty, target, &mut seen_vars)
}

fn resolve_inner(
    cat: &dyn EntityCatalog,
    ty: &TypeDescriptor,
    target: EntityId,
    seen_vars: &mut FxHashSet<TypeVarId>,
) -> Option<TypeDescriptor> {
    match ty {
        TypeDescriptor::Variable(var) => {
            if !seen_vars.insert(*var) {
                return None;
            }
            let found = cat
                .type_param(*var)?
                .upper_bounds
                .iter()
                .find_map(|bound| resolve_inner(cat, bound, target, seen_vars));
            seen_vars.remove(var);
            found
        }
        TypeDescriptor::Wildcard(w) => w
            .upper_bounds
            .iter()
            .find_map(|bound| resolve_inner(cat, bound, target, seen_vars)),
        TypeDescriptor::Array(_) => array_ancestor(cat, target),
        TypeDescriptor::Raw(entity) if cat.array_component(*entity).is_some() => {
            if *entity == target {
                return Some(ty.clone());
            }
            array_ancestor(cat, target)
        }
        TypeDescriptor::Raw(_) | TypeDescriptor::Parameterized(_) => {
            let mut visited = FxHashSet::default();
            search(cat, ty.clone(), target, &mut visited)
        }
    }
}

fn array_ancestor(cat: &dyn EntityCatalog, target: EntityId) -> Option<TypeDescriptor> {
    let wk = cat.well_known();
    if target == wk.object || target == wk.serializable || target == wk.cloneable {
        return Some(TypeDescriptor::Raw(target));
    }
    None
}

fn search(
    cat: &dyn EntityCatalog,
    current: TypeDescriptor,
    target: EntityId,
    visited: &mut FxHashSet<EntityId>,
) -> Option<TypeDescriptor> {
    let entity = match &current {
        TypeDescriptor::Raw(e) => *e,
        TypeDescriptor::Parameterized(p) => p.entity,
        _ => return None,
    };
    if entity == target {
        return Some(current);
    }
    if !visited.insert(entity) {
        return None;
    }
    let def = cat.entity(entity)?;
    if matches!(def.kind, EntityKind::Primitive(_)) {
        return None;
    }

    let raw_use = matches!(current, TypeDescriptor::Raw(_)) && !def.type_params.is_empty();
    let bindings = match &current {
        TypeDescriptor::Parameterized(p) => instantiation_bindings(cat, p),
        _ => FxHashMap::default(),
    };
    let project = |s: &TypeDescriptor| {
        if raw_use {
            TypeDescriptor::Raw(erase(cat, s))
        } else {
            substitute(cat, s, &bindings)
        }
    };

    let wk = cat.well_known();
    let mut supers = Vec::new();
    match &def.super_class {
        Some(sc) => supers.push(project(sc)),
        None if def.kind != EntityKind::Interface && entity != wk.object => {
            supers.push(TypeDescriptor::Raw(wk.object));
        }
        None => {}
    }
    for iface in &def.interfaces {
        supers.push(project(iface));
    }
    // In Java, every interface implicitly has `Object` as a supertype (JLS 4.10.2).
    if def.kind == EntityKind::Interface {
        supers.push(TypeDescriptor::Raw(wk.object));
    }

    supers
        .into_iter()
        .find_map(|s| search(cat, s, target, visited))
}
