//! Identity-preserving replacement of type-variable references.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::descriptor::{ParameterizedType, TypeDescriptor, TypeVarId, WildcardType};
use crate::store::EntityCatalog;
use crate::supertype::resolve_super_type;

/// Replace every bound variable in `ty` according to `bindings`.
///
/// Unbound variables are left as-is. Nodes whose children are all unchanged
/// are returned as-is rather than rebuilt, so derived descriptors share
/// sub-structure with their inputs; downstream cycle breaking relies on a
/// no-op substitution producing nothing new.
pub fn substitute(
    cat: &dyn EntityCatalog,
    ty: &TypeDescriptor,
    bindings: &FxHashMap<TypeVarId, TypeDescriptor>,
) -> TypeDescriptor {
    substituted(cat, ty, bindings).unwrap_or_else(|| ty.clone())
}

/// Inner form of [`substitute`]: `None` means "unchanged".
pub(crate) fn substituted(
    cat: &dyn EntityCatalog,
    ty: &TypeDescriptor,
    bindings: &FxHashMap<TypeVarId, TypeDescriptor>,
) -> Option<TypeDescriptor> {
    match ty {
        // A raw reference can never contain a bound variable.
        TypeDescriptor::Raw(_) => None,
        TypeDescriptor::Variable(var) => {
            let replacement = bindings.get(var)?;
            if replacement == ty {
                return None;
            }
            Some(replacement.clone())
        }
        TypeDescriptor::Parameterized(p) => {
            let owner = p.owner.as_deref().map(|o| substituted(cat, o, bindings));
            let args = substituted_slice(cat, &p.args, bindings);
            if matches!(owner, None | Some(None)) && args.is_none() {
                return None;
            }
            Some(TypeDescriptor::Parameterized(ParameterizedType {
                owner: match owner {
                    Some(Some(changed)) => Some(Box::new(changed)),
                    _ => p.owner.clone(),
                },
                entity: p.entity,
                args: args.unwrap_or_else(|| p.args.clone()),
            }))
        }
        TypeDescriptor::Array(component) => {
            substituted(cat, component, bindings).map(|changed| match changed {
                // An array over a now-raw component is the raw array entity.
                TypeDescriptor::Raw(e) => TypeDescriptor::Raw(cat.array_entity(e)),
                other => TypeDescriptor::Array(Box::new(other)),
            })
        }
        TypeDescriptor::Wildcard(w) => {
            let upper = substituted_slice(cat, &w.upper_bounds, bindings);
            let lower = substituted_slice(cat, &w.lower_bounds, bindings);
            if upper.is_none() && lower.is_none() {
                return None;
            }
            Some(TypeDescriptor::Wildcard(WildcardType {
                upper_bounds: upper.unwrap_or_else(|| w.upper_bounds.clone()),
                lower_bounds: lower.unwrap_or_else(|| w.lower_bounds.clone()),
            }))
        }
    }
}

fn substituted_slice(
    cat: &dyn EntityCatalog,
    items: &[TypeDescriptor],
    bindings: &FxHashMap<TypeVarId, TypeDescriptor>,
) -> Option<Vec<TypeDescriptor>> {
    let mut changed = false;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match substituted(cat, item, bindings) {
            Some(new) => {
                changed = true;
                out.push(new);
            }
            None => out.push(item.clone()),
        }
    }
    changed.then_some(out)
}

/// Bindings carried by an instantiation: the entity's declared variables
/// mapped to the actual arguments, plus the owner chain's bindings.
pub(crate) fn instantiation_bindings(
    cat: &dyn EntityCatalog,
    p: &ParameterizedType,
) -> FxHashMap<TypeVarId, TypeDescriptor> {
    let mut bindings = FxHashMap::default();
    collect_instantiation_bindings(cat, p, &mut bindings);
    bindings
}

fn collect_instantiation_bindings(
    cat: &dyn EntityCatalog,
    p: &ParameterizedType,
    bindings: &mut FxHashMap<TypeVarId, TypeDescriptor>,
) {
    if let Some(def) = cat.entity(p.entity) {
        for (idx, var) in def.type_params.iter().enumerate() {
            if let Some(arg) = p.args.get(idx) {
                bindings.insert(*var, arg.clone());
            }
        }
    }
    if let Some(TypeDescriptor::Parameterized(owner)) = p.owner.as_deref() {
        collect_instantiation_bindings(cat, owner, bindings);
    }
}

/// Extend `bindings` so every variable reachable in `ty` is bound, mapping
/// each free variable to a wildcard over its own declared bounds. Bound
/// expressions that mention the variable under check then resolve against
/// the candidate value instead of failing.
pub(crate) fn bind_free_variables_as_wildcards(
    cat: &dyn EntityCatalog,
    ty: &TypeDescriptor,
    bindings: &mut FxHashMap<TypeVarId, TypeDescriptor>,
) {
    match ty {
        TypeDescriptor::Raw(_) => {}
        TypeDescriptor::Variable(var) => {
            if bindings.contains_key(var) {
                return;
            }
            let upper_bounds = cat
                .type_param(*var)
                .map(|tp| tp.upper_bounds.clone())
                .filter(|bounds| !bounds.is_empty())
                .unwrap_or_else(|| vec![TypeDescriptor::Raw(cat.well_known().object)]);
            bindings.insert(
                *var,
                TypeDescriptor::Wildcard(WildcardType::upper_bounded(upper_bounds)),
            );
        }
        TypeDescriptor::Parameterized(p) => {
            if let Some(owner) = p.owner.as_deref() {
                bind_free_variables_as_wildcards(cat, owner, bindings);
            }
            for arg in &p.args {
                bind_free_variables_as_wildcards(cat, arg, bindings);
            }
        }
        TypeDescriptor::Array(component) => {
            bind_free_variables_as_wildcards(cat, component, bindings);
        }
        TypeDescriptor::Wildcard(w) => {
            for bound in w.upper_bounds.iter().chain(&w.lower_bounds) {
                bind_free_variables_as_wildcards(cat, bound, bindings);
            }
        }
    }
}

/// Resolve every class-declared variable inside `ty` against `context`.
///
/// Each variable declared by an entity that is an ancestor of `context` is
/// read off the resolved parameterized form of that ancestor; variables that
/// cannot be resolved stay as-is.
pub fn resolve_in_context(
    cat: &dyn EntityCatalog,
    context: &TypeDescriptor,
    ty: &TypeDescriptor,
) -> TypeDescriptor {
    let mut bindings = FxHashMap::default();
    let mut seen = FxHashSet::default();
    collect_context_bindings(cat, context, ty, &mut bindings, &mut seen);
    substitute(cat, ty, &bindings)
}

fn collect_context_bindings(
    cat: &dyn EntityCatalog,
    context: &TypeDescriptor,
    ty: &TypeDescriptor,
    bindings: &mut FxHashMap<TypeVarId, TypeDescriptor>,
    seen: &mut FxHashSet<TypeVarId>,
) {
    match ty {
        TypeDescriptor::Raw(_) => {}
        TypeDescriptor::Variable(var) => {
            // Recursive appearances of a variable are tolerated by visiting
            // each one once.
            if !seen.insert(*var) {
                return;
            }
            let Some(declared_by) = cat.type_param(*var).and_then(|tp| tp.declared_by) else {
                return;
            };
            let Some(TypeDescriptor::Parameterized(resolved)) =
                resolve_super_type(cat, context, declared_by)
            else {
                return;
            };
            let Some(position) = cat
                .entity(declared_by)
                .and_then(|def| def.type_params.iter().position(|tp| tp == var))
            else {
                return;
            };
            if let Some(arg) = resolved.args.get(position) {
                bindings.insert(*var, arg.clone());
            }
        }
        TypeDescriptor::Parameterized(p) => {
            if let Some(owner) = p.owner.as_deref() {
                collect_context_bindings(cat, context, owner, bindings, seen);
            }
            for arg in &p.args {
                collect_context_bindings(cat, context, arg, bindings, seen);
            }
        }
        TypeDescriptor::Array(component) => {
            collect_context_bindings(cat, context, component, bindings, seen);
        }
        TypeDescriptor::Wildcard(w) => {
            for bound in w.upper_bounds.iter().chain(&w.lower_bounds) {
                collect_context_bindings(cat, context, bound, bindings, seen);
            }
        }
    }
}
