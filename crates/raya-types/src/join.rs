//! The least-upper-bound (join) engine and its greatest-lower-bound helper.

use rustc_hash::FxHashSet;

use crate::assign::{assignable_reference, entity_assignable};
use crate::descriptor::{EntityId, ParameterizedType, TypeDescriptor, WildcardType};
use crate::erase::{erase, is_primitive};
use crate::error::{Result, TypeError};
use crate::format::render_type;
use crate::store::EntityCatalog;
use crate::supertype::{resolve_super_type, supertype_closure};

/// The most specific common supertypes of `types` (the JLS 4.10.4 "lub").
///
/// The result holds at most one class-like type, listed first, followed by
/// interface types. Recursive bound structures that would otherwise demand a
/// self-referential descriptor collapse to the top type instead.
pub fn least_upper_bounds(
    cat: &dyn EntityCatalog,
    types: &[TypeDescriptor],
) -> Result<Vec<TypeDescriptor>> {
    let mut guard = FxHashSet::default();
    lub(cat, types, &mut guard)
}

/// Drop every input that is a strict supertype of another input; what
/// remains is the greatest lower bound, as an intersection.
pub fn greatest_lower_bounds(
    cat: &dyn EntityCatalog,
    types: &[TypeDescriptor],
) -> Vec<TypeDescriptor> {
    let inputs = dedup(types);
    inputs
        .iter()
        .filter(|t| {
            !inputs
                .iter()
                .any(|u| u != *t && strictly_below(cat, u, t))
        })
        .cloned()
        .collect()
}

fn strictly_below(cat: &dyn EntityCatalog, sub: &TypeDescriptor, sup: &TypeDescriptor) -> bool {
    assignable_reference(cat, sup, sub, false) && !assignable_reference(cat, sub, sup, false)
}

fn dedup(types: &[TypeDescriptor]) -> Vec<TypeDescriptor> {
    let mut out: Vec<TypeDescriptor> = Vec::new();
    for ty in types {
        if !out.contains(ty) {
            out.push(ty.clone());
        }
    }
    out
}

fn lub(
    cat: &dyn EntityCatalog,
    types: &[TypeDescriptor],
    guard: &mut FxHashSet<Vec<TypeDescriptor>>,
) -> Result<Vec<TypeDescriptor>> {
    let inputs = dedup(types);
    if inputs.is_empty() {
        return Ok(Vec::new());
    }
    if inputs.len() == 1 {
        return Ok(inputs);
    }

    // The guard key is order-independent; a set that is already being
    // joined further up the call tree marks a recursive bound structure,
    // and the model cannot represent the self-referential type it would
    // take to describe that join precisely.
    let mut key = inputs.clone();
    key.sort_by_cached_key(|t| render_type(cat, t));
    if !guard.insert(key) {
        return Ok(vec![TypeDescriptor::Raw(cat.well_known().object)]);
    }

    let closures: Vec<Vec<EntityId>> = inputs.iter().map(|t| erased_closure(cat, t)).collect();
    let mut candidates: Vec<EntityId> = closures[0].clone();
    for closure in &closures[1..] {
        let set: FxHashSet<EntityId> = closure.iter().copied().collect();
        candidates.retain(|c| set.contains(c));
    }
    if candidates.is_empty() {
        let rendered: Vec<String> = inputs.iter().map(|t| render_type(cat, t)).collect();
        let mixed = inputs.iter().any(|t| is_primitive(cat, t))
            && inputs.iter().any(|t| !is_primitive(cat, t));
        let detail = if mixed {
            "mixed primitive and reference inputs"
        } else {
            "no common supertype"
        };
        return Err(TypeError::IncompatibleJoinInputs(format!(
            "{detail}: {}",
            rendered.join(", ")
        )));
    }
    tracing::debug!(candidates = candidates.len(), "join candidate set");

    let minimized: Vec<EntityId> = candidates
        .iter()
        .copied()
        .filter(|c| {
            !candidates
                .iter()
                .any(|d| d != c && entity_strict_subtype(cat, *d, *c))
        })
        .collect();

    let mut classes = Vec::new();
    let mut interfaces = Vec::new();
    for cand in minimized {
        let generic = cat
            .entity(cand)
            .is_some_and(|def| !def.type_params.is_empty());
        let merged = if generic {
            let resolved: Vec<Option<TypeDescriptor>> = inputs
                .iter()
                .map(|input| resolve_super_type(cat, input, cand))
                .collect();
            merge_candidate(cat, cand, &resolved, guard)?
        } else {
            TypeDescriptor::Raw(cand)
        };
        if cat.is_interface_entity(cand) {
            interfaces.push(merged);
        } else {
            classes.push(merged);
        }
    }
    classes.extend(interfaces);
    Ok(classes)
}

fn erased_closure(cat: &dyn EntityCatalog, ty: &TypeDescriptor) -> Vec<EntityId> {
    let mut seen: FxHashSet<EntityId> = FxHashSet::default();
    let mut out = Vec::new();
    for s in supertype_closure(cat, ty) {
        let e = erase(cat, &s);
        if seen.insert(e) {
            out.push(e);
        }
    }
    out
}

fn entity_strict_subtype(cat: &dyn EntityCatalog, sub: EntityId, sup: EntityId) -> bool {
    if sub == sup {
        return false;
    }
    match (cat.primitive_kind(sub), cat.primitive_kind(sup)) {
        (Some(a), Some(b)) => a.widens_to(b),
        (None, None) => entity_assignable(cat, sup, sub),
        _ => false,
    }
}

/// Merge the per-input resolved forms of one erased candidate into its
/// least containing invocation. Any raw resolution collapses the candidate
/// to its raw form.
fn merge_candidate(
    cat: &dyn EntityCatalog,
    cand: EntityId,
    resolved: &[Option<TypeDescriptor>],
    guard: &mut FxHashSet<Vec<TypeDescriptor>>,
) -> Result<TypeDescriptor> {
    let mut acc: Option<ParameterizedType> = None;
    for r in resolved {
        let Some(TypeDescriptor::Parameterized(p)) = r else {
            return Ok(TypeDescriptor::Raw(cand));
        };
        acc = Some(match acc {
            None => p.clone(),
            Some(prev) => merge_invocations(cat, prev, p, guard)?,
        });
    }
    Ok(match acc {
        Some(p) => TypeDescriptor::Parameterized(p),
        None => TypeDescriptor::Raw(cand),
    })
}

fn merge_invocations(
    cat: &dyn EntityCatalog,
    a: ParameterizedType,
    b: &ParameterizedType,
    guard: &mut FxHashSet<Vec<TypeDescriptor>>,
) -> Result<ParameterizedType> {
    debug_assert_eq!(a.entity, b.entity);
    let mut args = Vec::with_capacity(a.args.len());
    for (x, y) in a.args.iter().zip(&b.args) {
        args.push(least_containing_argument(cat, x, y, guard)?);
    }
    let owner = if a.owner == b.owner { a.owner.clone() } else { None };
    Ok(ParameterizedType {
        owner,
        entity: a.entity,
        args,
    })
}

enum ArgKind<'a> {
    Plain(&'a TypeDescriptor),
    Extends(&'a [TypeDescriptor]),
    Super(&'a [TypeDescriptor]),
}

fn classify(arg: &TypeDescriptor) -> ArgKind<'_> {
    match arg {
        TypeDescriptor::Wildcard(w) if !w.lower_bounds.is_empty() => ArgKind::Super(&w.lower_bounds),
        TypeDescriptor::Wildcard(w) => ArgKind::Extends(&w.upper_bounds),
        other => ArgKind::Plain(other),
    }
}

fn least_containing_argument(
    cat: &dyn EntityCatalog,
    a: &TypeDescriptor,
    b: &TypeDescriptor,
    guard: &mut FxHashSet<Vec<TypeDescriptor>>,
) -> Result<TypeDescriptor> {
    if a == b {
        return Ok(a.clone());
    }
    let wk = cat.well_known();
    match (classify(a), classify(b)) {
        (ArgKind::Plain(x), ArgKind::Plain(y)) => {
            extends_over(cat, &[x.clone(), y.clone()], guard)
        }
        (ArgKind::Plain(x), ArgKind::Extends(ys)) | (ArgKind::Extends(ys), ArgKind::Plain(x)) => {
            let mut bounds = vec![x.clone()];
            bounds.extend_from_slice(ys);
            extends_over(cat, &bounds, guard)
        }
        (ArgKind::Extends(xs), ArgKind::Extends(ys)) => {
            let mut bounds = xs.to_vec();
            bounds.extend_from_slice(ys);
            extends_over(cat, &bounds, guard)
        }
        (ArgKind::Plain(x), ArgKind::Super(ys)) | (ArgKind::Super(ys), ArgKind::Plain(x)) => {
            let mut bounds = vec![x.clone()];
            bounds.extend_from_slice(ys);
            Ok(super_over(cat, wk.object, &bounds))
        }
        (ArgKind::Super(xs), ArgKind::Super(ys)) => {
            let mut bounds = xs.to_vec();
            bounds.extend_from_slice(ys);
            Ok(super_over(cat, wk.object, &bounds))
        }
        // An upper-bounded and a lower-bounded wildcard only agree when
        // identical, which was ruled out above; nothing tighter than the
        // unrestricted wildcard contains both.
        (ArgKind::Extends(_), ArgKind::Super(_)) | (ArgKind::Super(_), ArgKind::Extends(_)) => {
            Ok(TypeDescriptor::Wildcard(WildcardType::unbounded(wk.object)))
        }
    }
}

fn extends_over(
    cat: &dyn EntityCatalog,
    bounds: &[TypeDescriptor],
    guard: &mut FxHashSet<Vec<TypeDescriptor>>,
) -> Result<TypeDescriptor> {
    let upper = lub(cat, bounds, guard)?;
    Ok(TypeDescriptor::Wildcard(WildcardType::upper_bounded(upper)))
}

fn super_over(
    cat: &dyn EntityCatalog,
    top: EntityId,
    bounds: &[TypeDescriptor],
) -> TypeDescriptor {
    let lower = greatest_lower_bounds(cat, bounds);
    TypeDescriptor::Wildcard(WildcardType::lower_bounded(top, lower))
}
