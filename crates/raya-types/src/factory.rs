//! Validated construction of parameterized, wildcard, and array types.
//!
//! These functions are the crate's validating boundary: a descriptor they
//! return always satisfies the model invariants.

use rustc_hash::FxHashMap;

use crate::assign::is_assignable_strict;
use crate::descriptor::{EntityId, ParameterizedType, TypeDescriptor, WildcardType};
use crate::erase::{erase, is_primitive};
use crate::error::{Result, TypeError};
use crate::format::render_type;
use crate::store::EntityCatalog;
use crate::subst::{bind_free_variables_as_wildcards, instantiation_bindings, substitute};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundKind {
    Upper,
    Lower,
}

/// Build `entity<args...>` (optionally `owner.entity<args...>`), validating
/// arity, the owner relationship, and every declared bound.
///
/// The bound check runs against a binding map pre-seeded with the candidate
/// arguments themselves, so F-bounded declarations (`E extends Enum<E>`)
/// validate each argument against the very value under test.
pub fn parameterized_type(
    cat: &dyn EntityCatalog,
    owner: Option<TypeDescriptor>,
    entity: EntityId,
    args: Vec<TypeDescriptor>,
) -> Result<TypeDescriptor> {
    let def = cat
        .entity(entity)
        .ok_or(TypeError::UndefinedEntity(entity))?;
    if def.type_params.len() != args.len() {
        return Err(TypeError::MalformedDescriptor(format!(
            "{} declares {} type parameters, got {} type arguments",
            def.name,
            def.type_params.len(),
            args.len()
        )));
    }

    let enclosing_generic = def
        .enclosing
        .and_then(|e| cat.entity(e))
        .is_some_and(|d| !d.type_params.is_empty());
    match &owner {
        Some(o) => {
            let Some(enclosing) = def.enclosing else {
                return Err(TypeError::MalformedDescriptor(format!(
                    "{} is not a nested entity, it cannot take an owner type",
                    def.name
                )));
            };
            if def.is_static_member {
                return Err(TypeError::MalformedDescriptor(format!(
                    "{} is a static member, it cannot take an owner type",
                    def.name
                )));
            }
            if !enclosing_generic {
                return Err(TypeError::MalformedDescriptor(format!(
                    "the enclosing type of {} is not generic, it cannot take an owner type",
                    def.name
                )));
            }
            if !matches!(
                o,
                TypeDescriptor::Raw(_) | TypeDescriptor::Parameterized(_)
            ) {
                return Err(TypeError::MalformedDescriptor(format!(
                    "owner of {} must be a class type, got {}",
                    def.name,
                    render_type(cat, o)
                )));
            }
            if erase(cat, o) != enclosing {
                return Err(TypeError::MalformedDescriptor(format!(
                    "{} does not enclose {}",
                    render_type(cat, o),
                    def.name
                )));
            }
        }
        None => {
            if def.enclosing.is_some() && !def.is_static_member && enclosing_generic {
                return Err(TypeError::MalformedDescriptor(format!(
                    "{} is a non-static member of a generic type, an owner type is required",
                    def.name
                )));
            }
        }
    }

    let mut bindings: FxHashMap<_, _> = def
        .type_params
        .iter()
        .copied()
        .zip(args.iter().cloned())
        .collect();
    if let Some(TypeDescriptor::Parameterized(op)) = &owner {
        bindings.extend(instantiation_bindings(cat, op));
    }

    for (var, arg) in def.type_params.iter().zip(&args) {
        // An unbounded wildcard argument stands for "some type within the
        // bounds" and has nothing concrete to check.
        if matches!(arg, TypeDescriptor::Wildcard(w) if w.is_unbounded(cat.well_known().object)) {
            continue;
        }
        let Some(tp) = cat.type_param(*var) else {
            continue;
        };
        for declared in &tp.upper_bounds {
            let mut bound_bindings = bindings.clone();
            bind_free_variables_as_wildcards(cat, declared, &mut bound_bindings);
            let bound = substitute(cat, declared, &bound_bindings);
            if !is_assignable_strict(cat, &bound, arg) {
                return Err(TypeError::BoundViolation {
                    bound: render_type(cat, &bound),
                    argument: render_type(cat, arg),
                });
            }
        }
    }

    Ok(TypeDescriptor::Parameterized(ParameterizedType {
        owner: owner.map(Box::new),
        entity,
        args,
    }))
}

/// Build `? extends bound` or `? super bound`.
pub fn wildcard_type(
    cat: &dyn EntityCatalog,
    bound: TypeDescriptor,
    kind: BoundKind,
) -> Result<TypeDescriptor> {
    if bound.is_wildcard() {
        return Err(TypeError::MalformedDescriptor(
            "a wildcard bound must not itself be a wildcard".to_string(),
        ));
    }
    if is_primitive(cat, &bound) {
        return Err(TypeError::MalformedDescriptor(format!(
            "a wildcard bound must be a reference type, got {}",
            render_type(cat, &bound)
        )));
    }
    let wildcard = match kind {
        BoundKind::Upper => WildcardType::upper_bounded(vec![bound]),
        BoundKind::Lower => WildcardType::lower_bounded(cat.well_known().object, vec![bound]),
    };
    Ok(TypeDescriptor::Wildcard(wildcard))
}

/// The unrestricted wildcard `?`.
pub fn unbounded_wildcard(cat: &dyn EntityCatalog) -> TypeDescriptor {
    TypeDescriptor::Wildcard(WildcardType::unbounded(cat.well_known().object))
}

/// Build the array type over `component`.
///
/// A raw component loads the catalog's true array entity; only genuinely
/// generic components produce an `Array` node.
pub fn array_type(cat: &dyn EntityCatalog, component: TypeDescriptor) -> Result<TypeDescriptor> {
    match component {
        TypeDescriptor::Wildcard(_) => Err(TypeError::MalformedDescriptor(
            "an array component must not be a wildcard".to_string(),
        )),
        TypeDescriptor::Raw(entity) => Ok(TypeDescriptor::Raw(cat.array_entity(entity))),
        other => Ok(TypeDescriptor::Array(Box::new(other))),
    }
}
