//! Erasure projection and classification predicates.

use crate::descriptor::{EntityId, TypeDescriptor, WildcardType};
use crate::store::{EntityCatalog, EntityKind};

/// The raw-entity projection of `ty`, discarding all generic information.
///
/// Variables and wildcards erase through their first upper bound; a variable
/// with no declared bounds erases to the top type.
pub fn erase(cat: &dyn EntityCatalog, ty: &TypeDescriptor) -> EntityId {
    match ty {
        TypeDescriptor::Raw(entity) => *entity,
        TypeDescriptor::Parameterized(p) => p.entity,
        TypeDescriptor::Array(component) => cat.array_entity(erase(cat, component)),
        TypeDescriptor::Variable(var) => match cat
            .type_param(*var)
            .and_then(|tp| tp.upper_bounds.first())
        {
            Some(bound) => erase(cat, bound),
            None => cat.well_known().object,
        },
        TypeDescriptor::Wildcard(w) => match w.upper_bounds.first() {
            Some(bound) => erase(cat, bound),
            None => cat.well_known().object,
        },
    }
}

pub fn is_primitive(cat: &dyn EntityCatalog, ty: &TypeDescriptor) -> bool {
    cat.primitive_kind(erase(cat, ty)).is_some()
}

pub fn is_interface(cat: &dyn EntityCatalog, ty: &TypeDescriptor) -> bool {
    cat.is_interface_entity(erase(cat, ty))
}

pub fn is_enum(cat: &dyn EntityCatalog, ty: &TypeDescriptor) -> bool {
    cat.entity(erase(cat, ty))
        .is_some_and(|def| def.kind == EntityKind::Enum)
}

/// Array-ness looks *through* variables and wildcards: a variable bounded by
/// an array type is itself array-typed.
pub fn is_array_type(cat: &dyn EntityCatalog, ty: &TypeDescriptor) -> bool {
    match ty {
        TypeDescriptor::Array(_) => true,
        TypeDescriptor::Raw(entity) => cat.array_component(*entity).is_some(),
        TypeDescriptor::Parameterized(_) => false,
        TypeDescriptor::Variable(var) => cat
            .type_param(*var)
            .and_then(|tp| tp.upper_bounds.first())
            .is_some_and(|bound| is_array_type(cat, bound)),
        TypeDescriptor::Wildcard(w) => w
            .upper_bounds
            .first()
            .is_some_and(|bound| is_array_type(cat, bound)),
    }
}

/// Component type of an array-typed descriptor.
///
/// For variables and wildcards the component of the first bound is wrapped
/// in a fresh upper-bounded wildcard: the component of `T extends Number[]`
/// is `? extends Number`, not `Number`, because the actual component is
/// unknown.
pub fn component_type(cat: &dyn EntityCatalog, ty: &TypeDescriptor) -> Option<TypeDescriptor> {
    match ty {
        TypeDescriptor::Array(component) => Some((**component).clone()),
        TypeDescriptor::Raw(entity) => cat.array_component(*entity).map(TypeDescriptor::Raw),
        TypeDescriptor::Parameterized(_) => None,
        TypeDescriptor::Variable(var) => {
            let bound = cat.type_param(*var)?.upper_bounds.first()?.clone();
            bound_component_as_wildcard(cat, &bound)
        }
        TypeDescriptor::Wildcard(w) => {
            let bound = w.upper_bounds.first()?;
            bound_component_as_wildcard(cat, bound)
        }
    }
}

fn bound_component_as_wildcard(
    cat: &dyn EntityCatalog,
    bound: &TypeDescriptor,
) -> Option<TypeDescriptor> {
    let component = component_type(cat, bound)?;
    Some(TypeDescriptor::Wildcard(WildcardType::upper_bounded(vec![
        component,
    ])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EntityStore;

    #[test]
    fn variable_erases_through_first_bound() {
        let mut store = EntityStore::new();
        let number = store.well_known().number;
        let t = store.add_type_param("T", vec![TypeDescriptor::Raw(number)]);
        assert_eq!(erase(&store, &TypeDescriptor::Variable(t)), number);

        let unbounded = store.add_type_param("U", vec![]);
        assert_eq!(
            erase(&store, &TypeDescriptor::Variable(unbounded)),
            store.well_known().object
        );
    }

    #[test]
    fn array_component_of_bounded_variable_is_a_wildcard() {
        let mut store = EntityStore::new();
        let number = store.well_known().number;
        let number_array = store.array_entity(number);
        let t = store.add_type_param("T", vec![TypeDescriptor::Raw(number_array)]);

        let var = TypeDescriptor::Variable(t);
        assert!(is_array_type(&store, &var));
        assert_eq!(
            component_type(&store, &var),
            Some(TypeDescriptor::Wildcard(WildcardType::upper_bounded(vec![
                TypeDescriptor::Raw(number),
            ])))
        );
    }

    #[test]
    fn erasure_of_generic_array_loads_the_array_entity() {
        let store = EntityStore::with_minimal_jdk();
        let list = store.lookup("java.util.List").unwrap();
        let string = store.well_known().string;

        let list_of_string = TypeDescriptor::parameterized(list, vec![TypeDescriptor::Raw(string)]);
        let array = TypeDescriptor::Array(Box::new(list_of_string));
        assert_eq!(erase(&store, &array), store.array_entity(list));
        assert!(is_array_type(&store, &array));
    }
}
