use raya_types::{
    array_type, parameterized_type, unbounded_wildcard, wildcard_type, BoundKind, EntityCatalog,
    EntityDef, EntityKind, EntityStore, PrimitiveKind, TypeDescriptor, TypeError, WildcardType,
};

use pretty_assertions::assert_eq;

#[test]
fn arity_mismatch_is_malformed() {
    let env = EntityStore::with_minimal_jdk();
    let list = env.lookup("java.util.List").unwrap();
    let string = env.well_known().string;

    let err = parameterized_type(&env, None, list, vec![]).unwrap_err();
    assert!(matches!(err, TypeError::MalformedDescriptor(_)));

    let err = parameterized_type(
        &env,
        None,
        list,
        vec![TypeDescriptor::Raw(string), TypeDescriptor::Raw(string)],
    )
    .unwrap_err();
    assert!(matches!(err, TypeError::MalformedDescriptor(_)));
}

#[test]
fn well_formed_instantiations_construct() {
    let env = EntityStore::with_minimal_jdk();
    let list = env.lookup("java.util.List").unwrap();
    let string = env.well_known().string;

    let built = parameterized_type(&env, None, list, vec![TypeDescriptor::Raw(string)]).unwrap();
    assert_eq!(
        built,
        TypeDescriptor::parameterized(list, vec![TypeDescriptor::Raw(string)])
    );

    // Wildcard arguments are fine under a trivial bound.
    let extends_number =
        wildcard_type(&env, TypeDescriptor::Raw(env.well_known().number), BoundKind::Upper)
            .unwrap();
    parameterized_type(&env, None, list, vec![extends_number]).unwrap();
}

#[test]
fn bound_violations_name_both_sides() {
    let mut env = EntityStore::new();
    let object = env.well_known().object;
    let comparable = env.well_known().comparable;

    // class Sorted<T extends Comparable<T>>
    let sorted = env.intern_entity_id("com.example.Sorted");
    let t = env.add_entity_type_param(sorted, "T", vec![TypeDescriptor::Raw(object)]);
    env.define_type_param(
        t,
        raya_types::TypeParamDef {
            name: "T".to_string(),
            declared_by: Some(sorted),
            upper_bounds: vec![TypeDescriptor::parameterized(
                comparable,
                vec![TypeDescriptor::Variable(t)],
            )],
        },
    );
    env.define_entity(
        sorted,
        EntityDef {
            name: "com.example.Sorted".to_string(),
            kind: EntityKind::Class,
            type_params: vec![t],
            super_class: Some(TypeDescriptor::Raw(object)),
            interfaces: vec![],
            enclosing: None,
            is_static_member: false,
        },
    );

    // String implements Comparable<String>, so it satisfies the F-bound.
    let string = env.well_known().string;
    parameterized_type(&env, None, sorted, vec![TypeDescriptor::Raw(string)]).unwrap();

    // Object does not.
    let err =
        parameterized_type(&env, None, sorted, vec![TypeDescriptor::Raw(object)]).unwrap_err();
    let TypeError::BoundViolation { bound, argument } = err else {
        panic!("expected bound violation");
    };
    assert_eq!(bound, "java.lang.Comparable<java.lang.Object>");
    assert_eq!(argument, "java.lang.Object");
}

#[test]
fn f_bounded_enum_instantiation_validates_against_itself() {
    let mut env = EntityStore::new();
    let enum_base = env.well_known().enum_base;

    let planet = env.intern_entity_id("com.example.Planet");
    env.define_entity(
        planet,
        EntityDef {
            name: "com.example.Planet".to_string(),
            kind: EntityKind::Enum,
            type_params: vec![],
            super_class: Some(TypeDescriptor::parameterized(
                enum_base,
                vec![TypeDescriptor::Raw(planet)],
            )),
            interfaces: vec![],
            enclosing: None,
            is_static_member: false,
        },
    );

    parameterized_type(&env, None, enum_base, vec![TypeDescriptor::Raw(planet)]).unwrap();

    // `Enum<String>` fails: String is not an Enum<String>.
    let string = env.well_known().string;
    let err =
        parameterized_type(&env, None, enum_base, vec![TypeDescriptor::Raw(string)]).unwrap_err();
    assert!(matches!(err, TypeError::BoundViolation { .. }));

    // `Enum<?>` is fine: the unknown is assumed to live within the bounds.
    parameterized_type(&env, None, enum_base, vec![unbounded_wildcard(&env)]).unwrap();
}

#[test]
fn owner_rules_for_nested_generics() {
    let mut env = EntityStore::new();
    let object = env.well_known().object;
    let string = env.well_known().string;
    let number = env.well_known().number;

    // class Outer<T> { class Inner<U extends T> {} static class Nested<V> {} }
    let outer = env.intern_entity_id("com.example.Outer");
    let outer_t = env.add_entity_type_param(outer, "T", vec![TypeDescriptor::Raw(object)]);
    env.define_entity(
        outer,
        EntityDef {
            name: "com.example.Outer".to_string(),
            kind: EntityKind::Class,
            type_params: vec![outer_t],
            super_class: Some(TypeDescriptor::Raw(object)),
            interfaces: vec![],
            enclosing: None,
            is_static_member: false,
        },
    );

    let inner = env.intern_entity_id("com.example.Outer.Inner");
    let inner_u =
        env.add_entity_type_param(inner, "U", vec![TypeDescriptor::Variable(outer_t)]);
    env.define_entity(
        inner,
        EntityDef {
            name: "com.example.Outer.Inner".to_string(),
            kind: EntityKind::Class,
            type_params: vec![inner_u],
            super_class: Some(TypeDescriptor::Raw(object)),
            interfaces: vec![],
            enclosing: Some(outer),
            is_static_member: false,
        },
    );

    let nested = env.intern_entity_id("com.example.Outer.Nested");
    let nested_v = env.add_entity_type_param(nested, "V", vec![TypeDescriptor::Raw(object)]);
    env.define_entity(
        nested,
        EntityDef {
            name: "com.example.Outer.Nested".to_string(),
            kind: EntityKind::Class,
            type_params: vec![nested_v],
            super_class: Some(TypeDescriptor::Raw(object)),
            interfaces: vec![],
            enclosing: Some(outer),
            is_static_member: true,
        },
    );

    let outer_string =
        TypeDescriptor::parameterized(outer, vec![TypeDescriptor::Raw(string)]);

    // Owner bindings flow into the member's bound: U extends T, T = String.
    parameterized_type(
        &env,
        Some(outer_string.clone()),
        inner,
        vec![TypeDescriptor::Raw(string)],
    )
    .unwrap();
    let err = parameterized_type(
        &env,
        Some(outer_string.clone()),
        inner,
        vec![TypeDescriptor::Raw(number)],
    )
    .unwrap_err();
    assert!(matches!(err, TypeError::BoundViolation { .. }));

    // A non-static member of a generic type needs its owner.
    let err = parameterized_type(&env, None, inner, vec![TypeDescriptor::Raw(string)]).unwrap_err();
    assert!(matches!(err, TypeError::MalformedDescriptor(_)));

    // A static member must not carry one.
    let err = parameterized_type(
        &env,
        Some(outer_string),
        nested,
        vec![TypeDescriptor::Raw(string)],
    )
    .unwrap_err();
    assert!(matches!(err, TypeError::MalformedDescriptor(_)));
    parameterized_type(&env, None, nested, vec![TypeDescriptor::Raw(string)]).unwrap();

    // A top-level entity must not carry one either.
    let list_like = env.intern_entity_id("com.example.Top");
    let top_t = env.add_entity_type_param(list_like, "T", vec![TypeDescriptor::Raw(object)]);
    env.define_entity(
        list_like,
        EntityDef {
            name: "com.example.Top".to_string(),
            kind: EntityKind::Class,
            type_params: vec![top_t],
            super_class: Some(TypeDescriptor::Raw(object)),
            interfaces: vec![],
            enclosing: None,
            is_static_member: false,
        },
    );
    let err = parameterized_type(
        &env,
        Some(TypeDescriptor::Raw(object)),
        list_like,
        vec![TypeDescriptor::Raw(string)],
    )
    .unwrap_err();
    assert!(matches!(err, TypeError::MalformedDescriptor(_)));
}

#[test]
fn wildcard_constructor_rejects_bad_bounds() {
    let env = EntityStore::new();
    let wk = env.well_known();

    let err = wildcard_type(
        &env,
        TypeDescriptor::Raw(wk.primitive(PrimitiveKind::Int)),
        BoundKind::Upper,
    )
    .unwrap_err();
    assert!(matches!(err, TypeError::MalformedDescriptor(_)));

    let err = wildcard_type(&env, unbounded_wildcard(&env), BoundKind::Lower).unwrap_err();
    assert!(matches!(err, TypeError::MalformedDescriptor(_)));

    let upper = wildcard_type(&env, TypeDescriptor::Raw(wk.number), BoundKind::Upper).unwrap();
    assert_eq!(
        upper,
        TypeDescriptor::Wildcard(WildcardType::upper_bounded(vec![TypeDescriptor::Raw(
            wk.number
        )]))
    );
    let lower = wildcard_type(&env, TypeDescriptor::Raw(wk.number), BoundKind::Lower).unwrap();
    assert_eq!(
        lower,
        TypeDescriptor::Wildcard(WildcardType::lower_bounded(
            wk.object,
            vec![TypeDescriptor::Raw(wk.number)]
        ))
    );
}

#[test]
fn array_constructor_loads_true_array_entities_for_raw_components() {
    let env = EntityStore::with_minimal_jdk();
    let wk = env.well_known();
    let list = env.lookup("java.util.List").unwrap();

    let string_array = array_type(&env, TypeDescriptor::Raw(wk.string)).unwrap();
    assert_eq!(string_array, TypeDescriptor::Raw(env.array_entity(wk.string)));
    // The loader memoizes: building it twice yields the identical entity.
    assert_eq!(string_array, array_type(&env, TypeDescriptor::Raw(wk.string)).unwrap());

    let int_array =
        array_type(&env, TypeDescriptor::Raw(wk.primitive(PrimitiveKind::Int))).unwrap();
    assert_eq!(
        int_array,
        TypeDescriptor::Raw(env.array_entity(wk.primitive(PrimitiveKind::Int)))
    );

    let list_string = TypeDescriptor::parameterized(list, vec![TypeDescriptor::Raw(wk.string)]);
    assert_eq!(
        array_type(&env, list_string.clone()).unwrap(),
        TypeDescriptor::Array(Box::new(list_string))
    );

    let err = array_type(&env, unbounded_wildcard(&env)).unwrap_err();
    assert!(matches!(err, TypeError::MalformedDescriptor(_)));
}
