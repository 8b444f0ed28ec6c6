use raya_types::{is_subtype, EntityCatalog, EntityStore, TypeDescriptor};

#[test]
fn minimal_jdk_interfaces_are_subtypes_of_object() {
    let env = EntityStore::with_minimal_jdk();

    let object = TypeDescriptor::Raw(env.well_known().object);

    let list = env.lookup("java.util.List").expect("List must exist in the minimal JDK");
    let string = env.well_known().string;
    let list_string = TypeDescriptor::parameterized(list, vec![TypeDescriptor::Raw(string)]);
    assert!(is_subtype(&env, &list_string, &object));

    let cloneable = TypeDescriptor::Raw(env.well_known().cloneable);
    assert!(is_subtype(&env, &cloneable, &object));
}

#[test]
fn boxed_numerics_are_numbers_and_comparables() {
    let env = EntityStore::new();
    let wk = env.well_known();

    let integer = TypeDescriptor::Raw(wk.integer);
    assert!(is_subtype(&env, &integer, &TypeDescriptor::Raw(wk.number)));
    assert!(is_subtype(&env, &integer, &TypeDescriptor::Raw(wk.serializable)));
    assert!(is_subtype(
        &env,
        &integer,
        &TypeDescriptor::parameterized(wk.comparable, vec![TypeDescriptor::Raw(wk.integer)])
    ));
    assert!(!is_subtype(
        &env,
        &integer,
        &TypeDescriptor::parameterized(wk.comparable, vec![TypeDescriptor::Raw(wk.string)])
    ));
}

#[test]
fn string_is_comparable_to_itself_only() {
    let env = EntityStore::new();
    let wk = env.well_known();
    let string = TypeDescriptor::Raw(wk.string);

    assert!(is_subtype(
        &env,
        &string,
        &TypeDescriptor::parameterized(wk.comparable, vec![TypeDescriptor::Raw(wk.string)])
    ));
    assert!(!is_subtype(
        &env,
        &string,
        &TypeDescriptor::parameterized(wk.comparable, vec![TypeDescriptor::Raw(wk.object)])
    ));
}
