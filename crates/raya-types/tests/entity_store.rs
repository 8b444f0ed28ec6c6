use raya_types::{
    EntityCatalog, EntityDef, EntityKind, EntityStore, PrimitiveKind, TypeDescriptor,
};

use pretty_assertions::assert_eq;

fn plain_class(name: &str, super_class: Option<TypeDescriptor>) -> EntityDef {
    EntityDef {
        name: name.to_string(),
        kind: EntityKind::Class,
        type_params: vec![],
        super_class,
        interfaces: vec![],
        enclosing: None,
        is_static_member: false,
    }
}

#[test]
fn intern_entity_id_is_idempotent() {
    let mut store = EntityStore::new();
    let first = store.intern_entity_id("com.example.Foo");
    let second = store.intern_entity_id("com.example.Foo");
    assert_eq!(first, second);
    assert!(store.entity(first).is_none());
}

#[test]
fn define_entity_overwrites_placeholder() {
    let mut store = EntityStore::new();
    let object = store.well_known().object;
    let id = store.intern_entity_id("com.example.Foo");
    store.define_entity(id, plain_class("com.example.Foo", Some(TypeDescriptor::Raw(object))));

    assert_eq!(store.entity_id("com.example.Foo"), Some(id));
    let def = store.entity(id).expect("entity should be defined");
    assert_eq!(def.name, "com.example.Foo");
    assert_eq!(def.kind, EntityKind::Class);
}

#[test]
fn upsert_entity_overwrites_without_changing_id() {
    let mut store = EntityStore::new();
    let first = store.upsert_entity(plain_class("com.example.Bar", None));
    let second = store.upsert_entity(EntityDef {
        kind: EntityKind::Interface,
        ..plain_class("com.example.Bar", None)
    });

    assert_eq!(first, second);
    let def = store.entity(first).expect("entity should be defined");
    assert_eq!(def.kind, EntityKind::Interface);
}

#[test]
fn entity_mut_edits_in_place() {
    let mut store = EntityStore::with_minimal_jdk();
    let linked_list = store.entity_id("java.util.LinkedList").unwrap();
    let cloneable = store.well_known().cloneable;

    store
        .entity_mut(linked_list)
        .unwrap()
        .interfaces
        .push(TypeDescriptor::Raw(cloneable));
    assert!(store
        .entity(linked_list)
        .unwrap()
        .interfaces
        .contains(&TypeDescriptor::Raw(cloneable)));
}

#[test]
fn array_entities_are_memoized_and_nest() {
    let store = EntityStore::new();
    let string = store.well_known().string;

    let a = store.array_entity(string);
    let b = store.array_entity(string);
    assert_eq!(a, b);
    assert!(a.is_array_entity());
    assert_eq!(store.array_component(a), Some(string));
    assert_eq!(store.array_component(string), None);

    let aa = store.array_entity(a);
    assert_eq!(store.array_component(aa), Some(a));
    assert_eq!(store.entity_name(aa), "java.lang.String[][]");
}

#[test]
fn array_entity_names_primitives() {
    let store = EntityStore::new();
    let int_entity = store.well_known().primitive(PrimitiveKind::Int);
    assert_eq!(store.entity_name(store.array_entity(int_entity)), "int[]");
}

#[test]
fn concurrent_array_loads_agree_on_one_id() {
    let store = EntityStore::new();
    let string = store.well_known().string;

    let ids: Vec<_> = std::thread::scope(|scope| {
        (0..8)
            .map(|_| scope.spawn(|| store.array_entity(string)))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });
    for id in &ids {
        assert_eq!(*id, ids[0]);
    }
}
