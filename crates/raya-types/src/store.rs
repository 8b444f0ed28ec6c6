//! The entity catalog: raw-entity metadata the algebra queries but does not
//! own.
//!
//! [`EntityCatalog`] is the seam consumed by every algorithm in this crate;
//! [`EntityStore`] is the owned implementation with name interning, two-phase
//! definition (so recursive bounds can reference ids before their definition
//! lands), and the lazy array-entity loader.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::descriptor::{EntityId, TypeDescriptor, TypeVarId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Char,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    fn index(self) -> usize {
        match self {
            PrimitiveKind::Boolean => 0,
            PrimitiveKind::Byte => 1,
            PrimitiveKind::Short => 2,
            PrimitiveKind::Char => 3,
            PrimitiveKind::Int => 4,
            PrimitiveKind::Long => 5,
            PrimitiveKind::Float => 6,
            PrimitiveKind::Double => 7,
        }
    }

    /// Direct widening successors. `byte` and `char` are the two roots of
    /// the widening order; `boolean` and `double` widen to nothing.
    pub fn widening_supers(self) -> &'static [PrimitiveKind] {
        match self {
            PrimitiveKind::Byte => &[PrimitiveKind::Short],
            PrimitiveKind::Short => &[PrimitiveKind::Int],
            PrimitiveKind::Char => &[PrimitiveKind::Int],
            PrimitiveKind::Int => &[PrimitiveKind::Long],
            PrimitiveKind::Long => &[PrimitiveKind::Float],
            PrimitiveKind::Float => &[PrimitiveKind::Double],
            PrimitiveKind::Boolean | PrimitiveKind::Double => &[],
        }
    }

    /// Transitive widening, excluding identity.
    pub fn widens_to(self, target: PrimitiveKind) -> bool {
        let mut cur = self;
        while let Some(next) = cur.widening_supers().first().copied() {
            if next == target {
                return true;
            }
            cur = next;
        }
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Class,
    Interface,
    Enum,
    Primitive(PrimitiveKind),
}

/// Catalog-side record of a raw entity.
///
/// `super_class` and `interfaces` are the *generic* forms as declared, so
/// they may reference the entity's own type parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    pub kind: EntityKind,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<TypeDescriptor>,
    pub interfaces: Vec<TypeDescriptor>,
    /// Lexically enclosing entity, for nested declarations.
    pub enclosing: Option<EntityId>,
    pub is_static_member: bool,
}

/// Declaration-site record of a type parameter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParamDef {
    pub name: String,
    /// The declaring entity, or `None` for an operation-level parameter.
    pub declared_by: Option<EntityId>,
    /// May reference the parameter itself (F-bounds) or sibling parameters.
    pub upper_bounds: Vec<TypeDescriptor>,
}

/// Entities the algebra needs by identity: the top type, the array
/// super-interfaces, and the primitive boxing tables.
#[derive(Clone, Debug)]
pub struct WellKnownEntities {
    pub object: EntityId,
    pub string: EntityId,
    pub number: EntityId,
    pub integer: EntityId,
    pub comparable: EntityId,
    pub serializable: EntityId,
    pub cloneable: EntityId,
    pub char_sequence: EntityId,
    pub enum_base: EntityId,
    primitives: [EntityId; 8],
    boxes: [EntityId; 8],
}

impl WellKnownEntities {
    pub fn primitive(&self, kind: PrimitiveKind) -> EntityId {
        self.primitives[kind.index()]
    }

    pub fn boxed(&self, kind: PrimitiveKind) -> EntityId {
        self.boxes[kind.index()]
    }

    /// The primitive a box entity unboxes to, if `id` is a box.
    pub fn unboxed(&self, id: EntityId) -> Option<PrimitiveKind> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| self.boxes[kind.index()] == id)
    }
}

/// Read-only view of an entity catalog.
///
/// All algebra operations take `&dyn EntityCatalog`; the catalog itself is
/// free to be backed by reflection data, classfile indexes, or the in-memory
/// [`EntityStore`].
pub trait EntityCatalog {
    fn entity(&self, id: EntityId) -> Option<&EntityDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup(&self, name: &str) -> Option<EntityId>;
    fn well_known(&self) -> &WellKnownEntities;

    /// The array entity over `component`, loading and caching it on first
    /// use. Duplicate concurrent loads must agree on one id.
    fn array_entity(&self, component: EntityId) -> EntityId;

    /// Component entity of an array entity; `None` for non-arrays.
    fn array_component(&self, id: EntityId) -> Option<EntityId>;

    fn primitive_kind(&self, id: EntityId) -> Option<PrimitiveKind> {
        match self.entity(id)?.kind {
            EntityKind::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    fn is_interface_entity(&self, id: EntityId) -> bool {
        self.entity(id)
            .is_some_and(|def| def.kind == EntityKind::Interface)
    }

    fn entity_name(&self, id: EntityId) -> String {
        if let Some(component) = self.array_component(id) {
            return format!("{}[]", self.entity_name(component));
        }
        match self.entity(id) {
            Some(def) => def.name.clone(),
            None => format!("<{id:?}>"),
        }
    }
}

#[derive(Default)]
struct ArrayTable {
    by_component: FxHashMap<EntityId, EntityId>,
    components: Vec<EntityId>,
}

/// In-memory entity catalog with name interning.
pub struct EntityStore {
    names: FxHashMap<String, EntityId>,
    entities: Vec<Option<EntityDef>>,
    type_params: Vec<TypeParamDef>,
    arrays: RwLock<ArrayTable>,
    well_known: WellKnownEntities,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// A store seeded with the `java.lang` core: Object, String, Number,
    /// Comparable, Serializable, Cloneable, CharSequence, Enum, the eight
    /// primitives, and their boxes.
    pub fn new() -> Self {
        let placeholder = EntityId(0);
        let mut store = EntityStore {
            names: FxHashMap::default(),
            entities: Vec::new(),
            type_params: Vec::new(),
            arrays: RwLock::new(ArrayTable::default()),
            well_known: WellKnownEntities {
                object: placeholder,
                string: placeholder,
                number: placeholder,
                integer: placeholder,
                comparable: placeholder,
                serializable: placeholder,
                cloneable: placeholder,
                char_sequence: placeholder,
                enum_base: placeholder,
                primitives: [placeholder; 8],
                boxes: [placeholder; 8],
            },
        };

        let object = store.add_entity(EntityDef {
            name: "java.lang.Object".to_string(),
            kind: EntityKind::Class,
            type_params: vec![],
            super_class: None,
            interfaces: vec![],
            enclosing: None,
            is_static_member: false,
        });
        let serializable = store.add_interface("java.io.Serializable", vec![]);
        let cloneable = store.add_interface("java.lang.Cloneable", vec![]);
        let char_sequence = store.add_interface("java.lang.CharSequence", vec![]);

        // interface Comparable<T>
        let comparable = store.intern_entity_id("java.lang.Comparable");
        let comparable_t = store.add_entity_type_param(
            comparable,
            "T",
            vec![TypeDescriptor::Raw(object)],
        );
        store.define_entity(
            comparable,
            EntityDef {
                name: "java.lang.Comparable".to_string(),
                kind: EntityKind::Interface,
                type_params: vec![comparable_t],
                super_class: None,
                interfaces: vec![],
                enclosing: None,
                is_static_member: false,
            },
        );

        let number = store.add_entity(EntityDef {
            name: "java.lang.Number".to_string(),
            kind: EntityKind::Class,
            type_params: vec![],
            super_class: Some(TypeDescriptor::Raw(object)),
            interfaces: vec![TypeDescriptor::Raw(serializable)],
            enclosing: None,
            is_static_member: false,
        });

        // class String implements Serializable, Comparable<String>, CharSequence
        let string = store.intern_entity_id("java.lang.String");
        store.define_entity(
            string,
            EntityDef {
                name: "java.lang.String".to_string(),
                kind: EntityKind::Class,
                type_params: vec![],
                super_class: Some(TypeDescriptor::Raw(object)),
                interfaces: vec![
                    TypeDescriptor::Raw(serializable),
                    TypeDescriptor::parameterized(comparable, vec![TypeDescriptor::Raw(string)]),
                    TypeDescriptor::Raw(char_sequence),
                ],
                enclosing: None,
                is_static_member: false,
            },
        );

        let mut primitives = [placeholder; 8];
        for kind in PrimitiveKind::ALL {
            primitives[kind.index()] = store.add_entity(EntityDef {
                name: kind.name().to_string(),
                kind: EntityKind::Primitive(kind),
                type_params: vec![],
                super_class: None,
                interfaces: vec![],
                enclosing: None,
                is_static_member: false,
            });
        }

        let mut boxes = [placeholder; 8];
        for kind in PrimitiveKind::ALL {
            let (name, numeric) = match kind {
                PrimitiveKind::Boolean => ("java.lang.Boolean", false),
                PrimitiveKind::Byte => ("java.lang.Byte", true),
                PrimitiveKind::Short => ("java.lang.Short", true),
                PrimitiveKind::Char => ("java.lang.Character", false),
                PrimitiveKind::Int => ("java.lang.Integer", true),
                PrimitiveKind::Long => ("java.lang.Long", true),
                PrimitiveKind::Float => ("java.lang.Float", true),
                PrimitiveKind::Double => ("java.lang.Double", true),
            };
            let id = store.intern_entity_id(name);
            let mut interfaces = vec![TypeDescriptor::parameterized(
                comparable,
                vec![TypeDescriptor::Raw(id)],
            )];
            let super_class = if numeric {
                TypeDescriptor::Raw(number)
            } else {
                interfaces.insert(0, TypeDescriptor::Raw(serializable));
                TypeDescriptor::Raw(object)
            };
            store.define_entity(
                id,
                EntityDef {
                    name: name.to_string(),
                    kind: EntityKind::Class,
                    type_params: vec![],
                    super_class: Some(super_class),
                    interfaces,
                    enclosing: None,
                    is_static_member: false,
                },
            );
            boxes[kind.index()] = id;
        }

        // class Enum<E extends Enum<E>> implements Comparable<E>, Serializable
        let enum_base = store.intern_entity_id("java.lang.Enum");
        let enum_e = store.add_entity_type_param(enum_base, "E", vec![TypeDescriptor::Raw(object)]);
        store.define_type_param(
            enum_e,
            TypeParamDef {
                name: "E".to_string(),
                declared_by: Some(enum_base),
                upper_bounds: vec![TypeDescriptor::parameterized(
                    enum_base,
                    vec![TypeDescriptor::Variable(enum_e)],
                )],
            },
        );
        store.define_entity(
            enum_base,
            EntityDef {
                name: "java.lang.Enum".to_string(),
                kind: EntityKind::Class,
                type_params: vec![enum_e],
                super_class: Some(TypeDescriptor::Raw(object)),
                interfaces: vec![
                    TypeDescriptor::parameterized(comparable, vec![TypeDescriptor::Variable(enum_e)]),
                    TypeDescriptor::Raw(serializable),
                ],
                enclosing: None,
                is_static_member: false,
            },
        );

        store.well_known = WellKnownEntities {
            object,
            string,
            number,
            integer: boxes[PrimitiveKind::Int.index()],
            comparable,
            serializable,
            cloneable,
            char_sequence,
            enum_base,
            primitives,
            boxes,
        };
        store
    }

    /// [`EntityStore::new`] plus a small `java.util` collections hierarchy:
    /// Iterable, Collection, List, AbstractList, ArrayList, LinkedList.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::new();
        let object = store.well_known.object;

        // interface Iterable<T>
        let iterable = store.intern_entity_id("java.lang.Iterable");
        let iterable_t = store.add_entity_type_param(iterable, "T", vec![TypeDescriptor::Raw(object)]);
        store.define_entity(
            iterable,
            EntityDef {
                name: "java.lang.Iterable".to_string(),
                kind: EntityKind::Interface,
                type_params: vec![iterable_t],
                super_class: None,
                interfaces: vec![],
                enclosing: None,
                is_static_member: false,
            },
        );

        // interface Collection<E> extends Iterable<E>
        let collection = store.intern_entity_id("java.util.Collection");
        let collection_e =
            store.add_entity_type_param(collection, "E", vec![TypeDescriptor::Raw(object)]);
        store.define_entity(
            collection,
            EntityDef {
                name: "java.util.Collection".to_string(),
                kind: EntityKind::Interface,
                type_params: vec![collection_e],
                super_class: None,
                interfaces: vec![TypeDescriptor::parameterized(
                    iterable,
                    vec![TypeDescriptor::Variable(collection_e)],
                )],
                enclosing: None,
                is_static_member: false,
            },
        );

        // interface List<E> extends Collection<E>
        let list = store.intern_entity_id("java.util.List");
        let list_e = store.add_entity_type_param(list, "E", vec![TypeDescriptor::Raw(object)]);
        store.define_entity(
            list,
            EntityDef {
                name: "java.util.List".to_string(),
                kind: EntityKind::Interface,
                type_params: vec![list_e],
                super_class: None,
                interfaces: vec![TypeDescriptor::parameterized(
                    collection,
                    vec![TypeDescriptor::Variable(list_e)],
                )],
                enclosing: None,
                is_static_member: false,
            },
        );

        // class AbstractList<E> implements List<E>
        let abstract_list = store.intern_entity_id("java.util.AbstractList");
        let abstract_list_e =
            store.add_entity_type_param(abstract_list, "E", vec![TypeDescriptor::Raw(object)]);
        store.define_entity(
            abstract_list,
            EntityDef {
                name: "java.util.AbstractList".to_string(),
                kind: EntityKind::Class,
                type_params: vec![abstract_list_e],
                super_class: Some(TypeDescriptor::Raw(object)),
                interfaces: vec![TypeDescriptor::parameterized(
                    list,
                    vec![TypeDescriptor::Variable(abstract_list_e)],
                )],
                enclosing: None,
                is_static_member: false,
            },
        );

        // class ArrayList<E> extends AbstractList<E> implements List<E>
        let array_list = store.intern_entity_id("java.util.ArrayList");
        let array_list_e =
            store.add_entity_type_param(array_list, "E", vec![TypeDescriptor::Raw(object)]);
        store.define_entity(
            array_list,
            EntityDef {
                name: "java.util.ArrayList".to_string(),
                kind: EntityKind::Class,
                type_params: vec![array_list_e],
                super_class: Some(TypeDescriptor::parameterized(
                    abstract_list,
                    vec![TypeDescriptor::Variable(array_list_e)],
                )),
                interfaces: vec![TypeDescriptor::parameterized(
                    list,
                    vec![TypeDescriptor::Variable(array_list_e)],
                )],
                enclosing: None,
                is_static_member: false,
            },
        );

        // class LinkedList<E> implements List<E>
        let linked_list = store.intern_entity_id("java.util.LinkedList");
        let linked_list_e =
            store.add_entity_type_param(linked_list, "E", vec![TypeDescriptor::Raw(object)]);
        store.define_entity(
            linked_list,
            EntityDef {
                name: "java.util.LinkedList".to_string(),
                kind: EntityKind::Class,
                type_params: vec![linked_list_e],
                super_class: Some(TypeDescriptor::Raw(object)),
                interfaces: vec![TypeDescriptor::parameterized(
                    list,
                    vec![TypeDescriptor::Variable(linked_list_e)],
                )],
                enclosing: None,
                is_static_member: false,
            },
        );

        store
    }

    fn add_interface(&mut self, name: &str, interfaces: Vec<TypeDescriptor>) -> EntityId {
        self.add_entity(EntityDef {
            name: name.to_string(),
            kind: EntityKind::Interface,
            type_params: vec![],
            super_class: None,
            interfaces,
            enclosing: None,
            is_static_member: false,
        })
    }

    /// Reserve an id for `name` without defining it yet. Needed when a
    /// definition references its own id (self-referential bounds).
    pub fn intern_entity_id(&mut self, name: &str) -> EntityId {
        if let Some(id) = self.names.get(name) {
            return *id;
        }
        let id = EntityId::from_index(self.entities.len());
        self.entities.push(None);
        self.names.insert(name.to_string(), id);
        id
    }

    /// Define (or redefine) a previously interned entity.
    pub fn define_entity(&mut self, id: EntityId, def: EntityDef) {
        let idx = id
            .index()
            .expect("array entities are defined by the loader");
        self.entities[idx] = Some(def);
    }

    pub fn add_entity(&mut self, def: EntityDef) -> EntityId {
        let id = self.intern_entity_id(&def.name);
        self.define_entity(id, def);
        id
    }

    /// Define `def`, reusing the existing id when the name is already
    /// interned.
    pub fn upsert_entity(&mut self, def: EntityDef) -> EntityId {
        self.add_entity(def)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut EntityDef> {
        self.entities.get_mut(id.index()?)?.as_mut()
    }

    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.names.get(name).copied()
    }

    /// Operation-level type parameter with no declaring entity.
    pub fn add_type_param(&mut self, name: &str, upper_bounds: Vec<TypeDescriptor>) -> TypeVarId {
        self.push_type_param(TypeParamDef {
            name: name.to_string(),
            declared_by: None,
            upper_bounds,
        })
    }

    pub fn add_entity_type_param(
        &mut self,
        entity: EntityId,
        name: &str,
        upper_bounds: Vec<TypeDescriptor>,
    ) -> TypeVarId {
        self.push_type_param(TypeParamDef {
            name: name.to_string(),
            declared_by: Some(entity),
            upper_bounds,
        })
    }

    /// Redefine a previously added type parameter, for F-bounds that need
    /// the id before the bound exists.
    pub fn define_type_param(&mut self, id: TypeVarId, def: TypeParamDef) {
        self.type_params[id.index()] = def;
    }

    fn push_type_param(&mut self, def: TypeParamDef) -> TypeVarId {
        let id = TypeVarId::from_index(self.type_params.len());
        self.type_params.push(def);
        id
    }
}

impl EntityCatalog for EntityStore {
    fn entity(&self, id: EntityId) -> Option<&EntityDef> {
        self.entities.get(id.index()?)?.as_ref()
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.index())
    }

    fn lookup(&self, name: &str) -> Option<EntityId> {
        self.entity_id(name)
    }

    fn well_known(&self) -> &WellKnownEntities {
        &self.well_known
    }

    fn array_entity(&self, component: EntityId) -> EntityId {
        if let Some(id) = self.arrays.read().by_component.get(&component) {
            return *id;
        }
        let mut table = self.arrays.write();
        // Re-check under the write lock so racing loaders agree on one id.
        if let Some(id) = table.by_component.get(&component) {
            return *id;
        }
        let id = EntityId::from_array_index(table.components.len());
        table.components.push(component);
        table.by_component.insert(component, id);
        id
    }

    fn array_component(&self, id: EntityId) -> Option<EntityId> {
        let idx = id.array_index()?;
        self.arrays.read().components.get(idx).copied()
    }
}
