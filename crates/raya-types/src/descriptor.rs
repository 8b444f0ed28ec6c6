//! The descriptor model: a closed set of node kinds describing generic types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Interned identity of a raw entity (class, interface, enum, primitive, or
/// array) inside an entity catalog.
///
/// Array entities are allocated lazily by the catalog's array loader and
/// carry a tag bit so they can live in their own table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub(crate) u32);

impl EntityId {
    const ARRAY_BIT: u32 = 1 << 31;

    pub(crate) fn from_index(index: usize) -> Self {
        let idx: u32 = index.try_into().expect("too many entities");
        debug_assert_eq!(idx & Self::ARRAY_BIT, 0);
        Self(idx)
    }

    pub(crate) fn from_array_index(index: usize) -> Self {
        let idx: u32 = index.try_into().expect("too many array entities");
        Self(Self::ARRAY_BIT | idx)
    }

    pub(crate) fn index(self) -> Option<usize> {
        if self.is_array_entity() {
            return None;
        }
        Some(self.0 as usize)
    }

    pub(crate) fn array_index(self) -> Option<usize> {
        if !self.is_array_entity() {
            return None;
        }
        Some((self.0 & !Self::ARRAY_BIT) as usize)
    }

    /// Whether this id names a lazily loaded array entity.
    pub fn is_array_entity(self) -> bool {
        (self.0 & Self::ARRAY_BIT) != 0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.array_index() {
            Some(idx) => write!(f, "EntityId(array#{idx})"),
            None => write!(f, "EntityId({})", self.0),
        }
    }
}

/// Interned identity of a declared type parameter.
///
/// Identity is the interned id, assigned once per declaration site and name;
/// bounds are looked up from the catalog and never compared structurally, so
/// mutually recursive bounds cannot send equality into a loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeVarId(pub(crate) u32);

impl TypeVarId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index.try_into().expect("too many type params"))
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A generic type descriptor.
///
/// Descriptors are immutable value objects; structural equality is recursive
/// and order-sensitive for type arguments and bounds. Derived descriptors
/// produced by the substitution and resolution engines share unchanged
/// sub-structure with their inputs.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum TypeDescriptor {
    /// Erased, non-generic reference to a catalog entity.
    Raw(EntityId),
    /// Instantiation of a generic entity with type arguments.
    Parameterized(ParameterizedType),
    /// Generic array type. The component is never `Raw` (raw arrays are
    /// `Raw` over the catalog's array entity) and never a wildcard.
    Array(Box<TypeDescriptor>),
    /// Reference to a declared type parameter. Bounds live in the catalog.
    Variable(TypeVarId),
    /// Bounded placeholder for an unknown type.
    Wildcard(WildcardType),
}

impl TypeDescriptor {
    pub fn raw(entity: EntityId) -> Self {
        TypeDescriptor::Raw(entity)
    }

    /// Unvalidated parameterized instantiation without an owner. The
    /// validating boundary is [`crate::parameterized_type`].
    pub fn parameterized(entity: EntityId, args: Vec<TypeDescriptor>) -> Self {
        TypeDescriptor::Parameterized(ParameterizedType {
            owner: None,
            entity,
            args,
        })
    }

    pub fn variable(var: TypeVarId) -> Self {
        TypeDescriptor::Variable(var)
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, TypeDescriptor::Wildcard(_))
    }
}

/// Instantiation of a generic entity.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ParameterizedType {
    /// Enclosing instantiation; present iff the entity is a non-static
    /// nested generic whose enclosing type is itself generic.
    pub owner: Option<Box<TypeDescriptor>>,
    pub entity: EntityId,
    /// Length always equals the entity's declared type-parameter count.
    pub args: Vec<TypeDescriptor>,
}

/// Bounds of a wildcard.
///
/// `upper_bounds` is non-empty (an unbounded wildcard carries the top type);
/// a wildcard with a non-trivial lower bound keeps its upper bounds fixed to
/// the top type. Two wildcards with identical bounds compare equal, but a
/// wildcard is never [`crate::is_same_type`] with anything: each one stands
/// for its own unknown.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct WildcardType {
    pub upper_bounds: Vec<TypeDescriptor>,
    pub lower_bounds: Vec<TypeDescriptor>,
}

impl WildcardType {
    /// `? extends bounds[0] & bounds[1] & ...`
    pub fn upper_bounded(upper_bounds: Vec<TypeDescriptor>) -> Self {
        debug_assert!(!upper_bounds.is_empty());
        Self {
            upper_bounds,
            lower_bounds: Vec::new(),
        }
    }

    /// `? super bound`, with the upper bound pinned to the top type.
    pub fn lower_bounded(top: EntityId, lower_bounds: Vec<TypeDescriptor>) -> Self {
        Self {
            upper_bounds: vec![TypeDescriptor::Raw(top)],
            lower_bounds,
        }
    }

    /// `?`, i.e. `? extends` the top type.
    pub fn unbounded(top: EntityId) -> Self {
        Self {
            upper_bounds: vec![TypeDescriptor::Raw(top)],
            lower_bounds: Vec::new(),
        }
    }

    pub fn is_unbounded(&self, top: EntityId) -> bool {
        self.lower_bounds.is_empty()
            && self.upper_bounds == [TypeDescriptor::Raw(top)]
    }
}
