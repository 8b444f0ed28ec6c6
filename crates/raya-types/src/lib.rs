//! Raya's descriptor algebra: generics and erasure over an entity catalog.
//!
//! The crate models a Java-like language's types as a closed set of
//! descriptor kinds ([`TypeDescriptor`]) and answers the questions a
//! type-checker asks about them: what is a type's erasure, is one type
//! assignable from another, what does an entity look like when viewed as one
//! of its generic ancestors, and what is the least upper bound of a set of
//! types. Validated constructors build new parameterized, wildcard, and
//! array descriptors from parts.
//!
//! All operations are pure functions over immutable descriptors and a
//! read-only [`EntityCatalog`]. The catalog is the seam to the host's type
//! metadata; [`EntityStore`] is the in-memory implementation used throughout
//! the tests.

mod assign;
mod descriptor;
mod erase;
mod error;
mod factory;
mod format;
mod join;
mod store;
mod subst;
mod supertype;

pub use assign::{
    assignable_reference, is_assignable, is_assignable_strict, is_same_type, is_subtype,
    is_subtype_strict,
};
pub use descriptor::{EntityId, ParameterizedType, TypeDescriptor, TypeVarId, WildcardType};
pub use erase::{component_type, erase, is_array_type, is_enum, is_interface, is_primitive};
pub use error::{Result, TypeError};
pub use factory::{array_type, parameterized_type, unbounded_wildcard, wildcard_type, BoundKind};
pub use format::render_type;
pub use join::{greatest_lower_bounds, least_upper_bounds};
pub use store::{
    EntityCatalog, EntityDef, EntityKind, EntityStore, PrimitiveKind, TypeParamDef,
    WellKnownEntities,
};
pub use subst::{resolve_in_context, substitute};
pub use supertype::{all_supertypes, direct_supertypes, resolve_super_type};
