use thiserror::Error;

use crate::descriptor::EntityId;

pub type Result<T> = std::result::Result<T, TypeError>;

/// Failures surfaced by the validating constructors and the join engine.
///
/// Nothing here is retried or degraded; every error propagates synchronously
/// to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// Wrong argument arity, invalid owner relationship, or a primitive or
    /// wildcard used where the model disallows it.
    #[error("malformed descriptor: {0}")]
    MalformedDescriptor(String),
    /// A type argument does not satisfy the declared bound of its type
    /// parameter. Both sides are pre-rendered for diagnostics.
    #[error("type argument {argument} does not satisfy bound {bound}")]
    BoundViolation { bound: String, argument: String },
    /// A join was requested over a mix of primitive and reference inputs
    /// that share no supertype.
    #[error("incompatible join inputs: {0}")]
    IncompatibleJoinInputs(String),
    /// An interned entity id with no definition reached a structural
    /// recursion that needs one.
    #[error("entity {0:?} has no definition")]
    UndefinedEntity(EntityId),
}
