//! Error details for the structural, mode and lookup failures of a mesh file session.
//!
//! Each enum wraps small detail structs so that callers can match on the
//! exact cause while the top level [`Error`](crate::Error) stays flat.

use crate::prelude::*;

use crate::dataset::ValueType;
use crate::file::Mode;
use crate::mesh::{EntityKind, VariableKind};

/// The shape, size or ordering of something handed to the file did not line up
/// with what the schema allows.
#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum StructuralError {
    #[error("{0}")]
    SizeMismatch(SizeMismatch),
    #[error("{0}")]
    OutOfRange(OutOfRange),
    #[error("{0}")]
    Duplicate(Duplicate),
    #[error("{0}")]
    AlreadyDeclared(AlreadyDeclared),
    #[error("{0}")]
    Undeclared(Undeclared),
    #[error("{0}")]
    SchemaIncomplete(SchemaIncomplete),
    #[error("{0}")]
    CapacityExceeded(CapacityExceeded),
    #[error("{0}")]
    StepOrder(StepOrder),
    #[error("{0}")]
    UnknownTopology(UnknownTopology),
    #[error("{0}")]
    TypeMismatch(TypeMismatch),
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "size mismatch for {what}: expected {expected}, got {actual}")]
pub struct SizeMismatch {
    pub what: String,
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "{what} `{value}` is outside of the allowed range [{min}, {max}]")]
pub struct OutOfRange {
    pub what: String,
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "{kind} with id {id} was already written")]
pub struct Duplicate {
    pub kind: EntityKind,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "{what} has already been declared")]
pub struct AlreadyDeclared {
    pub what: String,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "{what} must be declared before values are written")]
pub struct Undeclared {
    pub what: String,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "schema is incomplete: `{field}` was not set")]
pub struct SchemaIncomplete {
    pub field: &'static str,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "the schema reserves {capacity} slot(s) for {what}, all of which are used")]
pub struct CapacityExceeded {
    pub what: String,
    pub capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "time steps must be appended in order: expected step {expected}, got {actual}")]
pub struct StepOrder {
    pub expected: usize,
    pub actual: usize,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "no side table for element `{element_type}` side {side}")]
pub struct UnknownTopology {
    pub element_type: String,
    pub side: i64,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "variable `{variable}` holds {actual} data, but {expected} was requested")]
pub struct TypeMismatch {
    pub variable: String,
    pub expected: ValueType,
    pub actual: ValueType,
}

/// The operation is not legal for the current state of the file session
#[derive(Debug, Clone, PartialEq, thiserror::Error, Constructor)]
#[error("`{operation}` is not allowed while the file is {mode}")]
pub struct ModeError {
    pub operation: &'static str,
    pub mode: Mode,
}

/// Something that was asked for does not exist
#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum NotFoundError {
    #[error("{0}")]
    File(MissingFile),
    #[error("{0}")]
    Entity(MissingEntity),
    #[error("{0}")]
    Variable(MissingVariable),
    #[error("{0}")]
    TimeStep(MissingTimeStep),
    #[error("{0}")]
    StoreItem(MissingStoreItem),
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "unable to open file `{path}`")]
pub struct MissingFile {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "no {kind} with id {id}")]
pub struct MissingEntity {
    pub kind: EntityKind,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "no {kind} variable with index {index}")]
pub struct MissingVariable {
    pub kind: VariableKind,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "time step {step} does not exist")]
pub struct MissingTimeStep {
    pub step: usize,
}

#[derive(Debug, Clone, PartialEq, Display, Constructor)]
#[display(fmt = "no {what} named `{name}` in the file")]
pub struct MissingStoreItem {
    pub what: &'static str,
    pub name: String,
}

/// The four broad families of failure a caller may want to branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    Mode,
    NotFound,
    Io,
}
