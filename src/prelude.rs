//! Common traits and types that are useful for working with `exodus`
#![allow(unused_imports)]

pub use crate::file::{File, FileAccess, InitParams, Mode};
pub use crate::mesh::{ElementBlock, EntityKind, NodeSet, SideSet, VariableKind};
pub use crate::traits::Payload;
pub use crate::write_store::Encoding;

pub(crate) use crate::error::{
    AlreadyDeclared, CapacityExceeded, Duplicate, MissingEntity, MissingFile, MissingStoreItem,
    MissingTimeStep, MissingVariable, OutOfRange, SchemaIncomplete, SizeMismatch, StepOrder,
    TypeMismatch, Undeclared, UnknownTopology,
};
pub(crate) use crate::error::{ModeError, NotFoundError, StructuralError};
pub(crate) use crate::Error;

pub(crate) use std::io::{BufRead, Write};

pub(crate) use derive_more::{Constructor, Deref, Display, From, Into};

pub(crate) use ndarray::Array2;
