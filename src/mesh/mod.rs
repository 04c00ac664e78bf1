//! # Mesh Information
//!
//! The types in this module are the in-memory snapshots of what a mesh file contains:
//! element blocks (homogeneous groups of elements that share a topology), node sets
//! and side sets. They are handed out by a [`File`](crate::File) after the relevant
//! `read_*` call, or filled in as the structure is written.
//!
//! Every entity carries the integer id the caller chose for it. Ids are opaque: they
//! only need to be unique among the entities of the same kind. Node and element
//! indices stored inside an entity are 1-based, matching the numbering used in the
//! file itself.
//!
//! ## Side sets and topology
//!
//! A side set is a list of `(element, local side)` pairs. To turn a side into the nodes
//! that lie on it, the file needs to know the topology of the owning element. The
//! [`topology`] module holds the local side tables for the element types the crate
//! understands (`BAR2`, `TRI3`, `QUAD4`, `TET4`, `HEX8`, ...). Element types outside of
//! that list can still be written and read, but their side sets cannot be expanded into
//! node lists.
//!
//! ## Variable catalogs
//!
//! Time dependent values are addressed through a [`VariableCatalog`]: an ordered mapping
//! from the 1-based variable index to its name. A catalog is declared once per
//! [`VariableKind`] and is never modified afterwards.

mod block;
mod catalog;
mod sets;
pub mod topology;

pub use block::ElementBlock;
pub use catalog::VariableCatalog;
pub use sets::{NodeSet, SideSet};
pub use topology::Topology;

pub(crate) use catalog::CatalogState;
pub(crate) use sets::check_side_lists;

use crate::prelude::*;

/// The kind of structural entity an id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EntityKind {
    #[display(fmt = "element block")]
    ElementBlock,
    #[display(fmt = "node set")]
    NodeSet,
    #[display(fmt = "side set")]
    SideSet,
}

/// Which catalog a time dependent variable belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum VariableKind {
    #[display(fmt = "global")]
    Global,
    #[display(fmt = "nodal")]
    Nodal,
    #[display(fmt = "elemental")]
    Elemental,
}
