#![doc = include_str!("../README.md")]

pub mod dataset;
pub mod error;
mod file;
pub mod mesh;
pub mod parse;
pub mod prelude;
mod traits;
mod utils;
pub mod write_store;

pub use dataset::{Dataset, ValueType};
pub use error::{ErrorKind, ModeError, NotFoundError, StructuralError};
pub use file::{File, FileAccess, InitParams, Mode};
pub use mesh::{ElementBlock, EntityKind, NodeSet, SideSet, Topology, VariableCatalog, VariableKind};
pub use parse::{read_dataset, ParseError};
pub use traits::Payload;
pub use write_store::{write_dataset, Encoding};

pub use ndarray;

pub use quick_xml::reader::Reader;
pub use quick_xml::writer::Writer;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid mesh structure: {0}")]
    Structural(#[from] StructuralError),
    #[error("{0}")]
    Mode(#[from] ModeError),
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Error while parsing mesh file xml: {0}")]
    Parse(#[from] parse::ParseError),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
}

impl Error {
    /// The broad family of the error. Every failure to move bytes to or from disk
    /// (including malformed files) is [`ErrorKind::Io`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Structural(_) => ErrorKind::Structural,
            Self::Mode(_) => ErrorKind::Mode,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Io(_) | Self::Parse(_) | Self::XmlWrite(_) => ErrorKind::Io,
        }
    }
}
