//! # Mesh file sessions
//!
//! A [`File`] is one handle on one mesh file. It moves through a small state machine:
//!
//! ```text
//!          create(path)            open(path, Read)         open(path, Append)
//! Closed ---------------> Write    Closed -------> Read     Closed -------> Append
//!   ^                       |        ^               |        ^               |
//!   +------- close() -------+        +--- close() ---+        +--- close() ---+
//! ```
//!
//! There is no transition between the open modes: to switch from writing to reading,
//! close the file and open it again.
//!
//! In `Write` mode the schema is declared exactly once with [`File::init`]. After that,
//! coordinates, element blocks, sets, time steps and variable values are written in any
//! order that respects their dependencies (a time step must exist before values are
//! written to it, a variable catalog must be declared before its values are written).
//!
//! In `Read` and `Append` mode the schema comes from the file. The `read_*` methods load
//! parts of the file into the session's caches, which the `get_*` accessors then hand
//! out without touching the file again. [`File::read`] loads everything at once.
//!
//! ## Flushing
//!
//! Writes go into an in-memory [`Dataset`]. Nothing reaches disk until [`File::update`]
//! or [`File::close`] is called. A session that is dropped while still open is closed
//! (and therefore flushed) in its `Drop` implementation; failures there are logged with
//! `log::warn!` since they can no longer be returned.
//!
//! A session holds no lock on its file. Running two sessions on the same path at the
//! same time, when either of them writes, is not supported.
//!
//! ```no_run
//! use exodus::{File, FileAccess, InitParams};
//!
//! # fn main() -> Result<(), exodus::Error> {
//! let mut file = File::create("triangle.exo")?;
//! file.init(&InitParams::new("one triangle", 2, 3, 1, 1, 0, 0))?;
//! file.write_coords(&[0.0, 1.0, 0.0], Some(&[0.0, 0.0, 1.0]), None)?;
//! file.write_block(1, "TRI3", 3, &[1, 2, 3])?;
//! file.write_time(1, 0.0)?;
//! file.write_nodal_var_names(&["temperature"])?;
//! file.write_nodal_var(1, 1, &[10.0, 11.0, 12.0])?;
//! file.close()?;
//!
//! let mut file = File::open("triangle.exo", FileAccess::Read)?;
//! let temperature = file.get_nodal_variable_values(1, 1)?;
//! assert_eq!(temperature, vec![10.0, 11.0, 12.0]);
//! # Ok(())
//! # }
//! ```

mod names;
mod structure;
mod variables;

use crate::dataset::{Dataset, ValueType};
use crate::mesh::{CatalogState, ElementBlock, NodeSet, SideSet, VariableCatalog, VariableKind};
use crate::parse;
use crate::prelude::*;
use crate::write_store;

use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// The state of a [`File`] session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Mode {
    #[default]
    #[display(fmt = "closed")]
    Closed,
    #[display(fmt = "open for reading")]
    Read,
    #[display(fmt = "open for writing")]
    Write,
    #[display(fmt = "open for appending")]
    Append,
}

/// How an existing file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAccess {
    /// inspect the file without changing it
    Read,
    /// add time steps and variable values to the file
    Append,
}

impl From<FileAccess> for Mode {
    fn from(access: FileAccess) -> Self {
        match access {
            FileAccess::Read => Mode::Read,
            FileAccess::Append => Mode::Append,
        }
    }
}

const WRITABLE: &[Mode] = &[Mode::Write, Mode::Append];
const READABLE: &[Mode] = &[Mode::Read, Mode::Append];

/// The schema of a new file.
///
/// `dim`, `num_nodes` and `num_elems` are required. The remaining counts default to zero
/// and the title to an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitParams {
    pub title: Option<String>,
    pub dim: Option<usize>,
    pub num_nodes: Option<usize>,
    pub num_elems: Option<usize>,
    pub num_blocks: Option<usize>,
    pub num_node_sets: Option<usize>,
    pub num_side_sets: Option<usize>,
}

impl InitParams {
    /// Fully specified schema
    pub fn new<T: Into<String>>(
        title: T,
        dim: usize,
        num_nodes: usize,
        num_elems: usize,
        num_blocks: usize,
        num_node_sets: usize,
        num_side_sets: usize,
    ) -> Self {
        Self {
            title: Some(title.into()),
            dim: Some(dim),
            num_nodes: Some(num_nodes),
            num_elems: Some(num_elems),
            num_blocks: Some(num_blocks),
            num_node_sets: Some(num_node_sets),
            num_side_sets: Some(num_side_sets),
        }
    }

    fn validate(&self) -> Result<Summary, StructuralError> {
        let dim = self.dim.ok_or(SchemaIncomplete::new("dim"))?;
        if !(1..=3).contains(&dim) {
            return Err(OutOfRange::new("spatial dimension".into(), dim as i64, 1, 3).into());
        }

        Ok(Summary {
            dim,
            num_nodes: self.num_nodes.ok_or(SchemaIncomplete::new("num_nodes"))?,
            num_elems: self.num_elems.ok_or(SchemaIncomplete::new("num_elems"))?,
            num_blocks: self.num_blocks.unwrap_or(0),
            num_node_sets: self.num_node_sets.unwrap_or(0),
            num_side_sets: self.num_side_sets.unwrap_or(0),
        })
    }
}

/// counts fixed by the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) dim: usize,
    pub(crate) num_nodes: usize,
    pub(crate) num_elems: usize,
    pub(crate) num_blocks: usize,
    pub(crate) num_node_sets: usize,
    pub(crate) num_side_sets: usize,
}

/// One open (or closed) mesh file. See the [module documentation](self) for the lifecycle.
#[derive(Debug, Default)]
pub struct File {
    path: PathBuf,
    mode: Mode,
    encoding: Encoding,
    store: Dataset,
    /// the store holds changes that have not been written to `path`
    dirty: bool,

    title: String,
    summary: Option<Summary>,

    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
    coord_names: Vec<String>,
    element_blocks: Vec<ElementBlock>,
    node_sets: Vec<NodeSet>,
    side_sets: Vec<SideSet>,
    elem_map: Vec<usize>,
    info: Vec<String>,
    times: Vec<f64>,

    global_vars: CatalogState,
    nodal_vars: CatalogState,
    elem_vars: CatalogState,
}

impl File {
    /// A closed session. Every count accessor returns `None` until a file is opened.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or truncate) `path` and open it for writing
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        std::fs::File::create(path)?;

        log::debug!("created mesh file {}", path.display());

        let mut file = Self::new();
        file.path = path.to_path_buf();
        file.mode = Mode::Write;
        file.dirty = true;
        Ok(file)
    }

    /// Open an existing file for reading or appending
    pub fn open<P: AsRef<Path>>(path: P, access: FileAccess) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.is_file() {
            let missing = MissingFile::new(path.display().to_string());
            return Err(NotFoundError::from(missing).into());
        }

        let store = parse::read_dataset(path)?;

        let mut file = Self::new();
        file.path = path.to_path_buf();
        file.mode = Mode::from(access);
        file.store = store;
        file.load_schema()?;

        log::debug!("opened mesh file {} ({})", path.display(), file.mode);
        Ok(file)
    }

    /// Encoding used for numeric payloads the next time the file is flushed
    pub fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = encoding;
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn is_opened(&self) -> bool {
        self.mode != Mode::Closed
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Path of the open file. Empty once the session is closed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Declare the schema of a file opened with [`File::create`]. This can happen only once.
    pub fn init(&mut self, params: &InitParams) -> Result<(), Error> {
        self.require_mode("init", &[Mode::Write])?;

        if self.summary.is_some() {
            return Err(StructuralError::from(AlreadyDeclared::new("the schema".into())).into());
        }

        let summary = params.validate()?;
        let title = params.title.clone().unwrap_or_default();

        // build on a copy so that a failed definition leaves the session untouched
        let mut store = self.store.clone();
        define_schema(&mut store, &title, &summary)?;

        log::debug!(
            "initialized `{}`: dim={} nodes={} elements={} blocks={} node sets={} side sets={}",
            title,
            summary.dim,
            summary.num_nodes,
            summary.num_elems,
            summary.num_blocks,
            summary.num_node_sets,
            summary.num_side_sets
        );

        self.store = store;
        self.coord_names = default_coord_names(summary.dim);
        self.title = title;
        self.summary = Some(summary);
        self.dirty = true;
        Ok(())
    }

    /// Write every pending change to disk. A no-op for files opened for reading.
    pub fn update(&mut self) -> Result<(), Error> {
        if !self.is_opened() {
            return Err(ModeError::new("update", self.mode).into());
        }
        self.flush()
    }

    /// Flush pending changes and release the file. Closing a closed session does nothing.
    ///
    /// The session ends up closed even if the flush fails.
    pub fn close(&mut self) -> Result<(), Error> {
        if !self.is_opened() {
            return Ok(());
        }

        let result = self.flush();
        log::debug!("closing mesh file {}", self.path.display());

        let encoding = self.encoding;
        self.mode = Mode::Closed;
        *self = Self::new();
        self.encoding = encoding;

        result
    }

    /// Title of the file, empty when closed
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Spatial dimension, `None` when closed or before `init`
    pub fn dim(&self) -> Option<usize> {
        self.summary.map(|s| s.dim)
    }

    pub fn num_nodes(&self) -> Option<usize> {
        self.summary.map(|s| s.num_nodes)
    }

    pub fn num_elements(&self) -> Option<usize> {
        self.summary.map(|s| s.num_elems)
    }

    pub fn num_element_blocks(&self) -> Option<usize> {
        self.summary.map(|s| s.num_blocks)
    }

    pub fn num_node_sets(&self) -> Option<usize> {
        self.summary.map(|s| s.num_node_sets)
    }

    pub fn num_side_sets(&self) -> Option<usize> {
        self.summary.map(|s| s.num_side_sets)
    }

    /// Load the whole file into the session: coordinates, names, blocks, sets, the
    /// element map, info records and the time values.
    pub fn read(&mut self) -> Result<(), Error> {
        self.read_coords()?;
        self.read_coord_names()?;
        self.read_blocks()?;
        self.read_node_sets()?;
        self.read_side_sets()?;
        self.read_elem_map()?;
        self.read_info()?;
        self.read_times()?;
        Ok(())
    }

    fn require_mode(&self, operation: &'static str, allowed: &[Mode]) -> Result<(), Error> {
        if allowed.contains(&self.mode) {
            Ok(())
        } else {
            Err(ModeError::new(operation, self.mode).into())
        }
    }

    fn require_schema(&self) -> Result<Summary, Error> {
        self.summary
            .ok_or_else(|| StructuralError::from(Undeclared::new("the schema".into())).into())
    }

    /// the session may change the file, and the schema is in place
    fn require_writable(&self, operation: &'static str) -> Result<Summary, Error> {
        self.require_mode(operation, WRITABLE)?;
        self.require_schema()
    }

    /// the session was opened on an existing file that has a schema
    fn require_readable(&self, operation: &'static str) -> Result<Summary, Error> {
        self.require_mode(operation, READABLE)?;
        self.require_schema()
    }

    fn flush(&mut self) -> Result<(), Error> {
        if !self.dirty || self.mode == Mode::Read {
            return Ok(());
        }

        let file = std::fs::File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        write_store::write_dataset(&mut writer, &self.store, self.encoding)?;
        writer.flush()?;

        log::debug!(
            "flushed {} ({} time step(s)) to {}",
            self.title,
            self.store.num_records(),
            self.path.display()
        );

        self.dirty = false;
        Ok(())
    }

    /// Read the schema and the variable catalogs of a freshly parsed file
    fn load_schema(&mut self) -> Result<(), Error> {
        if !self.store.has_dimension(names::DIM_NUM_DIM) {
            log::debug!("{} has no schema", self.path.display());
            return Ok(());
        }

        let summary = Summary {
            dim: schema_dimension(&self.store, names::DIM_NUM_DIM)?,
            num_nodes: schema_dimension(&self.store, names::DIM_NUM_NODES)?,
            num_elems: schema_dimension(&self.store, names::DIM_NUM_ELEM)?,
            num_blocks: schema_dimension(&self.store, names::DIM_NUM_EL_BLK)?,
            num_node_sets: schema_dimension(&self.store, names::DIM_NUM_NODE_SETS)?,
            num_side_sets: schema_dimension(&self.store, names::DIM_NUM_SIDE_SETS)?,
        };

        if !(1..=3).contains(&summary.dim) {
            let detail = format!("spatial dimension {} is not 1, 2 or 3", summary.dim);
            let schema = parse::Schema::from(parse::Inconsistent::new(detail));
            return Err(parse::ParseError::from(schema).into());
        }

        if self.store.record_dimension().is_none() {
            let missing = parse::MissingSchemaItem::new("dimension", names::DIM_TIME_STEP.into());
            return Err(parse::ParseError::from(parse::Schema::from(missing)).into());
        }

        self.title = self.store.attribute(names::ATT_TITLE).unwrap_or_default().to_string();
        self.summary = Some(summary);

        self.global_vars = load_catalog(&self.store, names::VAR_NAME_GLO)?;
        self.nodal_vars = load_catalog(&self.store, names::VAR_NAME_NOD)?;
        self.elem_vars = load_catalog(&self.store, names::VAR_NAME_ELEM)?;

        Ok(())
    }

    fn catalog_state(&self, kind: VariableKind) -> &CatalogState {
        match kind {
            VariableKind::Global => &self.global_vars,
            VariableKind::Nodal => &self.nodal_vars,
            VariableKind::Elemental => &self.elem_vars,
        }
    }

    fn catalog_state_mut(&mut self, kind: VariableKind) -> &mut CatalogState {
        match kind {
            VariableKind::Global => &mut self.global_vars,
            VariableKind::Nodal => &mut self.nodal_vars,
            VariableKind::Elemental => &mut self.elem_vars,
        }
    }
}

impl Drop for File {
    fn drop(&mut self) {
        if !self.is_opened() {
            return;
        }

        let path = self.path.clone();
        if let Err(e) = self.close() {
            log::warn!("failed to close mesh file {}: {}", path.display(), e);
        }
    }
}

/// Define the dimensions and structural variables every initialized file carries
fn define_schema(store: &mut Dataset, title: &str, summary: &Summary) -> Result<(), Error> {
    store.set_attribute(names::ATT_TITLE, title);
    store.set_attribute(names::ATT_API_VERSION, env!("CARGO_PKG_VERSION"));

    store.define_dimension(names::DIM_NUM_DIM, summary.dim)?;
    store.define_dimension(names::DIM_NUM_NODES, summary.num_nodes)?;
    store.define_dimension(names::DIM_NUM_ELEM, summary.num_elems)?;
    store.define_dimension(names::DIM_NUM_EL_BLK, summary.num_blocks)?;
    store.define_dimension(names::DIM_NUM_NODE_SETS, summary.num_node_sets)?;
    store.define_dimension(names::DIM_NUM_SIDE_SETS, summary.num_side_sets)?;
    store.define_unlimited(names::DIM_TIME_STEP)?;

    for axis in 0..summary.dim {
        store.define_variable(&names::coord(axis), ValueType::Float64, &[names::DIM_NUM_NODES])?;
    }
    store.define_variable(names::VAR_COORD_NAMES, ValueType::Text, &[names::DIM_NUM_DIM])?;
    store.put_text(names::VAR_COORD_NAMES, &default_coord_names(summary.dim))?;

    let id_tables = [
        (names::VAR_EB_PROP, names::VAR_EB_NAMES, names::DIM_NUM_EL_BLK),
        (names::VAR_NS_PROP, names::VAR_NS_NAMES, names::DIM_NUM_NODE_SETS),
        (names::VAR_SS_PROP, names::VAR_SS_NAMES, names::DIM_NUM_SIDE_SETS),
    ];
    for (ids, entity_names, dim) in id_tables {
        store.define_variable(ids, ValueType::Int64, &[dim])?;
        store.define_variable(entity_names, ValueType::Text, &[dim])?;
    }

    store.define_variable(names::VAR_TIME, ValueType::Float64, &[names::DIM_TIME_STEP])?;

    Ok(())
}

fn default_coord_names(dim: usize) -> Vec<String> {
    names::DEFAULT_COORD_NAMES
        .iter()
        .take(dim)
        .map(|name| name.to_string())
        .collect()
}

/// a dimension the schema requires. Its absence means the file is not a mesh file.
fn schema_dimension(store: &Dataset, name: &str) -> Result<usize, Error> {
    if !store.has_dimension(name) {
        let missing = parse::MissingSchemaItem::new("dimension", name.into());
        return Err(parse::ParseError::from(parse::Schema::from(missing)).into());
    }
    store.dimension_len(name)
}

fn load_catalog(store: &Dataset, names_variable: &str) -> Result<CatalogState, Error> {
    if !store.has_variable(names_variable) {
        return Ok(CatalogState::Undeclared);
    }

    let names = store.get_text(names_variable)?;
    Ok(CatalogState::Declared(VariableCatalog::new(names)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.exo");
        (dir, path)
    }

    #[test]
    fn closed_session_sentinels() {
        let file = File::new();
        assert!(!file.is_opened());
        assert_eq!(file.mode(), Mode::Closed);
        assert_eq!(file.title(), "");
        assert_eq!(file.dim(), None);
        assert_eq!(file.num_nodes(), None);
        assert_eq!(file.num_side_sets(), None);
        assert_eq!(file.get_num_times(), 0);
        assert!(file.get_times().is_empty());
        assert!(file.get_nodal_variable_names().is_empty());
    }

    #[test]
    fn init_requires_dim_and_counts() {
        let (_dir, path) = scratch();
        let mut file = File::create(&path).unwrap();

        let err = file.init(&InitParams::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);

        let params = InitParams {
            dim: Some(4),
            num_nodes: Some(1),
            num_elems: Some(0),
            ..Default::default()
        };
        assert!(file.init(&params).is_err());

        // failed attempts do not count as the one allowed init
        let params = InitParams {
            dim: Some(1),
            num_nodes: Some(2),
            num_elems: Some(1),
            ..Default::default()
        };
        file.init(&params).unwrap();
        assert_eq!(file.title(), "");
        assert_eq!(file.num_element_blocks(), Some(0));
        assert_eq!(file.get_coord_names(), &["x".to_string()]);
    }

    #[test]
    fn init_only_once_and_only_for_writing() {
        let (_dir, path) = scratch();
        let params = InitParams::new("bar", 1, 2, 1, 1, 0, 0);

        let mut file = File::create(&path).unwrap();
        file.init(&params).unwrap();
        let err = file.init(&params).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::AlreadyDeclared(_))
        ));
        file.close().unwrap();

        let mut file = File::open(&path, FileAccess::Read).unwrap();
        let err = file.init(&params).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mode);
        assert_eq!(file.title(), "bar");
        assert_eq!(file.num_nodes(), Some(2));

        let mut file = File::open(&path, FileAccess::Append).unwrap();
        assert_eq!(file.init(&params).unwrap_err().kind(), ErrorKind::Mode);
    }

    #[test]
    fn close_is_idempotent() {
        let (_dir, path) = scratch();
        let mut file = File::create(&path).unwrap();
        file.init(&InitParams::new("t", 2, 3, 0, 0, 0, 0)).unwrap();
        file.set_encoding(Encoding::Ascii);

        file.close().unwrap();
        assert!(!file.is_opened());
        assert_eq!(file.num_nodes(), None);
        assert_eq!(file.encoding(), Encoding::Ascii);
        file.close().unwrap();

        // a closed session has nothing to flush
        assert_eq!(file.update().unwrap_err().kind(), ErrorKind::Mode);
        assert_eq!(
            file.init(&InitParams::new("t", 2, 3, 0, 0, 0, 0))
                .unwrap_err()
                .kind(),
            ErrorKind::Mode
        );
    }

    #[test]
    fn missing_and_malformed_files() {
        let (dir, path) = scratch();
        let err = File::open(&path, FileAccess::Read).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let garbage = dir.path().join("garbage.exo");
        std::fs::write(&garbage, "<html></html>").unwrap();
        let err = File::open(&garbage, FileAccess::Append).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn drop_flushes() {
        let (_dir, path) = scratch();
        {
            let mut file = File::create(&path).unwrap();
            file.init(&InitParams::new("dropped", 1, 2, 0, 0, 0, 0)).unwrap();
        }

        let file = File::open(&path, FileAccess::Read).unwrap();
        assert_eq!(file.title(), "dropped");
        assert_eq!(file.dim(), Some(1));
    }

    #[test]
    fn update_makes_schema_visible() {
        let (_dir, path) = scratch();
        let mut writer = File::create(&path).unwrap();
        writer.init(&InitParams::new("live", 3, 4, 0, 0, 0, 0)).unwrap();
        writer.update().unwrap();

        let reader = File::open(&path, FileAccess::Read).unwrap();
        assert_eq!(reader.num_nodes(), Some(4));
        assert_eq!(reader.dim(), Some(3));

        drop(reader);
        writer.close().unwrap();
    }
}
