//! Coordinates, element blocks, node sets and side sets.
//!
//! Entities of one kind occupy the slots reserved by the schema in the order they are
//! written. The `*_prop1` id table of a kind maps each slot to the caller's id, with `0`
//! marking a slot that has not been written yet.

use super::names;
use super::File;

use crate::dataset::ValueType;
use crate::mesh::topology;
use crate::mesh::{check_side_lists, ElementBlock, EntityKind, NodeSet, SideSet};
use crate::prelude::*;

use std::collections::BTreeMap;

fn id_table(kind: EntityKind) -> (&'static str, &'static str) {
    match kind {
        EntityKind::ElementBlock => (names::VAR_EB_PROP, names::VAR_EB_NAMES),
        EntityKind::NodeSet => (names::VAR_NS_PROP, names::VAR_NS_NAMES),
        EntityKind::SideSet => (names::VAR_SS_PROP, names::VAR_SS_NAMES),
    }
}

/// where the elements of one written block sit in the global element numbering
pub(crate) struct BlockLayout {
    pub(crate) slot: usize,
    /// number of elements in all earlier blocks
    pub(crate) offset: usize,
    pub(crate) size: usize,
}

impl File {
    /// Write the nodal coordinates. Exactly the first `dim` axes must be given, each with
    /// one value per node.
    pub fn write_coords(
        &mut self,
        x: &[f64],
        y: Option<&[f64]>,
        z: Option<&[f64]>,
    ) -> Result<(), Error> {
        let summary = self.require_writable("write_coords")?;

        let supplied = [Some(x), y, z];
        let axes = supplied.iter().take_while(|axis| axis.is_some()).count();
        if axes != summary.dim || supplied[axes..].iter().any(Option::is_some) {
            let given = supplied.iter().filter(|axis| axis.is_some()).count();
            let err = SizeMismatch::new("coordinate axes".into(), summary.dim, given);
            return Err(StructuralError::from(err).into());
        }

        for (axis, values) in supplied.iter().flatten().copied().enumerate() {
            let what = format!("{} coordinates", names::DEFAULT_COORD_NAMES[axis]);
            check_len(&what, summary.num_nodes, values.len())?;
        }

        for (axis, values) in supplied.iter().flatten().copied().enumerate() {
            self.store.put_var(&names::coord(axis), values)?;
        }

        self.x = x.to_vec();
        self.y = y.map(<[f64]>::to_vec).unwrap_or_default();
        self.z = z.map(<[f64]>::to_vec).unwrap_or_default();
        self.dirty = true;

        log::debug!("wrote {} coordinate axes for {} nodes", summary.dim, summary.num_nodes);
        Ok(())
    }

    /// Name the coordinate axes. `None` writes the default names `x`, `y`, `z`.
    pub fn write_coord_names(&mut self, names: Option<&[&str]>) -> Result<(), Error> {
        let summary = self.require_writable("write_coord_names")?;

        let names: Vec<String> = match names {
            Some(names) => names.iter().map(|name| name.to_string()).collect(),
            None => super::default_coord_names(summary.dim),
        };
        check_len("coordinate names", summary.dim, names.len())?;

        self.store.put_text(names::VAR_COORD_NAMES, &names)?;
        self.coord_names = names;
        self.dirty = true;
        Ok(())
    }

    /// Write the connectivity of the element block `id` into the next free block slot.
    ///
    /// The size of the block is `connectivity.len() / nodes_per_element`. Across all blocks
    /// the sizes must add up to the element count of the schema.
    pub fn write_block(
        &mut self,
        id: i64,
        element_type: &str,
        nodes_per_element: usize,
        connectivity: &[usize],
    ) -> Result<(), Error> {
        let summary = self.require_writable("write_block")?;
        let slot = self.reserve_slot(EntityKind::ElementBlock, id, summary.num_blocks)?;

        let mut block =
            ElementBlock::new(id, element_type, nodes_per_element, connectivity.to_vec())?;
        let what = format!("node in element block {id}");
        let words = index_words(&what, connectivity, summary.num_nodes)?;

        let used: usize = self.block_layout()?.iter().map(|b| b.size).sum();
        let total = used + block.size();
        let last_slot = slot + 1 == summary.num_blocks;
        if total > summary.num_elems || (last_slot && total != summary.num_elems) {
            let what = "elements in element blocks".to_string();
            let err = SizeMismatch::new(what, summary.num_elems, total);
            return Err(StructuralError::from(err).into());
        }

        // every check has passed, only definitions that cannot clash remain
        let k = slot + 1;
        let elements_dim = names::num_el_in_blk(k);
        let nodes_dim = names::num_nod_per_el(k);
        let connect = names::connect(k);
        self.store.define_dimension(&elements_dim, block.size())?;
        self.store.define_dimension(&nodes_dim, nodes_per_element)?;
        let connect_dims = [elements_dim.as_str(), nodes_dim.as_str()];
        self.store
            .define_variable(&connect, ValueType::Int64, &connect_dims)?;
        self.store.put_var(&connect, &words)?;
        self.store.set_variable_attribute(&connect, names::ATT_ELEM_TYPE, element_type)?;
        self.set_slot_id(EntityKind::ElementBlock, slot, id)?;

        let elem_vars = self.elem_vars.catalog().map(|c| c.len()).unwrap_or(0);
        for var in 1..=elem_vars {
            let values = names::vals_elem_var(var, k);
            let dims = [names::DIM_TIME_STEP, elements_dim.as_str()];
            self.store
                .define_variable(&values, ValueType::Float64, &dims)?;
        }

        block.set_name(self.slot_name(EntityKind::ElementBlock, slot)?);
        self.element_blocks.push(block);
        self.dirty = true;

        log::debug!("wrote element block {id} ({element_type}) into slot {k}");
        Ok(())
    }

    /// Name every element block slot of the schema, in slot order
    pub fn write_block_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), Error> {
        self.write_entity_names(EntityKind::ElementBlock, names)?;
        for (block, name) in self.element_blocks.iter_mut().zip(names) {
            block.set_name(name.as_ref());
        }
        Ok(())
    }

    pub fn write_node_set_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), Error> {
        self.write_entity_names(EntityKind::NodeSet, names)?;
        for (set, name) in self.node_sets.iter_mut().zip(names) {
            set.set_name(name.as_ref());
        }
        Ok(())
    }

    pub fn write_side_set_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), Error> {
        self.write_entity_names(EntityKind::SideSet, names)?;
        for (set, name) in self.side_sets.iter_mut().zip(names) {
            set.set_name(name.as_ref());
        }
        Ok(())
    }

    /// Write the node set `id` into the next free node set slot
    pub fn write_node_set(&mut self, id: i64, nodes: &[usize]) -> Result<(), Error> {
        let summary = self.require_writable("write_node_set")?;
        let slot = self.reserve_slot(EntityKind::NodeSet, id, summary.num_node_sets)?;
        let words = index_words(&format!("node in node set {id}"), nodes, summary.num_nodes)?;

        let k = slot + 1;
        let (dim, values) = (names::num_nod_ns(k), names::node_ns(k));
        self.store.define_dimension(&dim, nodes.len())?;
        self.store.define_variable(&values, ValueType::Int64, &[dim.as_str()])?;
        self.store.put_var(&values, &words)?;
        self.set_slot_id(EntityKind::NodeSet, slot, id)?;

        let name = self.slot_name(EntityKind::NodeSet, slot)?;
        self.node_sets.push(NodeSet::new(id, name, nodes.to_vec()));
        self.dirty = true;

        log::debug!("wrote node set {id} with {} node(s)", nodes.len());
        Ok(())
    }

    /// Write the side set `id`: parallel lists of (1-based) elements and their local sides.
    ///
    /// Nothing is written if the two lists differ in length.
    pub fn write_side_set(
        &mut self,
        id: i64,
        elements: &[usize],
        sides: &[i64],
    ) -> Result<(), Error> {
        let summary = self.require_writable("write_side_set")?;
        check_side_lists(elements.len(), sides.len())?;

        let slot = self.reserve_slot(EntityKind::SideSet, id, summary.num_side_sets)?;
        let what = format!("element in side set {id}");
        let words = index_words(&what, elements, summary.num_elems)?;
        if let Some(&side) = sides.iter().find(|&&side| side < 1) {
            let what = format!("side in side set {id}");
            return Err(StructuralError::from(OutOfRange::new(what, side, 1, i64::MAX)).into());
        }

        let k = slot + 1;
        let dim = names::num_side_ss(k);
        let element_var = names::elem_ss(k);
        let side_var = names::side_ss(k);
        self.store.define_dimension(&dim, elements.len())?;
        self.store.define_variable(&element_var, ValueType::Int64, &[dim.as_str()])?;
        self.store.define_variable(&side_var, ValueType::Int64, &[dim.as_str()])?;
        self.store.put_var(&element_var, &words)?;
        self.store.put_var(&side_var, sides)?;
        self.set_slot_id(EntityKind::SideSet, slot, id)?;

        let name = self.slot_name(EntityKind::SideSet, slot)?;
        self.side_sets.push(SideSet::new(id, name, elements.to_vec(), sides.to_vec())?);
        self.dirty = true;

        log::debug!("wrote side set {id} with {} side(s)", elements.len());
        Ok(())
    }

    /// Write the element numbering map, one positive entry per element
    pub fn write_elem_map(&mut self, map: &[usize]) -> Result<(), Error> {
        let summary = self.require_writable("write_elem_map")?;
        check_len("element map", summary.num_elems, map.len())?;
        let words = index_words("element map entry", map, usize::MAX)?;

        if !self.store.has_variable(names::VAR_ELEM_MAP) {
            let dims = [names::DIM_NUM_ELEM];
            self.store
                .define_variable(names::VAR_ELEM_MAP, ValueType::Int64, &dims)?;
        }
        self.store.put_var(names::VAR_ELEM_MAP, &words)?;

        self.elem_map = map.to_vec();
        self.dirty = true;
        Ok(())
    }

    /// Store free-form information records. They can be written once per file.
    pub fn write_info<S: AsRef<str>>(&mut self, records: &[S]) -> Result<(), Error> {
        self.require_writable("write_info")?;

        if self.store.has_variable(names::VAR_INFO) {
            return Err(StructuralError::from(AlreadyDeclared::new("info records".into())).into());
        }

        self.store.define_dimension(names::DIM_NUM_INFO, records.len())?;
        self.store.define_variable(names::VAR_INFO, ValueType::Text, &[names::DIM_NUM_INFO])?;
        self.store.put_text(names::VAR_INFO, records)?;

        self.info = records.iter().map(|r| r.as_ref().to_string()).collect();
        self.dirty = true;
        Ok(())
    }

    pub fn read_coords(&mut self) -> Result<(), Error> {
        let summary = self.require_readable("read_coords")?;

        let mut axes = (0..summary.dim)
            .map(|axis| self.store.get_var::<f64>(&names::coord(axis)).map(<[f64]>::to_vec))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();

        self.x = axes.next().unwrap_or_default();
        self.y = axes.next().unwrap_or_default();
        self.z = axes.next().unwrap_or_default();
        Ok(())
    }

    pub fn read_coord_names(&mut self) -> Result<(), Error> {
        self.require_readable("read_coord_names")?;
        self.coord_names = self.store.get_text(names::VAR_COORD_NAMES)?.to_vec();
        Ok(())
    }

    /// Load every written element block
    pub fn read_blocks(&mut self) -> Result<(), Error> {
        self.require_readable("read_blocks")?;

        let ids = self.store.get_var::<i64>(names::VAR_EB_PROP)?.to_vec();
        let mut blocks = Vec::new();

        for (slot, id) in written_slots(&ids) {
            let k = slot + 1;
            let connect = names::connect(k);
            let nodes_per_element = self.store.dimension_len(&names::num_nod_per_el(k))?;
            let element_type = self
                .store
                .variable_attribute(&connect, names::ATT_ELEM_TYPE)?
                .unwrap_or_default()
                .to_string();
            let connectivity = to_indices(self.store.get_var::<i64>(&connect)?, &connect)?;

            let mut block = ElementBlock::new(id, element_type, nodes_per_element, connectivity)?;
            block.set_name(self.slot_name(EntityKind::ElementBlock, slot)?);
            blocks.push(block);
        }

        log::debug!("read {} element block(s)", blocks.len());
        self.element_blocks = blocks;
        Ok(())
    }

    pub fn read_node_sets(&mut self) -> Result<(), Error> {
        self.require_readable("read_node_sets")?;

        let ids = self.store.get_var::<i64>(names::VAR_NS_PROP)?.to_vec();
        let mut sets = Vec::new();

        for (slot, id) in written_slots(&ids) {
            let values = names::node_ns(slot + 1);
            let nodes = to_indices(self.store.get_var::<i64>(&values)?, &values)?;
            sets.push(NodeSet::new(id, self.slot_name(EntityKind::NodeSet, slot)?, nodes));
        }

        self.node_sets = sets;
        Ok(())
    }

    pub fn read_side_sets(&mut self) -> Result<(), Error> {
        self.require_readable("read_side_sets")?;

        let ids = self.store.get_var::<i64>(names::VAR_SS_PROP)?.to_vec();
        let mut sets = Vec::new();

        for (slot, id) in written_slots(&ids) {
            let element_var = names::elem_ss(slot + 1);
            let elements = to_indices(self.store.get_var::<i64>(&element_var)?, &element_var)?;
            let sides = self.store.get_var::<i64>(&names::side_ss(slot + 1))?.to_vec();
            let name = self.slot_name(EntityKind::SideSet, slot)?;
            sets.push(SideSet::new(id, name, elements, sides)?);
        }

        self.side_sets = sets;
        Ok(())
    }

    /// Load the element numbering map. Files without one get the identity map.
    pub fn read_elem_map(&mut self) -> Result<(), Error> {
        let summary = self.require_readable("read_elem_map")?;

        self.elem_map = if self.store.has_variable(names::VAR_ELEM_MAP) {
            to_indices(self.store.get_var::<i64>(names::VAR_ELEM_MAP)?, names::VAR_ELEM_MAP)?
        } else {
            (1..=summary.num_elems).collect()
        };
        Ok(())
    }

    pub fn read_info(&mut self) -> Result<(), Error> {
        self.require_readable("read_info")?;

        self.info = if self.store.has_variable(names::VAR_INFO) {
            self.store.get_text(names::VAR_INFO)?.to_vec()
        } else {
            Vec::new()
        };
        Ok(())
    }

    /// Names of every element block slot, keyed by 0-based slot. Unnamed slots map to `""`.
    pub fn read_block_names(&self) -> Result<BTreeMap<usize, String>, Error> {
        self.read_entity_names("read_block_names", EntityKind::ElementBlock)
    }

    pub fn read_node_set_names(&self) -> Result<BTreeMap<usize, String>, Error> {
        self.read_entity_names("read_node_set_names", EntityKind::NodeSet)
    }

    pub fn read_side_set_names(&self) -> Result<BTreeMap<usize, String>, Error> {
        self.read_entity_names("read_side_set_names", EntityKind::SideSet)
    }

    pub fn get_x_coords(&self) -> &[f64] {
        &self.x
    }

    pub fn get_y_coords(&self) -> &[f64] {
        &self.y
    }

    pub fn get_z_coords(&self) -> &[f64] {
        &self.z
    }

    pub fn get_coord_names(&self) -> &[String] {
        &self.coord_names
    }

    pub fn get_element_blocks(&self) -> &[ElementBlock] {
        &self.element_blocks
    }

    /// The loaded element block with the given id
    pub fn get_element_block(&self, id: i64) -> Result<&ElementBlock, Error> {
        self.element_blocks
            .iter()
            .find(|block| block.id() == id)
            .ok_or_else(|| {
                let missing = MissingEntity::new(EntityKind::ElementBlock, id);
                NotFoundError::from(missing).into()
            })
    }

    pub fn get_node_sets(&self) -> &[NodeSet] {
        &self.node_sets
    }

    pub fn get_side_sets(&self) -> &[SideSet] {
        &self.side_sets
    }

    pub fn get_elem_map(&self) -> &[usize] {
        &self.elem_map
    }

    pub fn get_info_records(&self) -> &[String] {
        &self.info
    }

    /// Expand side set `id` into the nodes on each of its sides.
    ///
    /// Returns the number of nodes on every side and the concatenation of those nodes.
    pub fn get_side_set_node_list(&self, id: i64) -> Result<(Vec<usize>, Vec<usize>), Error> {
        self.require_readable("get_side_set_node_list")?;

        let slot = self.find_slot(EntityKind::SideSet, id)?;
        let element_var = names::elem_ss(slot + 1);
        let elements = to_indices(self.store.get_var::<i64>(&element_var)?, &element_var)?;
        let sides = self.store.get_var::<i64>(&names::side_ss(slot + 1))?;
        let layout = self.block_layout()?;

        let mut node_counts = Vec::with_capacity(elements.len());
        let mut node_list = Vec::new();

        for (&element, &side) in elements.iter().zip(sides) {
            let block = layout
                .iter()
                .find(|b| element > b.offset && element <= b.offset + b.size)
                .ok_or_else(|| {
                    let max = layout.last().map(|b| b.offset + b.size).unwrap_or(0);
                    let what = "element in side set".to_string();
                    StructuralError::from(OutOfRange::new(what, element as i64, 1, max as i64))
                })?;

            let k = block.slot + 1;
            let connect = names::connect(k);
            let nodes_per_element = self.store.dimension_len(&names::num_nod_per_el(k))?;
            let element_type = self
                .store
                .variable_attribute(&connect, names::ATT_ELEM_TYPE)?
                .unwrap_or_default();

            let local = element - block.offset - 1;
            let start = local * nodes_per_element;
            let words = &self.store.get_var::<i64>(&connect)?[start..start + nodes_per_element];
            let element_nodes = to_indices(words, &connect)?;

            let nodes = topology::nodes_on_side(element_type, &element_nodes, side)?;
            node_counts.push(nodes.len());
            node_list.extend(nodes);
        }

        Ok((node_counts, node_list))
    }

    /// Written element blocks in slot order, with their place in the element numbering
    pub(crate) fn block_layout(&self) -> Result<Vec<BlockLayout>, Error> {
        let ids = self.store.get_var::<i64>(names::VAR_EB_PROP)?;

        let mut offset = 0;
        let mut layout = Vec::new();
        for (slot, _) in written_slots(ids) {
            let size = self.store.dimension_len(&names::num_el_in_blk(slot + 1))?;
            layout.push(BlockLayout { slot, offset, size });
            offset += size;
        }
        Ok(layout)
    }

    /// 0-based slot holding the entity `id`
    pub(crate) fn find_slot(&self, kind: EntityKind, id: i64) -> Result<usize, Error> {
        let (ids, _) = id_table(kind);
        self.store
            .get_var::<i64>(ids)?
            .iter()
            .position(|&slot_id| slot_id == id && id != 0)
            .ok_or_else(|| NotFoundError::from(MissingEntity::new(kind, id)).into())
    }

    /// Check that `id` is new and find the first free slot for it
    fn reserve_slot(&self, kind: EntityKind, id: i64, capacity: usize) -> Result<usize, Error> {
        if id < 1 {
            let what = format!("{kind} id");
            return Err(StructuralError::from(OutOfRange::new(what, id, 1, i64::MAX)).into());
        }

        let (ids, _) = id_table(kind);
        let ids = self.store.get_var::<i64>(ids)?;

        if ids.contains(&id) {
            return Err(StructuralError::from(Duplicate::new(kind, id)).into());
        }

        ids.iter().position(|&slot_id| slot_id == 0).ok_or_else(|| {
            let what = format!("{kind}s");
            StructuralError::from(CapacityExceeded::new(what, capacity)).into()
        })
    }

    fn set_slot_id(&mut self, kind: EntityKind, slot: usize, id: i64) -> Result<(), Error> {
        let (ids, _) = id_table(kind);
        let mut table = self.store.get_var::<i64>(ids)?.to_vec();
        table[slot] = id;
        self.store.put_var(ids, &table)
    }

    fn slot_name(&self, kind: EntityKind, slot: usize) -> Result<String, Error> {
        let (_, entity_names) = id_table(kind);
        Ok(self
            .store
            .get_text(entity_names)?
            .get(slot)
            .cloned()
            .unwrap_or_default())
    }

    fn write_entity_names<S: AsRef<str>>(
        &mut self,
        kind: EntityKind,
        names: &[S],
    ) -> Result<(), Error> {
        let summary = self.require_writable("write names")?;
        let expected = match kind {
            EntityKind::ElementBlock => summary.num_blocks,
            EntityKind::NodeSet => summary.num_node_sets,
            EntityKind::SideSet => summary.num_side_sets,
        };
        check_len(&format!("{kind} names"), expected, names.len())?;

        let (_, entity_names) = id_table(kind);
        self.store.put_text(entity_names, names)?;
        self.dirty = true;
        Ok(())
    }

    fn read_entity_names(
        &self,
        operation: &'static str,
        kind: EntityKind,
    ) -> Result<BTreeMap<usize, String>, Error> {
        self.require_readable(operation)?;

        let (_, entity_names) = id_table(kind);
        Ok(self
            .store
            .get_text(entity_names)?
            .iter()
            .cloned()
            .enumerate()
            .collect())
    }
}

/// (0-based slot, id) of every slot that holds an entity
fn written_slots(ids: &[i64]) -> impl Iterator<Item = (usize, i64)> + '_ {
    ids.iter()
        .copied()
        .enumerate()
        .filter(|(_, id)| *id != 0)
}

pub(crate) fn check_len(what: &str, expected: usize, actual: usize) -> Result<(), StructuralError> {
    if expected != actual {
        return Err(SizeMismatch::new(what.into(), expected, actual).into());
    }
    Ok(())
}

/// Convert 1-based indices to stored words. Every index must be in `1..=max`, and `max`
/// itself is capped to what a word can hold.
fn index_words(what: &str, indices: &[usize], max: usize) -> Result<Vec<i64>, StructuralError> {
    let max = i64::try_from(max).unwrap_or(i64::MAX);

    indices
        .iter()
        .map(|&idx| match i64::try_from(idx) {
            Ok(word) if (1..=max).contains(&word) => Ok(word),
            Ok(word) => Err(OutOfRange::new(what.into(), word, 1, max).into()),
            Err(_) => Err(OutOfRange::new(what.into(), i64::MAX, 1, max).into()),
        })
        .collect()
}

/// convert stored words back into indices, which can never be negative
fn to_indices(words: &[i64], variable: &str) -> Result<Vec<usize>, Error> {
    words
        .iter()
        .map(|&word| {
            usize::try_from(word).map_err(|_| {
                let what = format!("index in `{variable}`");
                Error::from(StructuralError::from(OutOfRange::new(what, word, 0, i64::MAX)))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, FileAccess, InitParams};

    fn quad_strip() -> (tempfile::TempDir, std::path::PathBuf) {
        // 2 quads side by side:
        //
        // 4---5---6
        // |   |   |
        // 1---2---3
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strip.exo");

        let mut file = File::create(&path).unwrap();
        file.init(&InitParams::new("strip", 2, 6, 2, 2, 1, 1)).unwrap();
        file.write_coords(&[0., 1., 2., 0., 1., 2.], Some(&[0., 0., 0., 1., 1., 1.]), None)
            .unwrap();
        file.write_block(10, "QUAD4", 4, &[1, 2, 5, 4]).unwrap();
        file.write_block(20, "QUAD4", 4, &[2, 3, 6, 5]).unwrap();
        file.write_block_names(&["left", "right"]).unwrap();
        file.write_node_set(3, &[1, 4]).unwrap();
        file.write_side_set(7, &[1, 2], &[1, 2]).unwrap();
        file.write_side_set_names(&["bottom and right"]).unwrap();
        file.close().unwrap();

        (dir, path)
    }

    #[test]
    fn blocks_fill_slots_in_order() {
        let (_dir, path) = quad_strip();
        let mut file = File::open(&path, FileAccess::Read).unwrap();

        // nothing is loaded until asked for
        assert!(file.get_element_blocks().is_empty());
        file.read_blocks().unwrap();

        let ids: Vec<i64> = file.get_element_blocks().iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec![10, 20]);

        let right = file.get_element_block(20).unwrap();
        assert_eq!(right.name(), "right");
        assert_eq!(right.element_type(), "QUAD4");
        assert_eq!(right.connectivity(), &[2, 3, 6, 5]);

        let err = file.get_element_block(30).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let names = file.read_block_names().unwrap();
        assert_eq!(names.get(&0).map(String::as_str), Some("left"));
        assert_eq!(file.read_node_set_names().unwrap().get(&0).map(String::as_str), Some(""));
    }

    #[test]
    fn side_set_node_list_follows_topology() {
        let (_dir, path) = quad_strip();
        let file = File::open(&path, FileAccess::Read).unwrap();

        let (counts, nodes) = file.get_side_set_node_list(7).unwrap();
        assert_eq!(counts, vec![2, 2]);
        // side 1 of the left quad, side 2 of the right quad
        assert_eq!(nodes, vec![1, 2, 3, 6]);

        assert_eq!(file.get_side_set_node_list(8).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn block_sizes_must_add_up() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("sizes.exo")).unwrap();
        file.init(&InitParams::new("", 1, 3, 2, 2, 0, 0)).unwrap();

        // two elements in the first of two blocks leaves none for the second
        file.write_block(1, "BAR2", 2, &[1, 2, 2, 3]).unwrap();
        let err = file.write_block(2, "BAR2", 2, &[1, 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn last_block_must_complete_the_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("sizes.exo")).unwrap();
        file.init(&InitParams::new("", 1, 3, 2, 1, 0, 0)).unwrap();

        let err = file.write_block(1, "BAR2", 2, &[1, 2]).unwrap_err();
        assert!(matches!(err, Error::Structural(StructuralError::SizeMismatch(_))));
        assert!(file.get_element_blocks().is_empty());

        file.write_block(1, "BAR2", 2, &[1, 2, 2, 3]).unwrap();
        let err = file.write_block(2, "BAR2", 2, &[]).unwrap_err();
        assert!(matches!(err, Error::Structural(StructuralError::CapacityExceeded(_))));
    }

    #[test]
    fn entity_ids_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("ids.exo")).unwrap();
        file.init(&InitParams::new("", 1, 3, 2, 2, 2, 0)).unwrap();

        assert!(file.write_block(0, "BAR2", 2, &[1, 2]).is_err());
        assert!(file.write_block(1, "BAR2", 2, &[1, 4]).is_err());
        file.write_block(1, "BAR2", 2, &[1, 2]).unwrap();

        let err = file.write_block(1, "BAR2", 2, &[2, 3]).unwrap_err();
        assert!(matches!(err, Error::Structural(StructuralError::Duplicate(_))));

        file.write_node_set(5, &[1]).unwrap();
        assert!(file.write_node_set(5, &[2]).is_err());
        assert!(file.write_node_set(6, &[0]).is_err());
        assert_eq!(file.get_node_sets().len(), 1);
    }

    #[test]
    fn structure_needs_a_schema_and_write_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("order.exo");
        let mut file = File::create(&path).unwrap();

        let err = file.write_coords(&[0.0], None, None).unwrap_err();
        assert!(matches!(err, Error::Structural(StructuralError::Undeclared(_))));
        assert_eq!(file.read_coords().unwrap_err().kind(), ErrorKind::Mode);

        file.init(&InitParams::new("", 2, 2, 0, 0, 0, 0)).unwrap();
        let err = file.write_coords(&[0.0, 1.0], None, None).unwrap_err();
        assert!(matches!(err, Error::Structural(StructuralError::SizeMismatch(_))));
        assert!(file.write_coords(&[0.0, 1.0], None, Some(&[0.0, 1.0])).is_err());
        assert!(file.write_coords(&[0.0, 1.0], Some(&[0.0]), None).is_err());
        file.write_coords(&[0.0, 1.0], Some(&[2.0, 3.0]), None).unwrap();
        file.write_coord_names(Some(&["r", "z"])).unwrap();
        assert!(file.write_coord_names(Some(&["r"])).is_err());
        file.close().unwrap();

        let mut file = File::open(&path, FileAccess::Read).unwrap();
        let err = file
            .write_coords(&[0.0, 1.0], Some(&[2.0, 3.0]), None)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Mode);
        file.read().unwrap();
        assert_eq!(file.get_y_coords(), &[2.0, 3.0]);
        assert!(file.get_z_coords().is_empty());
        assert_eq!(file.get_coord_names(), &["r".to_string(), "z".to_string()]);
        assert_eq!(file.get_elem_map(), &[] as &[usize]);
    }

    #[test]
    fn elem_map_and_info_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.exo");
        let mut file = File::create(&path).unwrap();
        file.init(&InitParams::new("", 1, 3, 2, 1, 0, 0)).unwrap();
        file.write_block(1, "BAR2", 2, &[1, 2, 2, 3]).unwrap();

        assert!(file.write_elem_map(&[1]).is_err());
        assert!(file.write_elem_map(&[0, 1]).is_err());
        // entries have to fit in a stored word
        let err = file.write_elem_map(&[usize::MAX, 1]).unwrap_err();
        assert!(matches!(err, Error::Structural(StructuralError::OutOfRange(_))));
        file.write_elem_map(&[20, 10]).unwrap();
        file.write_info(&["made by a test", ""]).unwrap();
        assert!(file.write_info(&["again"]).is_err());
        file.close().unwrap();

        let mut file = File::open(&path, FileAccess::Read).unwrap();
        file.read_elem_map().unwrap();
        file.read_info().unwrap();
        assert_eq!(file.get_elem_map(), &[20, 10]);
        assert_eq!(file.get_info_records(), &["made by a test".to_string(), String::new()]);
    }

    #[test]
    fn identity_elem_map_when_absent() {
        let (_dir, path) = quad_strip();
        let mut file = File::open(&path, FileAccess::Read).unwrap();
        file.read_elem_map().unwrap();
        assert_eq!(file.get_elem_map(), &[1, 2]);
    }
}
