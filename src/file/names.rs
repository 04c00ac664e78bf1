//! Dimension and variable names used to lay a mesh out in a [`Dataset`](crate::dataset::Dataset).
//!
//! Per-entity names take the 1-based slot of the entity (the order in which it was
//! written), not its id.

pub(crate) const DIM_NUM_DIM: &str = "num_dim";
pub(crate) const DIM_NUM_NODES: &str = "num_nodes";
pub(crate) const DIM_NUM_ELEM: &str = "num_elem";
pub(crate) const DIM_NUM_EL_BLK: &str = "num_el_blk";
pub(crate) const DIM_NUM_NODE_SETS: &str = "num_node_sets";
pub(crate) const DIM_NUM_SIDE_SETS: &str = "num_side_sets";
pub(crate) const DIM_TIME_STEP: &str = "time_step";
pub(crate) const DIM_NUM_GLO_VAR: &str = "num_glo_var";
pub(crate) const DIM_NUM_NOD_VAR: &str = "num_nod_var";
pub(crate) const DIM_NUM_ELEM_VAR: &str = "num_elem_var";
pub(crate) const DIM_NUM_INFO: &str = "num_info";

pub(crate) const VAR_COORD_NAMES: &str = "coor_names";
pub(crate) const VAR_EB_PROP: &str = "eb_prop1";
pub(crate) const VAR_EB_NAMES: &str = "eb_names";
pub(crate) const VAR_NS_PROP: &str = "ns_prop1";
pub(crate) const VAR_NS_NAMES: &str = "ns_names";
pub(crate) const VAR_SS_PROP: &str = "ss_prop1";
pub(crate) const VAR_SS_NAMES: &str = "ss_names";
pub(crate) const VAR_TIME: &str = "time_whole";
pub(crate) const VAR_NAME_GLO: &str = "name_glo_var";
pub(crate) const VAR_NAME_NOD: &str = "name_nod_var";
pub(crate) const VAR_NAME_ELEM: &str = "name_elem_var";
pub(crate) const VAR_VALS_GLO: &str = "vals_glo_var";
pub(crate) const VAR_ELEM_MAP: &str = "elem_num_map";
pub(crate) const VAR_INFO: &str = "info_records";

pub(crate) const ATT_TITLE: &str = "title";
pub(crate) const ATT_API_VERSION: &str = "api_version";
pub(crate) const ATT_ELEM_TYPE: &str = "elem_type";

pub(crate) const DEFAULT_COORD_NAMES: [&str; 3] = ["x", "y", "z"];

/// `coordx`, `coordy` or `coordz` for axis 0, 1 or 2
pub(crate) fn coord(axis: usize) -> String {
    format!("coord{}", DEFAULT_COORD_NAMES[axis])
}

pub(crate) fn num_el_in_blk(slot: usize) -> String {
    format!("num_el_in_blk{slot}")
}

pub(crate) fn num_nod_per_el(slot: usize) -> String {
    format!("num_nod_per_el{slot}")
}

pub(crate) fn connect(slot: usize) -> String {
    format!("connect{slot}")
}

pub(crate) fn num_nod_ns(slot: usize) -> String {
    format!("num_nod_ns{slot}")
}

pub(crate) fn node_ns(slot: usize) -> String {
    format!("node_ns{slot}")
}

pub(crate) fn num_side_ss(slot: usize) -> String {
    format!("num_side_ss{slot}")
}

pub(crate) fn elem_ss(slot: usize) -> String {
    format!("elem_ss{slot}")
}

pub(crate) fn side_ss(slot: usize) -> String {
    format!("side_ss{slot}")
}

pub(crate) fn vals_nod_var(var: usize) -> String {
    format!("vals_nod_var{var}")
}

pub(crate) fn vals_elem_var(var: usize, block_slot: usize) -> String {
    format!("vals_elem_var{var}eb{block_slot}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_names() {
        assert_eq!(coord(2), "coordz");
        assert_eq!(connect(3), "connect3");
        assert_eq!(vals_elem_var(2, 11), "vals_elem_var2eb11");
    }
}
