//! Local side numbering for the element types this crate can expand into side node lists.
//!
//! Tables follow the usual exodus convention: sides are numbered from 1 and every row
//! lists the (1-based) local nodes of the element that lie on that side.

use crate::prelude::*;

/// Element topologies with a known side table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Bar2,
    Tri3,
    Tri6,
    Quad4,
    Quad8,
    Quad9,
    Tet4,
    Tet10,
    Hex8,
    Wedge6,
    Pyramid5,
}

const BAR2_SIDES: &[&[usize]] = &[&[1], &[2]];
const TRI3_SIDES: &[&[usize]] = &[&[1, 2], &[2, 3], &[3, 1]];
const TRI6_SIDES: &[&[usize]] = &[&[1, 2, 4], &[2, 3, 5], &[3, 1, 6]];
const QUAD4_SIDES: &[&[usize]] = &[&[1, 2], &[2, 3], &[3, 4], &[4, 1]];
const QUAD8_SIDES: &[&[usize]] = &[&[1, 2, 5], &[2, 3, 6], &[3, 4, 7], &[4, 1, 8]];
const TET4_SIDES: &[&[usize]] = &[&[1, 2, 4], &[2, 3, 4], &[1, 4, 3], &[1, 3, 2]];
const TET10_SIDES: &[&[usize]] = &[
    &[1, 2, 4, 5, 9, 8],
    &[2, 3, 4, 6, 10, 9],
    &[1, 4, 3, 8, 10, 7],
    &[1, 3, 2, 7, 6, 5],
];
const HEX8_SIDES: &[&[usize]] = &[
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[3, 4, 8, 7],
    &[1, 5, 8, 4],
    &[1, 4, 3, 2],
    &[5, 6, 7, 8],
];
const WEDGE6_SIDES: &[&[usize]] = &[
    &[1, 2, 5, 4],
    &[2, 3, 6, 5],
    &[1, 4, 6, 3],
    &[1, 3, 2],
    &[4, 5, 6],
];
const PYRAMID5_SIDES: &[&[usize]] = &[
    &[1, 2, 5],
    &[2, 3, 5],
    &[3, 4, 5],
    &[1, 5, 4],
    &[1, 4, 3, 2],
];

impl Topology {
    /// Match an element type tag as it appears in a file. Matching is case insensitive
    /// and a bare family name (`TRI`, `QUAD`, ...) defaults to the linear element.
    pub fn from_element_type(element_type: &str) -> Option<Self> {
        let tag = element_type.trim().to_ascii_uppercase();

        let topology = match tag.as_str() {
            "BAR" | "BAR2" | "EDGE" | "EDGE2" | "BEAM" | "BEAM2" | "TRUSS" | "TRUSS2" => {
                Self::Bar2
            }
            "TRI" | "TRI3" | "TRIANGLE" | "TRIANGLE3" => Self::Tri3,
            "TRI6" | "TRIANGLE6" => Self::Tri6,
            "QUAD" | "QUAD4" => Self::Quad4,
            "QUAD8" => Self::Quad8,
            "QUAD9" => Self::Quad9,
            "TET" | "TET4" | "TETRA" | "TETRA4" => Self::Tet4,
            "TET10" | "TETRA10" => Self::Tet10,
            "HEX" | "HEX8" => Self::Hex8,
            "WEDGE" | "WEDGE6" => Self::Wedge6,
            "PYRAMID" | "PYRAMID5" => Self::Pyramid5,
            _ => return None,
        };

        Some(topology)
    }

    fn sides(&self) -> &'static [&'static [usize]] {
        match self {
            Self::Bar2 => BAR2_SIDES,
            Self::Tri3 => TRI3_SIDES,
            Self::Tri6 => TRI6_SIDES,
            Self::Quad4 => QUAD4_SIDES,
            Self::Quad8 | Self::Quad9 => QUAD8_SIDES,
            Self::Tet4 => TET4_SIDES,
            Self::Tet10 => TET10_SIDES,
            Self::Hex8 => HEX8_SIDES,
            Self::Wedge6 => WEDGE6_SIDES,
            Self::Pyramid5 => PYRAMID5_SIDES,
        }
    }

    pub fn num_sides(&self) -> usize {
        self.sides().len()
    }

    /// local (1-based) node numbers on the given (1-based) side
    pub fn side_nodes(&self, side: i64) -> Option<&'static [usize]> {
        let idx = usize::try_from(side).ok()?.checked_sub(1)?;
        self.sides().get(idx).copied()
    }
}

/// Resolve the global nodes on `side` of an element with `element_nodes` connectivity
pub(crate) fn nodes_on_side(
    element_type: &str,
    element_nodes: &[usize],
    side: i64,
) -> Result<Vec<usize>, StructuralError> {
    let unknown = || UnknownTopology::new(element_type.to_string(), side);

    let topology = Topology::from_element_type(element_type).ok_or_else(unknown)?;
    let local = topology.side_nodes(side).ok_or_else(unknown)?;

    local
        .iter()
        .map(|&n| element_nodes.get(n - 1).copied().ok_or_else(unknown))
        .collect::<Result<Vec<_>, _>>()
        .map_err(StructuralError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_case_insensitive() {
        assert_eq!(Topology::from_element_type("quad4"), Some(Topology::Quad4));
        assert_eq!(Topology::from_element_type("TETRA"), Some(Topology::Tet4));
        assert_eq!(Topology::from_element_type("POLYHEDRON"), None);
    }

    #[test]
    fn shells_have_no_side_table() {
        // shell sides are faces first and edges after, unlike a quad
        assert_eq!(Topology::from_element_type("SHELL4"), None);
        let err = nodes_on_side("SHELL4", &[1, 2, 3, 4], 1).unwrap_err();
        assert!(matches!(err, StructuralError::UnknownTopology(_)));
    }

    #[test]
    fn quad_side_maps_to_global_nodes() {
        let nodes = nodes_on_side("QUAD4", &[2, 3, 8, 7], 2).unwrap();
        assert_eq!(nodes, vec![3, 8]);
    }

    #[test]
    fn side_zero_is_rejected() {
        assert!(nodes_on_side("TET4", &[1, 2, 3, 4], 0).is_err());
        assert!(nodes_on_side("TET4", &[1, 2, 3, 4], 5).is_err());
        assert_eq!(Topology::Hex8.num_sides(), 6);
    }
}
