use crate::prelude::*;

/// A homogeneous group of elements sharing a topology and a node count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementBlock {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) element_type: String,
    pub(crate) nodes_per_element: usize,
    pub(crate) connectivity: Vec<usize>,
}

impl ElementBlock {
    /// Build a block from its flat connectivity.
    ///
    /// The number of elements is inferred from `connectivity.len() / nodes_per_element`,
    /// so the connectivity length must be an exact multiple of `nodes_per_element`.
    pub fn new<T: Into<String>>(
        id: i64,
        element_type: T,
        nodes_per_element: usize,
        connectivity: Vec<usize>,
    ) -> Result<Self, StructuralError> {
        if nodes_per_element == 0 {
            return Err(OutOfRange::new(
                "nodes per element".into(),
                0,
                1,
                i64::MAX,
            )
            .into());
        }

        if connectivity.len() % nodes_per_element != 0 {
            let elements = connectivity.len() / nodes_per_element;
            return Err(SizeMismatch::new(
                format!("connectivity of element block {id}"),
                (elements + 1) * nodes_per_element,
                connectivity.len(),
            )
            .into());
        }

        Ok(Self {
            id,
            name: String::new(),
            element_type: element_type.into(),
            nodes_per_element,
            connectivity,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Name of the block, empty if it was never named
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<T: Into<String>>(&mut self, name: T) {
        self.name = name.into();
    }

    /// The free-form topology tag, e.g. `TRI3` or `HEX8`
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    pub fn nodes_per_element(&self) -> usize {
        self.nodes_per_element
    }

    /// Number of elements in the block
    pub fn size(&self) -> usize {
        if self.nodes_per_element == 0 {
            0
        } else {
            self.connectivity.len() / self.nodes_per_element
        }
    }

    /// The flat connectivity: `[el1_n1, el1_n2, ..., el2_n1, el2_n2, ...]`
    pub fn connectivity(&self) -> &[usize] {
        &self.connectivity
    }

    /// The (1-based) nodes of the element at 0-based position `idx` within this block
    pub fn element_connectivity(&self, idx: usize) -> Result<&[usize], StructuralError> {
        if idx >= self.size() {
            return Err(out_of_block(idx, self.size()));
        }

        let start = idx * self.nodes_per_element;
        Ok(&self.connectivity[start..start + self.nodes_per_element])
    }
}

fn out_of_block(idx: usize, size: usize) -> StructuralError {
    OutOfRange::new(
        "element index".into(),
        idx as i64,
        0,
        size as i64 - 1,
    )
    .into()
}
