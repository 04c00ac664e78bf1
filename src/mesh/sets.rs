use crate::prelude::*;

/// An ordered collection of (1-based) node indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Constructor)]
pub struct NodeSet {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) node_ids: Vec<usize>,
}

impl NodeSet {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<T: Into<String>>(&mut self, name: T) {
        self.name = name.into();
    }

    pub fn size(&self) -> usize {
        self.node_ids.len()
    }

    pub fn node_ids(&self) -> &[usize] {
        &self.node_ids
    }

    /// The node at position `idx` of the set
    pub fn node_id(&self, idx: usize) -> Result<usize, StructuralError> {
        self.node_ids
            .get(idx)
            .copied()
            .ok_or_else(|| position_out_of_range("node set position", idx, self.size()))
    }
}

/// Parallel lists of `(element, local side)` pairs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideSet {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) element_ids: Vec<usize>,
    pub(crate) side_ids: Vec<i64>,
}

impl SideSet {
    /// Construct a side set, checking that both lists have the same length
    pub fn new<T: Into<String>>(
        id: i64,
        name: T,
        element_ids: Vec<usize>,
        side_ids: Vec<i64>,
    ) -> Result<Self, StructuralError> {
        let mut set = Self {
            id,
            name: name.into(),
            ..Default::default()
        };
        set.set_sides(element_ids, side_ids)?;
        Ok(set)
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<T: Into<String>>(&mut self, name: T) {
        self.name = name.into();
    }

    /// Number of sides in the set
    pub fn size(&self) -> usize {
        self.element_ids.len()
    }

    pub fn element_ids(&self) -> &[usize] {
        &self.element_ids
    }

    pub fn side_ids(&self) -> &[i64] {
        &self.side_ids
    }

    pub fn element_id(&self, idx: usize) -> Result<usize, StructuralError> {
        self.element_ids
            .get(idx)
            .copied()
            .ok_or_else(|| position_out_of_range("side set position", idx, self.size()))
    }

    pub fn side_id(&self, idx: usize) -> Result<i64, StructuralError> {
        self.side_ids
            .get(idx)
            .copied()
            .ok_or_else(|| position_out_of_range("side set position", idx, self.size()))
    }

    /// Replace the sides of the set. Leaves the set untouched if the lengths differ.
    pub fn set_sides(
        &mut self,
        element_ids: Vec<usize>,
        side_ids: Vec<i64>,
    ) -> Result<(), StructuralError> {
        check_side_lists(element_ids.len(), side_ids.len())?;
        self.element_ids = element_ids;
        self.side_ids = side_ids;
        Ok(())
    }

    pub fn add(&mut self, element: usize, side: i64) {
        self.element_ids.push(element);
        self.side_ids.push(side);
    }
}

pub(crate) fn check_side_lists(elements: usize, sides: usize) -> Result<(), StructuralError> {
    if elements != sides {
        return Err(SizeMismatch::new("side list".into(), elements, sides).into());
    }
    Ok(())
}

fn position_out_of_range(what: &str, idx: usize, size: usize) -> StructuralError {
    OutOfRange::new(what.into(), idx as i64, 0, size as i64 - 1).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_lists_must_match() {
        let err = SideSet::new(2, "", vec![1], vec![]).unwrap_err();
        assert_eq!(
            err,
            StructuralError::SizeMismatch(SizeMismatch::new("side list".into(), 1, 0))
        );

        let mut set = SideSet::new(1, "left", vec![1, 2], vec![4, 4]).unwrap();
        assert!(set.set_sides(vec![3], vec![1, 2]).is_err());
        assert_eq!(set.element_ids(), &[1, 2]);

        set.add(5, 1);
        assert_eq!(set.size(), 3);
        assert_eq!(set.element_id(2).unwrap(), 5);
        assert_eq!(set.side_id(2).unwrap(), 1);
        assert!(set.side_id(3).is_err());
    }

    #[test]
    fn node_set_positions() {
        let set = NodeSet::new(10, "bottom".into(), vec![1, 2, 3]);
        assert_eq!(set.node_id(0).unwrap(), 1);
        assert!(set.node_id(3).is_err());
    }
}
