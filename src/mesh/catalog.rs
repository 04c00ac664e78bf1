use crate::prelude::*;
use std::collections::BTreeMap;

/// Ordered, immutable mapping from 1-based variable index to variable name
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct VariableCatalog {
    names: BTreeMap<usize, String>,
}

impl VariableCatalog {
    pub(crate) fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let names = names
            .iter()
            .enumerate()
            .map(|(i, name)| (i + 1, name.as_ref().to_string()))
            .collect();

        Self { names }
    }

    /// name of the variable with 1-based `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }

    /// 1-based index of the variable called `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(idx, _)| *idx)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.names.values().cloned().collect()
    }
}

/// Declaration state of one variable catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum CatalogState {
    #[default]
    Undeclared,
    Declared(VariableCatalog),
}

impl CatalogState {
    pub(crate) fn catalog(&self) -> Option<&VariableCatalog> {
        match self {
            Self::Undeclared => None,
            Self::Declared(catalog) => Some(catalog),
        }
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.catalog().map(VariableCatalog::to_vec).unwrap_or_default()
    }
}
