//! In-memory named array store that backs every mesh file.
//!
//! A [`Dataset`] holds named dimensions, named variables shaped by those dimensions and
//! free-form string attributes. One dimension may be *unlimited*: variables whose first
//! dimension is the unlimited one are *record variables* and grow one record at a time.
//! Definitions are write-once. Values can be replaced wholesale or, for record
//! variables, one contiguous slab of a record at a time.
//!
//! The store knows nothing about meshes. The naming convention that turns a mesh into
//! dimensions and variables lives in the `file` module, and the on-disk encoding lives in
//! [`write_store`](crate::write_store) / [`parse`](crate::parse).

use crate::prelude::*;
use num_traits::Zero;
use std::collections::BTreeMap;

/// element type of a stored variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ValueType {
    #[display(fmt = "Float64")]
    Float64,
    #[display(fmt = "Int64")]
    Int64,
    #[display(fmt = "String")]
    Text,
}

impl ValueType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Float64 => "Float64",
            Self::Int64 => "Int64",
            Self::Text => "String",
        }
    }

    pub(crate) fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"Float64" => Some(Self::Float64),
            b"Int64" => Some(Self::Int64),
            b"String" => Some(Self::Text),
            _ => None,
        }
    }
}

/// typed storage of a variable's values, flattened in row major order
#[derive(Debug, Clone, PartialEq)]
pub enum VarData {
    Float64(Vec<f64>),
    Int64(Vec<i64>),
    Text(Vec<String>),
}

impl VarData {
    fn zeros(value_type: ValueType, len: usize) -> Self {
        match value_type {
            ValueType::Float64 => Self::Float64(vec![f64::zero(); len]),
            ValueType::Int64 => Self::Int64(vec![i64::zero(); len]),
            ValueType::Text => Self::Text(vec![String::new(); len]),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Float64(_) => ValueType::Float64,
            Self::Int64(_) => ValueType::Int64,
            Self::Text(_) => ValueType::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Float64(x) => x.len(),
            Self::Int64(x) => x.len(),
            Self::Text(x) => x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn extend_zeros(&mut self, len: usize) {
        match self {
            Self::Float64(x) => extend_zeros(x, len),
            Self::Int64(x) => extend_zeros(x, len),
            Self::Text(x) => x.resize(x.len() + len, String::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Dimension {
    pub name: String,
    pub length: usize,
    pub unlimited: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) dims: Vec<String>,
    pub(crate) data: VarData,
    pub(crate) attributes: BTreeMap<String, String>,
}

impl Variable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn data(&self) -> &VarData {
        &self.data
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// A set of named, dimensioned arrays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    attributes: BTreeMap<String, String>,
    dimensions: BTreeMap<String, Dimension>,
    variables: BTreeMap<String, Variable>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.dimensions.values()
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn set_attribute<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.contains_key(name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Define a fixed size dimension
    pub fn define_dimension(&mut self, name: &str, length: usize) -> Result<(), Error> {
        self.insert_dimension(Dimension::new(name.into(), length, false))
    }

    /// Define the record dimension. A dataset has at most one.
    pub fn define_unlimited(&mut self, name: &str) -> Result<(), Error> {
        if self.record_dimension().is_some() {
            let err = AlreadyDeclared::new("unlimited dimension".into());
            return Err(StructuralError::from(err).into());
        }
        self.insert_dimension(Dimension::new(name.into(), 0, true))
    }

    pub(crate) fn insert_dimension(&mut self, dimension: Dimension) -> Result<(), Error> {
        if self.has_dimension(&dimension.name) {
            let what = format!("dimension `{}`", dimension.name);
            return Err(StructuralError::from(AlreadyDeclared::new(what)).into());
        }
        log::debug!("defining dimension {} = {}", dimension.name, dimension.length);
        self.dimensions.insert(dimension.name.clone(), dimension);
        Ok(())
    }

    pub fn dimension_len(&self, name: &str) -> Result<usize, Error> {
        self.dimensions
            .get(name)
            .map(|dim| dim.length)
            .ok_or_else(|| missing("dimension", name))
    }

    pub fn record_dimension(&self) -> Option<&Dimension> {
        self.dimensions.values().find(|dim| dim.unlimited)
    }

    /// Number of records currently stored along the unlimited dimension
    pub fn num_records(&self) -> usize {
        self.record_dimension().map(|dim| dim.length).unwrap_or(0)
    }

    /// Define a variable. Its values start out zeroed (or as empty strings).
    pub fn define_variable(
        &mut self,
        name: &str,
        value_type: ValueType,
        dims: &[&str],
    ) -> Result<(), Error> {
        if self.has_variable(name) {
            let what = format!("variable `{name}`");
            return Err(StructuralError::from(AlreadyDeclared::new(what)).into());
        }

        let mut len = 1;
        for (position, dim_name) in dims.iter().enumerate() {
            let dim = self
                .dimensions
                .get(*dim_name)
                .ok_or_else(|| missing("dimension", dim_name))?;

            if dim.unlimited && position != 0 {
                return Err(StructuralError::from(OutOfRange::new(
                    format!("position of unlimited dimension in `{name}`"),
                    position as i64,
                    0,
                    0,
                ))
                .into());
            }
            len *= dim.length;
        }

        let variable = Variable {
            name: name.into(),
            dims: dims.iter().map(|d| d.to_string()).collect(),
            data: VarData::zeros(value_type, len),
            attributes: BTreeMap::new(),
        };

        self.insert_variable(variable)
    }

    /// insert a fully formed variable, checking its payload against its dimensions
    pub(crate) fn insert_variable(&mut self, variable: Variable) -> Result<(), Error> {
        let expected = variable
            .dims
            .iter()
            .map(|d| self.dimension_len(d))
            .product::<Result<usize, Error>>()?;

        if variable.data.len() != expected {
            let what = format!("variable `{}`", variable.name);
            let err = SizeMismatch::new(what, expected, variable.data.len());
            return Err(StructuralError::from(err).into());
        }

        log::debug!("defining variable {} over {:?}", variable.name, variable.dims);
        self.variables.insert(variable.name.clone(), variable);
        Ok(())
    }

    pub fn variable(&self, name: &str) -> Result<&Variable, Error> {
        self.variables
            .get(name)
            .ok_or_else(|| missing("variable", name))
    }

    fn variable_mut(&mut self, name: &str) -> Result<&mut Variable, Error> {
        self.variables
            .get_mut(name)
            .ok_or_else(|| missing("variable", name))
    }

    pub fn set_variable_attribute<K: Into<String>, V: Into<String>>(
        &mut self,
        name: &str,
        key: K,
        value: V,
    ) -> Result<(), Error> {
        let variable = self.variable_mut(name)?;
        variable.attributes.insert(key.into(), value.into());
        Ok(())
    }

    pub fn variable_attribute(&self, name: &str, key: &str) -> Result<Option<&str>, Error> {
        let variable = self.variable(name)?;
        Ok(variable.attributes.get(key).map(String::as_str))
    }

    pub fn is_record_variable(&self, name: &str) -> Result<bool, Error> {
        let variable = self.variable(name)?;
        Ok(self.first_dim_is_unlimited(variable))
    }

    fn first_dim_is_unlimited(&self, variable: &Variable) -> bool {
        variable
            .dims
            .first()
            .and_then(|d| self.dimensions.get(d))
            .map(|d| d.unlimited)
            .unwrap_or(false)
    }

    /// number of values in a single record of a record variable, or in the whole
    /// variable otherwise
    pub fn record_len(&self, name: &str) -> Result<usize, Error> {
        let variable = self.variable(name)?;
        let skip = usize::from(self.first_dim_is_unlimited(variable));
        variable.dims[skip..]
            .iter()
            .map(|d| self.dimension_len(d))
            .product()
    }

    /// Replace every value of a variable
    pub fn put_var<T: Payload>(&mut self, name: &str, values: &[T]) -> Result<(), Error> {
        let variable = self.variable_mut(name)?;
        let actual = variable.data.value_type();
        let buffer = T::buffer_mut(&mut variable.data)
            .ok_or_else(|| type_mismatch::<T>(name, actual))?;

        if buffer.len() != values.len() {
            let what = format!("variable `{name}`");
            let err = SizeMismatch::new(what, buffer.len(), values.len());
            return Err(StructuralError::from(err).into());
        }

        buffer.copy_from_slice(values);
        Ok(())
    }

    pub fn get_var<T: Payload>(&self, name: &str) -> Result<&[T], Error> {
        let variable = self.variable(name)?;
        T::buffer(&variable.data)
            .map(Vec::as_slice)
            .ok_or_else(|| type_mismatch::<T>(name, variable.data.value_type()))
    }

    pub fn put_text<S: AsRef<str>>(&mut self, name: &str, values: &[S]) -> Result<(), Error> {
        let variable = self.variable_mut(name)?;
        let actual = variable.data.value_type();

        let buffer = match &mut variable.data {
            VarData::Text(buffer) => buffer,
            _ => {
                let err = TypeMismatch::new(name.into(), ValueType::Text, actual);
                return Err(StructuralError::from(err).into());
            }
        };

        if buffer.len() != values.len() {
            let what = format!("variable `{name}`");
            let err = SizeMismatch::new(what, buffer.len(), values.len());
            return Err(StructuralError::from(err).into());
        }

        for (slot, value) in buffer.iter_mut().zip(values) {
            *slot = value.as_ref().to_string();
        }
        Ok(())
    }

    pub fn get_text(&self, name: &str) -> Result<&[String], Error> {
        let variable = self.variable(name)?;
        match &variable.data {
            VarData::Text(buffer) => Ok(buffer),
            other => {
                let err = TypeMismatch::new(name.into(), ValueType::Text, other.value_type());
                Err(StructuralError::from(err).into())
            }
        }
    }

    /// append one zeroed record to every record variable
    fn grow_records(&mut self) -> Result<(), Error> {
        let record_dim = match self.record_dimension() {
            Some(dim) => dim.name.clone(),
            None => return Err(missing("dimension", "unlimited")),
        };

        let record_vars = self
            .variables
            .values()
            .filter(|v| v.dims.first() == Some(&record_dim))
            .map(|v| v.name.clone())
            .collect::<Vec<_>>();

        for name in record_vars {
            let len = self.record_len(&name)?;
            self.variable_mut(&name)?.data.extend_zeros(len);
        }

        if let Some(dim) = self.dimensions.get_mut(&record_dim) {
            dim.length += 1;
            log::trace!("record dimension {} grew to {}", record_dim, dim.length);
        }

        Ok(())
    }

    /// Check that `[offset, offset + count)` lies within one record of `name` and return
    /// the flat start of the range
    fn record_range(
        &self,
        name: &str,
        record: usize,
        offset: usize,
        count: usize,
        allow_new: bool,
    ) -> Result<usize, Error> {
        if !self.is_record_variable(name)? {
            let what = format!("variable `{name}`");
            let err = Undeclared::new(format!("{what} as a record variable"));
            return Err(StructuralError::from(err).into());
        }

        let records = self.num_records();
        let max_record = if allow_new { records } else { records.saturating_sub(1) };
        if record > max_record || (!allow_new && records == 0) {
            return Err(StructuralError::from(OutOfRange::new(
                format!("record of `{name}`"),
                record as i64,
                0,
                max_record as i64,
            ))
            .into());
        }

        let record_len = self.record_len(name)?;
        match offset.checked_add(count) {
            Some(end) if end <= record_len => (),
            end => {
                let end = end.and_then(|end| i64::try_from(end).ok()).unwrap_or(i64::MAX);
                return Err(StructuralError::from(OutOfRange::new(
                    format!("end of slab in `{name}`"),
                    end,
                    0,
                    record_len as i64,
                ))
                .into());
            }
        }

        Ok(record * record_len + offset)
    }

    /// Write `values` into record `record` of `name`, starting `offset` values into the
    /// record. Writing to the record just past the end appends a new record.
    pub fn put_record_slab<T: Payload>(
        &mut self,
        name: &str,
        record: usize,
        offset: usize,
        values: &[T],
    ) -> Result<(), Error> {
        let start = self.record_range(name, record, offset, values.len(), true)?;

        // type check before any record is appended
        let actual = self.variable(name)?.data.value_type();
        if actual != T::VALUE_TYPE {
            return Err(type_mismatch::<T>(name, actual));
        }

        if record == self.num_records() {
            self.grow_records()?;
        }

        let variable = self.variable_mut(name)?;
        let buffer = T::buffer_mut(&mut variable.data)
            .ok_or_else(|| type_mismatch::<T>(name, actual))?;
        buffer[start..start + values.len()].copy_from_slice(values);

        log::trace!(
            "wrote {} value(s) to {} at record {} offset {}",
            values.len(),
            name,
            record,
            offset
        );
        Ok(())
    }

    pub fn get_record_slab<T: Payload>(
        &self,
        name: &str,
        record: usize,
        offset: usize,
        count: usize,
    ) -> Result<&[T], Error> {
        let start = self.record_range(name, record, offset, count, false)?;
        let values = self.get_var::<T>(name)?;
        Ok(&values[start..start + count])
    }

    /// One value per record for the inclusive record range `[first, last]`
    pub fn get_record_column<T: Payload>(
        &self,
        name: &str,
        column: usize,
        first: usize,
        last: usize,
    ) -> Result<Vec<T>, Error> {
        if first > last {
            return Err(StructuralError::from(OutOfRange::new(
                format!("first record of `{name}`"),
                first as i64,
                0,
                last as i64,
            ))
            .into());
        }

        (first..=last)
            .map(|record| {
                self.get_record_slab::<T>(name, record, column, 1)
                    .map(|value| value[0])
            })
            .collect()
    }

    /// Every record of a record variable as a `records x record_len` array
    pub fn get_records<T: Payload>(&self, name: &str) -> Result<Array2<T>, Error> {
        let record_len = self.record_len(name)?;
        let values = self.get_var::<T>(name)?;
        let records = if record_len == 0 { 0 } else { values.len() / record_len };

        Array2::from_shape_vec((records, record_len), values.to_vec()).map_err(|_| {
            let what = format!("records of `{name}`");
            let err = SizeMismatch::new(what, records * record_len, values.len());
            Error::from(StructuralError::from(err))
        })
    }
}

fn extend_zeros<T: Payload>(values: &mut Vec<T>, len: usize) {
    values.resize(values.len() + len, T::zero());
}

fn missing(what: &'static str, name: &str) -> Error {
    NotFoundError::from(MissingStoreItem::new(what, name.into())).into()
}

fn type_mismatch<T: Payload>(name: &str, actual: ValueType) -> Error {
    StructuralError::from(TypeMismatch::new(name.into(), T::VALUE_TYPE, actual)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_dataset() -> Dataset {
        let mut data = Dataset::new();
        data.define_unlimited("time_step").unwrap();
        data.define_dimension("num_nodes", 3).unwrap();
        data.define_variable("time_whole", ValueType::Float64, &["time_step"])
            .unwrap();
        data.define_variable("vals", ValueType::Float64, &["time_step", "num_nodes"])
            .unwrap();
        data
    }

    #[test]
    fn definitions_are_write_once() {
        let mut data = time_dataset();
        assert!(data.define_dimension("num_nodes", 4).is_err());
        assert!(data.define_unlimited("other").is_err());
        assert!(data
            .define_variable("vals", ValueType::Int64, &["num_nodes"])
            .is_err());
        assert!(data
            .define_variable("bad", ValueType::Int64, &["num_elem"])
            .is_err());
        assert!(data
            .define_variable("late", ValueType::Int64, &["num_nodes", "time_step"])
            .is_err());
    }

    #[test]
    fn records_grow_one_at_a_time() {
        let mut data = time_dataset();
        data.put_record_slab("time_whole", 0, 0, &[0.5]).unwrap();
        assert_eq!(data.num_records(), 1);
        // the sibling record variable grew along with it
        assert_eq!(data.get_record_slab::<f64>("vals", 0, 0, 3).unwrap(), &[0.0; 3]);

        assert!(data.put_record_slab("time_whole", 2, 0, &[1.5]).is_err());
        assert_eq!(data.num_records(), 1);

        data.put_record_slab("vals", 0, 1, &[7.0, 8.0]).unwrap();
        assert_eq!(data.get_record_slab::<f64>("vals", 0, 0, 3).unwrap(), &[0.0, 7.0, 8.0]);
        assert!(data.put_record_slab("vals", 0, 2, &[1.0, 2.0]).is_err());
    }

    #[test]
    fn slab_end_cannot_wrap() {
        let mut data = time_dataset();
        data.put_record_slab("time_whole", 0, 0, &[0.0]).unwrap();
        data.put_record_slab("vals", 0, 0, &[1.0, 2.0, 3.0]).unwrap();
        data.put_record_slab("time_whole", 1, 0, &[1.0]).unwrap();

        let err = data
            .put_record_slab("vals", 1, usize::MAX, &[9.0, 9.0])
            .unwrap_err();
        assert!(matches!(err, Error::Structural(StructuralError::OutOfRange(_))));
        assert!(data.get_record_slab::<f64>("vals", 0, usize::MAX, 2).is_err());

        assert_eq!(data.get_record_slab::<f64>("vals", 0, 0, 3).unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(data.get_record_slab::<f64>("vals", 1, 0, 3).unwrap(), &[0.0; 3]);
    }

    #[test]
    fn columns_and_matrices() {
        let mut data = time_dataset();
        for step in 0..3 {
            data.put_record_slab("time_whole", step, 0, &[step as f64]).unwrap();
            data.put_record_slab("vals", step, 0, &[step as f64, 10.0, 20.0])
                .unwrap();
        }

        let column = data.get_record_column::<f64>("vals", 0, 1, 2).unwrap();
        assert_eq!(column, vec![1.0, 2.0]);

        let matrix = data.get_records::<f64>("vals").unwrap();
        assert_eq!(matrix.dim(), (3, 3));
        assert_eq!(matrix[[2, 0]], 2.0);
    }

    #[test]
    fn typed_access() {
        let mut data = Dataset::new();
        data.define_dimension("n", 2).unwrap();
        data.define_variable("ids", ValueType::Int64, &["n"]).unwrap();
        data.define_variable("names", ValueType::Text, &["n"]).unwrap();

        assert!(data.put_var("ids", &[1.0, 2.0]).is_err());
        assert!(data.put_var("ids", &[1_i64]).is_err());
        data.put_var("ids", &[3_i64, 4]).unwrap();
        assert_eq!(data.get_var::<i64>("ids").unwrap(), &[3, 4]);

        data.put_text("names", &["a", ""]).unwrap();
        assert_eq!(data.get_text("names").unwrap(), &["a".to_string(), String::new()]);
        assert!(data.get_text("ids").is_err());
        assert!(data.get_var::<f64>("missing").is_err());
    }
}
