//! Time steps and the global, nodal and elemental variables sampled at them.
//!
//! Time steps are records along the unlimited `time_step` dimension. Appending a time
//! step zero fills a new record in every variable, so values may be written to a step
//! in any number of partial writes.

use super::names;
use super::structure::check_len;
use super::{File, READABLE, WRITABLE};

use crate::dataset::ValueType;
use crate::mesh::{CatalogState, EntityKind, VariableCatalog, VariableKind};
use crate::prelude::*;

/// The value array of one variable at one step
struct Target {
    variable: String,
    /// values per step
    len: usize,
    record: usize,
}

impl File {
    /// Set the time of step `step`. Steps are appended in order starting from 1.
    pub fn write_time(&mut self, step: usize, time: f64) -> Result<(), Error> {
        self.require_writable("write_time")?;

        let expected = self.store.num_records() + 1;
        if step != expected {
            return Err(StructuralError::from(StepOrder::new(expected, step)).into());
        }

        self.store.put_record_slab(names::VAR_TIME, step - 1, 0, &[time])?;

        // keep a loaded time cache in sync
        if self.times.len() == step - 1 {
            self.times.push(time);
        }
        self.dirty = true;

        log::trace!("wrote time step {step} = {time}");
        Ok(())
    }

    pub fn write_global_var_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), Error> {
        self.declare_catalog(VariableKind::Global, names)
    }

    pub fn write_nodal_var_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), Error> {
        self.declare_catalog(VariableKind::Nodal, names)
    }

    /// Declare the elemental variables. Every element block stores its own values for each.
    pub fn write_elem_var_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), Error> {
        self.declare_catalog(VariableKind::Elemental, names)
    }

    /// Write a single global variable at `step`
    pub fn write_global_var(
        &mut self,
        step: usize,
        var_index: usize,
        value: f64,
    ) -> Result<(), Error> {
        let target = self.target(
            WRITABLE,
            "write_global_var",
            VariableKind::Global,
            step,
            var_index,
            None,
        )?;
        self.put_values(&target, var_index, &[value])
    }

    /// Write every global variable at `step`, in catalog order
    pub fn write_global_vars(&mut self, step: usize, values: &[f64]) -> Result<(), Error> {
        let target = self.target(
            WRITABLE,
            "write_global_vars",
            VariableKind::Global,
            step,
            1,
            None,
        )?;
        check_len("global variable values", target.len, values.len())?;
        self.put_values(&target, 1, values)
    }

    /// Write one value per node for the nodal variable `var_index` at `step`
    pub fn write_nodal_var(
        &mut self,
        step: usize,
        var_index: usize,
        values: &[f64],
    ) -> Result<(), Error> {
        let target = self.target(
            WRITABLE,
            "write_nodal_var",
            VariableKind::Nodal,
            step,
            var_index,
            None,
        )?;
        check_len("nodal variable values", target.len, values.len())?;
        self.put_values(&target, 1, values)
    }

    /// Write `values` to the nodes `start, start + 1, ...` (1-based) of the nodal variable
    /// `var_index` at `step`. Nodes outside of the range keep their current values.
    pub fn write_partial_nodal_var(
        &mut self,
        step: usize,
        var_index: usize,
        start: usize,
        values: &[f64],
    ) -> Result<(), Error> {
        let target = self.target(
            WRITABLE,
            "write_partial_nodal_var",
            VariableKind::Nodal,
            step,
            var_index,
            None,
        )?;
        self.put_values(&target, start, values)
    }

    /// Write one value per element of block `block_id` for the elemental variable `var_index`
    pub fn write_elem_var(
        &mut self,
        step: usize,
        var_index: usize,
        block_id: i64,
        values: &[f64],
    ) -> Result<(), Error> {
        let target = self.target(
            WRITABLE,
            "write_elem_var",
            VariableKind::Elemental,
            step,
            var_index,
            Some(block_id),
        )?;
        check_len(&format!("values of element block {block_id}"), target.len, values.len())?;
        self.put_values(&target, 1, values)
    }

    /// The elemental counterpart of [`File::write_partial_nodal_var`], with `start` counting
    /// elements within block `block_id`
    pub fn write_partial_elem_var(
        &mut self,
        step: usize,
        var_index: usize,
        block_id: i64,
        start: usize,
        values: &[f64],
    ) -> Result<(), Error> {
        let target = self.target(
            WRITABLE,
            "write_partial_elem_var",
            VariableKind::Elemental,
            step,
            var_index,
            Some(block_id),
        )?;
        self.put_values(&target, start, values)
    }

    /// Load every time value into the session
    pub fn read_times(&mut self) -> Result<(), Error> {
        self.require_readable("read_times")?;
        self.times = self.store.get_var::<f64>(names::VAR_TIME)?.to_vec();
        Ok(())
    }

    /// Time values loaded by [`File::read_times`]
    pub fn get_times(&self) -> &[f64] {
        &self.times
    }

    /// Number of time values loaded by [`File::read_times`]
    pub fn get_num_times(&self) -> usize {
        self.times.len()
    }

    pub fn get_global_variable_names(&self) -> Vec<String> {
        self.global_vars.names()
    }

    pub fn get_nodal_variable_names(&self) -> Vec<String> {
        self.nodal_vars.names()
    }

    pub fn get_elemental_variable_names(&self) -> Vec<String> {
        self.elem_vars.names()
    }

    /// The catalog of `kind`, if it was declared
    pub fn variable_catalog(&self, kind: VariableKind) -> Option<&VariableCatalog> {
        self.catalog_state(kind).catalog()
    }

    /// Every global variable at `step`
    pub fn get_global_variable_values(&self, step: usize) -> Result<Vec<f64>, Error> {
        let target = self.target(
            READABLE,
            "get_global_variable_values",
            VariableKind::Global,
            step,
            1,
            None,
        )?;
        let values = self.store.get_record_slab::<f64>(
            &target.variable,
            target.record,
            0,
            target.len,
        )?;
        Ok(values.to_vec())
    }

    /// Global variable `var_index` at every step in `begin..=end`. `end = None` runs to the
    /// last stored step.
    pub fn get_global_variable_time_series(
        &self,
        var_index: usize,
        begin: usize,
        end: Option<usize>,
    ) -> Result<Vec<f64>, Error> {
        let last = end.unwrap_or_else(|| self.store.num_records());
        let target = self.target(
            READABLE,
            "get_global_variable_time_series",
            VariableKind::Global,
            last,
            var_index,
            None,
        )?;
        self.check_step(begin)?;

        if begin > last {
            let what = "first step of the time series".to_string();
            let err = OutOfRange::new(what, begin as i64, 1, last as i64);
            return Err(StructuralError::from(err).into());
        }

        self.store
            .get_record_column::<f64>(&target.variable, var_index - 1, begin - 1, last - 1)
    }

    /// One value per node of nodal variable `var_index` at `step`
    pub fn get_nodal_variable_values(
        &self,
        step: usize,
        var_index: usize,
    ) -> Result<Vec<f64>, Error> {
        let target = self.target(
            READABLE,
            "get_nodal_variable_values",
            VariableKind::Nodal,
            step,
            var_index,
            None,
        )?;
        let values = self.store.get_record_slab::<f64>(
            &target.variable,
            target.record,
            0,
            target.len,
        )?;
        Ok(values.to_vec())
    }

    /// One value per element of block `block_id` for elemental variable `var_index` at `step`
    pub fn get_elemental_variable_values(
        &self,
        step: usize,
        var_index: usize,
        block_id: i64,
    ) -> Result<Vec<f64>, Error> {
        let target = self.target(
            READABLE,
            "get_elemental_variable_values",
            VariableKind::Elemental,
            step,
            var_index,
            Some(block_id),
        )?;
        let values = self.store.get_record_slab::<f64>(
            &target.variable,
            target.record,
            0,
            target.len,
        )?;
        Ok(values.to_vec())
    }

    /// Nodal variable `var_index` at every step, as a `steps x nodes` array
    pub fn get_nodal_variable_history(&self, var_index: usize) -> Result<Array2<f64>, Error> {
        self.require_readable("get_nodal_variable_history")?;
        self.check_variable(VariableKind::Nodal, var_index)?;
        self.store.get_records::<f64>(&names::vals_nod_var(var_index))
    }

    fn declare_catalog<S: AsRef<str>>(
        &mut self,
        kind: VariableKind,
        names: &[S],
    ) -> Result<(), Error> {
        self.require_writable("declare variable names")?;

        if names.is_empty() {
            return Ok(());
        }

        if let CatalogState::Declared(_) = self.catalog_state(kind) {
            let what = format!("the {kind} variable names");
            return Err(StructuralError::from(AlreadyDeclared::new(what)).into());
        }

        let (dim, names_var) = match kind {
            VariableKind::Global => (names::DIM_NUM_GLO_VAR, names::VAR_NAME_GLO),
            VariableKind::Nodal => (names::DIM_NUM_NOD_VAR, names::VAR_NAME_NOD),
            VariableKind::Elemental => (names::DIM_NUM_ELEM_VAR, names::VAR_NAME_ELEM),
        };

        // the block layout is the only lookup that can fail, do it before defining anything
        let block_slots: Vec<usize> = self.block_layout()?.iter().map(|b| b.slot).collect();

        self.store.define_dimension(dim, names.len())?;
        self.store.define_variable(names_var, ValueType::Text, &[dim])?;
        self.store.put_text(names_var, names)?;

        self.define_value_variables(kind, names.len(), &block_slots)?;

        *self.catalog_state_mut(kind) = CatalogState::Declared(VariableCatalog::new(names));
        self.dirty = true;

        log::debug!("declared {} {kind} variable(s)", names.len());
        Ok(())
    }

    fn define_value_variables(
        &mut self,
        kind: VariableKind,
        count: usize,
        block_slots: &[usize],
    ) -> Result<(), Error> {
        match kind {
            VariableKind::Global => {
                let dims = [names::DIM_TIME_STEP, names::DIM_NUM_GLO_VAR];
                self.store.define_variable(names::VAR_VALS_GLO, ValueType::Float64, &dims)?;
            }
            VariableKind::Nodal => {
                let dims = [names::DIM_TIME_STEP, names::DIM_NUM_NODES];
                for var in 1..=count {
                    let values = names::vals_nod_var(var);
                    self.store
                        .define_variable(&values, ValueType::Float64, &dims)?;
                }
            }
            VariableKind::Elemental => {
                for &slot in block_slots {
                    let elements_dim = names::num_el_in_blk(slot + 1);
                    let dims = [names::DIM_TIME_STEP, elements_dim.as_str()];
                    for var in 1..=count {
                        let values = names::vals_elem_var(var, slot + 1);
                        self.store.define_variable(&values, ValueType::Float64, &dims)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn check_variable(&self, kind: VariableKind, var_index: usize) -> Result<usize, Error> {
        let catalog = self.catalog_state(kind).catalog().ok_or_else(|| {
            let what = format!("the {kind} variable names");
            Error::from(StructuralError::from(Undeclared::new(what)))
        })?;

        if var_index == 0 || var_index > catalog.len() {
            return Err(NotFoundError::from(MissingVariable::new(kind, var_index)).into());
        }
        Ok(catalog.len())
    }

    fn check_step(&self, step: usize) -> Result<(), Error> {
        if step == 0 || step > self.store.num_records() {
            return Err(NotFoundError::from(MissingTimeStep::new(step)).into());
        }
        Ok(())
    }

    /// Validate an access to variable `var_index` of `kind` at `step` and work out where its
    /// values live
    fn target(
        &self,
        modes: &[Mode],
        operation: &'static str,
        kind: VariableKind,
        step: usize,
        var_index: usize,
        block_id: Option<i64>,
    ) -> Result<Target, Error> {
        self.require_mode(operation, modes)?;
        let summary = self.require_schema()?;

        let num_vars = self.check_variable(kind, var_index)?;
        self.check_step(step)?;

        let (variable, len) = match kind {
            VariableKind::Global => (names::VAR_VALS_GLO.to_string(), num_vars),
            VariableKind::Nodal => (names::vals_nod_var(var_index), summary.num_nodes),
            VariableKind::Elemental => {
                let block_id = block_id.unwrap_or_default();
                let slot = self.find_slot(EntityKind::ElementBlock, block_id)?;
                let len = self.store.dimension_len(&names::num_el_in_blk(slot + 1))?;
                (names::vals_elem_var(var_index, slot + 1), len)
            }
        };

        Ok(Target {
            variable,
            len,
            record: step - 1,
        })
    }

    /// Write `values` to the 1-based positions `start..start + values.len()` of `target`
    fn put_values(&mut self, target: &Target, start: usize, values: &[f64]) -> Result<(), Error> {
        let offset = start.checked_sub(1);
        let end = offset.and_then(|offset| offset.checked_add(values.len()));

        let (offset, end) = match (offset, end) {
            (Some(offset), Some(end)) if end <= target.len => (offset, end),
            _ => {
                let what = format!("first position written to `{}`", target.variable);
                let start = i64::try_from(start).unwrap_or(i64::MAX);
                let max = target.len.saturating_sub(values.len()).saturating_add(1);
                let err = OutOfRange::new(what, start, 1, max as i64);
                return Err(StructuralError::from(err).into());
            }
        };

        log::trace!("writing positions {}..={end} of `{}`", offset + 1, target.variable);
        self.store
            .put_record_slab(&target.variable, target.record, offset, values)?;
        self.dirty = true;
        Ok(())
    }
}
