//! The labeled-data container and its combination engine.

use indexmap::IndexMap;
use thiserror::Error;

use crate::coord::CoordValue;
use crate::index::CoordIndex;

/// Width used when embedding index representations in error messages.
const DIAG_REPR_WIDTH: usize = 40;

#[derive(Debug, Error)]
pub enum AlignError {
    /// Two same-named indexed coordinates refused to reconcile. Both
    /// representations come from [`CoordIndex::inline_repr`].
    #[error("conflicting indexes for coordinate {coord:?}: {left} vs {right}")]
    IndexConflict {
        coord: String,
        left: String,
        right: String,
    },
    #[error("no coordinate {coord:?} found in dataset")]
    MissingCoord { coord: String },
    #[error("cannot concatenate variable {var:?} along {dim:?}: dimensions differ")]
    DimensionMismatch { var: String, dim: String },
}

/// A named data variable: a flat f64 buffer laid out along named
/// dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub dims: Vec<String>,
    pub data: Vec<f64>,
}

impl Variable {
    pub fn new(dims: Vec<String>, data: Vec<f64>) -> Self {
        Self { dims, data }
    }

    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }
}

/// Labeled-data container: ordered maps of coordinates, data variables, and
/// per-coordinate indexes.
///
/// Updates are copy-on-write: every mutating operation returns a new
/// dataset, leaving the receiver untouched. Combination operations
/// (`align`, `merge`, `concat`) reconcile shared indexed coordinates
/// through the [`CoordIndex`] hooks and never resolve index conflicts
/// silently.
#[derive(Debug, Default, Clone)]
pub struct Dataset {
    coords: IndexMap<String, CoordValue>,
    vars: IndexMap<String, Variable>,
    indexes: IndexMap<String, Box<dyn CoordIndex>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    // ── coordinates ───────────────────────────────────────────────────────

    pub fn assign_coord(&self, name: impl Into<String>, value: CoordValue) -> Dataset {
        let mut out = self.clone();
        out.coords.insert(name.into(), value);
        out
    }

    /// Drop a coordinate together with its index, if any.
    pub fn drop_coord(&self, name: &str) -> Dataset {
        let mut out = self.clone();
        out.coords.shift_remove(name);
        out.indexes.shift_remove(name);
        out
    }

    pub fn coord(&self, name: &str) -> Option<&CoordValue> {
        self.coords.get(name)
    }

    pub fn has_coord(&self, name: &str) -> bool {
        self.coords.contains_key(name)
    }

    pub fn coords(&self) -> impl Iterator<Item = (&str, &CoordValue)> {
        self.coords.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ── variables ─────────────────────────────────────────────────────────

    pub fn assign_var(&self, name: impl Into<String>, var: Variable) -> Dataset {
        let mut out = self.clone();
        out.vars.insert(name.into(), var);
        out
    }

    pub fn var(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    pub fn vars(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ── indexes ───────────────────────────────────────────────────────────

    /// Attach an index to an existing coordinate, replacing any previous
    /// one.
    pub fn set_index(
        &self,
        name: &str,
        index: Box<dyn CoordIndex>,
    ) -> Result<Dataset, AlignError> {
        if !self.coords.contains_key(name) {
            return Err(AlignError::MissingCoord { coord: name.into() });
        }
        let mut out = self.clone();
        out.indexes.insert(name.to_string(), index);
        Ok(out)
    }

    pub fn drop_index(&self, name: &str) -> Dataset {
        let mut out = self.clone();
        out.indexes.shift_remove(name);
        out
    }

    pub fn index(&self, name: &str) -> Option<&dyn CoordIndex> {
        self.indexes.get(name).map(|b| b.as_ref())
    }

    pub fn indexes(&self) -> impl Iterator<Item = (&str, &dyn CoordIndex)> {
        self.indexes.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    // ── combination ───────────────────────────────────────────────────────

    /// Check that every coordinate indexed on both sides is compatible.
    pub fn align(&self, other: &Dataset) -> Result<(), AlignError> {
        for (name, left) in self.indexes() {
            if let Some(right) = other.index(name) {
                if !left.equals(right) {
                    return Err(index_conflict(name, left, right));
                }
            }
        }
        Ok(())
    }

    /// Set-union of coordinates, variables, and indexes.
    ///
    /// Shared indexed coordinates are reconciled through
    /// [`CoordIndex::merge`]; one-sided entries are adopted as-is. For
    /// unindexed entries present on both sides, the left side wins.
    pub fn merge(&self, other: &Dataset) -> Result<Dataset, AlignError> {
        let mut out = self.clone();
        for (name, value) in other.coords() {
            if !out.coords.contains_key(name) {
                out.coords.insert(name.to_string(), value.clone());
            }
        }
        for (name, var) in other.vars() {
            if !out.vars.contains_key(name) {
                out.vars.insert(name.to_string(), var.clone());
            }
        }
        out.indexes = self.merged_indexes(other, |_| false)?;
        Ok(out)
    }

    /// Concatenate data variables along `dim`.
    ///
    /// Array coordinates laid out along `dim` are concatenated and their
    /// indexes dropped without being reconciled (label indexes over the
    /// joined coordinate are stale and must be rebuilt by the caller, and
    /// the two sides' labels legitimately differ); every other indexed
    /// coordinate is reconciled exactly like in [`Dataset::merge`].
    pub fn concat(&self, other: &Dataset, dim: &str) -> Result<Dataset, AlignError> {
        let mut out = Dataset::new();

        for (name, value) in self.coords() {
            let joined = match (value, other.coord(name)) {
                (
                    CoordValue::Array { dim: d, data },
                    Some(CoordValue::Array { dim: od, data: odata }),
                ) if d == dim && od == dim => {
                    let mut data = data.clone();
                    data.extend_from_slice(odata);
                    CoordValue::Array {
                        dim: dim.to_string(),
                        data,
                    }
                }
                _ => value.clone(),
            };
            out.coords.insert(name.to_string(), joined);
        }
        for (name, value) in other.coords() {
            if !out.coords.contains_key(name) {
                out.coords.insert(name.to_string(), value.clone());
            }
        }

        for (name, var) in self.vars() {
            let joined = match (var.has_dim(dim), other.var(name)) {
                (true, Some(ovar)) => {
                    if var.dims != ovar.dims {
                        return Err(AlignError::DimensionMismatch {
                            var: name.to_string(),
                            dim: dim.to_string(),
                        });
                    }
                    let mut data = var.data.clone();
                    data.extend_from_slice(&ovar.data);
                    Variable::new(var.dims.clone(), data)
                }
                _ => var.clone(),
            };
            out.vars.insert(name.to_string(), joined);
        }
        for (name, var) in other.vars() {
            if !out.vars.contains_key(name) {
                out.vars.insert(name.to_string(), var.clone());
            }
        }

        let indexes = self.merged_indexes(other, |name| {
            out.coords
                .get(name)
                .and_then(CoordValue::dim)
                .is_some_and(|d| d == dim)
        })?;
        out.indexes = indexes;
        Ok(out)
    }

    /// Reconcile both sides' indexes, skipping coordinate names `skip`
    /// accepts. Skipped coordinates never reach the merge hook, so they can
    /// neither conflict nor be adopted.
    fn merged_indexes(
        &self,
        other: &Dataset,
        skip: impl Fn(&str) -> bool,
    ) -> Result<IndexMap<String, Box<dyn CoordIndex>>, AlignError> {
        let mut merged: IndexMap<String, Box<dyn CoordIndex>> = IndexMap::new();
        for (name, left) in self.indexes() {
            if skip(name) {
                continue;
            }
            match other.index(name) {
                Some(right) => match left.merge(right) {
                    Some(index) => {
                        merged.insert(name.to_string(), index);
                    }
                    None => return Err(index_conflict(name, left, right)),
                },
                None => {
                    merged.insert(name.to_string(), left.clone_box());
                }
            }
        }
        for (name, right) in other.indexes() {
            if !skip(name) && !merged.contains_key(name) {
                merged.insert(name.to_string(), right.clone_box());
            }
        }
        Ok(merged)
    }

    /// Structural equality: same coordinates, variables, and pairwise-equal
    /// indexes over the same coordinate names.
    pub fn identical(&self, other: &Dataset) -> bool {
        if self.coords != other.coords || self.vars != other.vars {
            return false;
        }
        if self.indexes.len() != other.indexes.len() {
            return false;
        }
        self.indexes().all(|(name, left)| {
            other
                .index(name)
                .is_some_and(|right| left.equals(right))
        })
    }
}

fn index_conflict(coord: &str, left: &dyn CoordIndex, right: &dyn CoordIndex) -> AlignError {
    AlignError::IndexConflict {
        coord: coord.to_string(),
        left: left.inline_repr(DIAG_REPR_WIDTH),
        right: right.inline_repr(DIAG_REPR_WIDTH),
    }
}

/// Reduce several datasets into one, merging pairwise left-to-right.
pub fn merge_all<'a>(
    datasets: impl IntoIterator<Item = &'a Dataset>,
) -> Result<Dataset, AlignError> {
    let mut out = Dataset::new();
    for ds in datasets {
        out = out.merge(ds)?;
    }
    Ok(out)
}
