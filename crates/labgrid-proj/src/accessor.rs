//! The `.proj()` dataset accessor: assign, retrieve, and propagate CRS
//! metadata.

use indexmap::IndexMap;

use labgrid::{CoordIndex, CoordValue, Dataset};

use crate::crs::{Crs, CrsInput};
use crate::error::CrsError;
use crate::index::CrsIndex;
use crate::mixins::{crs_aware, CrsAware};

/// Width used when embedding an existing index in an override error.
const DIAG_REPR_WIDTH: usize = 40;

/// Extension entry point, implemented for [`Dataset`].
pub trait ProjExt {
    fn proj(&self) -> ProjAccessor<'_>;
}

impl ProjExt for Dataset {
    fn proj(&self) -> ProjAccessor<'_> {
        ProjAccessor { ds: self }
    }
}

/// Borrowed view over a dataset's CRS-related state.
pub struct ProjAccessor<'a> {
    ds: &'a Dataset,
}

impl<'a> ProjAccessor<'a> {
    /// Coordinates carrying a [`CrsIndex`], in dataset order.
    pub fn crs_indexes(&self) -> IndexMap<&'a str, &'a CrsIndex> {
        self.ds
            .indexes()
            .filter_map(|(name, index)| {
                index
                    .as_any()
                    .downcast_ref::<CrsIndex>()
                    .map(|crs_index| (name, crs_index))
            })
            .collect()
    }

    /// Coordinates whose index registered the [`CrsAware`] capability,
    /// excluding [`CrsIndex`] coordinates (those are listed by
    /// [`crs_indexes`](Self::crs_indexes)).
    pub fn crs_aware_indexes(&self) -> IndexMap<&'a str, &'a dyn CrsAware> {
        self.ds
            .indexes()
            .filter(|(_, index)| index.as_any().downcast_ref::<CrsIndex>().is_none())
            .filter_map(|(name, index)| crs_aware(index).map(|aware| (name, aware)))
            .collect()
    }

    /// The dataset-wide CRS.
    ///
    /// Explicit reduction over every CRS-bearing index (both [`CrsIndex`]
    /// and registered CRS-aware kinds): no bearers yields `None`, full
    /// agreement yields the value, and disagreement fails with the
    /// conflicting coordinate names and their CRS representations.
    pub fn crs(&self) -> Result<Option<&'a Crs>, CrsError> {
        let mut bearers: Vec<(&str, &Crs)> = Vec::new();
        for (name, index) in self.ds.indexes() {
            let Some(aware) = crs_aware(index) else {
                continue;
            };
            if let Some(crs) = aware.crs() {
                bearers.push((name, crs));
            }
        }
        let Some((_, first)) = bearers.first().copied() else {
            return Ok(None);
        };
        if bearers.iter().any(|(_, crs)| *crs != first) {
            return Err(CrsError::AmbiguousCrs {
                conflicts: bearers
                    .into_iter()
                    .map(|(name, crs)| (name.to_string(), crs.to_string()))
                    .collect(),
            });
        }
        Ok(Some(first))
    }

    /// Select one spatial-reference coordinate by name.
    pub fn coord(&self, name: &str) -> Result<CoordProj<'a>, CrsError> {
        if !self.ds.has_coord(name) {
            return Err(CrsError::MissingCoord {
                coord: name.to_string(),
            });
        }
        let index = self.ds.index(name).ok_or_else(|| CrsError::CoordNotIndexed {
            coord: name.to_string(),
        })?;
        let aware = crs_aware(index).ok_or_else(|| CrsError::NotCrsAware {
            coord: name.to_string(),
        })?;
        Ok(CoordProj { aware })
    }

    /// Exactly one CRS-indexed coordinate, or an error.
    pub fn assert_single_crs(&self) -> Result<(), CrsError> {
        match self.crs_indexes().len() {
            0 => Err(CrsError::NoCrs),
            1 => Ok(()),
            _ => Err(CrsError::MultipleCrs),
        }
    }

    /// Attach a CRS to each named coordinate, creating missing coordinates
    /// as new scalars.
    ///
    /// A CRS index anchors to exactly one scalar coordinate, so naming an
    /// existing array coordinate fails with
    /// [`CrsError::NotScalar`] regardless of `allow_override`. A
    /// coordinate already carrying a different CRS (or a foreign index)
    /// is only replaced when `allow_override` is set; assigning to a
    /// coordinate without CRS information always succeeds. The operation
    /// never propagates to indexes it was not asked about - explicit
    /// propagation goes through [`map_crs`](Self::map_crs).
    pub fn assign_crs<N, C>(
        &self,
        mapping: impl IntoIterator<Item = (N, C)>,
        allow_override: bool,
    ) -> Result<Dataset, CrsError>
    where
        N: Into<String>,
        C: Into<CrsInput>,
    {
        let mut ds = self.ds.clone();
        for (name, input) in mapping {
            let name = name.into();
            let crs = input.into().into_crs()?;

            if !ds.has_coord(&name) {
                ds = ds.assign_coord(&name, CoordValue::scalar(0.0));
            }
            let value = ds
                .coord(&name)
                .ok_or_else(|| CrsError::MissingCoord { coord: name.clone() })?;
            let index = CrsIndex::from_coord(&name, value, Some(crs.clone()))?;
            if !allow_override {
                if let Some(existing) = ds.index(&name) {
                    check_replaceable(&name, existing, &crs)?;
                }
            }
            ds = ds
                .set_index(&name, Box::new(index))
                .map_err(|_| CrsError::MissingCoord { coord: name.clone() })?;
        }
        Ok(ds)
    }

    /// Explicitly propagate a spatial-reference coordinate's CRS to the
    /// named target coordinates through their set-CRS hooks.
    ///
    /// Each target's hook is invoked exactly once; targets whose index
    /// lacks the capability, or whose hook declines, are left unchanged.
    pub fn map_crs<S, J, T>(
        &self,
        mapping: impl IntoIterator<Item = (S, J)>,
    ) -> Result<Dataset, CrsError>
    where
        S: AsRef<str>,
        J: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let mut ds = self.ds.clone();
        for (source, targets) in mapping {
            let source = source.as_ref();
            let crs = source_crs(&ds, source)?;
            for target in targets {
                let target = target.as_ref();
                if !ds.has_coord(target) {
                    return Err(CrsError::MissingCoord {
                        coord: target.to_string(),
                    });
                }
                let replacement = match ds.index(target) {
                    None => {
                        return Err(CrsError::CoordNotIndexed {
                            coord: target.to_string(),
                        })
                    }
                    Some(index) => crs_aware(index)
                        .and_then(|aware| aware.with_crs(source, &crs)),
                };
                if let Some(replacement) = replacement {
                    ds = ds
                        .set_index(target, replacement)
                        .map_err(|_| CrsError::MissingCoord {
                            coord: target.to_string(),
                        })?;
                }
            }
        }
        Ok(ds)
    }
}

/// Scoped view over a single spatial-reference coordinate.
pub struct CoordProj<'a> {
    aware: &'a dyn CrsAware,
}

impl<'a> CoordProj<'a> {
    pub fn crs(&self) -> Option<&'a Crs> {
        self.aware.crs()
    }
}

impl<'a> std::fmt::Debug for CoordProj<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordProj").finish()
    }
}

/// Overriding is only refused when it would silently change information:
/// an existing different CRS, or a foreign index kind.
fn check_replaceable(
    name: &str,
    existing: &dyn CoordIndex,
    replacement: &Crs,
) -> Result<(), CrsError> {
    let conflict = match existing.as_any().downcast_ref::<CrsIndex>() {
        Some(crs_index) => match crs_index.crs() {
            Some(existing_crs) => existing_crs != replacement,
            None => false,
        },
        None => true,
    };
    if conflict {
        return Err(CrsError::Override {
            coord: name.to_string(),
            existing: existing.inline_repr(DIAG_REPR_WIDTH),
            replacement: replacement.to_string(),
        });
    }
    Ok(())
}

fn source_crs(ds: &Dataset, source: &str) -> Result<Crs, CrsError> {
    if !ds.has_coord(source) {
        return Err(CrsError::MissingCoord {
            coord: source.to_string(),
        });
    }
    let index = ds.index(source).ok_or_else(|| CrsError::CoordNotIndexed {
        coord: source.to_string(),
    })?;
    let crs_index = index
        .as_any()
        .downcast_ref::<CrsIndex>()
        .ok_or_else(|| CrsError::NotCrsAware {
            coord: source.to_string(),
        })?;
    crs_index
        .crs()
        .cloned()
        .ok_or_else(|| CrsError::UnsetCrs {
            coord: source.to_string(),
        })
}
