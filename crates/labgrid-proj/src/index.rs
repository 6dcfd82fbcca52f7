//! The CRS coordinate index.
//!
//! A [`CrsIndex`] anchors one CRS descriptor (or "unset") to a scalar
//! spatial-reference coordinate. It implements the host's
//! [`CoordIndex`] protocol, so dataset alignment, merging, and
//! concatenation compare and reconcile CRS metadata without the host
//! knowing what a CRS is.

use std::any::Any;

use labgrid::{CoordIndex, CoordValue};

use crate::crs::Crs;
use crate::error::CrsError;
use crate::mixins::CrsAware;

#[derive(Debug, Clone, PartialEq)]
pub struct CrsIndex {
    coord_name: String,
    crs: Option<Crs>,
}

impl CrsIndex {
    /// Build an index carrying `crs` for the named coordinate. `None`
    /// means "no CRS information": such an index is compatible with
    /// anything during alignment.
    pub fn new(coord_name: impl Into<String>, crs: Option<Crs>) -> Self {
        Self {
            coord_name: coord_name.into(),
            crs,
        }
    }

    /// Parse `input` and build the index in one step.
    pub fn from_input(
        coord_name: impl Into<String>,
        input: Option<&str>,
    ) -> Result<Self, CrsError> {
        let crs = input.map(Crs::from_user_input).transpose()?;
        Ok(Self::new(coord_name, crs))
    }

    /// Host-facing constructor: a CRS index anchors to exactly one scalar
    /// coordinate. Every path that attaches an index to an existing
    /// coordinate goes through here, so an array coordinate can never end
    /// up carrying one.
    pub fn from_coord(
        coord_name: &str,
        value: &CoordValue,
        crs: Option<Crs>,
    ) -> Result<Self, CrsError> {
        if !value.is_scalar() {
            return Err(CrsError::NotScalar {
                coord: coord_name.to_string(),
            });
        }
        Ok(Self::new(coord_name, crs))
    }

    pub fn coord_name(&self) -> &str {
        &self.coord_name
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    /// Combination policy: most-defined wins, conflicting defined values
    /// reject.
    ///
    /// `None` marks an irreconcilable pair (both sides defined and
    /// unequal); the host turns that into an alignment failure naming the
    /// coordinate. An unset side is "no information", never a conflicting
    /// value, so a dataset without CRS metadata combines freely with one
    /// that has it.
    pub fn merge_with(&self, other: &CrsIndex) -> Option<CrsIndex> {
        let crs = match (&self.crs, &other.crs) {
            (Some(left), Some(right)) if left != right => return None,
            (Some(left), _) => Some(left.clone()),
            (None, right) => right.clone(),
        };
        Some(CrsIndex::new(self.coord_name.clone(), crs))
    }

    fn format_crs(&self, max_width: usize) -> String {
        match &self.crs {
            Some(crs) => crs.format_compact(max_width),
            None => "None".to_string(),
        }
    }
}

impl CoordIndex for CrsIndex {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn CoordIndex> {
        Box::new(self.clone())
    }

    fn equals(&self, other: &dyn CoordIndex) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => match (&self.crs, &other.crs) {
                (Some(left), Some(right)) => left == right,
                // Either side unset: compatible.
                _ => true,
            },
            None => false,
        }
    }

    fn merge(&self, other: &dyn CoordIndex) -> Option<Box<dyn CoordIndex>> {
        let other = other.as_any().downcast_ref::<Self>()?;
        self.merge_with(other)
            .map(|merged| Box::new(merged) as Box<dyn CoordIndex>)
    }

    fn inline_repr(&self, max_width: usize) -> String {
        let label = "CrsIndex (crs=";
        let width = max_width.saturating_sub(label.len() + 1);
        format!("{label}{})", self.format_crs(width.max(1)))
    }
}

impl CrsAware for CrsIndex {
    fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    fn with_crs(&self, _crs_coord_name: &str, crs: &Crs) -> Option<Box<dyn CoordIndex>> {
        Some(Box::new(CrsIndex::new(
            self.coord_name.clone(),
            Some(crs.clone()),
        )))
    }
}
