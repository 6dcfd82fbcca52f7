//! The coordinate-index extension point.
//!
//! An index attaches behavior to a named coordinate: label lookup, metadata
//! comparison, anything the container itself does not interpret. The
//! container only ever calls through [`CoordIndex`], so index kinds defined
//! in other crates participate in alignment on equal footing with the
//! built-in [`ValueIndex`].

use std::any::Any;

use crate::coord::CoordValue;

/// Per-coordinate index protocol invoked by the dataset combination engine.
///
/// `equals` is the sole predicate alignment uses to decide whether two
/// same-named indexed coordinates are compatible. `merge` is invoked when
/// two datasets are combined along a shared coordinate; returning `None`
/// marks the pair as conflicting and the caller surfaces an
/// [`AlignError::IndexConflict`](crate::AlignError::IndexConflict) built
/// from both sides' `inline_repr`.
pub trait CoordIndex: std::fmt::Debug {
    /// Concrete-type access for capability queries and cross-kind equality
    /// checks.
    fn as_any(&self) -> &dyn Any;

    fn clone_box(&self) -> Box<dyn CoordIndex>;

    /// Compatibility predicate. Indexes of different concrete kinds compare
    /// not-equal by convention.
    fn equals(&self, other: &dyn CoordIndex) -> bool;

    /// Combination hook. The default keeps the left side when the two
    /// indexes are equal and reports a conflict otherwise.
    fn merge(&self, other: &dyn CoordIndex) -> Option<Box<dyn CoordIndex>> {
        if self.equals(other) {
            Some(self.clone_box())
        } else {
            None
        }
    }

    /// One-line representation used in diagnostics. Implementations should
    /// include whatever identifies the indexed metadata (an authority code,
    /// a value count) and respect `max_width` via [`truncate_repr`].
    fn inline_repr(&self, max_width: usize) -> String;
}

impl Clone for Box<dyn CoordIndex> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Truncate a representation string to `max_width` characters, marking the
/// cut with a trailing ellipsis.
pub fn truncate_repr(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_width).collect();
        format!("{head} ...")
    }
}

/// Default index over a coordinate's values: exact-label lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueIndex {
    coord_name: String,
    values: Vec<f64>,
}

impl ValueIndex {
    pub fn from_coord(name: impl Into<String>, value: &CoordValue) -> Self {
        Self {
            coord_name: name.into(),
            values: value.values().to_vec(),
        }
    }

    pub fn coord_name(&self) -> &str {
        &self.coord_name
    }

    /// Position of the first label exactly equal to `label`.
    pub fn get_loc(&self, label: f64) -> Option<usize> {
        self.values.iter().position(|v| *v == label)
    }
}

impl CoordIndex for ValueIndex {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_box(&self) -> Box<dyn CoordIndex> {
        Box::new(self.clone())
    }

    fn equals(&self, other: &dyn CoordIndex) -> bool {
        match other.as_any().downcast_ref::<Self>() {
            Some(other) => self.values == other.values,
            None => false,
        }
    }

    fn inline_repr(&self, max_width: usize) -> String {
        truncate_repr(
            &format!("ValueIndex ({} labels)", self.values.len()),
            max_width,
        )
    }
}
