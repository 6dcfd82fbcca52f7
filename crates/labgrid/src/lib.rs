//! labgrid - a minimal labeled-data container with pluggable coordinate
//! indexes.
//!
//! A [`Dataset`] owns named coordinates (scalar or 1-D) and named data
//! variables. Any coordinate may carry an index implementing the
//! [`CoordIndex`] extension point; alignment, merging, and concatenation are
//! driven entirely through the index `equals`/`merge` hooks, so extension
//! crates can teach the container to reconcile their own metadata without
//! the container knowing anything about it.
//!
//! The [`registry`] module provides the second extension point: a
//! capability registry through which extension crates can discover optional
//! interfaces on third-party index implementations.

mod coord;
mod dataset;
mod index;
pub mod registry;

pub use coord::CoordValue;
pub use dataset::{merge_all, AlignError, Dataset, Variable};
pub use index::{truncate_repr, CoordIndex, ValueIndex};
pub use registry::ExtensionRegistry;
