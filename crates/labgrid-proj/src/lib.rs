//! labgrid-proj - CRS-aware coordinate indexing for `labgrid` datasets.
//!
//! The extension attaches a coordinate reference system to a dataset as an
//! indexed scalar coordinate, so alignment, merging, and concatenation
//! compare and reconcile CRS metadata through the host's own indexing
//! machinery. Nothing here reprojects data; the crate is a metadata shim.
//!
//! # Surface
//!
//! - [`Crs`]: opaque descriptor parsed and validated by `proj4rs`.
//! - [`CrsIndex`]: the coordinate index implementing the host's
//!   [`CoordIndex`](labgrid::CoordIndex) protocol with the
//!   "most-defined-wins, conflicting-defined-values-reject" policy.
//! - [`ProjExt`]: the `.proj()` accessor on
//!   [`Dataset`](labgrid::Dataset) - assign, retrieve, and explicitly
//!   propagate CRS metadata.
//! - [`CrsAware`] / [`register_crs_aware`]: the optional capability
//!   interface third-party indexes implement to participate in CRS
//!   propagation.
//!
//! ```
//! use labgrid::Dataset;
//! use labgrid_proj::ProjExt;
//!
//! let ds = Dataset::new()
//!     .proj()
//!     .assign_crs([("spatial_ref", "EPSG:4326")], false)?;
//! assert_eq!(ds.proj().crs()?.and_then(|crs| crs.epsg()), Some(4326));
//! # Ok::<(), labgrid_proj::CrsError>(())
//! ```

mod accessor;
mod crs;
mod error;
mod index;
mod mixins;

pub use accessor::{CoordProj, ProjAccessor, ProjExt};
pub use crs::{Crs, CrsInput};
pub use error::CrsError;
pub use index::CrsIndex;
pub use mixins::{crs_aware, register_crs_aware, CrsAware};
