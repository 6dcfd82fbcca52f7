use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrsError {
    /// Input the geodesy parser could not interpret as a CRS.
    #[error("invalid CRS input {input:?}: {reason}")]
    InvalidCrs { input: String, reason: String },

    /// A CRS index can only anchor to a single scalar coordinate.
    #[error("can only build a CRS index from one scalar coordinate (got {coord:?})")]
    NotScalar { coord: String },

    /// Replacing an existing, different CRS requires explicit permission.
    #[error(
        "coordinate {coord:?} already has an index ({existing}); \
         set allow_override to replace it with {replacement}"
    )]
    Override {
        coord: String,
        existing: String,
        replacement: String,
    },

    /// CRS-bearing coordinates disagree, so "the CRS of this dataset" is
    /// not well-defined. Each entry names a coordinate and its CRS.
    #[error("found conflicting CRS values across coordinates: {conflicts:?}")]
    AmbiguousCrs { conflicts: Vec<(String, String)> },

    #[error("no coordinate {coord:?} found in dataset")]
    MissingCoord { coord: String },

    #[error("coordinate {coord:?} has no index")]
    CoordNotIndexed { coord: String },

    #[error("coordinate {coord:?} index is not CRS-aware")]
    NotCrsAware { coord: String },

    /// Propagation source with nothing to propagate.
    #[error("coordinate {coord:?} carries no CRS to propagate")]
    UnsetCrs { coord: String },

    #[error("no CRS found in dataset")]
    NoCrs,

    #[error("multiple CRS found in dataset")]
    MultipleCrs,
}
