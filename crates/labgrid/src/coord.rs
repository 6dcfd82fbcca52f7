//! Coordinate values.

/// Value held by a named coordinate: a single scalar, or a 1-D array laid
/// out along a named dimension.
///
/// Scalar coordinates carry no positional labels; they exist to anchor
/// metadata-only indexes (a coordinate reference system, a calendar epoch)
/// to the dataset so the alignment machinery can compare them.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordValue {
    Scalar(f64),
    Array { dim: String, data: Vec<f64> },
}

impl CoordValue {
    pub fn scalar(value: f64) -> Self {
        Self::Scalar(value)
    }

    pub fn array(dim: impl Into<String>, data: Vec<f64>) -> Self {
        Self::Array {
            dim: dim.into(),
            data,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Dimension name for array coordinates, `None` for scalars.
    pub fn dim(&self) -> Option<&str> {
        match self {
            Self::Scalar(_) => None,
            Self::Array { dim, .. } => Some(dim),
        }
    }

    /// Number of labels: 1 for a scalar, the data length for an array.
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Array { data, .. } => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> &[f64] {
        match self {
            Self::Scalar(v) => std::slice::from_ref(v),
            Self::Array { data, .. } => data,
        }
    }
}
