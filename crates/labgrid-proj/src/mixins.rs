//! Optional CRS-awareness capability for third-party indexes.
//!
//! Any [`CoordIndex`] implementation may opt into CRS handling by
//! implementing [`CrsAware`] and registering itself with
//! [`register_crs_aware`]. Container-level operations discover the
//! capability through [`crs_aware`] and fall back to a no-op when it is
//! absent; nothing is ever propagated to an index the caller did not name.

use labgrid::{CoordIndex, ExtensionRegistry};

use crate::crs::Crs;
use crate::index::CrsIndex;

/// The two optional hooks a CRS-aware index provides.
pub trait CrsAware {
    /// Get hook: the CRS this index currently carries, if any.
    fn crs(&self) -> Option<&Crs>;

    /// Set hook: build a replacement index carrying `crs`.
    ///
    /// `crs_coord_name` names the spatial-reference coordinate the CRS was
    /// propagated from. Returning `None` declares the hook unsupported and
    /// leaves the index unchanged.
    fn with_crs(&self, crs_coord_name: &str, crs: &Crs) -> Option<Box<dyn CoordIndex>> {
        let _ = (crs_coord_name, crs);
        None
    }
}

/// Register a third-party index type as CRS-aware so container-level
/// operations can discover the capability. Idempotent.
pub fn register_crs_aware<T>()
where
    T: CrsAware + 'static,
{
    ExtensionRegistry::register::<dyn CrsAware, T>(|any| {
        any.downcast_ref::<T>().map(|index| index as &dyn CrsAware)
    });
}

/// Capability query: the CRS-aware view of an index, if it has one.
///
/// [`CrsIndex`] is recognized directly; every other kind resolves through
/// the registry.
pub fn crs_aware(index: &dyn CoordIndex) -> Option<&dyn CrsAware> {
    if let Some(crs_index) = index.as_any().downcast_ref::<CrsIndex>() {
        return Some(crs_index);
    }
    ExtensionRegistry::lookup::<dyn CrsAware>(index.as_any())
}
