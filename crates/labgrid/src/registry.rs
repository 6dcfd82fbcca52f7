//! Process-wide extension capability registry.
//!
//! Extension crates define optional capability traits (say, "this index can
//! report a coordinate reference system") that arbitrary third-party
//! [`CoordIndex`](crate::CoordIndex) implementations may support. The
//! container cannot name those traits, so discovery goes through this
//! registry: an implementation registers a caster from `&dyn Any` to its
//! capability trait object, and a container-level operation later probes by
//! `(capability, concrete type)` pair. Absent registrations resolve to
//! `None`, which callers treat as "capability not supported".
//!
//! Registration is idempotent (re-registering a pair overwrites the
//! caster). Writes happen at extension setup time; all later traffic is
//! read-only lookups.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

type CasterMap = HashMap<(TypeId, TypeId), Box<dyn Any + Send + Sync>>;

static CASTERS: OnceLock<RwLock<CasterMap>> = OnceLock::new();

fn casters() -> &'static RwLock<CasterMap> {
    CASTERS.get_or_init(|| RwLock::new(HashMap::new()))
}

pub struct ExtensionRegistry;

impl ExtensionRegistry {
    /// Register a caster from the concrete type `T` to the capability trait
    /// object `C`.
    pub fn register<C, T>(caster: fn(&dyn Any) -> Option<&C>)
    where
        C: ?Sized + 'static,
        T: 'static,
    {
        let key = (TypeId::of::<C>(), TypeId::of::<T>());
        let mut map = match casters().write() {
            Ok(map) => map,
            // A poisoned lock only means a registration panicked; the map
            // itself is still a valid HashMap.
            Err(poisoned) => poisoned.into_inner(),
        };
        map.insert(key, Box::new(caster));
    }

    /// Probe `value` for capability `C`.
    pub fn lookup<C>(value: &dyn Any) -> Option<&C>
    where
        C: ?Sized + 'static,
    {
        let key = (TypeId::of::<C>(), value.type_id());
        let caster: fn(&dyn Any) -> Option<&C> = {
            let map = match casters().read() {
                Ok(map) => map,
                Err(poisoned) => poisoned.into_inner(),
            };
            *map.get(&key)?.downcast_ref::<fn(&dyn Any) -> Option<&C>>()?
        };
        caster(value)
    }
}
