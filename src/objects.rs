//! Client-side object id bookkeeping.
//!
//! Ids are a namespace shared with the compositor: an id is handed out when
//! the client creates or binds an object, and only becomes reusable once the
//! compositor confirms deletion (or a one-shot object is retired locally).

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    protocol::{ObjectType, WL_DISPLAY_ID, WL_REGISTRY_ID},
};

/// First id of the server-allocated range; client ids stay below it.
pub const SERVER_ID_START: u32 = 0xFF00_0000;

/// Table of live client-side objects, indexed directly by id.
///
/// Slot 0 is never used. Slots 1 and 2 hold the display and registry
/// singletons for the lifetime of the connection. The table grows on demand;
/// allocation always returns the lowest free id.
#[derive(Debug)]
pub struct ObjectMap {
    slots: Vec<Option<ObjectType>>,
    limit: u32,
}

impl Default for ObjectMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectMap {
    pub fn new() -> Self {
        Self::with_limit(SERVER_ID_START)
    }

    /// Creates a table that refuses to hand out ids at or above `limit`.
    pub fn with_limit(limit: u32) -> Self {
        Self {
            slots: vec![None, Some(ObjectType::Display), Some(ObjectType::Registry)],
            limit,
        }
    }

    /// Allocates the lowest free id and tags it with `kind`.
    ///
    /// # Errors
    /// Returns [`Error::CapacityExhausted`] when every id below the limit is live.
    pub fn allocate(&mut self, kind: ObjectType) -> Result<u32> {
        let free = self
            .slots
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, slot)| slot.is_none())
            .map(|(id, _)| id);

        let id = match free {
            Some(id) => id,
            None => {
                if self.slots.len() >= self.limit as usize {
                    return Err(Error::CapacityExhausted);
                }
                self.slots.push(None);
                self.slots.len() - 1
            }
        };

        self.slots[id] = Some(kind);
        debug!(id, interface = %kind, "allocated object id");
        Ok(id as u32)
    }

    /// Releases `id` for reuse, returning the type it had.
    ///
    /// The display and registry singletons are never released.
    pub fn free(&mut self, id: u32) -> Option<ObjectType> {
        if id == WL_DISPLAY_ID || id == WL_REGISTRY_ID {
            warn!(id, "refusing to free a bootstrap singleton id");
            return None;
        }

        let released = self.slots.get_mut(id as usize).and_then(Option::take);
        match released {
            Some(kind) => debug!(id, interface = %kind, "released object id"),
            None => debug!(id, "release of an id that was not live"),
        }
        released
    }

    pub fn get(&self, id: u32) -> Option<ObjectType> {
        self.slots.get(id as usize).copied().flatten()
    }

    pub fn is_live(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Number of live ids, singletons included.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn singletons_are_preallocated() {
        let objects = ObjectMap::new();

        assert_eq!(objects.get(WL_DISPLAY_ID), Some(ObjectType::Display));
        assert_eq!(objects.get(WL_REGISTRY_ID), Some(ObjectType::Registry));
        assert_eq!(objects.get(0), None);
    }

    #[test]
    fn first_allocation_follows_singletons() {
        let mut objects = ObjectMap::new();

        assert_eq!(objects.allocate(ObjectType::Callback).unwrap(), 3);
        assert_eq!(objects.allocate(ObjectType::Compositor).unwrap(), 4);
    }

    #[test]
    fn freed_id_is_reused_first() {
        let mut objects = ObjectMap::new();
        let callback = objects.allocate(ObjectType::Callback).unwrap();
        objects.allocate(ObjectType::Shm).unwrap();

        assert_eq!(objects.free(callback), Some(ObjectType::Callback));
        assert_eq!(objects.allocate(ObjectType::Callback).unwrap(), callback);
    }

    #[test]
    fn singletons_cannot_be_freed() {
        let mut objects = ObjectMap::new();

        assert_eq!(objects.free(WL_DISPLAY_ID), None);
        assert_eq!(objects.free(WL_REGISTRY_ID), None);
        assert!(objects.is_live(WL_DISPLAY_ID));
        assert!(objects.is_live(WL_REGISTRY_ID));
    }

    #[test]
    fn exhaustion_is_reported() {
        let mut objects = ObjectMap::with_limit(5);

        assert_eq!(objects.allocate(ObjectType::Callback).unwrap(), 3);
        assert_eq!(objects.allocate(ObjectType::Callback).unwrap(), 4);
        assert!(matches!(
            objects.allocate(ObjectType::Callback),
            Err(Error::CapacityExhausted)
        ));

        objects.free(3);
        assert_eq!(objects.allocate(ObjectType::Surface).unwrap(), 3);
    }

    #[test]
    fn table_grows_past_the_old_fixed_size() {
        let mut objects = ObjectMap::new();
        for _ in 0..300 {
            objects.allocate(ObjectType::Buffer).unwrap();
        }
        assert_eq!(objects.live_count(), 302);
        assert_eq!(objects.get(302), Some(ObjectType::Buffer));
    }

    proptest! {
        #[test]
        fn live_ids_are_unique(ops in prop::collection::vec(any::<(bool, u8)>(), 1..200)) {
            let mut objects = ObjectMap::new();
            let mut live: HashSet<u32> = HashSet::new();

            for (allocate, pick) in ops {
                if allocate || live.is_empty() {
                    let id = objects.allocate(ObjectType::Callback).unwrap();
                    prop_assert!(id > WL_REGISTRY_ID);
                    prop_assert!(live.insert(id), "id {} handed out twice", id);
                } else {
                    let mut ids: Vec<u32> = live.iter().copied().collect();
                    ids.sort_unstable();
                    let victim = ids[pick as usize % ids.len()];
                    prop_assert_eq!(objects.free(victim), Some(ObjectType::Callback));
                    live.remove(&victim);
                }
            }

            prop_assert_eq!(objects.live_count(), live.len() + 2);
        }
    }
}
