//! ID registry

use super::{encode_id, ObjectId, MAX_OBJECT_ID};
use crate::error::{Error, Result};
use crate::scene::Color;
use std::collections::HashMap;

/// Issues dense object IDs and caches their colours.
///
/// Each engine owns its own registry, so several independent engines can
/// live in one process.
#[derive(Debug, Default)]
pub struct IdRegistry {
    /// Last issued ID; 0 when nothing was issued.
    last: u32,

    /// Colour cache.
    colors: HashMap<ObjectId, Color>,
}

impl IdRegistry {
    /// Returns a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh ID. IDs increase monotonically from 1.
    ///
    /// Refuses to issue an ID that the colour encoding cannot represent
    /// rather than wrapping onto an existing ID's colour.
    pub fn next_id(&mut self) -> Result<ObjectId> {
        let id = self.last + 1;
        if id > MAX_OBJECT_ID {
            error!("Too many tracked objects: ID {id} exceeds {MAX_OBJECT_ID}");
            return Err(Error::CapacityExceeded {
                id,
                max: MAX_OBJECT_ID,
            });
        }
        self.last = id;
        Ok(ObjectId::new(id))
    }

    /// Returns the ID colour for `id`, or black for untracked objects.
    ///
    /// * `id` - The object ID.
    pub fn color_for(&mut self, id: Option<ObjectId>) -> Color {
        match id {
            Some(id) if !id.is_background() => {
                *self.colors.entry(id).or_insert_with(|| encode_id(id))
            }
            _ => Color::BLACK,
        }
    }

    /// Returns true if `id` was issued and not invalidated by `clear()`.
    ///
    /// * `id` - The object ID.
    pub fn contains(&self, id: ObjectId) -> bool {
        id.get() >= 1 && id.get() <= self.last
    }

    /// Returns the number of issued IDs.
    pub fn count(&self) -> u32 {
        self.last
    }

    /// Invalidates every issued ID and restarts numbering. The owner must
    /// release any GPU state indexed by the old IDs.
    pub fn clear(&mut self) {
        self.last = 0;
        self.colors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut registry = IdRegistry::new();
        let a = registry.next_id().unwrap();
        let b = registry.next_id().unwrap();
        assert_eq!(a.get(), 1);
        assert_eq!(b.get(), 2);
        assert_eq!(registry.count(), 2);
        assert!(registry.contains(a));
        assert!(!registry.contains(ObjectId::new(3)));
        assert!(!registry.contains(ObjectId::BACKGROUND));
    }

    #[test]
    fn colors_are_cached_and_black_for_untracked() {
        let mut registry = IdRegistry::new();
        let id = registry.next_id().unwrap();
        assert_eq!(registry.color_for(Some(id)), registry.color_for(Some(id)));
        assert_eq!(registry.color_for(None), Color::BLACK);
        assert_eq!(registry.color_for(Some(ObjectId::BACKGROUND)), Color::BLACK);
    }

    #[test]
    fn clear_restarts_numbering() {
        let mut registry = IdRegistry::new();
        registry.next_id().unwrap();
        registry.next_id().unwrap();
        registry.clear();
        assert_eq!(registry.count(), 0);
        assert_eq!(registry.next_id().unwrap().get(), 1);
    }

    #[test]
    fn capacity_is_refused_not_wrapped() {
        let mut registry = IdRegistry::new();
        registry.last = MAX_OBJECT_ID - 1;
        assert_eq!(registry.next_id().unwrap().get(), MAX_OBJECT_ID);
        assert_eq!(
            registry.next_id(),
            Err(Error::CapacityExceeded {
                id: MAX_OBJECT_ID + 1,
                max: MAX_OBJECT_ID
            })
        );
        assert_eq!(registry.count(), MAX_OBJECT_ID);
    }
}
