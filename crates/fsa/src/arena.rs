//!
//! A slot arena with generation checked keys. Removing a value frees its slot
//! for reuse, and bumps the generation of the slot so that keys to the removed
//! value are never confused with keys to a later value in the same slot.
//!

use std::fmt;

/// A key into an [Arena]. The `owner` tag identifies the arena that handed out
/// the key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Key {
    owner: u32,
    index: u32,
    generation: u32,
}

impl Key {
    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "{}", self.index)
        } else {
            write!(f, "{}.{}", self.index, self.generation)
        }
    }
}

#[derive(Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Clone)]
pub(crate) struct Arena<T> {
    owner: u32,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) fn new(owner: u32) -> Arena<T> {
        Arena {
            owner,
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Reserves a slot that stays vacant forever, and returns its key. The key
    /// is never handed out by [Arena::insert].
    pub(crate) fn reserve(&mut self) -> Key {
        self.slots.push(Slot {
            generation: 0,
            value: None,
        });

        Key {
            owner: self.owner,
            index: (self.slots.len() - 1) as u32,
            generation: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> Key {
        self.len += 1;

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none(), "A free slot must be vacant");
            slot.value = Some(value);

            Key {
                owner: self.owner,
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });

            Key {
                owner: self.owner,
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Removes the value for the given key, returns None when the key is stale
    /// or belongs to another arena.
    pub(crate) fn remove(&mut self, key: Key) -> Option<T> {
        if !self.contains(key) {
            return None;
        }

        let slot = &mut self.slots[key.index()];
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        self.len -= 1;
        value
    }

    pub(crate) fn contains(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn get(&self, key: Key) -> Option<&T> {
        if key.owner != self.owner {
            return None;
        }

        self.slots
            .get(key.index())
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        if key.owner != self.owner {
            return None;
        }

        self.slots
            .get_mut(key.index())
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Iterates over all occupied slots in index order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (Key, &T)> + '_ {
        let owner = self.owner;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            slot.value.as_ref().map(|value| {
                (
                    Key {
                        owner,
                        index: index as u32,
                        generation: slot.generation,
                    },
                    value,
                )
            })
        })
    }

    /// Consumes the arena, yielding all values with their keys in index order.
    pub(crate) fn into_entries(self) -> impl Iterator<Item = (Key, T)> {
        let owner = self.owner;
        self.slots.into_iter().enumerate().filter_map(move |(index, slot)| {
            let generation = slot.generation;
            slot.value.map(|value| {
                (
                    Key {
                        owner,
                        index: index as u32,
                        generation,
                    },
                    value,
                )
            })
        })
    }

    /// Returns the number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Removes all values, reserved slots are kept.
    pub(crate) fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }

        self.len = 0;
    }
}
