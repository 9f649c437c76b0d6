//! A slot arena addressed by [`StateId`] handles.
//!
//! States refer to each other (parent links, fail links) by handle rather than by
//! reference, so the failure builder can reassign links freely and pruning can
//! release a state without any dangling pointer. Released slots go on a free-list
//! and are reused by later allocations.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Handle of a state inside a [`StateArena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
    /// The root state; allocated first and never released.
    pub const ROOT: StateId = StateId(0);

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    /// True for [`StateId::ROOT`].
    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Debug for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

pub(crate) struct StateArena<T> {
    slots: Vec<Option<T>>,
    free_list: Vec<StateId>,
    len: usize,
}

impl<T> StateArena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        StateArena {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Stores a value and returns its handle, reusing a released slot when one exists.
    pub fn alloc(&mut self, value: T) -> StateId {
        self.len += 1;
        if let Some(id) = self.free_list.pop() {
            debug_assert!(self.slots[id.index()].is_none());
            self.slots[id.index()] = Some(value);
            return id;
        }
        let raw = u32::try_from(self.slots.len()).expect("state arena exhausted u32 handles");
        self.slots.push(Some(value));
        StateId(raw)
    }

    /// Takes the value out of its slot and puts the slot on the free-list.
    ///
    /// Panics if the handle was already released.
    pub fn release(&mut self, id: StateId) -> T {
        debug_assert!(!id.is_root(), "the root state is never released");
        let value = self.slots[id.index()]
            .take()
            .expect("released a state that was not live");
        self.free_list.push(id);
        self.len -= 1;
        value
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of slots ever allocated; every live handle indexes below this bound.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Iterates over live values with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (StateId(i as u32), v)))
    }

    /// Removes every live value, leaving the arena empty.
    pub fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.free_list.clear();
        self.len = 0;
        self.slots.drain(..).flatten()
    }
}

impl<T> Index<StateId> for StateArena<T> {
    type Output = T;

    #[inline]
    fn index(&self, id: StateId) -> &T {
        self.slots[id.index()]
            .as_ref()
            .expect("dangling state handle")
    }
}

impl<T> IndexMut<StateId> for StateArena<T> {
    #[inline]
    fn index_mut(&mut self, id: StateId) -> &mut T {
        self.slots[id.index()]
            .as_mut()
            .expect("dangling state handle")
    }
}
