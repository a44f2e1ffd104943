// Copyright 2017 Matthew Plant. This file is part of Kine2D.
//
// Kine2D is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Kine2D is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with Kine2D. If not, see <http://www.gnu.org/licenses/>.

use std::mem;
use std::ops::{Index, IndexMut};
use std::vec::Vec;

use serde::{Deserialize, Serialize};

/// Stable handle to a body stored in a World.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyHandle(pub(crate) usize);

/// Stable handle to a collision shape stored in a World.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeHandle(pub(crate) usize);

impl BodyHandle {
    /// Slot index of the body.
    pub fn index(self) -> usize {
        self.0
    }
}

impl ShapeHandle {
    /// Slot index of the shape.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Internal storage type used by Pool.
#[derive(Clone, Debug)]
enum Slot<T> {
    Free { next_free: Option<usize> },
    Occupied(T),
}

/// Growable array type that allows items to be removed and inserted without
/// changing the indices of other entries. Bodies and shapes live in pools so
/// that handles stay valid while the scene changes around them.
#[derive(Clone, Debug)]
pub struct Pool<T> {
    len: usize,
    free_list: Option<usize>,
    slots: Vec<Slot<T>>,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool::new()
    }
}

impl<T> Pool<T> {
    /// Create an empty Pool.
    pub fn new() -> Self {
        Pool {
            len: 0,
            free_list: None,
            slots: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// Push a new item to the Pool. Slots left empty by removed items are
    /// reused before the backing storage grows.
    pub fn push(&mut self, item: T) -> usize {
        self.len += 1;
        if let Some(free) = self.free_list {
            self.free_list = match self.slots[free] {
                Slot::Free { next_free } => next_free,
                Slot::Occupied(_) => unreachable!(),
            };
            self.slots[free] = Slot::Occupied(item);
            free
        } else {
            self.slots.push(Slot::Occupied(item));
            self.slots.len() - 1
        }
    }

    /// Removes the item at i, returning it if the slot was occupied.
    pub fn take(&mut self, i: usize) -> Option<T> {
        if !self.contains(i) {
            return None;
        }
        let freed = Slot::Free { next_free: self.free_list };
        match mem::replace(&mut self.slots[i], freed) {
            Slot::Occupied(item) => {
                self.free_list = Some(i);
                self.len -= 1;
                Some(item)
            }
            Slot::Free { .. } => unreachable!(),
        }
    }

    pub fn contains(&self, i: usize) -> bool {
        match self.slots.get(i) {
            Some(Slot::Occupied(_)) => true,
            _ => false,
        }
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        match self.slots.get(i) {
            Some(Slot::Occupied(item)) => Some(item),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, i: usize) -> Option<&mut T> {
        match self.slots.get_mut(i) {
            Some(Slot::Occupied(item)) => Some(item),
            _ => None,
        }
    }

    /// Iterates over occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(item) => Some(item),
            Slot::Free { .. } => None,
        })
    }

    /// Iterates over occupied slots in index order along with their indices.
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(item) => Some((i, item)),
            Slot::Free { .. } => None,
        })
    }
}

impl<T> Index<usize> for Pool<T> {
    type Output = T;

    fn index(&self, i: usize) -> &T {
        match self.get(i) {
            Some(item) => item,
            None => panic!("index {} is not occupied", i),
        }
    }
}

impl<T> IndexMut<usize> for Pool<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        match self.get_mut(i) {
            Some(item) => item,
            None => panic!("index {} is not occupied", i),
        }
    }
}
