// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Indexed binary min-heap for the A* open set.
//!
//! `std::collections::BinaryHeap` cannot lower the key of an entry in place,
//! which forces lazy deletion. Here every open state has exactly one slot,
//! tracked by a hash index, and relaxing it is a sift-up.

use std::hash::Hash;

use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OpenEntry<K> {
    pub key: K,
    pub g: u32,
    pub f: u32,
    seq: u64,
}

impl<K> OpenEntry<K> {
    /// Ordering: lower `f` first, then earlier insertion/relaxation.
    fn precedes(&self, other: &Self) -> bool {
        (self.f, self.seq) < (other.f, other.seq)
    }
}

#[derive(Debug)]
pub(crate) struct OpenSet<K> {
    heap: Vec<OpenEntry<K>>,
    index: FxHashMap<K, usize>,
    next_seq: u64,
}

impl<K: Copy + Eq + Hash> OpenSet<K> {
    pub fn new() -> Self {
        Self { heap: Vec::new(), index: FxHashMap::default(), next_seq: 0 }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Inserts `key`, or lowers its cost if it is already open with a worse
    /// `g`. Returns whether the open set changed.
    pub fn push_or_improve(&mut self, key: K, g: u32, f: u32) -> bool {
        let seq = self.next_seq;
        if let Some(&slot) = self.index.get(&key) {
            if g >= self.heap[slot].g {
                return false;
            }
            self.next_seq += 1;
            let entry = &mut self.heap[slot];
            entry.g = g;
            entry.f = f;
            entry.seq = seq;
            self.sift_up(slot);
            return true;
        }

        self.next_seq += 1;
        let slot = self.heap.len();
        self.heap.push(OpenEntry { key, g, f, seq });
        self.index.insert(key, slot);
        self.sift_up(slot);
        true
    }

    pub fn pop(&mut self) -> Option<OpenEntry<K>> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let entry = self.heap.pop()?;
        self.index.remove(&entry.key);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(entry)
    }

    fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.heap.swap(a, b);
        self.index.insert(self.heap[a].key, a);
        self.index.insert(self.heap[b].key, b);
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.heap[slot].precedes(&self.heap[parent]) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = slot * 2 + 1;
            let right = left + 1;
            let mut best = slot;
            if left < len && self.heap[left].precedes(&self.heap[best]) {
                best = left;
            }
            if right < len && self.heap[right].precedes(&self.heap[best]) {
                best = right;
            }
            if best == slot {
                break;
            }
            self.swap(slot, best);
            slot = best;
        }
    }
}
