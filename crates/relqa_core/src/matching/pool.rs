//! Working pools of items with claim tombstones.

use crate::models::{MediaItem, SIDE_A_TAG, SIDE_B_TAG};

/// Which input collection an item came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Old release.
    A,
    /// New release.
    B,
}

impl Side {
    /// Default subgroup tag for this side.
    pub fn tag(self) -> &'static str {
        match self {
            Side::A => SIDE_A_TAG,
            Side::B => SIDE_B_TAG,
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::A => "old",
            Side::B => "new",
        }
    }
}

/// Items of one side; committed items are tombstoned, never removed, so
/// indices stay valid for the whole run.
#[derive(Debug)]
pub struct ItemPool<'a> {
    side: Side,
    items: &'a [MediaItem],
    claimed: Vec<bool>,
}

impl<'a> ItemPool<'a> {
    pub fn new(side: Side, items: &'a [MediaItem]) -> Self {
        Self {
            side,
            items,
            claimed: vec![false; items.len()],
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, idx: usize) -> &'a MediaItem {
        &self.items[idx]
    }

    pub fn is_claimed(&self, idx: usize) -> bool {
        self.claimed[idx]
    }

    /// Mark an item as committed to a group.
    pub fn claim(&mut self, idx: usize) {
        debug_assert!(!self.claimed[idx], "item {} claimed twice", idx);
        self.claimed[idx] = true;
    }

    /// Indices of unclaimed items, in input order.
    pub fn unclaimed(&self) -> Vec<usize> {
        (0..self.items.len()).filter(|&i| !self.claimed[i]).collect()
    }

    /// Unclaimed indices whose items satisfy `pred`.
    pub fn candidates(&self, mut pred: impl FnMut(&MediaItem) -> bool) -> Vec<usize> {
        (0..self.items.len())
            .filter(|&i| !self.claimed[i] && pred(&self.items[i]))
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.claimed.iter().filter(|c| !**c).count()
    }
}
