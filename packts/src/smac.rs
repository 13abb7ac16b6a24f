#![cfg(feature = "ethernet")]

//! Source MAC substitution driven by a six entry byte table.

use crate::eth::{EthHeader, MAC_LEN};

pub const SMAC_TABLE_LEN: u32 = MAC_LEN as u32;

/// Byte-at-index view of the replacement source address.
///
/// Index 0 is the most significant byte. Any entry may be absent, and an
/// implementation backed by shared memory may change between two calls.
pub trait SmacTable {
    fn get(&self, index: u32) -> Option<u8>;

    /// Present entries in index order.
    #[inline(always)]
    fn present(&self) -> impl Iterator<Item = (u32, u8)> {
        (0..SMAC_TABLE_LEN).filter_map(move |i| self.get(i).map(|b| (i, b)))
    }
}

/// Compiled-in replacement address. Every entry is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedMac(pub [u8; MAC_LEN]);

impl SmacTable for FixedMac {
    #[inline(always)]
    fn get(&self, index: u32) -> Option<u8> {
        self.0.get(index as usize).copied()
    }
}

impl SmacTable for [Option<u8>; MAC_LEN] {
    #[inline(always)]
    fn get(&self, index: u32) -> Option<u8> {
        self.as_slice().get(index as usize).copied().flatten()
    }
}

impl<T: SmacTable + ?Sized> SmacTable for &T {
    #[inline(always)]
    fn get(&self, index: u32) -> Option<u8> {
        (**self).get(index)
    }

    #[inline(always)]
    fn present(&self) -> impl Iterator<Item = (u32, u8)> {
        (**self).present()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RewriteStrategy {
    /// Six independent lookups, one per address byte.
    #[default]
    PerIndex,
    /// Walk whatever entries the table reports as present.
    Iterate,
}

/// Set of source address indices that were overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WrittenMask(u8);

impl WrittenMask {
    pub const NONE: WrittenMask = WrittenMask(0);
    pub const ALL: WrittenMask = WrittenMask(0b0011_1111);

    #[inline(always)]
    pub fn set(&mut self, index: u32) {
        self.0 |= 1 << index;
    }

    #[inline(always)]
    pub fn contains(&self, index: u32) -> bool {
        index < SMAC_TABLE_LEN && self.0 & (1 << index) != 0
    }

    #[inline(always)]
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    #[inline(always)]
    pub fn bits(&self) -> u8 {
        self.0
    }
}

#[inline(always)]
pub fn rewrite_source<T: SmacTable>(
    header: &mut EthHeader,
    table: &T,
    strategy: RewriteStrategy,
) -> WrittenMask {
    match strategy {
        RewriteStrategy::PerIndex => rewrite_per_index(header, table),
        RewriteStrategy::Iterate => rewrite_iterate(header, table),
    }
}

#[inline(always)]
fn rewrite_per_index<T: SmacTable>(header: &mut EthHeader, table: &T) -> WrittenMask {
    let mut written = WrittenMask::NONE;
    // ループ展開させるために固定長で回す
    for i in 0..SMAC_TABLE_LEN {
        if let Some(b) = table.get(i) {
            header.source_address[i as usize] = b;
            written.set(i);
        }
    }
    written
}

#[inline(always)]
fn rewrite_iterate<T: SmacTable>(header: &mut EthHeader, table: &T) -> WrittenMask {
    let mut written = WrittenMask::NONE;
    for (i, b) in table.present() {
        if let Some(slot) = header.source_address.get_mut(i as usize) {
            *slot = b;
            written.set(i);
        }
    }
    written
}
