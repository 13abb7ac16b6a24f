//! In-process replacement address table.
//!
//! Mirrors the kernel SMAC map: six independently updated one-byte slots.
//! A writer may change any slot while a frame is being rewritten, so a
//! reader can observe a mix of old and new bytes. Nothing here tries to
//! make the six bytes change atomically.

use crate::protocol::MacAddr;
use crate::{Error, Result};
use packts::smac::{SmacTable, SMAC_TABLE_LEN};
use std::sync::atomic::{AtomicU16, Ordering};

const PRESENT: u16 = 0x100;
const LEN: usize = SMAC_TABLE_LEN as usize;

#[derive(Debug, Default)]
pub struct SharedSmacTable {
    // bit 8: present, bits 0-7: value
    slots: [AtomicU16; LEN],
}

impl SharedSmacTable {
    /// Creates a table with every entry absent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: [Option<u8>; LEN]) -> Self {
        let table = Self::new();
        table.load_entries(entries);
        table
    }

    pub fn set(&self, index: u32, value: u8) -> Result<()> {
        self.slot(index)?
            .store(PRESENT | value as u16, Ordering::Release);
        Ok(())
    }

    pub fn clear(&self, index: u32) -> Result<()> {
        self.slot(index)?.store(0, Ordering::Release);
        Ok(())
    }

    /// Writes all six entries, one slot at a time.
    pub fn load_mac(&self, mac: MacAddr) {
        for (slot, b) in self.slots.iter().zip(mac.0) {
            slot.store(PRESENT | b as u16, Ordering::Release);
        }
    }

    pub fn load_entries(&self, entries: [Option<u8>; LEN]) {
        for (slot, entry) in self.slots.iter().zip(entries) {
            slot.store(encode(entry), Ordering::Release);
        }
    }

    pub fn snapshot(&self) -> [Option<u8>; LEN] {
        let mut out = [None; LEN];
        for (o, slot) in out.iter_mut().zip(&self.slots) {
            *o = decode(slot.load(Ordering::Acquire));
        }
        out
    }

    fn slot(&self, index: u32) -> Result<&AtomicU16> {
        self.slots.get(index as usize).ok_or(Error::TableIndex {
            index,
            len: SMAC_TABLE_LEN,
        })
    }
}

impl SmacTable for SharedSmacTable {
    fn get(&self, index: u32) -> Option<u8> {
        let raw = self.slots.get(index as usize)?.load(Ordering::Acquire);
        decode(raw)
    }
}

fn encode(entry: Option<u8>) -> u16 {
    match entry {
        Some(b) => PRESENT | b as u16,
        None => 0,
    }
}

fn decode(raw: u16) -> Option<u8> {
    if raw & PRESENT != 0 {
        Some(raw as u8)
    } else {
        None
    }
}
