/* SPDX-License-Identifier: MIT */

//! Synthetic page-table hierarchies for tests.

use crate::mem::entry::{RawEntry, TableLevel, ENTRIES_PER_TABLE, ENTRY_PRESENT};
use crate::mem::walk::TableSource;

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::Cell;
use x86_64::addr::{PhysAddr, VirtAddr};

/// In-memory table source with map/unmap accounting.
pub(crate) struct FakeTableSource {
    tables: Vec<(u64, Box<[RawEntry; ENTRIES_PER_TABLE]>)>,
    maps: Cell<usize>,
    unmaps: Cell<usize>,
}

impl FakeTableSource {
    pub(crate) fn new() -> Self {
        FakeTableSource {
            tables: Vec::new(),
            maps: Cell::new(0),
            unmaps: Cell::new(0),
        }
    }

    /// Build a hierarchy that fully maps `va` to the frame at `frame`,
    /// with one table per level laid out from `root` upwards.
    pub(crate) fn with_mapping(root: u64, va: VirtAddr, frame: u64) -> Self {
        let mut src: FakeTableSource = FakeTableSource::new();
        src.add_table(root);

        let mut table: u64 = root;
        for level in [
            TableLevel::Pgd,
            TableLevel::P4d,
            TableLevel::Pud,
            TableLevel::Pmd,
        ] {
            let next: u64 = Self::table_at_level(root, level) + 0x1000;
            src.add_table(next);
            src.set_entry(table, level.index(va), next | ENTRY_PRESENT);
            table = next;
        }

        src.set_entry(table, TableLevel::Pte.index(va), frame | ENTRY_PRESENT);
        src
    }

    /// Physical address of the table inspected at `level` in a
    /// `with_mapping` hierarchy rooted at `root`.
    pub(crate) fn table_at_level(root: u64, level: TableLevel) -> u64 {
        let depth: u64 = match level {
            TableLevel::Pgd => 0,
            TableLevel::P4d => 1,
            TableLevel::Pud => 2,
            TableLevel::Pmd => 3,
            TableLevel::Pte => 4,
        };

        root + depth * 0x1000
    }

    pub(crate) fn add_table(&mut self, pa: u64) {
        self.tables
            .push((pa, Box::new([RawEntry::zero(); ENTRIES_PER_TABLE])));
    }

    pub(crate) fn set_entry(&mut self, table: u64, idx: usize, bits: u64) {
        let t: &mut (u64, Box<[RawEntry; ENTRIES_PER_TABLE]>) = self
            .tables
            .iter_mut()
            .find(|(pa, _)| *pa == table)
            .expect("no such table");
        t.1[idx] = RawEntry::new(bits);
    }

    pub(crate) fn clear_entry(&mut self, table: u64, idx: usize) {
        self.set_entry(table, idx, 0);
    }

    pub(crate) fn map_count(&self) -> usize {
        self.maps.get()
    }

    pub(crate) fn unmap_count(&self) -> usize {
        self.unmaps.get()
    }
}

impl TableSource for FakeTableSource {
    fn map_table(&self, pa: PhysAddr) -> Option<&[RawEntry; ENTRIES_PER_TABLE]> {
        let entries: &[RawEntry; ENTRIES_PER_TABLE] = self
            .tables
            .iter()
            .find(|(p, _)| *p == pa.as_u64())
            .map(|(_, t)| &**t)?;

        self.maps.set(self.maps.get() + 1);
        Some(entries)
    }

    fn unmap_table(&self, _pa: PhysAddr) {
        self.unmaps.set(self.unmaps.get() + 1);
    }
}
