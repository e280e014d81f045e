/* SPDX-License-Identifier: MIT */

use crate::BIT;

use x86_64::addr::{PhysAddr, VirtAddr};
use x86_64::structures::paging::frame::PhysFrame;

/// 512
pub const ENTRIES_PER_TABLE: usize = 512;

/// Bit 0
pub const ENTRY_PRESENT: u64 = BIT!(0);
/// Bit 7
pub const ENTRY_HUGE: u64 = BIT!(7);
/// Bits 51:12
pub const ENTRY_ADDR_MASK: u64 = 0x000f_ffff_ffff_f000;

/// One tier of the translation hierarchy, most significant first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableLevel {
    Pgd,
    P4d,
    Pud,
    Pmd,
    Pte,
}

impl TableLevel {
    /// All levels in walk order
    pub const ALL: [TableLevel; 5] = [
        TableLevel::Pgd,
        TableLevel::P4d,
        TableLevel::Pud,
        TableLevel::Pmd,
        TableLevel::Pte,
    ];

    /// Bit position of this level's index field within a virtual address
    pub const fn shift(self) -> u64 {
        match self {
            TableLevel::Pgd => 48,
            TableLevel::P4d => 39,
            TableLevel::Pud => 30,
            TableLevel::Pmd => 21,
            TableLevel::Pte => 12,
        }
    }

    /// Table index selected by `vaddr` at this level
    pub fn index(self, vaddr: VirtAddr) -> usize {
        ((vaddr.as_u64() >> self.shift()) & (ENTRIES_PER_TABLE as u64 - 1)) as usize
    }
}

/// Raw 64-bit page-table entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct RawEntry(u64);

/// What a raw entry means at a given level of the hierarchy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    /// Maps the next, less significant table
    Table(PhysAddr),
    /// Terminates at a page frame (leaf level only)
    Frame(PhysFrame),
    /// Not present
    Absent,
    /// Present but unusable for the walk
    Malformed,
}

impl RawEntry {
    pub const fn new(bits: u64) -> Self {
        RawEntry(bits)
    }

    pub const fn zero() -> Self {
        RawEntry(0)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    /// Classify this entry as seen at `level`.
    ///
    /// Intermediate entries with the huge bit set are `Malformed`: only
    /// base-size leaf mappings are supported, so a large mapping where a
    /// table is expected cannot be followed.
    pub fn classify(self, level: TableLevel) -> EntryKind {
        if self.0 & ENTRY_PRESENT == 0 {
            return EntryKind::Absent;
        }

        let pa: PhysAddr = PhysAddr::new(self.0 & ENTRY_ADDR_MASK);
        match level {
            TableLevel::Pte => EntryKind::Frame(PhysFrame::containing_address(pa)),
            _ if self.0 & ENTRY_HUGE != 0 => EntryKind::Malformed,
            _ => EntryKind::Table(pa),
        }
    }
}
