/* SPDX-License-Identifier: MIT */

use crate::getter_func;
use crate::mem::entry::{EntryKind, RawEntry, TableLevel, ENTRIES_PER_TABLE};

use x86_64::addr::{PhysAddr, VirtAddr};
use x86_64::structures::paging::frame::PhysFrame;

/// Access to the page-table frames of one address space.
///
/// The walk borrows one table at a time through `map_table` and gives it
/// back through `unmap_table` once the entry has been read. A privileged
/// embedding typically backs this with a transient kernel mapping of the
/// frame; the mapping must stay valid until the matching `unmap_table`.
pub trait TableSource {
    /// Borrow the page table located at `pa`. Returns `None` if the
    /// frame cannot be inspected.
    fn map_table(&self, pa: PhysAddr) -> Option<&[RawEntry; ENTRIES_PER_TABLE]>;

    /// Release the transient mapping established by `map_table`.
    fn unmap_table(&self, _pa: PhysAddr) {}
}

/// A page table borrowed from a [`TableSource`]. The table is given back
/// when the guard is dropped, on every return path of the walk.
pub struct TableMapGuard<'a> {
    source: &'a dyn TableSource,
    pa: PhysAddr,
    entries: &'a [RawEntry; ENTRIES_PER_TABLE],
}

impl<'a> TableMapGuard<'a> {
    pub fn new(source: &'a dyn TableSource, pa: PhysAddr) -> Option<Self> {
        let entries: &[RawEntry; ENTRIES_PER_TABLE] = source.map_table(pa)?;
        Some(TableMapGuard {
            source,
            pa,
            entries,
        })
    }

    pub fn entry(&self, idx: usize) -> RawEntry {
        self.entries[idx]
    }

    getter_func!(pa, PhysAddr);
}

impl Drop for TableMapGuard<'_> {
    fn drop(&mut self) {
        self.source.unmap_table(self.pa);
    }
}

/// Borrowed view of one process's address-space state: the page-table
/// root and the source used to inspect its table frames. Read-only for
/// the duration of one translation.
#[derive(Clone, Copy)]
pub struct MemoryContext<'a> {
    root: PhysAddr,
    tables: &'a dyn TableSource,
}

impl<'a> MemoryContext<'a> {
    pub fn new(root: PhysAddr, tables: &'a dyn TableSource) -> Self {
        MemoryContext { root, tables }
    }

    pub fn root(&self) -> PhysAddr {
        self.root
    }

    pub fn tables(&self) -> &'a dyn TableSource {
        self.tables
    }
}

/// A level of the walk was absent or malformed. The level is diagnostic
/// information only; callers surface every walk failure identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TranslateError {
    level: TableLevel,
}

impl TranslateError {
    getter_func!(level, TableLevel);
}

fn descend(
    tables: &dyn TableSource,
    table: PhysAddr,
    level: TableLevel,
    vaddr: VirtAddr,
) -> Result<PhysAddr, TranslateError> {
    let map: TableMapGuard = match TableMapGuard::new(tables, table) {
        Some(m) => m,
        None => return Err(TranslateError { level }),
    };

    match map.entry(level.index(vaddr)).classify(level) {
        EntryKind::Table(next) => {
            #[cfg(feature = "verbose")]
            log::trace!("{:?} entry maps table at {:#x}", level, next.as_u64());

            Ok(next)
        }
        EntryKind::Absent | EntryKind::Frame(_) | EntryKind::Malformed => {
            log::debug!("invalid {:?} entry for va {:#x}", level, vaddr.as_u64());
            Err(TranslateError { level })
        }
    }
}

fn lookup_frame(
    tables: &dyn TableSource,
    table: PhysAddr,
    vaddr: VirtAddr,
) -> Result<PhysFrame, TranslateError> {
    let level: TableLevel = TableLevel::Pte;

    let map: TableMapGuard = match TableMapGuard::new(tables, table) {
        Some(m) => m,
        None => return Err(TranslateError { level }),
    };

    match map.entry(level.index(vaddr)).classify(level) {
        EntryKind::Frame(frame) => {
            #[cfg(feature = "verbose")]
            log::trace!(
                "pte maps va {:#x} to frame {:#x}",
                vaddr.as_u64(),
                frame.start_address().as_u64()
            );

            Ok(frame)
        }
        EntryKind::Absent | EntryKind::Table(_) | EntryKind::Malformed => {
            log::debug!("invalid {:?} entry for va {:#x}", level, vaddr.as_u64());
            Err(TranslateError { level })
        }
    }
}

/// Resolve `vaddr` to the physical base address of its backing frame.
///
/// Fixed five-level walk, most significant level first; the first absent
/// or malformed entry aborts the walk. The returned address is the frame
/// base only; the offset of `vaddr` within the page is not added.
pub fn translate(ctx: &MemoryContext<'_>, vaddr: VirtAddr) -> Result<PhysAddr, TranslateError> {
    let p4d: PhysAddr = descend(ctx.tables(), ctx.root(), TableLevel::Pgd, vaddr)?;
    let pud: PhysAddr = descend(ctx.tables(), p4d, TableLevel::P4d, vaddr)?;
    let pmd: PhysAddr = descend(ctx.tables(), pud, TableLevel::Pud, vaddr)?;
    let pte: PhysAddr = descend(ctx.tables(), pmd, TableLevel::Pmd, vaddr)?;
    let frame: PhysFrame = lookup_frame(ctx.tables(), pte, vaddr)?;

    Ok(frame.start_address())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::entry::{ENTRY_HUGE, ENTRY_PRESENT};
    use crate::mem::testutil::FakeTableSource;

    const ROOT: u64 = 0x10_0000;
    const FRAME: u64 = 0x5000;

    #[test]
    pub fn test_translate_fully_mapped() {
        let va: VirtAddr = VirtAddr::new(0x7fff_0000);
        let src: FakeTableSource = FakeTableSource::with_mapping(ROOT, va, FRAME);
        let ctx: MemoryContext = MemoryContext::new(PhysAddr::new(ROOT), &src);

        assert_eq!(translate(&ctx, va), Ok(PhysAddr::new(FRAME)));
    }

    #[test]
    pub fn test_translate_returns_frame_base_without_offset() {
        let va: VirtAddr = VirtAddr::new(0x7fff_0123);
        let src: FakeTableSource = FakeTableSource::with_mapping(ROOT, va, FRAME);
        let ctx: MemoryContext = MemoryContext::new(PhysAddr::new(ROOT), &src);

        // The sub-page offset (0x123) is not applied to the result
        assert_eq!(translate(&ctx, va), Ok(PhysAddr::new(FRAME)));
    }

    #[test]
    pub fn test_translate_fails_for_any_absent_level() {
        let va: VirtAddr = VirtAddr::new(0x7fff_0000);

        for level in TableLevel::ALL {
            let mut src: FakeTableSource = FakeTableSource::with_mapping(ROOT, va, FRAME);
            src.clear_entry(FakeTableSource::table_at_level(ROOT, level), level.index(va));

            let ctx: MemoryContext = MemoryContext::new(PhysAddr::new(ROOT), &src);
            assert_eq!(translate(&ctx, va), Err(TranslateError { level }));
        }
    }

    #[test]
    pub fn test_translate_fails_for_malformed_intermediate() {
        let va: VirtAddr = VirtAddr::new(0x7fff_0000);
        let mut src: FakeTableSource = FakeTableSource::with_mapping(ROOT, va, FRAME);

        let pmd: u64 = FakeTableSource::table_at_level(ROOT, TableLevel::Pmd);
        let pte_table: u64 = FakeTableSource::table_at_level(ROOT, TableLevel::Pte);
        src.set_entry(
            pmd,
            TableLevel::Pmd.index(va),
            pte_table | ENTRY_PRESENT | ENTRY_HUGE,
        );

        let ctx: MemoryContext = MemoryContext::new(PhysAddr::new(ROOT), &src);
        assert_eq!(
            translate(&ctx, va),
            Err(TranslateError {
                level: TableLevel::Pmd
            })
        );
    }

    #[test]
    pub fn test_translate_fails_for_unmappable_table() {
        let va: VirtAddr = VirtAddr::new(0x7fff_0000);
        let src: FakeTableSource = FakeTableSource::new();
        let ctx: MemoryContext = MemoryContext::new(PhysAddr::new(ROOT), &src);

        assert_eq!(
            translate(&ctx, va),
            Err(TranslateError {
                level: TableLevel::Pgd
            })
        );
    }

    #[test]
    pub fn test_walk_releases_every_mapped_table() {
        let va: VirtAddr = VirtAddr::new(0x7fff_0000);

        // Success path: five tables mapped, five released
        let src: FakeTableSource = FakeTableSource::with_mapping(ROOT, va, FRAME);
        let ctx: MemoryContext = MemoryContext::new(PhysAddr::new(ROOT), &src);
        translate(&ctx, va).unwrap();
        assert_eq!(src.map_count(), 5);
        assert_eq!(src.unmap_count(), 5);

        // Failure path: the walk stops at the pmd but still releases
        // everything it mapped
        let mut src: FakeTableSource = FakeTableSource::with_mapping(ROOT, va, FRAME);
        src.clear_entry(
            FakeTableSource::table_at_level(ROOT, TableLevel::Pmd),
            TableLevel::Pmd.index(va),
        );
        let ctx: MemoryContext = MemoryContext::new(PhysAddr::new(ROOT), &src);
        assert!(translate(&ctx, va).is_err());
        assert_eq!(src.map_count(), 4);
        assert_eq!(src.unmap_count(), 4);
    }
}
