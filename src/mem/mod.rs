/* SPDX-License-Identifier: MIT */

/// Typed page-table entries
pub mod entry;
/// Five-level address-translation walk
pub mod walk;

#[cfg(test)]
pub(crate) mod testutil;

pub use crate::mem::entry::{EntryKind, RawEntry, TableLevel, ENTRIES_PER_TABLE};

pub use crate::mem::walk::{translate, MemoryContext, TableMapGuard, TableSource, TranslateError};
