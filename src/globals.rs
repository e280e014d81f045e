/* SPDX-License-Identifier: MIT */

use crate::BIT;

/// 12
pub const PAGE_SHIFT: u64 = 12;
/// Bit 12
pub const PAGE_SIZE: u64 = BIT!(PAGE_SHIFT);
/// Page Mask (the opposite of page size minus 1)
pub const PAGE_MASK: u64 = !(PAGE_SIZE - 1);

/// Canonical base page size the call descriptor is measured against
pub const PAGE_4K: u64 = BIT!(12);

/// Whether the configured page size is the canonical 4 KiB base size.
///
/// System-wide constant, but recomputed per call so a descriptor never
/// carries a stale indicator.
#[inline]
pub fn page_size_is_base() -> bool {
    PAGE_SIZE == PAGE_4K
}
