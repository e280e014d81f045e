/* SPDX-License-Identifier: MIT */

/// Spinlock implementation
pub mod locking;
/// Macros and helpers
pub mod util;
