/* SPDX-License-Identifier: MIT */

/// Construction and dispatch of attestation calls
pub mod attest;

pub use crate::protocols::attest::*;

/// 3
pub const SVSM_ATTEST_PROTOCOL: u32 = 3;
