/* SPDX-License-Identifier: MIT */

use crate::funcs;
use crate::protocols::SVSM_ATTEST_PROTOCOL;

use x86_64::addr::PhysAddr;

/// 3 << 32
pub const SVSM_CALL_BASE: u64 = (SVSM_ATTEST_PROTOCOL as u64) << 32;
/// SVSM_CALL_BASE | 1
pub const SVSM_CALL_HASH_SINGLE: u64 = SVSM_CALL_BASE | 1;

/// 0
pub const SVSM_SUCCESS: i64 = 0;

/// Register-shaped call descriptor handed to the privileged primitive.
///
/// Built fresh for every request; never persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct SvsmCall {
    rax: u64,
    rcx: u64,
    rdx: u64,
    r8: u64,
    r9: u64,
}

impl SvsmCall {
    pub const fn new() -> Self {
        SvsmCall {
            rax: 0,
            rcx: 0,
            rdx: 0,
            r8: 0,
            r9: 0,
        }
    }

    funcs!(rax, u64);
    funcs!(rcx, u64);
    funcs!(rdx, u64);
    funcs!(r8, u64);
    funcs!(r9, u64);
}

/// Build a "hash single page" call descriptor.
///
/// Field layout:
///   rax - call identifier
///   rcx - physical address of the page to attest
///   rdx - page-size indicator (0 = base 4 KiB size, 1 = otherwise)
///   r8  - physical address of the report buffer
///   r9  - byte length of the report buffer
pub fn build_hash_single(
    target: PhysAddr,
    page_is_base_size: bool,
    report_buf: PhysAddr,
    report_len: u64,
) -> SvsmCall {
    let mut call: SvsmCall = SvsmCall::new();

    call.set_rax(SVSM_CALL_HASH_SINGLE);
    call.set_rcx(target.as_u64());
    call.set_rdx(match page_is_base_size {
        true => 0,
        false => 1,
    });
    call.set_r8(report_buf.as_u64());
    call.set_r9(report_len);

    call
}

/// The privileged transition into the secure service, provided by the
/// host environment.
pub trait ProtocolDriver {
    /// Transfer control to the secure service and return its outcome
    /// code. The descriptor is read in place and must not be mutated
    /// during the call. Every address field must already be a physical
    /// address; handing in a virtual one is undefined behavior at the
    /// privileged boundary, not a recoverable error.
    fn do_protocol(&self, call: &SvsmCall) -> i64;
}

/// Submit `call` to the secure service.
///
/// Non-zero outcomes are service-defined failure codes; they are surfaced
/// verbatim and never retried or reinterpreted here.
pub fn dispatch(driver: &dyn ProtocolDriver, call: &SvsmCall) -> Result<(), i64> {
    let ret: i64 = driver.do_protocol(call);
    if ret != SVSM_SUCCESS {
        return Err(ret);
    }

    Ok(())
}
