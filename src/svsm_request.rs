/* SPDX-License-Identifier: MIT */

use crate::getter_func;
use crate::globals::page_size_is_base;
use crate::mem::{translate, TranslateError};
use crate::protocols::{build_hash_single, dispatch, ProtocolDriver, SvsmCall};
use crate::task_list::{ContextNotFound, ProcessContextLookup, ProcessId};

use memchr::memchr;
use x86_64::addr::{PhysAddr, VirtAddr};

/// Why a request ended without a successful secure call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestError {
    /// Malformed request text; nothing was looked up or translated
    InputParse,
    /// Unknown pid, or the task has no usable memory context
    ProcessNotFound,
    /// A page-table level was absent or malformed during the walk
    TranslationFailed,
    /// The secure service returned a non-zero outcome, preserved verbatim
    SecureCallFailure(i64),
}

impl From<ContextNotFound> for RequestError {
    fn from(_e: ContextNotFound) -> Self {
        RequestError::ProcessNotFound
    }
}

impl From<TranslateError> for RequestError {
    fn from(_e: TranslateError) -> Self {
        // The failing level is logged at the point of failure; callers
        // cannot distinguish which level it was.
        RequestError::TranslationFailed
    }
}

/// Physical location and size of the report buffer the secure service
/// writes into. The buffer itself is owned by the channel layer and only
/// the location travels through this core.
#[derive(Clone, Copy, Debug)]
pub struct ReportBuffer {
    pa: PhysAddr,
    len: u64,
}

impl ReportBuffer {
    pub fn new(pa: PhysAddr, len: u64) -> Self {
        ReportBuffer { pa, len }
    }

    getter_func!(pa, PhysAddr);
    getter_func!(len, u64);
}

fn trim_line(buf: &[u8]) -> &[u8] {
    let mut end: usize = buf.len();
    while end > 0 && (buf[end - 1] == 0 || buf[end - 1].is_ascii_whitespace()) {
        end -= 1;
    }

    &buf[..end]
}

/// Parse one request line of the form `<pid> <hex-vaddr>`: a decimal
/// process id and an unprefixed hexadecimal address, separated by a
/// single space. Trailing NUL padding and whitespace from the channel
/// buffer are ignored.
pub fn parse_request(buf: &[u8]) -> Result<(ProcessId, VirtAddr), RequestError> {
    let line: &[u8] = trim_line(buf);

    let sep: usize = match memchr(b' ', line) {
        Some(s) => s,
        None => return Err(RequestError::InputParse),
    };

    let pid_text: &str =
        core::str::from_utf8(&line[..sep]).map_err(|_e| RequestError::InputParse)?;
    let addr_text: &str =
        core::str::from_utf8(&line[sep + 1..]).map_err(|_e| RequestError::InputParse)?;

    let pid: ProcessId =
        ProcessId::from_str_radix(pid_text, 10).map_err(|_e| RequestError::InputParse)?;
    let addr_raw: u64 =
        u64::from_str_radix(addr_text, 16).map_err(|_e| RequestError::InputParse)?;

    // VirtAddr cannot represent a non-canonical address; reject it here
    // so the resolver only ever sees representable input.
    let vaddr: VirtAddr = VirtAddr::try_new(addr_raw).map_err(|_e| RequestError::InputParse)?;

    Ok((pid, vaddr))
}

/// Run one attestation request through the pipeline: context lookup,
/// address translation, descriptor construction, dispatch. The first
/// failing step ends the request; there are no retries.
pub fn handle_request(
    tasks: &dyn ProcessContextLookup,
    driver: &dyn ProtocolDriver,
    pid: ProcessId,
    vaddr: VirtAddr,
    report_buf: &ReportBuffer,
) -> Result<(), RequestError> {
    let ctx = tasks.resolve_context(pid)?;
    let pa: PhysAddr = translate(&ctx, vaddr)?;

    let call: SvsmCall =
        build_hash_single(pa, page_size_is_base(), report_buf.pa(), report_buf.len());

    match dispatch(driver, &call) {
        Ok(()) => {
            log::info!(
                "attested page {:#x} for pid {} (va {:#x})",
                pa.as_u64(),
                pid,
                vaddr.as_u64()
            );
            Ok(())
        }
        Err(code) => {
            log::warn!("secure call failed with outcome {}", code);
            Err(RequestError::SecureCallFailure(code))
        }
    }
}

/// Handle one request line as received from the client channel.
pub fn handle_request_line(
    tasks: &dyn ProcessContextLookup,
    driver: &dyn ProtocolDriver,
    line: &[u8],
    report_buf: &ReportBuffer,
) -> Result<(), RequestError> {
    let (pid, vaddr) = parse_request(line)?;

    log::info!(
        "attestation request for pid {} va {:#x}",
        pid,
        vaddr.as_u64()
    );

    handle_request(tasks, driver, pid, vaddr, report_buf)
}
