/* SPDX-License-Identifier: MIT */

//! Client-side core for the SVSM page-attestation service.
//!
//! A privileged caller hands in a process id and a virtual address; the
//! crate resolves the address to its physical backing in that process's
//! address space, builds an attestation call descriptor and dispatches it
//! to the secure service. The channel carrying the request text and the
//! privileged-call primitive itself are external collaborators, reached
//! through the [`svsm_request`] entry points and the
//! [`protocols::ProtocolDriver`] trait.

#![cfg_attr(not(test), no_std)]

/// Page-size constants
pub mod globals;
/// Page-table entry model and the five-level address walk
pub mod mem;
/// Descriptor construction and dispatch to the secure service
pub mod protocols;
/// Handle attestation requests from the client channel
pub mod svsm_request;
/// Track tasks and resolve their memory contexts
pub mod task_list;
/// Auxiliary functions and macros
pub mod util;

extern crate alloc;

pub use crate::mem::{translate, MemoryContext, TableSource, TranslateError};
pub use crate::protocols::{build_hash_single, dispatch, ProtocolDriver, SvsmCall};
pub use crate::svsm_request::{handle_request, handle_request_line, ReportBuffer, RequestError};
pub use crate::task_list::{ContextNotFound, ProcessContextLookup, ProcessId, TaskTable};
