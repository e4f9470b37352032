//! EMM-REG SAP: the internal notification bus between the Attach Coordinator and whatever other
//! EMM procedures (detach, periodic TAU, ...) share a UE context. Out of scope beyond the four
//! primitives the Attach procedure itself emits.

use emm_core::cause::EmmCause;
use emm_core::fsm::PendingProcedure;
use emm_core::ids::UeId;

/// Aborts any common procedure currently running for `ueid`, e.g. because a fresh Attach Request
/// with changed parameters arrived mid-procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmRegProcAbort {
    pub ueid: UeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmRegAttachCnf {
    pub ueid: UeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmRegAttachRej {
    pub ueid: UeId,
    pub cause: EmmCause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmmRegCommonProcReq {
    pub ueid: UeId,
    pub procedure: PendingProcedure,
}

pub trait EmmRegSap {
    fn proc_abort(&mut self, ind: EmmRegProcAbort);
    fn attach_cnf(&mut self, ind: EmmRegAttachCnf);
    fn attach_rej(&mut self, ind: EmmRegAttachRej);
    fn common_proc_req(&mut self, ind: EmmRegCommonProcReq);
}
