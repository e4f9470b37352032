//! Common-procedure SAP: starts Identification, Authentication and Security Mode Control.
//!
//! The "continuation" is not a stored closure or function pointer but the context's
//! `phase: PendingProcedure` label (see [`emm_core::fsm::PendingProcedure`]): these methods take
//! only the data needed to start the procedure, and the Coordinator exposes a single resume
//! entry point (`on_procedure_outcome`) that dispatches on that label once the procedure
//! completes, fails, or is aborted.

use emm_core::ids::UeId;

/// Outcome a common procedure reports back through `on_procedure_outcome`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureOutcome {
    Success,
    Failure,
    Abort,
}

pub trait CommonProcedureSap {
    fn start_identification(&mut self, ueid: UeId);
    fn start_authentication(&mut self, ueid: UeId);
    fn start_security_mode_control(&mut self, ueid: UeId);
}
