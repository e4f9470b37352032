//! SAP primitives and collaborator traits the Attach Coordinator calls through: EMM-REG,
//! EMM-AS, ESM, the MME API, the common-procedure starter, and the timer service.

pub mod common_proc;
pub mod emm_as;
pub mod emm_reg;
pub mod esm;
pub mod mme_api;
pub mod timer;

pub use common_proc::{CommonProcedureSap, ProcedureOutcome};
pub use emm_as::{EmmAsEstablishCnf, EmmAsEstablishRej, EmmAsSap};
pub use emm_reg::{EmmRegAttachCnf, EmmRegAttachRej, EmmRegCommonProcReq, EmmRegProcAbort, EmmRegSap};
pub use esm::{EsmDefaultEpsBearerContextActivateCnf, EsmOutcome, EsmPdnConnectivityReq, EsmPdnConnectivityRej, EsmSap};
pub use mme_api::MmeApi;
pub use timer::{SoftwareTimerService, TimerKind, TimerService};
