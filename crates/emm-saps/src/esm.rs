//! ESM SAP. ESM's own internals (bearer contexts, QoS negotiation, PDN selection) are out of
//! scope; only the call boundary the Attach Coordinator crosses is modelled.

use emm_core::ids::UeId;

#[derive(Debug, Clone)]
pub struct EsmPdnConnectivityReq {
    pub ueid: UeId,
    /// The ESM container carried inside the Attach Request.
    pub recv: Vec<u8>,
    /// True when the Attach Request carried no ESM container at all and a default bearer setup
    /// must be initiated standalone.
    pub is_standalone: bool,
}

#[derive(Debug, Clone)]
pub struct EsmPdnConnectivityRej {
    pub ueid: UeId,
    pub esm_cause: u8,
}

#[derive(Debug, Clone)]
pub struct EsmDefaultEpsBearerContextActivateCnf {
    pub ueid: UeId,
    /// The embedded ESM message delivered alongside Attach Complete.
    pub recv: Vec<u8>,
}

/// Outcome of a `PDN_CONNECTIVITY_REQ` call.
#[derive(Debug, Clone)]
pub enum EsmOutcome {
    /// ESM accepted; `send` is the opaque reply to embed in the Attach Accept's ESM container.
    Success { send: Vec<u8> },
    /// ESM discarded the request outright (e.g. malformed container) — attach proceeds without
    /// an ESM failure being reported to the UE.
    Discarded,
    /// ESM rejected with `esm_cause`; the caller reports `EmmCause::EsmFailure`.
    Failure(u8),
}

pub trait EsmSap {
    fn pdn_connectivity_req(&mut self, req: EsmPdnConnectivityReq) -> EsmOutcome;
    /// Notifies ESM that the attach procedure aborted before completion; no reply expected.
    fn pdn_connectivity_rej(&mut self, rej: EsmPdnConnectivityRej);
    /// Delivers the embedded ESM message from Attach Complete as a non-standalone default-bearer
    /// activation confirm.
    fn default_eps_bearer_context_activate_cnf(&mut self, cnf: EsmDefaultEpsBearerContextActivateCnf) -> EsmOutcome;
}
