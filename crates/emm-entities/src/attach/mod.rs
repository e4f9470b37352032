//! The Attach procedure: Context Store and Parameter Diff feed the Context Updater, which feeds
//! the phase modules (Identify -> Authenticate & Secure -> Accept), with abnormal-case handling
//! and T3450 timer expiry wired in, all orchestrated by the Attach Coordinator.

pub mod abnormal;
pub mod accept;
pub mod coordinator;
pub mod diff;
pub mod identify;
pub mod sap_adapters;
pub mod security;
pub mod timers;
pub mod updater;

use emm_core::cause::EmmCause;
use emm_core::identity::{Guti, Imei, Imsi};
use emm_core::security::{Eea, Eia, Gea, KsiType, Uea, Uia};
use emm_core::attach_type::AttachType;

use crate::context::AuthVector;

/// Whether the NAS decoder delivered a structurally well-formed Attach Request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    Ok,
    ProtocolError,
}

/// The parameters carried by an (already-decoded) Attach Request, per 3GPP TS 24.301 §8.2.4. TAI
/// is represented as a single TAC, matching this core's one-serving-TAI-list model.
#[derive(Debug, Clone)]
pub struct AttachParams {
    pub attach_type: AttachType,
    pub is_native_ksi: bool,
    pub ksi: KsiType,
    pub is_native_guti: bool,
    pub guti: Option<Guti>,
    pub imsi: Option<Imsi>,
    pub imei: Option<Imei>,
    pub tai: Option<u16>,
    pub eea: Eea,
    pub eia: Eia,
    pub ucs2: bool,
    pub uea: Option<Uea>,
    pub uia: Option<Uia>,
    pub gea: Option<Gea>,
    pub umts_present: bool,
    pub gprs_present: bool,
    pub esm_msg: Vec<u8>,
    pub decode_status: DecodeStatus,
}

/// Payload delivered to [`coordinator::AttachCoordinator::on_procedure_outcome`] when a
/// suspended common procedure (or the asynchronous authentication-info notification) completes.
/// The coordinator checks this against the context's `phase` label before dispatching, per the
/// explicit state-label continuation design `PendingProcedure` implements.
#[derive(Debug, Clone)]
pub enum ResumeEvent {
    /// Identification common procedure resolved (GUTI path). `Ok` carries the IMSI the UE
    /// reported in its Identity Response.
    Identification(Result<Imsi, EmmCause>),
    /// Authentication-info request resolved (IMSI path, no security context yet).
    AuthInfoReady(Result<AuthVector, EmmCause>),
    /// Authentication common procedure resolved.
    Authentication(Result<(), EmmCause>),
    /// Security Mode Control common procedure resolved, carrying the negotiated algorithms.
    SecurityModeControl(Result<(Eea, Eia), EmmCause>),
}
