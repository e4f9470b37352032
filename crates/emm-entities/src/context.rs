//! The UE EMM Context and the Attach Retransmission Record it cooperates with.

use emm_core::cause::EmmCause;
use emm_core::fsm::{EmmFsmState, PendingProcedure};
use emm_core::identity::{Guti, Imei, Imsi};
use emm_core::ids::{TimerId, UeId};
use emm_core::security::{Eea, Eia, Gea, KsiType, SecurityContext, Uea, Uia};
use emm_core::attach_type::AttachType;

/// Authentication vector staged for the Authentication common procedure. Its own generation
/// (Milenage/TUAK and friends) is the subscriber database's concern, entirely out of scope here;
/// this is just the RAND/AUTN pair the core stages and later hands off.
#[derive(Debug, Clone, Default)]
pub struct AuthVector {
    pub rand: Vec<u8>,
    pub autn: Vec<u8>,
}

/// One UE EMM Context, keyed by a stable UE lower-layer identifier (`ueid`).
///
/// `guti` is deliberately private to this module: only the Context Store and the Context Updater
/// — both within this crate — ever write it, so that a write is never observable without the
/// matching secondary index update. Read access is unrestricted via [`UeEmmContext::guti`].
#[derive(Debug, Clone)]
pub struct UeEmmContext {
    pub ueid: UeId,

    pub imsi: Option<Imsi>,
    pub imei: Option<Imei>,
    guti: Option<Guti>,
    pub old_guti: Option<Guti>,
    pub guti_is_new: bool,

    pub attach_type: AttachType,
    pub ksi: KsiType,
    pub eea: Eea,
    pub eia: Eia,
    pub ucs2: bool,
    pub uea: Option<Uea>,
    pub uia: Option<Uia>,
    pub gea: Option<Gea>,
    pub umts_present: bool,
    pub gprs_present: bool,
    pub is_emergency: bool,
    pub is_attached: bool,
    /// True for heap-owned contexts eligible for teardown (the only kind this core creates; the
    /// field exists because the design this was extracted from also supports statically
    /// pre-allocated, non-releasable contexts in transient reject paths — see
    /// [`UeEmmContext::transient`]).
    pub is_dynamic: bool,

    pub tac: u16,
    pub n_tacs: u8,

    pub security: Option<SecurityContext>,
    pub auth_vector: Option<AuthVector>,

    pub esm_msg: Option<Vec<u8>>,

    pub t3450: Option<TimerId>,
    pub t3460: Option<TimerId>,
    pub t3470: Option<TimerId>,

    pub fsm: EmmFsmState,
    pub cause: EmmCause,

    /// Which common procedure (if any) this context is currently suspended on. `None` means the
    /// context is not waiting on anything.
    pub phase: Option<PendingProcedure>,
}

impl UeEmmContext {
    /// A fresh dynamic context: all identity/security fields empty, timers inactive, FSM at
    /// `DEREGISTERED`. Matches guard 5 of `attach_request`.
    pub fn new(ueid: UeId) -> Self {
        Self {
            ueid,
            imsi: None,
            imei: None,
            guti: None,
            old_guti: None,
            guti_is_new: false,
            attach_type: AttachType::Eps,
            ksi: KsiType::KsiNotAvailable,
            eea: emm_core::security::EEA0,
            eia: emm_core::security::EIA0,
            ucs2: false,
            uea: None,
            uia: None,
            gea: None,
            umts_present: false,
            gprs_present: false,
            is_emergency: false,
            is_attached: false,
            is_dynamic: true,
            tac: 0,
            n_tacs: 0,
            security: None,
            auth_vector: None,
            esm_msg: None,
            t3450: None,
            t3460: None,
            t3470: None,
            fsm: EmmFsmState::Deregistered,
            cause: EmmCause::default(),
            phase: None,
        }
    }

    /// A transient, non-store context used solely to carry a cause through a reject — e.g. when
    /// the NAS decoder detected a protocol error before any real context exists. `is_dynamic` is
    /// false, so `release` never attempts to remove it from the Context Store.
    pub fn transient(ueid: UeId, cause: EmmCause) -> Self {
        let mut ctx = Self::new(ueid);
        ctx.is_dynamic = false;
        ctx.cause = cause;
        ctx
    }

    pub fn guti(&self) -> Option<Guti> {
        self.guti
    }

    pub(crate) fn set_guti_field(&mut self, guti: Option<Guti>) {
        self.guti = guti;
    }

    /// Zeroes all key material and drops the Security Context. Called by `release`.
    pub fn wipe_security(&mut self) {
        if let Some(mut sctx) = self.security.take() {
            sctx.wipe();
        }
    }
}

/// Created when Attach Accept is emitted, owned by the Coordinator until Attach Complete or
/// abort frees it.
#[derive(Debug, Clone)]
pub struct AttachRetransmissionRecord {
    pub ueid: UeId,
    pub retransmission_count: u8,
    /// The Activate-Default-EPS-Bearer-Context-Request to retransmit verbatim.
    pub esm_msg: Vec<u8>,
}

impl AttachRetransmissionRecord {
    pub fn new(ueid: UeId, esm_msg: Vec<u8>) -> Self {
        Self { ueid, retransmission_count: 0, esm_msg }
    }
}
