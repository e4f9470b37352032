//! In-memory reference collaborators for the demo binary: an always-succeeding `MmeApi`/`EsmSap`
//! pair, and thin logging `EmmAsSap`/`EmmRegSap`/`CommonProcedureSap` implementations that print
//! the SAP primitives the Attach Coordinator emits. None of this is a real HSS or ESM stack —
//! grounded on the teacher's own reference-implementation style for components it doesn't need a
//! full stack for (e.g. `tetra_entities::brew`'s no-op fallback path when Brew integration is
//! disabled).

use emm_core::cause::EmmCause;
use emm_core::identity::{Guti, Gummei, Imei, Imsi};
use emm_core::ids::UeId;
use emm_saps::{
    CommonProcedureSap, EmmAsEstablishCnf, EmmAsEstablishRej, EmmAsSap, EmmRegAttachCnf, EmmRegAttachRej,
    EmmRegCommonProcReq, EmmRegProcAbort, EmmRegSap, EsmDefaultEpsBearerContextActivateCnf, EsmOutcome,
    EsmPdnConnectivityReq, EsmPdnConnectivityRej, EsmSap, MmeApi,
};

/// Accepts any IMSI/IMEI it's asked to identify and hands out sequential GUTIs from its own
/// counter (separate from `MmeState`'s, since a real subscriber database owns its own allocator).
/// Never resolves a GUTI it's given — the reference MME keeps no GUTI-to-IMSI table of its own —
/// so the GUTI path always falls through to explicit identification, which is the behaviour this
/// core models regardless of whether a GUTI lookup would have succeeded.
pub struct ReferenceMmeApi {
    gummei: Gummei,
    tac_list: Vec<u16>,
    next_m_tmsi: u32,
}

impl ReferenceMmeApi {
    pub fn new(gummei: Gummei, tac_list: Vec<u16>) -> Self {
        Self { gummei, tac_list, next_m_tmsi: 1 }
    }
}

impl MmeApi for ReferenceMmeApi {
    fn identify_imsi(&mut self, ueid: UeId, imsi: &Imsi) -> Result<(), EmmCause> {
        tracing::info!(%ueid, %imsi, "MME_API identify_imsi -> accepted");
        Ok(())
    }

    fn identify_guti(&mut self, ueid: UeId, guti: &Guti) -> Result<Imsi, EmmCause> {
        tracing::info!(%ueid, %guti, "MME_API identify_guti -> unknown, falling back to explicit identification");
        Err(EmmCause::IllegalUe)
    }

    fn identify_imei(&mut self, ueid: UeId, imei: &Imei) -> Result<(), EmmCause> {
        tracing::info!(%ueid, %imei, "MME_API identify_imei -> accepted");
        Ok(())
    }

    fn new_guti(&mut self, imsi: &Imsi) -> (Guti, Vec<u16>) {
        let m_tmsi = self.next_m_tmsi;
        self.next_m_tmsi = self.next_m_tmsi.wrapping_add(1);
        tracing::info!(%imsi, m_tmsi, "MME_API new_guti");
        (Guti { gummei: self.gummei, m_tmsi }, self.tac_list.clone())
    }

    fn notify_ue_id_changed(&mut self, old: UeId, new: UeId) {
        tracing::info!(%old, %new, "MME_API notify_ue_id_changed");
    }

    fn notify_new_guti(&mut self, ueid: UeId, guti: &Guti) {
        tracing::info!(%ueid, %guti, "MME_API notify_new_guti");
    }

    fn find_mnc_length(&self, _digits: &[u8]) -> u8 {
        self.gummei.plmn.mnc_length
    }

    fn request_authentication_info(&mut self, ueid: UeId, imsi: &Imsi, num_vectors: u8) {
        tracing::info!(%ueid, %imsi, num_vectors, "MME_API request_authentication_info (reply delivered out of band)");
    }
}

/// Accepts every PDN Connectivity Request with a fixed opaque reply, and logs the two
/// notification-only primitives.
#[derive(Default)]
pub struct ReferenceEsm;

impl EsmSap for ReferenceEsm {
    fn pdn_connectivity_req(&mut self, req: EsmPdnConnectivityReq) -> EsmOutcome {
        tracing::info!(ueid = %req.ueid, is_standalone = req.is_standalone, "ESM_PDN_CONNECTIVITY_REQ -> success");
        EsmOutcome::Success { send: vec![0xC2, 0x01] }
    }

    fn pdn_connectivity_rej(&mut self, rej: EsmPdnConnectivityRej) {
        tracing::info!(ueid = %rej.ueid, esm_cause = rej.esm_cause, "ESM_PDN_CONNECTIVITY_REJ");
    }

    fn default_eps_bearer_context_activate_cnf(
        &mut self,
        cnf: EsmDefaultEpsBearerContextActivateCnf,
    ) -> EsmOutcome {
        tracing::info!(ueid = %cnf.ueid, "ESM_DEFAULT_EPS_BEARER_CONTEXT_ACTIVATE_CNF -> success");
        EsmOutcome::Success { send: Vec::new() }
    }
}

/// Prints the two access-stratum primitives the Attach Coordinator sends.
#[derive(Default)]
pub struct ReferenceEmmAs;

impl EmmAsSap for ReferenceEmmAs {
    fn establish_cnf(&mut self, cnf: EmmAsEstablishCnf) {
        let new_guti = cnf.new_guti.map(|g| g.to_string()).unwrap_or_else(|| "none".to_string());
        println!(
            "EMMAS_ESTABLISH_CNF  ueid={} guti={} new_guti={} tac_list={:?} eea={:?} eia={:?} nas_msg={:02x?}",
            cnf.ueid, cnf.guti, new_guti, cnf.tac_list, cnf.selected_eea, cnf.selected_eia, cnf.nas_msg
        );
    }

    fn establish_rej(&mut self, rej: EmmAsEstablishRej) {
        println!("EMMAS_ESTABLISH_REJ  ueid={} cause={}", rej.ueid, rej.cause);
    }
}

/// Prints the internal notification bus primitives.
#[derive(Default)]
pub struct ReferenceEmmReg;

impl EmmRegSap for ReferenceEmmReg {
    fn proc_abort(&mut self, ind: EmmRegProcAbort) {
        println!("EMMREG_PROC_ABORT    ueid={}", ind.ueid);
    }

    fn attach_cnf(&mut self, ind: EmmRegAttachCnf) {
        println!("EMMREG_ATTACH_CNF    ueid={}", ind.ueid);
    }

    fn attach_rej(&mut self, ind: EmmRegAttachRej) {
        println!("EMMREG_ATTACH_REJ    ueid={} cause={}", ind.ueid, ind.cause);
    }

    fn common_proc_req(&mut self, ind: EmmRegCommonProcReq) {
        println!("EMMREG_COMMON_PROC_REQ ueid={} procedure={}", ind.ueid, ind.procedure);
    }
}

/// Logs that a common procedure was started; the procedure's own internals (and the resulting
/// success/failure/abort) are out of scope, so the demo driver resumes each suspension by hand.
#[derive(Default)]
pub struct ReferenceCommonProc;

impl CommonProcedureSap for ReferenceCommonProc {
    fn start_identification(&mut self, ueid: UeId) {
        tracing::info!(%ueid, "COMMON_PROC start Identification");
    }

    fn start_authentication(&mut self, ueid: UeId) {
        tracing::info!(%ueid, "COMMON_PROC start Authentication");
    }

    fn start_security_mode_control(&mut self, ueid: UeId) {
        tracing::info!(%ueid, "COMMON_PROC start SecurityModeControl");
    }
}
