//! Attach Coordinator: owns the Context Store and the collaborator handles, and exposes the
//! three external entry points (`attach_request`, `attach_reject`, `attach_complete`) plus the
//! single resume entry point for suspended common procedures (`on_procedure_outcome`).
//!
//! Grounded on the reference stack's `MmBs` component (`mm_bs.rs`): one struct holding a
//! `ClientMgr` plus boxed SAP handles, with `rx_*`-style entry points that mutate context state
//! and call back out through those handles. The boxed-trait-object collaborator style mirrors how
//! `MmBs` is parameterized over its downstream SAPs.

use std::time::Instant;

use emm_config::SharedConfig;
use emm_core::cause::EmmCause;
use emm_core::ids::UeId;
use emm_saps::{CommonProcedureSap, EmmAsSap, EmmRegSap, EsmSap, MmeApi, TimerService};

use crate::attach::{abnormal, accept, diff, identify, sap_adapters, security, timers, updater, AttachParams, DecodeStatus, ResumeEvent};
use crate::context::{AttachRetransmissionRecord, UeEmmContext};
use crate::store::ContextStore;
use std::collections::HashMap;

/// Everything the Attach procedure needs: the Context Store, the shared configuration, the
/// in-flight Attach Accept retransmission records, and the boxed collaborator SAPs. The phase
/// modules (`identify`, `security`, `accept`, `abnormal`, `timers`) are free functions taking
/// `&mut AttachCoordinator` rather than methods, so that none of them need to borrow the whole
/// struct through more than one path at a time.
pub struct AttachCoordinator {
    pub(crate) store: ContextStore,
    pub(crate) config: SharedConfig,
    pub(crate) retransmissions: HashMap<UeId, AttachRetransmissionRecord>,
    pub(crate) mme_api: Box<dyn MmeApi + Send>,
    pub(crate) esm: Box<dyn EsmSap + Send>,
    pub(crate) emm_as: Box<dyn EmmAsSap + Send>,
    pub(crate) emm_reg: Box<dyn EmmRegSap + Send>,
    pub(crate) common_proc: Box<dyn CommonProcedureSap + Send>,
    pub(crate) timers: Box<dyn TimerService + Send>,
}

impl AttachCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SharedConfig,
        mme_api: Box<dyn MmeApi + Send>,
        esm: Box<dyn EsmSap + Send>,
        emm_as: Box<dyn EmmAsSap + Send>,
        emm_reg: Box<dyn EmmRegSap + Send>,
        common_proc: Box<dyn CommonProcedureSap + Send>,
        timers: Box<dyn TimerService + Send>,
    ) -> Self {
        Self {
            store: ContextStore::new(),
            config,
            retransmissions: HashMap::new(),
            mme_api,
            esm,
            emm_as,
            emm_reg,
            common_proc,
            timers,
        }
    }

    pub fn context_count(&self) -> usize {
        self.store.len()
    }

    /// Entry point for an incoming (already NAS-decoded) Attach Request. Implements the guard
    /// chain of the UE-initiated EPS attach procedure (3GPP TS 24.301 §5.5.1.2).
    pub fn attach_request(&mut self, ueid: UeId, req: AttachParams) {
        if let DecodeStatus::ProtocolError = req.decode_status {
            self.reject_transient(ueid, EmmCause::ProtocolError);
            return;
        }
        if ueid.0 as usize >= self.config.config().max_contexts {
            self.reject_transient(ueid, EmmCause::IllegalUe);
            return;
        }
        if matches!(req.attach_type, emm_core::attach_type::AttachType::Emergency) && !self.config.config().emergency_attach {
            self.reject_transient(ueid, EmmCause::ImeiNotAccepted);
            return;
        }

        if self.store.get(ueid).is_none() {
            if let Some(guti) = req.guti {
                if let Some(old_ueid) = self.store.lookup_by_guti(&guti) {
                    if old_ueid != ueid {
                        self.mme_api.notify_ue_id_changed(old_ueid, ueid);
                        self.store.rekey(old_ueid, ueid).expect("just looked up by guti");
                    }
                }
            }
        }

        if self.store.get(ueid).is_some() {
            self.attach_request_existing(ueid, req);
            return;
        }

        let mut ctx = UeEmmContext::new(ueid);
        if let Some(tac) = req.tai {
            ctx.tac = tac;
        }
        self.store.insert(ctx).expect("just checked absent");

        if updater::context_update(&mut self.store, self.mme_api.as_ref(), &self.config, ueid, &req).is_err() {
            self.reject_real(ueid, EmmCause::IllegalUe);
            return;
        }

        identify::identify(self, ueid);
    }

    /// Context already exists under `ueid` (whether it was there before this call or arrived here
    /// via the rekey above): duplicate-or-restart handling, guard 4 of the guard chain above.
    fn attach_request_existing(&mut self, ueid: UeId, req: AttachParams) {
        let changed = match self.store.get(ueid) {
            Some(ctx) if ctx.fsm > emm_core::fsm::EmmFsmState::Deregistered => diff::parameters_have_changed(ctx, &req),
            // Context exists but hasn't progressed past DEREGISTERED (e.g. freshly rekeyed, or
            // created by an attach that never got past guard 6): treat it like a brand-new one.
            _ => {
                if let Err(_) = updater::context_update(&mut self.store, self.mme_api.as_ref(), &self.config, ueid, &req) {
                    self.reject_real(ueid, EmmCause::IllegalUe);
                    return;
                }
                identify::identify(self, ueid);
                return;
            }
        };

        if !changed {
            // Duplicate Attach Request for an in-flight procedure: no side effects.
            return;
        }

        // `release` itself notifies EMM-REG with PROC_ABORT, which is the notification guard 4
        // calls for here — no separate emission needed.
        abnormal::release(self, ueid);
        self.attach_request(ueid, req);
    }

    /// Entry point used when an earlier phase decided, outside of `attach_request`'s own guard
    /// chain, that the procedure must be rejected with `cause` (e.g. a caller rejecting before a
    /// context was ever created).
    pub fn attach_reject(&mut self, ueid: UeId, cause: EmmCause) {
        self.reject_transient(ueid, cause);
    }

    /// Entry point for an Attach Complete: releases the retransmission bookkeeping, stops T3450,
    /// and forwards the embedded ESM message to ESM as a (non-standalone) default bearer
    /// activation confirm (the final step of the attach procedure).
    pub fn attach_complete(&mut self, ueid: UeId, esm_msg: Vec<u8>) {
        self.retransmissions.remove(&ueid);

        let t3450 = match self.store.get_mut(ueid) {
            Some(ctx) => ctx.t3450.take(),
            None => {
                tracing::warn!(%ueid, "attach_complete for unknown ueid");
                return;
            }
        };
        if let Some(id) = t3450 {
            self.timers.stop(id);
        }
        if let Some(ctx) = self.store.get_mut(ueid) {
            ctx.guti_is_new = false;
            ctx.old_guti = None;
        }

        let outcome = self
            .esm
            .default_eps_bearer_context_activate_cnf(emm_saps::EsmDefaultEpsBearerContextActivateCnf { ueid, recv: esm_msg });

        match outcome {
            emm_saps::EsmOutcome::Success { .. } => {
                if let Some(ctx) = self.store.get_mut(ueid) {
                    ctx.is_attached = true;
                    ctx.fsm = emm_core::fsm::EmmFsmState::Registered;
                }
                self.emm_reg.attach_cnf(sap_adapters::build_attach_cnf(ueid));
            }
            emm_saps::EsmOutcome::Failure(_) => {
                self.emm_reg.attach_rej(sap_adapters::build_attach_rej(ueid, EmmCause::EsmFailure));
            }
            emm_saps::EsmOutcome::Discarded => {}
        }
    }

    /// The single resume entry point a suspended common procedure (or the asynchronous
    /// authentication-info notification) calls back into. Dispatches on the context's `phase`
    /// label, ignoring any event that doesn't match what the context is actually suspended on
    /// (the explicit state-label continuation design `PendingProcedure` implements).
    pub fn on_procedure_outcome(&mut self, ueid: UeId, event: ResumeEvent) {
        let expected = match self.store.get(ueid) {
            Some(ctx) => ctx.phase,
            None => return,
        };
        let matches_phase = matches!(
            (&event, expected),
            (ResumeEvent::Identification(_), Some(emm_core::fsm::PendingProcedure::Identification))
                | (ResumeEvent::AuthInfoReady(_), Some(emm_core::fsm::PendingProcedure::AuthInfoRequest))
                | (ResumeEvent::Authentication(_), Some(emm_core::fsm::PendingProcedure::Authentication))
                | (ResumeEvent::SecurityModeControl(_), Some(emm_core::fsm::PendingProcedure::SecurityModeControl))
        );
        if !matches_phase {
            tracing::warn!(%ueid, ?expected, "procedure outcome did not match the pending phase; ignoring");
            return;
        }
        if let Some(ctx) = self.store.get_mut(ueid) {
            ctx.phase = None;
        }

        match event {
            ResumeEvent::Identification(Ok(imsi)) => {
                if let Some(ctx) = self.store.get_mut(ueid) {
                    ctx.imsi = Some(imsi);
                }
                identify::identify(self, ueid);
            }
            ResumeEvent::Identification(Err(_)) => abnormal::release(self, ueid),

            ResumeEvent::AuthInfoReady(Ok(vector)) => {
                if let Some(ctx) = self.store.get_mut(ueid) {
                    ctx.auth_vector = Some(vector);
                }
                identify::resume_after_auth_info(self, ueid);
            }
            ResumeEvent::AuthInfoReady(Err(_)) => abnormal::release(self, ueid),

            ResumeEvent::Authentication(Ok(())) => security::attach_security(self, ueid),
            ResumeEvent::Authentication(Err(_)) => abnormal::release(self, ueid),

            ResumeEvent::SecurityModeControl(Ok((eea, eia))) => {
                if let Some(ctx) = self.store.get_mut(ueid) {
                    if let Some(sctx) = ctx.security.as_mut() {
                        sctx.selected_eea = eea;
                        sctx.selected_eia = eia;
                    }
                }
                accept::attach(self, ueid);
            }
            ResumeEvent::SecurityModeControl(Err(_)) => abnormal::release(self, ueid),
        }
    }

    /// Drives T3450 expiry: call once per event-loop tick with the current time.
    pub fn poll_timers(&mut self, now: Instant) {
        timers::poll(self, now);
    }

    /// Rejects using a transient, never-stored context: used by guards that fire before any real
    /// context exists (or ever will).
    fn reject_transient(&mut self, ueid: UeId, cause: EmmCause) {
        let ctx = UeEmmContext::transient(ueid, cause);
        let rej = sap_adapters::build_establish_rej(&ctx);
        self.emm_as.establish_rej(rej);
    }

    /// Rejects using the real stored context, setting `cause` first.
    pub(crate) fn reject_real(&mut self, ueid: UeId, cause: EmmCause) {
        if let Some(ctx) = self.store.get_mut(ueid) {
            ctx.cause = cause;
        }
        abnormal::reject(self, ueid);
    }
}
