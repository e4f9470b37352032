//! Abnormal-case handling: Reject, Abort and Release (3GPP TS 24.301 §5.5.1.2.7).
//!
//! `reject` only ever talks to the access stratum (`EMMAS_ESTABLISH_REJ`); `abort` additionally
//! notifies ESM and EMM-REG before tearing the context down; `release` is the shared teardown
//! both converge on, and the only place `wipe_security` is called from.

use emm_core::cause::EmmCause;
use emm_core::ids::UeId;
use emm_saps::EsmPdnConnectivityRej;

use crate::attach::coordinator::AttachCoordinator;
use crate::attach::sap_adapters;

/// Sends `EMMAS_ESTABLISH_REJ` built from the context's current cause, then releases the context
/// if it's dynamic (a transient context, used for the guards that fire before a real context
/// exists, never reaches here — `reject_transient` on the Coordinator handles those directly).
pub fn reject(coord: &mut AttachCoordinator, ueid: UeId) {
    let Some(ctx) = coord.store.get(ueid) else { return };
    let rej = sap_adapters::build_establish_rej(ctx);
    let is_dynamic = ctx.is_dynamic;
    coord.emm_as.establish_rej(rej);
    if is_dynamic {
        release(coord, ueid);
    }
}

/// Notifies ESM and EMM-REG that the procedure aborted, then releases the context. This is the
/// continuation common procedures resume into on failure or abort, and what T3450 exhaustion
/// calls once the retransmission bound is hit.
pub fn abort(coord: &mut AttachCoordinator, ueid: UeId) {
    let cause = coord
        .store
        .get(ueid)
        .map(|c| if matches!(c.cause, EmmCause::Success) { EmmCause::IllegalUe } else { c.cause })
        .unwrap_or(EmmCause::IllegalUe);

    let t3450 = coord.store.get_mut(ueid).and_then(|ctx| ctx.t3450.take());
    if let Some(id) = t3450 {
        coord.timers.stop(id);
    }
    coord.retransmissions.remove(&ueid);

    coord.esm.pdn_connectivity_rej(EsmPdnConnectivityRej { ueid, esm_cause: 0 });
    coord.emm_reg.attach_rej(sap_adapters::build_attach_rej(ueid, cause));

    release(coord, ueid);
}

/// Tears the context down unconditionally: wipes security material, stops all three timers,
/// drops any retransmission record, removes the context (and its secondary index entry) from the
/// Context Store, and notifies EMM-REG that any common procedure still believing itself
/// associated with this `ueid` must abort.
pub fn release(coord: &mut AttachCoordinator, ueid: UeId) {
    let Some(mut ctx) = coord.store.remove(ueid) else { return };

    ctx.wipe_security();
    for timer in [ctx.t3450.take(), ctx.t3460.take(), ctx.t3470.take()] {
        if let Some(id) = timer {
            coord.timers.stop(id);
        }
    }
    coord.retransmissions.remove(&ueid);

    coord.emm_reg.proc_abort(sap_adapters::build_proc_abort(ueid));
}
