//! Phase: Attach and Phase: Attach Accept (3GPP TS 24.301 §5.5.1.2.4). `attach` hands the buffered
//! ESM message to ESM; on success it allocates the Attach Accept retransmission record and calls
//! `attach_accept`, which builds and sends `EMMAS_ESTABLISH_CNF` and arms (or restarts) T3450.

use std::time::Duration;

use emm_core::cause::EmmCause;
use emm_core::ids::UeId;
use emm_saps::{EsmOutcome, EsmPdnConnectivityReq, TimerKind};

use crate::attach::coordinator::AttachCoordinator;
use crate::attach::sap_adapters;
use crate::context::AttachRetransmissionRecord;

pub fn attach(coord: &mut AttachCoordinator, ueid: UeId) {
    let Some((recv, is_standalone)) =
        coord.store.get(ueid).map(|ctx| (ctx.esm_msg.clone().unwrap_or_default(), ctx.esm_msg.is_none()))
    else {
        return;
    };

    let outcome = coord.esm.pdn_connectivity_req(EsmPdnConnectivityReq { ueid, recv, is_standalone });
    match outcome {
        EsmOutcome::Success { send } => {
            coord.retransmissions.insert(ueid, AttachRetransmissionRecord::new(ueid, send));
            let reallocated_guti =
                coord.store.get(ueid).map(|c| c.guti_is_new && c.old_guti.is_some()).unwrap_or(false);

            attach_accept(coord, ueid);

            if reallocated_guti {
                coord.emm_reg.common_proc_req(emm_saps::EmmRegCommonProcReq {
                    ueid,
                    procedure: emm_core::fsm::PendingProcedure::Identification,
                });
            }
        }
        EsmOutcome::Failure(esm_cause) => {
            if let Some(ctx) = coord.store.get_mut(ueid) {
                ctx.esm_msg = Some(vec![esm_cause]);
            }
            coord.reject_real(ueid, EmmCause::EsmFailure);
        }
        EsmOutcome::Discarded => {}
    }
}

/// Builds and sends `EMMAS_ESTABLISH_CNF` from the current context and retransmission record, and
/// arms (first send) or restarts (retransmission) T3450. Called both from `attach` and from the
/// T3450 expiry handler.
pub fn attach_accept(coord: &mut AttachCoordinator, ueid: UeId) {
    let Some(record) = coord.retransmissions.get(&ueid).cloned() else { return };
    let Some(cnf) = coord.store.get(ueid).map(|ctx| sap_adapters::build_establish_cnf(ctx, &record)) else { return };
    coord.emm_as.establish_cnf(cnf);

    let duration = Duration::from_secs(coord.config.config().t3450_secs);
    let existing_timer = coord.store.get(ueid).and_then(|ctx| ctx.t3450);
    let new_timer = match existing_timer {
        Some(id) => coord.timers.restart(id, duration),
        None => coord.timers.start(ueid, TimerKind::T3450, duration),
    };
    if let Some(ctx) = coord.store.get_mut(ueid) {
        ctx.t3450 = Some(new_timer);
    }
}
