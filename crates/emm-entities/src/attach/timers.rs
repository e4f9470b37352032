//! T3450 expiry handling: driven once per tick by `AttachCoordinator::poll_timers`, which calls
//! [`poll`]. T3460/T3470 belong to the Authentication and Identification common procedures
//! themselves; the Coordinator only stops them on release.

use std::time::Instant;

use emm_core::ids::UeId;
use emm_saps::TimerKind;

use crate::attach::coordinator::AttachCoordinator;
use crate::attach::{abnormal, accept};

pub fn poll(coord: &mut AttachCoordinator, now: Instant) {
    let expired = coord.timers.poll_expired(now);
    for (ueid, kind) in expired {
        if kind == TimerKind::T3450 {
            handle_t3450_expiry(coord, ueid);
        }
    }
}

/// Increments the retransmission count; retransmits Attach Accept while under the configured
/// bound, aborts once it's exhausted.
fn handle_t3450_expiry(coord: &mut AttachCoordinator, ueid: UeId) {
    if let Some(ctx) = coord.store.get_mut(ueid) {
        ctx.t3450 = None;
    }

    let should_retransmit = match coord.retransmissions.get_mut(&ueid) {
        Some(record) => {
            record.retransmission_count += 1;
            record.retransmission_count < coord.config.config().attach_counter_max
        }
        None => return,
    };

    if should_retransmit {
        accept::attach_accept(coord, ueid);
    } else {
        abnormal::abort(coord, ueid);
    }
}
