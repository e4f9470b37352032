//! Phase: Authenticate & Secure. Ensures a Security Context exists, then starts Security
//! Mode Control; the negotiated algorithms and the success/failure/abort outcome arrive back via
//! `AttachCoordinator::on_procedure_outcome`.

use emm_core::fsm::PendingProcedure;
use emm_core::ids::UeId;
use emm_core::security::SecurityContext;

use crate::attach::coordinator::AttachCoordinator;

pub fn attach_security(coord: &mut AttachCoordinator, ueid: UeId) {
    let Some(ctx) = coord.store.get_mut(ueid) else { return };
    if ctx.security.is_none() {
        ctx.security = Some(SecurityContext::new_unauthenticated());
    }

    coord.common_proc.start_security_mode_control(ueid);
    if let Some(ctx) = coord.store.get_mut(ueid) {
        ctx.phase = Some(PendingProcedure::SecurityModeControl);
    }
}
