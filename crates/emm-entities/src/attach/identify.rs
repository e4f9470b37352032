//! Phase: Identify (3GPP TS 24.301 §5.5.1.2.3). Selects an identification path from whichever
//! identity the Attach Request (or a rekey) left on the context, resolves it, reallocates the
//! GUTI when the path calls for it, and hands off to the security-path selection that both
//! `identify` and the auth-info resume converge on.

use emm_core::cause::EmmCause;
use emm_core::fsm::PendingProcedure;
use emm_core::ids::UeId;

use crate::attach::coordinator::AttachCoordinator;
use crate::attach::security;
use crate::attach::accept;

/// Number of authentication vectors requested per `request_authentication_info` call. Out of
/// scope to make configurable: the vector-count tradeoff belongs to the MME API side.
const AUTH_VECTORS_PER_REQUEST: u8 = 1;

/// Entry point for the Identify phase, called whenever a context has just had its parameters
/// applied (fresh attach, restarted attach) or has resumed from the GUTI path's forced
/// Identification procedure.
pub fn identify(coord: &mut AttachCoordinator, ueid: UeId) {
    let Some(ctx) = coord.store.get(ueid) else { return };

    if let Some(imsi) = ctx.imsi.clone() {
        identify_via_imsi(coord, ueid, imsi);
        return;
    }
    if let Some(guti) = ctx.guti() {
        identify_via_guti(coord, ueid, guti);
        return;
    }
    if ctx.is_emergency {
        if let Some(imei) = ctx.imei.clone() {
            identify_via_imei(coord, ueid, imei);
            return;
        }
    }
    coord.reject_real(ueid, EmmCause::IllegalUe);
}

/// Resumes the IMSI path after an out-of-band authentication-info reply arrives. Does not
/// re-dispatch through [`identify`]: the IMSI path was already selected, only its suspension has
/// resolved. `guti_reallocation` is false here: that flag only applies to the security-already-
/// present branch of [`identify_via_imsi`], which synchronously calls `identify_imsi` rather than
/// suspending. The Context Updater already synthesized this context's GUTI before Identify ran.
pub fn resume_after_auth_info(coord: &mut AttachCoordinator, ueid: UeId) {
    post_identification(coord, ueid, false);
}

fn identify_via_imsi(coord: &mut AttachCoordinator, ueid: UeId, imsi: emm_core::identity::Imsi) {
    let has_security = coord.store.get(ueid).map(|c| c.security.is_some()).unwrap_or(false);
    if !has_security {
        coord.mme_api.request_authentication_info(ueid, &imsi, AUTH_VECTORS_PER_REQUEST);
        if let Some(ctx) = coord.store.get_mut(ueid) {
            ctx.phase = Some(PendingProcedure::AuthInfoRequest);
        }
        return;
    }

    match coord.mme_api.identify_imsi(ueid, &imsi) {
        Ok(()) => post_identification(coord, ueid, true),
        Err(cause) => coord.reject_real(ueid, cause),
    }
}

/// Always starts the Identification common procedure, regardless of whether `identify_guti`
/// itself resolved the IMSI. This mirrors the reference source's forced-identification workaround
/// rather than the textbook "skip Identification on a successful GUTI lookup" reading.
fn identify_via_guti(coord: &mut AttachCoordinator, ueid: UeId, guti: emm_core::identity::Guti) {
    let resolved = coord.mme_api.identify_guti(ueid, &guti);
    if let (Ok(imsi), Some(ctx)) = (resolved, coord.store.get_mut(ueid)) {
        ctx.imsi = Some(imsi);
    }

    coord.common_proc.start_identification(ueid);
    if let Some(ctx) = coord.store.get_mut(ueid) {
        ctx.phase = Some(PendingProcedure::Identification);
    }
}

fn identify_via_imei(coord: &mut AttachCoordinator, ueid: UeId, imei: emm_core::identity::Imei) {
    match coord.mme_api.identify_imei(ueid, &imei) {
        Ok(()) => post_identification(coord, ueid, false),
        Err(_) => coord.reject_real(ueid, EmmCause::ImeiNotAccepted),
    }
}

/// Converges the IMSI and IMEI paths once identification has actually resolved: reallocates the
/// GUTI when called for, then selects the security path.
fn post_identification(coord: &mut AttachCoordinator, ueid: UeId, guti_reallocation: bool) {
    if guti_reallocation {
        reallocate_guti(coord, ueid);
    }
    select_security_path(coord, ueid);
}

fn reallocate_guti(coord: &mut AttachCoordinator, ueid: UeId) {
    let Some(imsi) = coord.store.get(ueid).and_then(|c| c.imsi.clone()) else { return };
    let (new_guti, tac_list) = coord.mme_api.new_guti(&imsi);

    if let Some(ctx) = coord.store.get_mut(ueid) {
        ctx.old_guti = ctx.guti();
    }
    if coord.store.set_guti(ueid, Some(new_guti)).is_err() {
        tracing::warn!(%ueid, "guti reallocation conflicted with an existing owner");
        return;
    }
    if let Some(ctx) = coord.store.get_mut(ueid) {
        ctx.guti_is_new = true;
        ctx.n_tacs = tac_list.len().max(1) as u8;
    }
    coord.mme_api.notify_new_guti(ueid, &new_guti);
}

fn select_security_path(coord: &mut AttachCoordinator, ueid: UeId) {
    let (has_security, is_emergency) = match coord.store.get(ueid) {
        Some(ctx) => (ctx.security.is_some(), ctx.is_emergency),
        None => return,
    };

    if has_security {
        accept::attach(coord, ueid);
        return;
    }

    if is_emergency && coord.config.config().unauthenticated_imsi {
        security::attach_security(coord, ueid);
        return;
    }

    coord.common_proc.start_authentication(ueid);
    if let Some(ctx) = coord.store.get_mut(ueid) {
        ctx.phase = Some(PendingProcedure::Authentication);
    }
}
