//! Thin adapters that build SAP primitives out of context state. Kept separate from the phase
//! modules so that the wire-shape of each primitive changes in exactly one place (mirrors how
//! the reference stack's `mm_bs.rs` `rx_*` methods build their reply primitives inline but the
//! primitive *types* themselves live in `tetra-saps`).

use emm_core::cause::EmmCause;
use emm_core::ids::UeId;
use emm_saps::{EmmAsEstablishCnf, EmmAsEstablishRej, EmmRegAttachCnf, EmmRegAttachRej, EmmRegProcAbort};

use crate::context::{AttachRetransmissionRecord, UeEmmContext};

pub fn build_establish_cnf(ctx: &UeEmmContext, retransmission: &AttachRetransmissionRecord) -> EmmAsEstablishCnf {
    let current = ctx.guti().unwrap_or_else(|| unreachable!("attach_accept requires a guti to be installed"));

    // The UE is still addressed by whatever GUTI it was last told about: `old_guti` when this
    // Attach Accept is carrying an implicit reallocation, otherwise the current one.
    let guti = if ctx.guti_is_new { ctx.old_guti.unwrap_or(current) } else { current };
    let new_guti = if ctx.guti_is_new { Some(current) } else { None };

    let (selected_eea, selected_eia) = ctx
        .security
        .as_ref()
        .map(|s| (s.selected_eea, s.selected_eia))
        .unwrap_or((emm_core::security::EEA0, emm_core::security::EIA0));

    EmmAsEstablishCnf {
        ueid: ctx.ueid,
        guti,
        new_guti,
        tac_list: vec![ctx.tac; ctx.n_tacs.max(1) as usize],
        nas_msg: retransmission.esm_msg.clone(),
        selected_eea,
        selected_eia,
    }
}

pub fn build_establish_rej(ctx: &UeEmmContext) -> EmmAsEstablishRej {
    let cause = if matches!(ctx.cause, EmmCause::Success) { EmmCause::IllegalUe } else { ctx.cause };
    let nas_msg = if matches!(cause, EmmCause::EsmFailure) { ctx.esm_msg.clone().unwrap_or_default() } else { Vec::new() };
    EmmAsEstablishRej { ueid: ctx.ueid, cause, nas_msg }
}

pub fn build_attach_cnf(ueid: UeId) -> EmmRegAttachCnf {
    EmmRegAttachCnf { ueid }
}

pub fn build_attach_rej(ueid: UeId, cause: EmmCause) -> EmmRegAttachRej {
    EmmRegAttachRej { ueid, cause }
}

pub fn build_proc_abort(ueid: UeId) -> EmmRegProcAbort {
    EmmRegProcAbort { ueid }
}
