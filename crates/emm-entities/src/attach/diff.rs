//! Parameter Diff: `parameters_have_changed`, a pure predicate deciding whether an incoming
//! Attach Request must abort and restart the in-flight procedure.

use crate::attach::AttachParams;
use crate::context::UeEmmContext;

/// Returns `true` iff the incoming request's parameters differ from the stored context in any
/// way that must abort and restart the in-flight procedure. Comparisons run in the order listed
/// below and short-circuit on the first mismatch; the TAI and the opaque `esm_msg` are
/// deliberately excluded.
pub fn parameters_have_changed(ctx: &UeEmmContext, req: &AttachParams) -> bool {
    if ctx.is_emergency != matches!(req.attach_type, emm_core::attach_type::AttachType::Emergency) {
        return true;
    }
    if ctx.ksi != req.ksi {
        return true;
    }
    if ctx.eea != req.eea {
        return true;
    }
    if ctx.eia != req.eia {
        return true;
    }
    if ctx.umts_present != req.umts_present {
        return true;
    }
    if ctx.umts_present && req.umts_present {
        if ctx.ucs2 != req.ucs2 {
            return true;
        }
        if ctx.uea != req.uea {
            return true;
        }
        if ctx.uia != req.uia {
            return true;
        }
    }
    if ctx.gprs_present != req.gprs_present {
        return true;
    }
    if ctx.gprs_present && req.gprs_present && ctx.gea != req.gea {
        return true;
    }
    if guti_changed(ctx, req) {
        return true;
    }
    if identity_changed(ctx.imsi.as_ref(), req.imsi.as_ref()) {
        return true;
    }
    if identity_changed(ctx.imei.as_ref(), req.imei.as_ref()) {
        return true;
    }
    false
}

/// A GUTI the context allocated itself this Attach and hasn't had confirmed by Attach Complete
/// yet (`guti_is_new`) is not something the UE could possibly have echoed back — a retransmitted
/// request still carries whatever the UE originally presented (often none), so it is not compared.
fn guti_changed(ctx: &UeEmmContext, req: &AttachParams) -> bool {
    if ctx.guti_is_new {
        return false;
    }
    match (ctx.guti(), req.guti) {
        (None, None) => false,
        (Some(_), None) | (None, Some(_)) => true,
        (Some(a), Some(b)) => a.m_tmsi != b.m_tmsi || a.gummei != b.gummei,
    }
}

fn identity_changed<T: PartialEq>(a: Option<&T>, b: Option<&T>) -> bool {
    match (a, b) {
        (None, None) => false,
        (Some(_), None) | (None, Some(_)) => true,
        (Some(a), Some(b)) => a != b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attach::DecodeStatus;
    use emm_core::attach_type::AttachType;
    use emm_core::identity::Imsi;
    use emm_core::security::{Eea, Eia, KsiType};

    fn base_ctx() -> UeEmmContext {
        let mut ctx = UeEmmContext::new(emm_core::ids::UeId(1));
        ctx.ksi = KsiType::Native(7);
        ctx.eea = Eea(0xF0);
        ctx.eia = Eia(0xF0);
        ctx
    }

    fn base_req() -> AttachParams {
        AttachParams {
            attach_type: AttachType::Eps,
            is_native_ksi: true,
            ksi: KsiType::Native(7),
            is_native_guti: false,
            guti: None,
            imsi: Imsi::from_decimal_str("208930000000001"),
            imei: None,
            tai: None,
            eea: Eea(0xF0),
            eia: Eia(0xF0),
            ucs2: false,
            uea: None,
            uia: None,
            gea: None,
            umts_present: false,
            gprs_present: false,
            esm_msg: vec![0xDE, 0xAD],
            decode_status: DecodeStatus::Ok,
        }
    }

    #[test]
    fn identical_request_has_not_changed() {
        let mut ctx = base_ctx();
        ctx.imsi = base_req().imsi;
        assert!(!parameters_have_changed(&ctx, &base_req()));
    }

    #[test]
    fn changed_eea_is_detected() {
        let ctx = base_ctx();
        let mut req = base_req();
        req.eea = Eea(0x00);
        assert!(parameters_have_changed(&ctx, &req));
    }

    #[test]
    fn tai_alone_is_not_a_change() {
        let mut ctx = base_ctx();
        ctx.imsi = base_req().imsi;
        ctx.tac = 5;
        let mut req = base_req();
        req.tai = Some(999);
        assert!(!parameters_have_changed(&ctx, &req));
    }

    #[test]
    fn esm_msg_alone_is_not_a_change() {
        let mut ctx = base_ctx();
        ctx.imsi = base_req().imsi;
        let mut req = base_req();
        req.esm_msg = vec![0x00];
        assert!(!parameters_have_changed(&ctx, &req));
    }

    #[test]
    fn new_imsi_where_none_was_present_is_a_change() {
        let ctx = base_ctx();
        assert!(parameters_have_changed(&ctx, &base_req()));
    }
}
