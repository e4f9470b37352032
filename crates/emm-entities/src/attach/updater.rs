//! Context Updater: applies an Attach Request's parameters into a context, allocating or
//! refreshing the GUTI as needed. Grounded on `_emm_attach_update`'s GUTI-synthesis
//! semantics: MCC/MNC are carried by the IMSI, the MNC-length-dependent 3rd digit is padded with
//! `MNC_UNUSED_DIGIT` when the MNC is two digits long, and the GUMMEI's MMEcode/MMEgid come from
//! local configuration rather than from the request.

use std::fmt;

use emm_config::SharedConfig;
use emm_core::identity::Guti;
use emm_core::ids::UeId;
use emm_saps::MmeApi;

use crate::attach::AttachParams;
use crate::store::{ContextStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    ContextNotFound,
    NoIdentityToSynthesizeGuti,
    StoreConflict,
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpdateError::ContextNotFound => "no context exists for this ueid",
            UpdateError::NoIdentityToSynthesizeGuti => "neither a GUTI nor an IMSI was supplied",
            UpdateError::StoreConflict => "guti index conflict while applying update",
        };
        write!(f, "{s}")
    }
}

impl From<StoreError> for UpdateError {
    fn from(_: StoreError) -> Self {
        UpdateError::StoreConflict
    }
}

/// Applies `req` onto the context keyed by `ueid`. Overwrites scalar parameters unconditionally;
/// installs a caller-supplied GUTI or synthesizes a fresh one from the IMSI and local
/// configuration; byte-copies IMSI/IMEI and the opaque ESM message; clears `is_attached`.
pub fn context_update(
    store: &mut ContextStore,
    mme_api: &dyn MmeApi,
    shared: &SharedConfig,
    ueid: UeId,
    req: &AttachParams,
) -> Result<(), UpdateError> {
    let config = shared.config();

    {
        let ctx = store.get_mut(ueid).ok_or(UpdateError::ContextNotFound)?;
        ctx.attach_type = req.attach_type;
        ctx.is_emergency = matches!(req.attach_type, emm_core::attach_type::AttachType::Emergency);
        ctx.ksi = req.ksi;
        ctx.eea = req.eea;
        ctx.eia = req.eia;
        ctx.ucs2 = req.ucs2;
        ctx.uea = req.uea;
        ctx.uia = req.uia;
        ctx.gea = req.gea;
        ctx.umts_present = req.umts_present;
        ctx.gprs_present = req.gprs_present;

        if let Some(tac) = req.tai {
            ctx.tac = tac;
            ctx.n_tacs = 1;
        } else if ctx.n_tacs == 0 {
            ctx.n_tacs = config.gummei.tac_list.len() as u8;
        }

        ctx.imsi = req.imsi.clone().or_else(|| ctx.imsi.take());
        ctx.imei = req.imei.clone().or_else(|| ctx.imei.take());

        ctx.esm_msg = Some(req.esm_msg.clone());
        ctx.is_attached = false;
        ctx.fsm = emm_core::fsm::EmmFsmState::CommonProcedureInitiated;
    }

    if let Some(guti) = req.guti {
        store.set_guti(ueid, Some(guti))?;
        return Ok(());
    }

    synthesize_guti(store, mme_api, shared, ueid)
}

/// Synthesizes a fresh GUTI from the context's IMSI (MCC/MNC, via `find_mnc_length`) and the
/// locally configured GUMMEI, allocating the m-TMSI from the shared running counter. Installs it
/// via the Context Store (keeping the secondary index in lockstep) and sets `guti_is_new`.
fn synthesize_guti(
    store: &mut ContextStore,
    mme_api: &dyn MmeApi,
    shared: &SharedConfig,
    ueid: UeId,
) -> Result<(), UpdateError> {
    let imsi = {
        let ctx = store.get(ueid).ok_or(UpdateError::ContextNotFound)?;
        ctx.imsi.clone()
    };
    let Some(imsi) = imsi else {
        return Err(UpdateError::NoIdentityToSynthesizeGuti);
    };

    let mnc_length = mme_api.find_mnc_length(&imsi.digits);
    let Some(plmn) = imsi.plmn(mnc_length) else {
        return Err(UpdateError::NoIdentityToSynthesizeGuti);
    };
    let configured_plmn = shared.config().plmn();
    if plmn != configured_plmn {
        tracing::debug!(?plmn, configured = ?configured_plmn, "IMSI PLMN differs from configured GUMMEI PLMN");
    }

    let m_tmsi = shared.state_write().allocate_m_tmsi();
    let gummei = shared.config().gummei.gummei;
    let guti = Guti { gummei, m_tmsi };

    store.set_guti(ueid, Some(guti))?;
    if let Some(ctx) = store.get_mut(ueid) {
        ctx.guti_is_new = true;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attach::DecodeStatus;
    use crate::context::UeEmmContext;
    use emm_config::{GummeiConfig, MmeConfig};
    use emm_core::attach_type::AttachType;
    use emm_core::identity::{Gummei, Imsi, Plmn};
    use emm_core::security::{Eea, Eia, KsiType};

    struct StubApi;
    impl MmeApi for StubApi {
        fn identify_imsi(&mut self, _: UeId, _: &Imsi) -> Result<(), emm_core::cause::EmmCause> {
            Ok(())
        }
        fn identify_guti(&mut self, _: UeId, _: &Guti) -> Result<Imsi, emm_core::cause::EmmCause> {
            Err(emm_core::cause::EmmCause::IllegalUe)
        }
        fn identify_imei(&mut self, _: UeId, _: &emm_core::identity::Imei) -> Result<(), emm_core::cause::EmmCause> {
            Ok(())
        }
        fn new_guti(&mut self, _: &Imsi) -> (Guti, Vec<u16>) {
            unimplemented!()
        }
        fn notify_ue_id_changed(&mut self, _: UeId, _: UeId) {}
        fn notify_new_guti(&mut self, _: UeId, _: &Guti) {}
        fn find_mnc_length(&self, _: &[u8]) -> u8 {
            2
        }
        fn request_authentication_info(&mut self, _: UeId, _: &Imsi, _: u8) {}
    }

    fn test_config() -> MmeConfig {
        MmeConfig::new(GummeiConfig {
            gummei: Gummei { plmn: Plmn { mcc: 208, mnc: 93, mnc_length: 2 }, mme_gid: 1, mme_code: 1 },
            tac_list: vec![1, 2, 3],
        })
    }

    fn test_req(imsi: Option<Imsi>, guti: Option<Guti>) -> AttachParams {
        AttachParams {
            attach_type: AttachType::Eps,
            is_native_ksi: true,
            ksi: KsiType::Native(7),
            is_native_guti: guti.is_some(),
            guti,
            imsi,
            imei: None,
            tai: Some(5),
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
    fn synthesizes_guti_from_imsi_when_none_supplied() {
        let mut store = ContextStore::new();
        store.insert(UeEmmContext::new(UeId(1))).unwrap();
        let api = StubApi;
        let shared = SharedConfig::new(test_config());

        let imsi = Imsi::from_decimal_str("208930000000001");
        let req = test_req(imsi, None);

        context_update(&mut store, &api, &shared, UeId(1), &req).unwrap();

        let ctx = store.get(UeId(1)).unwrap();
        assert!(ctx.guti().is_some());
        assert!(ctx.guti_is_new);
    }

    #[test]
    fn installs_caller_supplied_guti_directly() {
        let mut store = ContextStore::new();
        store.insert(UeEmmContext::new(UeId(1))).unwrap();
        let api = StubApi;
        let shared = SharedConfig::new(test_config());

        let guti = Guti {
            gummei: Gummei { plmn: Plmn { mcc: 208, mnc: 93, mnc_length: 2 }, mme_gid: 1, mme_code: 1 },
            m_tmsi: 99,
        };
        let req = test_req(None, Some(guti));

        context_update(&mut store, &api, &shared, UeId(1), &req).unwrap();

        let ctx = store.get(UeId(1)).unwrap();
        assert_eq!(ctx.guti(), Some(guti));
        assert!(!ctx.guti_is_new);
    }

    #[test]
    fn fails_without_guti_or_imsi() {
        let mut store = ContextStore::new();
        store.insert(UeEmmContext::new(UeId(1))).unwrap();
        let api = StubApi;
        let shared = SharedConfig::new(test_config());
        let req = test_req(None, None);

        let err = context_update(&mut store, &api, &shared, UeId(1), &req).unwrap_err();
        assert_eq!(err, UpdateError::NoIdentityToSynthesizeGuti);
    }

    #[test]
    fn second_allocation_advances_m_tmsi_counter() {
        let mut store = ContextStore::new();
        store.insert(UeEmmContext::new(UeId(1))).unwrap();
        store.insert(UeEmmContext::new(UeId(2))).unwrap();
        let api = StubApi;
        let shared = SharedConfig::new(test_config());

        let imsi = Imsi::from_decimal_str("208930000000001");
        context_update(&mut store, &api, &shared, UeId(1), &test_req(imsi.clone(), None)).unwrap();
        context_update(&mut store, &api, &shared, UeId(2), &test_req(imsi, None)).unwrap();

        let g1 = store.get(UeId(1)).unwrap().guti().unwrap();
        let g2 = store.get(UeId(2)).unwrap().guti().unwrap();
        assert_ne!(g1.m_tmsi, g2.m_tmsi);
    }
}
