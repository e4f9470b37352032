//! End-to-end tests for the Attach Coordinator, driven entirely through its three public entry
//! points (`attach_request`, `attach_complete`, `on_procedure_outcome`) plus `poll_timers`.
//!
//! The collaborator stubs below play the same role as the reference stack's `Sink`
//! (`tetra-entities/tests/common/sink.rs`): each one records the SAP primitives it receives into a
//! shared log instead of acting on them, so a test can assert on exactly what the Coordinator
//! emitted.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use emm_config::{GummeiConfig, MmeConfig, SharedConfig};
use emm_core::attach_type::AttachType;
use emm_core::cause::EmmCause;
use emm_core::identity::{Guti, Gummei, Imei, Imsi, Plmn};
use emm_core::ids::UeId;
use emm_core::security::{Eea, Eia, KsiType};
use emm_entities::{AttachCoordinator, AttachParams, AuthVector, DecodeStatus, ResumeEvent};
use emm_saps::{
    CommonProcedureSap, EmmAsEstablishCnf, EmmAsEstablishRej, EmmAsSap, EmmRegAttachCnf, EmmRegAttachRej,
    EmmRegCommonProcReq, EmmRegProcAbort, EmmRegSap, EsmDefaultEpsBearerContextActivateCnf, EsmOutcome,
    EsmPdnConnectivityReq, EsmPdnConnectivityRej, EsmSap, MmeApi, SoftwareTimerService,
};

#[derive(Default)]
struct Log {
    establish_cnf: Vec<EmmAsEstablishCnf>,
    establish_rej: Vec<EmmAsEstablishRej>,
    proc_abort: Vec<UeId>,
    attach_cnf: Vec<EmmRegAttachCnf>,
    attach_rej: Vec<EmmRegAttachRej>,
    common_proc_req: Vec<EmmRegCommonProcReq>,
    pdn_rej: Vec<EsmPdnConnectivityRej>,
    new_guti_calls: u32,
    auth_info_requests: u32,
    start_identification: u32,
    start_authentication: u32,
    start_smc: u32,
}

type SharedLog = Arc<Mutex<Log>>;

fn test_gummei() -> Gummei {
    Gummei { plmn: Plmn { mcc: 208, mnc: 93, mnc_length: 2 }, mme_gid: 1, mme_code: 1 }
}

fn test_config() -> MmeConfig {
    let mut cfg = MmeConfig::new(GummeiConfig { gummei: test_gummei(), tac_list: vec![1, 2, 3] });
    cfg.t3450_secs = 1;
    cfg.attach_counter_max = 5;
    cfg
}

/// Always accepts identification/IMEI checks, allocates sequential GUTIs, and resolves a single
/// pre-seeded GUTI (used by the rekey scenario) back to its IMSI.
struct StubMmeApi {
    log: SharedLog,
    next_m_tmsi: u32,
    tac_list: Vec<u16>,
    known_guti: Option<(Guti, Imsi)>,
}

impl StubMmeApi {
    fn new(log: SharedLog, tac_list: Vec<u16>) -> Self {
        Self { log, next_m_tmsi: 1, tac_list, known_guti: None }
    }
}

impl MmeApi for StubMmeApi {
    fn identify_imsi(&mut self, _ueid: UeId, _imsi: &Imsi) -> Result<(), EmmCause> {
        Ok(())
    }

    fn identify_guti(&mut self, _ueid: UeId, guti: &Guti) -> Result<Imsi, EmmCause> {
        match &self.known_guti {
            Some((known, imsi)) if known == guti => Ok(imsi.clone()),
            _ => Err(EmmCause::IllegalUe),
        }
    }

    fn identify_imei(&mut self, _ueid: UeId, _imei: &Imei) -> Result<(), EmmCause> {
        Ok(())
    }

    fn new_guti(&mut self, _imsi: &Imsi) -> (Guti, Vec<u16>) {
        self.log.lock().unwrap().new_guti_calls += 1;
        let m_tmsi = self.next_m_tmsi;
        self.next_m_tmsi += 1;
        (Guti { gummei: test_gummei(), m_tmsi }, self.tac_list.clone())
    }

    fn notify_ue_id_changed(&mut self, _old: UeId, _new: UeId) {}
    fn notify_new_guti(&mut self, _ueid: UeId, _guti: &Guti) {}

    fn find_mnc_length(&self, _digits: &[u8]) -> u8 {
        2
    }

    fn request_authentication_info(&mut self, _ueid: UeId, _imsi: &Imsi, _num_vectors: u8) {
        self.log.lock().unwrap().auth_info_requests += 1;
    }
}

/// Accepts every PDN Connectivity Request with a fixed reply, so the retransmission record is
/// always the same bytes across a test run.
struct StubEsm {
    log: SharedLog,
    reply: Vec<u8>,
}

impl EsmSap for StubEsm {
    fn pdn_connectivity_req(&mut self, _req: EsmPdnConnectivityReq) -> EsmOutcome {
        EsmOutcome::Success { send: self.reply.clone() }
    }

    fn pdn_connectivity_rej(&mut self, rej: EsmPdnConnectivityRej) {
        self.log.lock().unwrap().pdn_rej.push(rej);
    }

    fn default_eps_bearer_context_activate_cnf(
        &mut self,
        _cnf: EsmDefaultEpsBearerContextActivateCnf,
    ) -> EsmOutcome {
        EsmOutcome::Success { send: Vec::new() }
    }
}

struct RecordingEmmAs {
    log: SharedLog,
}

impl EmmAsSap for RecordingEmmAs {
    fn establish_cnf(&mut self, cnf: EmmAsEstablishCnf) {
        self.log.lock().unwrap().establish_cnf.push(cnf);
    }

    fn establish_rej(&mut self, rej: EmmAsEstablishRej) {
        self.log.lock().unwrap().establish_rej.push(rej);
    }
}

struct RecordingEmmReg {
    log: SharedLog,
}

impl EmmRegSap for RecordingEmmReg {
    fn proc_abort(&mut self, ind: EmmRegProcAbort) {
        self.log.lock().unwrap().proc_abort.push(ind.ueid);
    }

    fn attach_cnf(&mut self, ind: EmmRegAttachCnf) {
        self.log.lock().unwrap().attach_cnf.push(ind);
    }

    fn attach_rej(&mut self, ind: EmmRegAttachRej) {
        self.log.lock().unwrap().attach_rej.push(ind);
    }

    fn common_proc_req(&mut self, ind: EmmRegCommonProcReq) {
        self.log.lock().unwrap().common_proc_req.push(ind);
    }
}

struct RecordingCommonProc {
    log: SharedLog,
}

impl CommonProcedureSap for RecordingCommonProc {
    fn start_identification(&mut self, _ueid: UeId) {
        self.log.lock().unwrap().start_identification += 1;
    }

    fn start_authentication(&mut self, _ueid: UeId) {
        self.log.lock().unwrap().start_authentication += 1;
    }

    fn start_security_mode_control(&mut self, _ueid: UeId) {
        self.log.lock().unwrap().start_smc += 1;
    }
}

fn build(log: SharedLog, known_guti: Option<(Guti, Imsi)>) -> AttachCoordinator {
    let shared = SharedConfig::new(test_config());
    let mut mme_api = StubMmeApi::new(log.clone(), shared.config().gummei.tac_list.clone());
    mme_api.known_guti = known_guti;
    AttachCoordinator::new(
        shared,
        Box::new(mme_api),
        Box::new(StubEsm { log: log.clone(), reply: vec![0xC2, 0x01] }),
        Box::new(RecordingEmmAs { log: log.clone() }),
        Box::new(RecordingEmmReg { log: log.clone() }),
        Box::new(RecordingCommonProc { log: log.clone() }),
        Box::new(SoftwareTimerService::new()),
    )
}

fn test_imsi(last_digit: u8) -> Imsi {
    Imsi::from_decimal_str(&format!("20893000000000{last_digit}")).expect("valid test imsi")
}

fn imsi_attach_req(imsi: Imsi, eea: Eea) -> AttachParams {
    AttachParams {
        attach_type: AttachType::Eps,
        is_native_ksi: false,
        ksi: KsiType::KsiNotAvailable,
        is_native_guti: false,
        guti: None,
        imsi: Some(imsi),
        imei: None,
        tai: Some(7),
        eea,
        eia: Eia(0xF0),
        ucs2: false,
        uea: None,
        uia: None,
        gea: None,
        umts_present: false,
        gprs_present: false,
        esm_msg: vec![0xD0, 0x01],
        decode_status: DecodeStatus::Ok,
    }
}

/// Drives an IMSI attach through the out-of-band authentication-info reply and the two
/// common-procedure outcomes a real Authentication/Security-Mode-Control implementation would
/// eventually report back.
fn drive_to_accept(coord: &mut AttachCoordinator, ueid: UeId, imsi: Imsi, eea: Eea) {
    coord.attach_request(ueid, imsi_attach_req(imsi, eea));
    coord.on_procedure_outcome(
        ueid,
        ResumeEvent::AuthInfoReady(Ok(AuthVector { rand: vec![0xAA; 16], autn: vec![0xBB; 16] })),
    );
    coord.on_procedure_outcome(ueid, ResumeEvent::Authentication(Ok(())));
    coord.on_procedure_outcome(ueid, ResumeEvent::SecurityModeControl(Ok((Eea(1), Eia(2)))));
}

#[test]
fn happy_path_imsi_allocates_fresh_guti_and_attaches() {
    let log: SharedLog = Arc::default();
    let mut coord = build(log.clone(), None);
    let ueid = UeId(1);

    drive_to_accept(&mut coord, ueid, test_imsi(1), Eea(0xF0));

    {
        let l = log.lock().unwrap();
        assert_eq!(l.auth_info_requests, 1);
        assert_eq!(l.start_identification, 0, "the IMSI path never forces Identification");
        assert_eq!(l.start_authentication, 1);
        assert_eq!(l.start_smc, 1);
        assert_eq!(l.common_proc_req.len(), 0, "no GUTI was reallocated before an old one existed");
        // The Context Updater synthesizes the GUTI directly from local state (MME config + the
        // m-TMSI counter); `MmeApi::new_guti` is only called for the security-already-present
        // reallocation branch, which a first-time attach never takes.
        assert_eq!(l.new_guti_calls, 0);
        assert_eq!(l.establish_cnf.len(), 1);
        let cnf = &l.establish_cnf[0];
        assert!(cnf.new_guti.is_some());
        assert_eq!(cnf.guti.gummei.plmn.mcc, 208);
        assert_eq!(cnf.guti.gummei.plmn.mnc, 93);
    }

    coord.attach_complete(ueid, Vec::new());
    let l = log.lock().unwrap();
    assert_eq!(l.attach_cnf.len(), 1);
    assert_eq!(l.attach_rej.len(), 0);
    assert_eq!(coord.context_count(), 1);
}

#[test]
fn duplicate_attach_request_is_a_noop() {
    let log: SharedLog = Arc::default();
    let mut coord = build(log.clone(), None);
    let ueid = UeId(2);
    let imsi = test_imsi(2);

    coord.attach_request(ueid, imsi_attach_req(imsi.clone(), Eea(0xF0)));
    assert_eq!(log.lock().unwrap().new_guti_calls, 0, "the first attach synthesizes its GUTI locally");

    // Same parameters while the first request is still suspended on the auth-info reply.
    coord.attach_request(ueid, imsi_attach_req(imsi, Eea(0xF0)));

    let l = log.lock().unwrap();
    assert_eq!(l.new_guti_calls, 0, "duplicate must not allocate a second GUTI");
    assert_eq!(l.proc_abort.len(), 0, "duplicate must not abort the in-flight procedure");
}

#[test]
fn parameter_change_mid_procedure_restarts_with_fresh_guti() {
    let log: SharedLog = Arc::default();
    let mut coord = build(log.clone(), None);
    let ueid = UeId(3);
    let imsi = test_imsi(3);

    coord.attach_request(ueid, imsi_attach_req(imsi.clone(), Eea(0xF0)));
    assert_eq!(log.lock().unwrap().new_guti_calls, 0, "the first attach synthesizes its GUTI locally");

    // Second Attach Request with a changed EEA while the first is still suspended.
    coord.attach_request(ueid, imsi_attach_req(imsi, Eea(0x00)));

    let l = log.lock().unwrap();
    assert_eq!(l.proc_abort.len(), 1, "parameter change must abort the in-flight procedure");
    assert_eq!(l.new_guti_calls, 0, "the restarted attach also synthesizes its own GUTI locally");
}

#[test]
fn t3450_exhaustion_retransmits_then_aborts() {
    let log: SharedLog = Arc::default();
    let mut coord = build(log.clone(), None);
    let ueid = UeId(4);

    drive_to_accept(&mut coord, ueid, test_imsi(4), Eea(0xF0));
    assert_eq!(log.lock().unwrap().establish_cnf.len(), 1);

    for _ in 0..5 {
        coord.poll_timers(Instant::now() + Duration::from_secs(2));
    }

    let l = log.lock().unwrap();
    assert_eq!(l.establish_cnf.len(), 5, "4 retransmissions plus the original Attach Accept");
    let first = &l.establish_cnf[0].nas_msg;
    assert!(l.establish_cnf.iter().all(|cnf| &cnf.nas_msg == first), "retransmissions resend verbatim");
    assert_eq!(l.pdn_rej.len(), 1);
    assert_eq!(l.attach_rej.len(), 1);
    drop(l);
    assert_eq!(coord.context_count(), 0, "the context is released once T3450 is exhausted");
}

#[test]
fn emergency_attach_disabled_rejects_immediately() {
    let log: SharedLog = Arc::default();
    let mut coord = build(log.clone(), None);
    let ueid = UeId(5);

    let mut req = imsi_attach_req(test_imsi(5), Eea(0xF0));
    req.attach_type = AttachType::Emergency;
    coord.attach_request(ueid, req);

    let l = log.lock().unwrap();
    assert_eq!(l.establish_rej.len(), 1);
    assert_eq!(l.establish_rej[0].cause, EmmCause::ImeiNotAccepted);
    assert_eq!(l.new_guti_calls, 0);
    drop(l);
    assert_eq!(coord.context_count(), 0, "a disabled emergency attach never creates a context");
}

#[test]
fn ue_id_change_via_known_guti_rekeys_and_continues() {
    let imsi = test_imsi(6);
    let known_guti = Guti { gummei: test_gummei(), m_tmsi: 555 };

    let log: SharedLog = Arc::default();
    let mut coord = build(log.clone(), Some((known_guti, imsi.clone())));

    // Establish a context under ueid 42 carrying the known GUTI.
    let old_ueid = UeId(42);
    let mut first_req = imsi_attach_req(imsi.clone(), Eea(0xF0));
    first_req.guti = Some(known_guti);
    first_req.is_native_guti = true;
    coord.attach_request(old_ueid, first_req.clone());

    let l = log.lock().unwrap();
    assert_eq!(l.auth_info_requests, 1);
    drop(l);

    // Now the same GUTI arrives under a new ueid: the context must move, not duplicate.
    let new_ueid = UeId(99);
    coord.attach_request(new_ueid, first_req);

    // Exactly one context survives, now keyed by the new ueid, and the procedure continued as a
    // duplicate rather than starting a second independent attach.
    assert_eq!(coord.context_count(), 1);
    let l = log.lock().unwrap();
    assert_eq!(l.auth_info_requests, 1, "the rekeyed context is a duplicate, not a fresh attach");
    assert_eq!(l.proc_abort.len(), 0, "identical parameters must not abort the in-flight procedure");
    assert_eq!(l.new_guti_calls, 0, "this scenario always supplies an explicit GUTI");
}
