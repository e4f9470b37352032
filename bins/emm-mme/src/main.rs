mod reference_collaborators;

use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use emm_config::{toml_config, SharedConfig};
use emm_core::debug;
use emm_core::identity::Imsi;
use emm_entities::{AttachCoordinator, AttachParams, AuthVector, DecodeStatus, ResumeEvent};
use emm_saps::SoftwareTimerService;

use reference_collaborators::{ReferenceCommonProc, ReferenceEmmAs, ReferenceEmmReg, ReferenceEsm, ReferenceMmeApi};

fn load_config_from_toml(cfg_path: &str) -> SharedConfig {
    match toml_config::from_file(cfg_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

fn build_coordinator(cfg: &SharedConfig) -> AttachCoordinator {
    let gummei = cfg.config().gummei.gummei;
    let tac_list = cfg.config().gummei.tac_list.clone();

    AttachCoordinator::new(
        cfg.clone(),
        Box::new(ReferenceMmeApi::new(gummei, tac_list)),
        Box::new(ReferenceEsm),
        Box::new(ReferenceEmmAs),
        Box::new(ReferenceEmmReg),
        Box::new(ReferenceCommonProc),
        Box::new(SoftwareTimerService::new()),
    )
}

/// Drives one UE through the happy path by hand: an IMSI Attach Request, followed by the
/// out-of-band authentication-info reply and the two common-procedure outcomes it would
/// otherwise take a real Authentication/Identification/Security-Mode-Control implementation to
/// produce, ending in Attach Complete. Every SAP primitive the Coordinator emits along the way is
/// printed by the reference collaborators above.
fn run_happy_path_demo(coord: &mut AttachCoordinator) {
    let ueid = emm_core::ids::UeId(1);
    let imsi = Imsi::from_decimal_str("208930000000001").expect("valid test imsi");

    println!("--- attach_request (IMSI, no GUTI, no prior context) ---");
    coord.attach_request(
        ueid,
        AttachParams {
            attach_type: emm_core::attach_type::AttachType::Eps,
            is_native_ksi: false,
            ksi: emm_core::security::KsiType::KsiNotAvailable,
            is_native_guti: false,
            guti: None,
            imsi: Some(imsi),
            imei: None,
            tai: Some(1),
            eea: emm_core::security::Eea(0xF0),
            eia: emm_core::security::Eia(0xF0),
            ucs2: false,
            uea: None,
            uia: None,
            gea: None,
            umts_present: false,
            gprs_present: false,
            esm_msg: vec![0xD0, 0x01],
            decode_status: DecodeStatus::Ok,
        },
    );

    println!("--- authentication-info reply arrives ---");
    coord.on_procedure_outcome(
        ueid,
        ResumeEvent::AuthInfoReady(Ok(AuthVector { rand: vec![0xAA; 16], autn: vec![0xBB; 16] })),
    );

    println!("--- Authentication common procedure resolves ---");
    coord.on_procedure_outcome(ueid, ResumeEvent::Authentication(Ok(())));

    println!("--- Security Mode Control resolves ---");
    coord.on_procedure_outcome(
        ueid,
        ResumeEvent::SecurityModeControl(Ok((emm_core::security::Eea(1), emm_core::security::Eia(2)))),
    );

    println!("--- attach_complete ---");
    coord.attach_complete(ueid, Vec::new());

    println!("--- T3450 expiry simulation (no-op: attach already completed) ---");
    coord.poll_timers(Instant::now() + Duration::from_secs(60));
}

#[derive(Parser, Debug)]
#[command(author, version, about = "EMM Attach demo MME", long_about = None)]
struct Args {
    /// TOML config with GUMMEI/feature parameters
    config: String,

    /// Optional path for a verbose debug log file, in addition to the stdout summary log
    #[arg(long)]
    verbose_log: Option<String>,
}

fn main() {
    println!("EMM Attach Coordinator — demo MME");

    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = debug::setup_logging_default(args.verbose_log);

    let mut coord = build_coordinator(&cfg);
    run_happy_path_demo(&mut coord);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("failed to set Ctrl+C handler");

    println!("demo run complete ({} context(s) remain); Ctrl+C to exit", coord.context_count());
    while running.load(Ordering::SeqCst) {
        coord.poll_timers(Instant::now());
        std::thread::sleep(Duration::from_millis(200));
    }
}
