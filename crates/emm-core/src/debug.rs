//! Logging bootstrap shared by every crate in the workspace. Each binary (or test harness) calls
//! one of the `setup_logging*` functions exactly once; a `Once` guard makes repeated calls from
//! integration tests harmless.

use std::fs::OpenOptions;
use std::sync::Once;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt as tracingfmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Logs at WARN that a code path is known-unimplemented, without aborting the procedure. Used
/// for collaborator calls the Attach core can shrug off rather than depend on (e.g. the EPS
/// Bearer Context default QoS values an ESM stub doesn't populate).
#[macro_export]
macro_rules! unimplemented_log {
    ( $($arg:tt)* ) => {{
        tracing::warn!(
            "unimplemented: {}",
            format_args!($($arg)*),
        );
    }};
}

/// If `cond` is false, logs a warning identifying the failed condition and its call site,
/// without panicking. Used at invariant boundaries the Attach core expects to hold but that a
/// misbehaving collaborator could in principle violate.
#[macro_export]
macro_rules! assert_warn {
    ($cond:expr, $($arg:tt)+) => {{
        if !$cond {
            tracing::warn!(
                target: module_path!(),
                "assertion warning: `{}` failed: {} at {}:{}",
                stringify!($cond),
                format_args!($($arg)+),
                file!(),
                line!(),
            );
        }
    }};
}

static INIT_LOG: Once = Once::new();

/// Sets up logging at trace verbosity. Mainly for unit/integration tests.
pub fn setup_logging_verbose() {
    setup_logging(EnvFilter::new("trace"), None);
}

/// Sets up default logging to stdout and, optionally, a verbose log file. Returns a guard that
/// must be kept alive for file logging to keep flushing.
pub fn setup_logging_default(verbose_logfile: Option<String>) -> Option<WorkerGuard> {
    let stdout_filter = get_default_stdout_filter();
    let logfile_and_filter = verbose_logfile.map(|file| (file, get_default_logfile_filter()));
    setup_logging(stdout_filter, logfile_and_filter)
}

pub fn get_default_stdout_filter() -> EnvFilter {
    EnvFilter::new("info")
        // Per-attempt retransmission bookkeeping is noisy at info.
        .add_directive("emm_entities::attach::timers=warn".parse().unwrap())
        .add_directive("emm_entities::attach::coordinator=debug".parse().unwrap())
        .add_directive("emm_entities::attach::identify=debug".parse().unwrap())
        .add_directive("emm_entities::attach::security=debug".parse().unwrap())
        .add_directive("emm_entities::attach::accept=debug".parse().unwrap())
}

fn get_default_logfile_filter() -> EnvFilter {
    EnvFilter::new("debug")
}

fn setup_logging(stdout_filter: EnvFilter, outfile: Option<(String, EnvFilter)>) -> Option<WorkerGuard> {
    if let Some((outfile, outfile_filter)) = outfile {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(outfile)
            .expect("failed to open log file");
        let (file_writer, guard) = tracing_appender::non_blocking(file);

        INIT_LOG.call_once(|| {
            let file_layer = tracingfmt::layer().with_writer(file_writer).with_ansi(false);
            let stdout_layer = tracingfmt::layer();

            tracing_subscriber::registry()
                .with(file_layer.with_filter(outfile_filter))
                .with(stdout_layer.with_filter(stdout_filter))
                .init();
        });

        Some(guard)
    } else {
        INIT_LOG.call_once(|| {
            let stdout_layer = tracingfmt::layer();
            tracing_subscriber::registry().with(stdout_layer.with_filter(stdout_filter)).init();
        });
        None
    }
}
