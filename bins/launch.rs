//! Process bootstrap shared by both service binaries: logging, config, panic
//! hook, runtime, Ctrl+C.
use std::future::Future;
use std::process::ExitCode;

use configs::AppConfig;
use tracing::{error, info};
use uuid::Uuid;

fn init_logging(service: &str) {
    // .env first so RUST_LOG and LOG_FORMAT from it take effect
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service, event = "logger_init", "tracing subscriber initialized");
}

pub fn launch<F, Fut>(service: &'static str, run: F) -> ExitCode
where
    F: FnOnce(AppConfig) -> Fut,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    init_logging(service);

    let instance_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(service, event = "panic", %instance_id, pid, message = %info, "unhandled panic occurred");
    }));

    let cfg = match AppConfig::load_and_validate(service) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service, event = "config_invalid", error = %e, "configuration rejected");
            return ExitCode::FAILURE;
        }
    };
    let worker_threads = cfg.server.worker_threads;

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service, event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service,
        event = "start",
        %instance_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "service starting"
    );

    let server = run(cfg);
    rt.block_on(async move {
        let task = tokio::spawn(server);
        tokio::select! {
            res = task => match res {
                Ok(Ok(())) => {
                    info!(service, event = "stop", %instance_id, pid, "service stopped normally");
                    ExitCode::SUCCESS
                }
                Ok(Err(e)) => {
                    error!(service, event = "run_failed", error = %e, "service returned error");
                    ExitCode::FAILURE
                }
                Err(e) => {
                    error!(service, event = "task_join_error", error = %e, "service task join error");
                    ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!(service, event = "shutdown_signal", %instance_id, pid, "received Ctrl+C, shutting down");
                ExitCode::SUCCESS
            }
        }
    })
}
