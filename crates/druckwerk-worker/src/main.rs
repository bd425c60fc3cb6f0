// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Druckwerk — queue-driven print worker.
//
// Entry point. Initialises logging, loads configuration, wires the device
// executor, broker consumer, and heartbeat together, and runs the
// connection supervisor until a shutdown signal arrives.

use tokio::sync::watch;

use druckwerk_broker::{ConnectionSupervisor, JobConsumer, RetryPolicy};
use druckwerk_core::error::Result;
use druckwerk_core::state::{ConnectionStatus, SharedJobState};
use druckwerk_core::WorkerConfig;
use druckwerk_device::{CupsDriver, CupsProbe, ReadinessGate, SubmissionExecutor};
use druckwerk_report::{Heartbeat, HttpReporter};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Druckwerk worker starting");

    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "worker stopped with error");
        std::process::exit(1);
    }

    tracing::info!("worker stopped");
}

async fn run(config: WorkerConfig) -> Result<()> {
    let job_state = SharedJobState::new();
    let status = ConnectionStatus::new();

    // Heartbeat runs in its own task, decoupled from message processing.
    let heartbeat = Heartbeat::new(
        &config.api_base,
        config.api_token.clone(),
        config.heartbeat_interval,
        config.worker_id.clone(),
        config.printer_id.clone(),
        config.default_printer.clone(),
        CupsProbe::new(config.probe_timeout),
        job_state.clone(),
        status.clone(),
    );
    tokio::spawn(heartbeat.run());

    let executor = SubmissionExecutor::new(
        CupsDriver::new(config.probe_timeout),
        CupsProbe::new(config.probe_timeout),
        ReadinessGate::new(config.ready_max_wait, config.ready_poll_interval),
        config.completion_timeout,
        config.completion_timeout,
        config.disable_print,
    );

    let consumer = JobConsumer::new(
        executor,
        RetryPolicy::new(config.retry_delay),
        config.max_attempts,
        job_state,
        HttpReporter::new(&config.api_base, config.api_token.clone()),
        config.default_printer.clone(),
        config.default_method,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut supervisor = ConnectionSupervisor::new(
        config.amqp_uri(),
        config.queue_name(),
        format!("druckwerk-{}", config.worker_id),
        status,
        shutdown_rx,
    );

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received, closing broker connection");
            let _ = shutdown_tx.send(true);
        }
    });

    tracing::info!(
        worker_id = %config.worker_id,
        queue = %config.queue_name(),
        printer = %config.default_printer,
        "worker ready"
    );

    supervisor.run(&consumer).await
}
