// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Periodic worker heartbeat, independent of job flow.
//
// Every interval: read the in-flight job slot, probe the device, snapshot
// the supervisor's connection state, and POST the lot to the tracking
// API. Runs forever in its own task; failures are logged and the next
// beat proceeds regardless.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use druckwerk_core::state::{ConnectionStatus, SharedJobState};
use druckwerk_core::types::{ConnectionState, DeviceStatus};
use druckwerk_device::probe::StatusProbe;

/// Timeout for one heartbeat delivery.
const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(5);

/// Broker link health as reported in the heartbeat.
#[derive(Debug, Serialize)]
struct QueueConnection {
    status: ConnectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

/// One heartbeat body.
#[derive(Debug, Serialize)]
struct HeartbeatBody<'a> {
    worker_id: &'a str,
    printer_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<String>,
    printer_status: DeviceStatus,
    queue_connection: QueueConnection,
    timestamp: String,
}

/// Periodic status reporter for `{api_base}/api/v1/worker-status`.
pub struct Heartbeat<P> {
    client: reqwest::Client,
    url: String,
    token: String,
    interval: Duration,
    worker_id: String,
    printer_id: String,
    /// Probe target — the device this worker serves.
    printer: String,
    probe: P,
    job_state: SharedJobState,
    connection: ConnectionStatus,
}

impl<P: StatusProbe> Heartbeat<P> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        api_base: &str,
        token: impl Into<String>,
        interval: Duration,
        worker_id: impl Into<String>,
        printer_id: impl Into<String>,
        printer: impl Into<String>,
        probe: P,
        job_state: SharedJobState,
        connection: ConnectionStatus,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/api/v1/worker-status", api_base.trim_end_matches('/')),
            token: token.into(),
            interval,
            worker_id: worker_id.into(),
            printer_id: printer_id.into(),
            printer: printer.into(),
            probe,
            job_state,
            connection,
        }
    }

    /// Beat forever on the configured interval.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.beat().await;
        }
    }

    /// Send one heartbeat now.
    pub async fn beat(&self) {
        let printer_status = self.probe.probe(&self.printer).await;
        let state = self.connection.get();

        let body = HeartbeatBody {
            worker_id: &self.worker_id,
            printer_id: &self.printer_id,
            job_id: self.job_state.current(),
            printer_status,
            queue_connection: QueueConnection {
                error_message: (!state.is_live())
                    .then(|| "broker connection is down".to_string()),
                status: state,
            },
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let mut request = self
            .client
            .post(&self.url)
            .timeout(HEARTBEAT_TIMEOUT)
            .json(&body);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!("heartbeat delivered");
            }
            Ok(response) => {
                warn!(status = %response.status(), "heartbeat rejected by tracking API");
            }
            Err(e) => {
                warn!(error = %e, "heartbeat delivery failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedProbe(DeviceStatus);

    #[async_trait]
    impl StatusProbe for FixedProbe {
        async fn probe(&self, _target: &str) -> DeviceStatus {
            self.0.clone()
        }
    }

    fn heartbeat(
        server_uri: &str,
        probe: FixedProbe,
        job_state: SharedJobState,
        connection: ConnectionStatus,
    ) -> Heartbeat<FixedProbe> {
        Heartbeat::new(
            server_uri,
            "sekrit",
            Duration::from_secs(30),
            "worker-7",
            "7",
            "OfficePrinter",
            probe,
            job_state,
            connection,
        )
    }

    #[tokio::test]
    async fn beat_posts_full_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/worker-status"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let job_state = SharedJobState::new();
        job_state.set("j9");
        let connection = ConnectionStatus::new();
        connection.set(ConnectionState::Consuming);

        heartbeat(
            &server.uri(),
            FixedProbe(DeviceStatus::ready()),
            job_state,
            connection,
        )
        .beat()
        .await;

        let requests = server.received_requests().await.expect("requests");
        let body: serde_json::Value =
            serde_json::from_slice(&requests[0].body).expect("json body");
        assert_eq!(body["worker_id"], "worker-7");
        assert_eq!(body["printer_id"], "7");
        assert_eq!(body["job_id"], "j9");
        assert_eq!(body["printer_status"]["online"], true);
        assert_eq!(body["queue_connection"]["status"], "consuming");
        assert!(body["queue_connection"].get("error_message").is_none());
        assert!(body["timestamp"].as_str().expect("timestamp").contains('T'));
    }

    #[tokio::test]
    async fn idle_worker_omits_job_id_and_flags_dead_link() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        heartbeat(
            &server.uri(),
            FixedProbe(DeviceStatus::unreachable("lpstat: not found")),
            SharedJobState::new(),
            ConnectionStatus::new(),
        )
        .beat()
        .await;

        let requests = server.received_requests().await.expect("requests");
        let body: serde_json::Value =
            serde_json::from_slice(&requests[0].body).expect("json body");
        assert!(body.get("job_id").is_none());
        assert_eq!(body["printer_status"]["online"], false);
        assert_eq!(body["queue_connection"]["status"], "disconnected");
        assert_eq!(
            body["queue_connection"]["error_message"],
            "broker connection is down"
        );
    }

    #[tokio::test]
    async fn unreachable_api_is_swallowed() {
        heartbeat(
            "http://127.0.0.1:1",
            FixedProbe(DeviceStatus::ready()),
            SharedJobState::new(),
            ConnectionStatus::new(),
        )
        .beat()
        .await;
    }
}
