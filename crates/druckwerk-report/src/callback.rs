// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result callback — one POST to the tracking API per terminal decision.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use druckwerk_core::report::{CallbackReport, OutcomeReporter};

/// Timeout for one callback delivery.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(5);

/// Reporter posting terminal results to `{api_base}/api/v1/print-callback`.
#[derive(Debug, Clone)]
pub struct HttpReporter {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl HttpReporter {
    pub fn new(api_base: &str, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!(
                "{}/api/v1/print-callback",
                api_base.trim_end_matches('/')
            ),
            token: token.into(),
        }
    }
}

#[async_trait]
impl OutcomeReporter for HttpReporter {
    async fn report(&self, report: &CallbackReport) {
        let mut request = self
            .client
            .post(&self.url)
            .timeout(CALLBACK_TIMEOUT)
            .json(report);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!(job_id = %report.job_id, "callback delivered");
            }
            Ok(response) => {
                warn!(
                    job_id = %report.job_id,
                    status = %response.status(),
                    "callback rejected by tracking API"
                );
            }
            Err(e) => {
                warn!(job_id = %report.job_id, error = %e, "callback delivery failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use druckwerk_core::report::ReportStatus;
    use druckwerk_core::types::PrintMethod;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn report() -> CallbackReport {
        CallbackReport {
            job_id: "j1".into(),
            file: Some("a.pdf".into()),
            printer: "p1".into(),
            method: PrintMethod::Cups,
            status: ReportStatus::Success,
            error: None,
            device_job_id: Some("p1-7".into()),
        }
    }

    #[tokio::test]
    async fn posts_terminal_result_with_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/print-callback"))
            .and(header("authorization", "Bearer sekrit"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let reporter = HttpReporter::new(&server.uri(), "sekrit");
        reporter.report(&report()).await;

        let requests = server.received_requests().await.expect("requests");
        let body: serde_json::Value =
            serde_json::from_slice(&requests[0].body).expect("json body");
        assert_eq!(body["job_id"], "j1");
        assert_eq!(body["status"], "success");
        assert_eq!(body["device_job_id"], "p1-7");
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn server_error_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let reporter = HttpReporter::new(&server.uri(), "");
        // Must not panic or propagate.
        reporter.report(&report()).await;
    }

    #[tokio::test]
    async fn unreachable_api_is_swallowed() {
        let reporter = HttpReporter::new("http://127.0.0.1:1", "");
        reporter.report(&report()).await;
    }
}
