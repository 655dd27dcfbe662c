use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use beacon_dashboard::DashboardSnapshot;
use serde::de::DeserializeOwned;

use crate::transport::{
    error_excerpt, server_retry_hint, status_is_transient, transport_error_is_transient,
    RetryPolicy,
};
use crate::{BeaconApiError, ForceRefreshResponse, TicketFeed};

const RETRY_ATTEMPT_HEADER: &str = "x-beacon-retry-attempt";
const ERROR_BODY_MAX_CHARS: usize = 800;

struct RawResponse {
    status: u16,
    body: String,
}

impl RawResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn into_status_error(self, operation: &'static str) -> BeaconApiError {
        BeaconApiError::HttpStatus {
            operation,
            status: self.status,
            body: error_excerpt(&self.body, ERROR_BODY_MAX_CHARS),
        }
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, body: &str) -> Result<T, BeaconApiError> {
    serde_json::from_str(body).map_err(|source| BeaconApiError::Decode { operation, source })
}

#[derive(Clone)]
/// HTTP client for the dashboard backend.
pub struct BeaconApiClient {
    http: reqwest::Client,
    api_base: String,
    retry: RetryPolicy,
}

impl BeaconApiClient {
    pub fn new(
        api_base: String,
        request_timeout_ms: u64,
        retry_max_attempts: usize,
        retry_base_delay_ms: u64,
    ) -> Result<Self> {
        use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

        let default_headers = HeaderMap::from_iter([
            (USER_AGENT, HeaderValue::from_static("beacon-dashboard")),
            (ACCEPT, HeaderValue::from_static("application/json")),
        ]);
        let http = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create beacon api client")?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            retry: RetryPolicy::new(retry_max_attempts, retry_base_delay_ms),
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn tickets_url(&self, ticket_type_slug: &str) -> String {
        format!(
            "{}/api/tickets/{}",
            self.api_base,
            ticket_type_slug.trim_matches('/')
        )
    }

    /// `GET /api/tickets/{slug}`, scoped to one agent when `agent_id` is set.
    pub async fn fetch_tickets(
        &self,
        ticket_type_slug: &str,
        agent_id: Option<&str>,
    ) -> Result<DashboardSnapshot, BeaconApiError> {
        const OPERATION: &str = "fetch tickets";
        let url = self.tickets_url(ticket_type_slug);
        let agent_query = agent_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| [("agent_id", id)]);
        let response = self
            .send_with_retry(OPERATION, || {
                let request = self.http.get(&url);
                match &agent_query {
                    Some(query) => request.query(query),
                    None => request,
                }
            })
            .await?;
        if !response.is_success() {
            return Err(response.into_status_error(OPERATION));
        }
        decode(OPERATION, &response.body)
    }

    /// `POST /api/refresh`. A failure status whose body still carries the
    /// refresh payload is returned as that payload so its message can be shown.
    pub async fn force_refresh(&self) -> Result<ForceRefreshResponse, BeaconApiError> {
        const OPERATION: &str = "force refresh";
        let url = format!("{}/api/refresh", self.api_base);
        let response = self
            .send_with_retry(OPERATION, || self.http.post(&url))
            .await?;
        if response.is_success() {
            return decode(OPERATION, &response.body);
        }
        serde_json::from_str::<ForceRefreshResponse>(&response.body)
            .map_err(|_| response.into_status_error(OPERATION))
    }

    async fn send_with_retry<F>(
        &self,
        operation: &'static str,
        build_request: F,
    ) -> Result<RawResponse, BeaconApiError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempts_made = 0_usize;
        loop {
            let sent = build_request()
                .header(RETRY_ATTEMPT_HEADER, attempts_made.to_string())
                .send()
                .await;
            attempts_made += 1;
            let may_retry = self.retry.allows_another(attempts_made);

            let wait = match sent {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let hint = server_retry_hint(response.headers());
                    let body = response
                        .text()
                        .await
                        .map_err(|source| BeaconApiError::Network { operation, source })?;
                    if !may_retry || !status_is_transient(status) {
                        return Ok(RawResponse { status, body });
                    }
                    let wait = self.retry.backoff(attempts_made, hint);
                    tracing::debug!(
                        operation,
                        attempts_made,
                        status,
                        wait_ms = wait.as_millis() as u64,
                        "backend answered with a transient status"
                    );
                    wait
                }
                Err(source) => {
                    if !may_retry || !transport_error_is_transient(&source) {
                        return Err(BeaconApiError::Network { operation, source });
                    }
                    let wait = self.retry.backoff(attempts_made, None);
                    tracing::debug!(
                        operation,
                        attempts_made,
                        error = %source,
                        wait_ms = wait.as_millis() as u64,
                        "backend request did not complete"
                    );
                    wait
                }
            };
            tokio::time::sleep(wait).await;
        }
    }
}

#[async_trait]
impl TicketFeed for BeaconApiClient {
    async fn fetch_tickets(
        &self,
        ticket_type_slug: &str,
        agent_id: Option<&str>,
    ) -> Result<DashboardSnapshot, BeaconApiError> {
        BeaconApiClient::fetch_tickets(self, ticket_type_slug, agent_id).await
    }

    async fn force_refresh(&self) -> Result<ForceRefreshResponse, BeaconApiError> {
        BeaconApiClient::force_refresh(self).await
    }
}
