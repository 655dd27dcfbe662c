//! HTTP access to the ticket backend: the polling endpoint and the cache-busting refresh.

mod api_client;
mod transport;

use async_trait::async_trait;
use beacon_dashboard::DashboardSnapshot;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use api_client::BeaconApiClient;
pub use transport::{RetryPolicy, MAX_RETRY_DELAY};

#[derive(Debug, Error)]
/// Failure taxonomy for backend requests.
pub enum BeaconApiError {
    #[error("beacon api {operation} request failed: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("beacon api {operation} failed with status {status}: {body}")]
    HttpStatus {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode beacon api {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl BeaconApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { source, .. } if source.is_timeout())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Body of `POST /api/refresh`.
pub struct ForceRefreshResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub ticket_count: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[async_trait]
/// Source of dashboard snapshots. Implemented by [`BeaconApiClient`]; tests script their own.
pub trait TicketFeed: Send + Sync {
    async fn fetch_tickets(
        &self,
        ticket_type_slug: &str,
        agent_id: Option<&str>,
    ) -> Result<DashboardSnapshot, BeaconApiError>;

    async fn force_refresh(&self) -> Result<ForceRefreshResponse, BeaconApiError>;
}
