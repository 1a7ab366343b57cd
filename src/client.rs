//! HTTP client for the SMP Air itinerary search endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::de::IgnoredAny;
use std::error::Error as StdError;
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::SmpConfig;
use crate::observer::SearchObserver;
use crate::upstream::{Envelope, ItinerarySearchData, ItinerarySearchRequest};

pub const SEARCH_PATH: &str = "/air/itinerary/search";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("smp-air-mcp/", env!("CARGO_PKG_VERSION"));

/// Transport failures that are treated as "the API is unavailable".
const FALLBACK_TRANSPORT_KINDS: [TransportKind; 4] = [
    TransportKind::DnsLookup,
    TransportKind::ConnectionRefused,
    TransportKind::Timeout,
    TransportKind::Network,
];

const TLS_SIGNATURES: &[&str] = &["certificate", "tls", "ssl", "handshake"];

const DNS_SIGNATURES: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "no such host",
];

/// Failure talking to, or reported by, the upstream API
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("SMP API request failed: {message}")]
    Transport { kind: TransportKind, message: String },

    #[error("SMP API request failed: {message}")]
    Status { status: u16, message: String },

    #[error("SMP API Error: {}", .messages.join(", "))]
    Rejected { messages: Vec<String> },

    #[error("No data returned from SMP API")]
    NoData,

    #[error("SMP API returned an unreadable response: {0}")]
    Decode(String),
}

/// What went wrong below HTTP, when no usable response arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Host name did not resolve (ENOTFOUND)
    DnsLookup,
    /// Nothing listening on the other end (ECONNREFUSED)
    ConnectionRefused,
    Timeout,
    /// Request went out but no response came back
    Network,
    Tls,
    Other,
}

impl TransportKind {
    pub fn is_fallback_eligible(self) -> bool {
        FALLBACK_TRANSPORT_KINDS.contains(&self)
    }

    /// Classify from the error's source chain. The top-level message embeds
    /// the request URL, so it is never inspected.
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportKind::Timeout;
        }

        let mut io_kind = None;
        let mut causes = String::new();
        let mut source = err.source();
        while let Some(cause) = source {
            if let Some(io_err) = cause.downcast_ref::<io::Error>() {
                io_kind.get_or_insert(io_err.kind());
            }
            causes.push_str(&cause.to_string().to_lowercase());
            causes.push('\n');
            source = cause.source();
        }

        Self::from_signals(io_kind, &causes, err.is_connect(), err.is_request())
    }

    /// `causes` holds the lowercased source messages, one per line.
    fn from_signals(io_kind: Option<io::ErrorKind>, causes: &str, is_connect: bool, is_request: bool) -> Self {
        match io_kind {
            Some(io::ErrorKind::ConnectionRefused) => return TransportKind::ConnectionRefused,
            Some(io::ErrorKind::TimedOut) => return TransportKind::Timeout,
            _ => {}
        }
        if mentions_any(causes, TLS_SIGNATURES) {
            return TransportKind::Tls;
        }
        if mentions_any(causes, DNS_SIGNATURES) {
            return TransportKind::DnsLookup;
        }
        if matches!(
            io_kind,
            Some(
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            )
        ) {
            return TransportKind::Network;
        }
        // Unreachable network or host, and other connect failures
        if is_connect {
            return TransportKind::Other;
        }
        if is_request {
            return TransportKind::Network;
        }
        TransportKind::Other
    }
}

impl UpstreamError {
    fn transport(err: reqwest::Error) -> Self {
        UpstreamError::Transport {
            kind: TransportKind::classify(&err),
            message: error_chain(&err),
        }
    }
}

fn mentions_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Display of an error followed by every distinct source message.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Anything that can answer an itinerary search
#[async_trait]
pub trait ItinerarySource: Send + Sync {
    async fn search_itineraries(
        &self,
        request: &ItinerarySearchRequest,
    ) -> Result<ItinerarySearchData, UpstreamError>;
}

/// Client for the real SMP Air API. One attempt per call, no retries.
pub struct SmpAirClient {
    http_client: Client,
    search_url: String,
    observer: Arc<dyn SearchObserver>,
}

impl SmpAirClient {
    pub fn new(config: &SmpConfig, observer: Arc<dyn SearchObserver>) -> Result<Self, reqwest::Error> {
        debug!(base_url = %config.api_base_url, "Creating SMP Air client");
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            search_url: format!("{}{}", config.api_base_url.trim_end_matches('/'), SEARCH_PATH),
            observer,
        })
    }

    pub fn search_url(&self) -> &str {
        &self.search_url
    }
}

#[async_trait]
impl ItinerarySource for SmpAirClient {
    #[instrument(level = "info", skip(self, request), fields(legs = request.itinerary_legs.len(), echo_token = %request.echo_token))]
    async fn search_itineraries(
        &self,
        request: &ItinerarySearchRequest,
    ) -> Result<ItinerarySearchData, UpstreamError> {
        if let Ok(body) = serde_json::to_string(request) {
            debug!(body = %body, "Searching itineraries");
        }

        self.observer.request_sent("POST", SEARCH_PATH);
        let start_time = Instant::now();
        let response = self
            .http_client
            .post(&self.search_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .map_err(UpstreamError::transport)?;

        let status = response.status();
        self.observer.response_received(status.as_u16(), SEARCH_PATH, start_time.elapsed());

        let body = response.text().await.map_err(UpstreamError::transport)?;

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<IgnoredAny>>(&body)
                .ok()
                .and_then(|envelope| envelope.errors)
                .and_then(|errors| errors.into_iter().next())
                .map(|error| error.message)
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            return Err(UpstreamError::Status { status: status.as_u16(), message });
        }

        let envelope: Envelope<ItinerarySearchData> =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Decode(e.to_string()))?;

        for warning in envelope.warnings.iter().flatten() {
            warn!(warning = %warning, "SMP API warning");
        }

        let data = envelope.into_result()?;
        info!(itineraries = data.itineraries.len(), "Itinerary search returned");
        Ok(data)
    }
}
