//! Hooks the search pipeline calls at its interesting moments.
//!
//! Observers return nothing, so a misbehaving sink can never fail a search.

use std::time::Duration;
use tracing::{debug, info, warn};

use crate::transform::TransformError;
use crate::{SearchError, SearchResponse};

pub trait SearchObserver: Send + Sync {
    fn request_sent(&self, _method: &str, _path: &str) {}

    fn response_received(&self, _status: u16, _path: &str, _elapsed: Duration) {}

    fn itinerary_skipped(&self, _itinerary_id: Option<&str>, _reason: &TransformError) {}

    fn fallback_triggered(&self, _error: &SearchError) {}

    fn search_completed(&self, _response: &SearchResponse) {}
}

/// Default observer: structured `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn request_sent(&self, method: &str, path: &str) {
        info!(method = method, path = path, "SMP API request");
    }

    fn response_received(&self, status: u16, path: &str, elapsed: Duration) {
        info!(
            status = status,
            path = path,
            duration_ms = elapsed.as_millis() as u64,
            "SMP API response"
        );
    }

    fn itinerary_skipped(&self, itinerary_id: Option<&str>, reason: &TransformError) {
        warn!(itinerary_id = itinerary_id, reason = %reason, "Failed to transform itinerary, skipping");
    }

    fn fallback_triggered(&self, error: &SearchError) {
        warn!(error = %error, "SMP API unavailable, falling back to mock data");
    }

    fn search_completed(&self, response: &SearchResponse) {
        debug!(
            flights = response.flights.len(),
            warnings = response.warnings.len(),
            errors = response.errors.len(),
            "Search response ready"
        );
    }
}
