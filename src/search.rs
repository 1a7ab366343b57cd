//! Search entry point: fake mode, real search, fallback and error results

use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::client::{ItinerarySource, SmpAirClient};
use crate::config::{SmpConfig, SmpMode};
use crate::mock::{mock_response, FAKE_MODE_WARNING, UNAVAILABLE_WARNING};
use crate::observer::{SearchObserver, TracingObserver};
use crate::request::build_search_request;
use crate::transform::{transform_response, TransformedSearch};
use crate::{SearchArguments, SearchCriteria, SearchCriteriaEcho, SearchError, SearchParams, SearchResponse};

/// Which path produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Fake mode, canned data by design
    Fake,
    Success,
    /// Real mode, API unreachable, canned data instead
    FallbackToMock,
    Error,
}

/// Runs flight searches against SMP Air. Cheap to share behind an `Arc`.
pub struct FlightSearchService {
    config: Arc<SmpConfig>,
    source: Arc<dyn ItinerarySource>,
    observer: Arc<dyn SearchObserver>,
}

impl FlightSearchService {
    /// Service backed by the real HTTP client, logging through `tracing`.
    pub fn new(config: Arc<SmpConfig>) -> Result<Self, reqwest::Error> {
        let observer: Arc<dyn SearchObserver> = Arc::new(TracingObserver);
        let client = SmpAirClient::new(&config, Arc::clone(&observer))?;
        Ok(Self::with_source(config, Arc::new(client), observer))
    }

    pub fn with_source(
        config: Arc<SmpConfig>,
        source: Arc<dyn ItinerarySource>,
        observer: Arc<dyn SearchObserver>,
    ) -> Self {
        Self { config, source, observer }
    }

    pub fn config(&self) -> &SmpConfig {
        &self.config
    }

    /// Type-check untyped tool arguments, then validate and search. Never fails.
    pub async fn search_arguments(&self, arguments: &SearchArguments) -> SearchResponse {
        match SearchParams::try_from(arguments) {
            Ok(params) => self.search_params(&params).await,
            Err(e) => {
                error!(error = %e, "Malformed flight search arguments");
                let response = SearchResponse::failed(SearchCriteriaEcho::from(arguments), e.to_string());
                self.observer.search_completed(&response);
                response
            }
        }
    }

    /// Validate typed search parameters, then search. Never fails.
    pub async fn search_params(&self, params: &SearchParams) -> SearchResponse {
        match SearchCriteria::try_from(params) {
            Ok(criteria) => self.search(&criteria).await,
            Err(e) => {
                error!(error = %e, "Invalid flight search input");
                let response = SearchResponse::failed(SearchCriteriaEcho::from(params), e.to_string());
                self.observer.search_completed(&response);
                response
            }
        }
    }

    pub async fn search(&self, criteria: &SearchCriteria) -> SearchResponse {
        self.run(criteria).await.1
    }

    /// Search and report which path the response came from.
    #[instrument(
        level = "info",
        skip(self, criteria),
        fields(
            departure = %criteria.departure,
            arrival = %criteria.arrival,
            departure_date = %criteria.departure_date,
            mode = %self.config.mode,
        )
    )]
    pub async fn run(&self, criteria: &SearchCriteria) -> (SearchOutcome, SearchResponse) {
        info!(
            return_date = ?criteria.return_date,
            passengers = criteria.passengers,
            cabin_class = %criteria.cabin_class,
            max_results = criteria.max_results,
            "Starting flight search"
        );

        let (outcome, response) = if self.config.mode == SmpMode::Fake {
            info!("Fake mode, returning mock data");
            (
                SearchOutcome::Fake,
                mock_response(criteria, vec![FAKE_MODE_WARNING.to_string()]),
            )
        } else {
            match self.search_upstream(criteria).await {
                Ok(transformed) => {
                    for skipped in &transformed.skipped {
                        self.observer.itinerary_skipped(skipped.id.as_deref(), &skipped.reason);
                    }
                    info!(
                        flights = transformed.response.flights.len(),
                        skipped = transformed.skipped.len(),
                        "Flight search completed"
                    );
                    (SearchOutcome::Success, transformed.response)
                }
                Err(e) if e.is_fallback_eligible() => {
                    self.observer.fallback_triggered(&e);
                    let warnings = vec![UNAVAILABLE_WARNING.to_string(), format!("Original error: {}", e)];
                    (SearchOutcome::FallbackToMock, mock_response(criteria, warnings))
                }
                Err(e) => {
                    error!(error = %e, "Flight search failed");
                    (SearchOutcome::Error, SearchResponse::failed(criteria.echo(), e.to_string()))
                }
            }
        };

        self.observer.search_completed(&response);
        (outcome, response)
    }

    async fn search_upstream(&self, criteria: &SearchCriteria) -> Result<TransformedSearch, SearchError> {
        let request = build_search_request(criteria, &self.config);
        let data = self.source.search_itineraries(&request).await?;
        Ok(transform_response(&data, criteria))
    }
}
