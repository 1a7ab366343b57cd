//! # SMP Air flight search
//!
//! Translates a caller's flight search into an SMP Air itinerary search and
//! normalizes the answer into a compact, stable result shape. When the service
//! runs in fake mode, or the upstream API cannot be reached, canned flights are
//! returned with warnings instead.

pub mod cabin;
pub mod client;
pub mod config;
pub mod display;
pub mod mock;
pub mod observer;
pub mod request;
pub mod search;
pub mod time;
pub mod transform;
pub mod upstream;

use chrono::NaiveDate;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// Re-export main types for convenience
pub use cabin::CabinClass;
pub use client::{ItinerarySource, SmpAirClient, TransportKind, UpstreamError};
pub use config::{ConfigError, SmpConfig, SmpMode};
pub use display::format_flight_results;
pub use observer::{SearchObserver, TracingObserver};
pub use search::{FlightSearchService, SearchOutcome};
pub use time::{format_date_time, parse_duration};
pub use transform::TransformError;

pub const DEFAULT_PASSENGERS: i64 = 1;
pub const DEFAULT_MAX_RESULTS: i64 = 10;
pub const MAX_PASSENGERS: i64 = 9;
pub const MAX_RESULTS_LIMIT: i64 = 50;

/// Caller input that failed validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be {expected}, got {value}")]
    Type { field: &'static str, expected: &'static str, value: String },

    #[error("{field} must be a 3-letter uppercase IATA code, got {value:?}")]
    Location { field: &'static str, value: String },

    #[error("{field} must be a YYYY-MM-DD date, got {value:?}")]
    Date { field: &'static str, value: String },

    #[error("passengers must be between 1 and 9, got {0}")]
    Passengers(i64),

    #[error("maxResults must be between 1 and 50, got {0}")]
    MaxResults(i64),

    #[error("cabinClass must be one of economy, economyPremium, business, businessPremium, first, firstPremium, got {0:?}")]
    CabinClass(String),
}

/// Anything that stops a search from producing real results
#[derive(Error, Debug)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl SearchError {
    /// Only a short list of transport failures may be papered over with mock data.
    pub fn is_fallback_eligible(&self) -> bool {
        match self {
            SearchError::Upstream(UpstreamError::Transport { kind, .. }) => kind.is_fallback_eligible(),
            _ => false,
        }
    }
}

/// Raw `search_flights` tool arguments
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[schemars(description = "3-letter IATA airport code for departure (e.g., LAX, JFK, LHR)")]
    pub departure: String,
    #[schemars(description = "3-letter IATA airport code for arrival (e.g., LAX, JFK, LHR)")]
    pub arrival: String,
    #[schemars(description = "Departure date in YYYY-MM-DD format")]
    pub departure_date: String,
    #[schemars(description = "Return date in YYYY-MM-DD format (optional, for round-trip flights)")]
    pub return_date: Option<String>,
    #[schemars(description = "Number of adult passengers (1-9, default 1)")]
    pub passengers: Option<i64>,
    #[schemars(description = "Preferred cabin class: economy, economyPremium, business, businessPremium, first, firstPremium (default economy)")]
    pub cabin_class: Option<String>,
    #[schemars(description = "Maximum number of flight results to return (1-50, default 10)")]
    pub max_results: Option<i64>,
}

/// `search_flights` arguments exactly as the caller sent them.
///
/// Deserializing this never fails on a JSON object, so wrong types and
/// missing fields surface as a `ValidationError` in the search response.
/// The advertised schema is the one of `SearchParams`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchArguments(pub Map<String, Value>);

impl schemars::JsonSchema for SearchArguments {
    fn schema_name() -> String {
        <SearchParams as schemars::JsonSchema>::schema_name()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        <SearchParams as schemars::JsonSchema>::json_schema(generator)
    }
}

impl SearchArguments {
    fn text(&self, field: &'static str) -> Result<Option<String>, ValidationError> {
        match self.0.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(ValidationError::Type { field, expected: "a string", value: other.to_string() }),
        }
    }

    fn required_text(&self, field: &'static str) -> Result<String, ValidationError> {
        self.text(field)?.ok_or(ValidationError::Missing(field))
    }

    fn integer(&self, field: &'static str) -> Result<Option<i64>, ValidationError> {
        let value = match self.0.get(field) {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };
        let whole = value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        });
        whole
            .map(Some)
            .ok_or_else(|| ValidationError::Type { field, expected: "an integer", value: value.to_string() })
    }

    /// Echo text for a field of any JSON type
    fn echo_text(&self, field: &str) -> Option<String> {
        self.0.get(field).filter(|value| !value.is_null()).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}

impl TryFrom<&SearchArguments> for SearchParams {
    type Error = ValidationError;

    fn try_from(arguments: &SearchArguments) -> Result<Self, Self::Error> {
        Ok(Self {
            departure: arguments.required_text("departure")?,
            arrival: arguments.required_text("arrival")?,
            departure_date: arguments.required_text("departureDate")?,
            return_date: arguments.text("returnDate")?,
            passengers: arguments.integer("passengers")?,
            cabin_class: arguments.text("cabinClass")?,
            max_results: arguments.integer("maxResults")?,
        })
    }
}

/// Validated search input
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCriteria {
    pub departure: String,
    pub arrival: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub passengers: u8,
    pub cabin_class: CabinClass,
    pub max_results: usize,
}

impl SearchCriteria {
    /// One-way search with default passengers, cabin and result count.
    pub fn one_way(departure: &str, arrival: &str, departure_date: NaiveDate) -> Self {
        Self {
            departure: departure.to_string(),
            arrival: arrival.to_string(),
            departure_date,
            return_date: None,
            passengers: DEFAULT_PASSENGERS as u8,
            cabin_class: CabinClass::default(),
            max_results: DEFAULT_MAX_RESULTS as usize,
        }
    }

    pub fn echo(&self) -> SearchCriteriaEcho {
        SearchCriteriaEcho {
            departure: self.departure.clone(),
            arrival: self.arrival.clone(),
            departure_date: self.departure_date.format("%Y-%m-%d").to_string(),
            return_date: self.return_date.map(|d| d.format("%Y-%m-%d").to_string()),
            passengers: u32::from(self.passengers),
            cabin_class: self.cabin_class.to_string(),
        }
    }

    fn parse_location(field: &'static str, value: &str) -> Result<String, ValidationError> {
        if value.len() == 3 && value.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(value.to_string())
        } else {
            Err(ValidationError::Location { field, value: value.to_string() })
        }
    }

    fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
        let well_formed = value.len() == 10
            && value.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed {
            return Err(ValidationError::Date { field, value: value.to_string() });
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| ValidationError::Date { field, value: value.to_string() })
    }
}

impl TryFrom<&SearchParams> for SearchCriteria {
    type Error = ValidationError;

    fn try_from(params: &SearchParams) -> Result<Self, Self::Error> {
        let departure = Self::parse_location("departure", &params.departure)?;
        let arrival = Self::parse_location("arrival", &params.arrival)?;
        let departure_date = Self::parse_date("departureDate", &params.departure_date)?;
        let return_date = params
            .return_date
            .as_deref()
            .map(|d| Self::parse_date("returnDate", d))
            .transpose()?;

        let passengers = params.passengers.unwrap_or(DEFAULT_PASSENGERS);
        if !(1..=MAX_PASSENGERS).contains(&passengers) {
            return Err(ValidationError::Passengers(passengers));
        }

        let cabin_class = params
            .cabin_class
            .as_deref()
            .map(str::parse::<CabinClass>)
            .transpose()?
            .unwrap_or_default();

        let max_results = params.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
            return Err(ValidationError::MaxResults(max_results));
        }

        Ok(Self {
            departure,
            arrival,
            departure_date,
            return_date,
            passengers: passengers as u8,
            cabin_class,
            max_results: max_results as usize,
        })
    }
}

/// The search criteria as echoed back in every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteriaEcho {
    pub departure: String,
    pub arrival: String,
    pub departure_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub passengers: u32,
    pub cabin_class: String,
}

impl From<&SearchParams> for SearchCriteriaEcho {
    /// Echo of input that may not have passed validation, with defaults filled in.
    fn from(params: &SearchParams) -> Self {
        Self {
            departure: params.departure.clone(),
            arrival: params.arrival.clone(),
            departure_date: params.departure_date.clone(),
            return_date: params.return_date.clone(),
            passengers: params
                .passengers
                .unwrap_or(DEFAULT_PASSENGERS)
                .clamp(0, i64::from(u32::MAX)) as u32,
            cabin_class: params
                .cabin_class
                .clone()
                .unwrap_or_else(|| CabinClass::default().to_string()),
        }
    }
}

impl From<&SearchArguments> for SearchCriteriaEcho {
    /// Best-effort echo of arguments that did not even have the right types.
    fn from(arguments: &SearchArguments) -> Self {
        Self {
            departure: arguments.echo_text("departure").unwrap_or_default(),
            arrival: arguments.echo_text("arrival").unwrap_or_default(),
            departure_date: arguments.echo_text("departureDate").unwrap_or_default(),
            return_date: arguments.echo_text("returnDate"),
            passengers: arguments
                .0
                .get("passengers")
                .and_then(Value::as_u64)
                .map_or(DEFAULT_PASSENGERS as u32, |n| n.min(u64::from(u32::MAX)) as u32),
            cabin_class: arguments
                .echo_text("cabinClass")
                .unwrap_or_else(|| CabinClass::default().to_string()),
        }
    }
}

/// One flattened flight, built from an itinerary's first leg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightResult {
    pub id: String,
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    pub duration: String,
    pub stops: u32,
    pub airline: String,
    pub flight_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<String>,
    pub cabin_class: String,
    pub price: FlightPrice,
    pub booking_class: String,
    pub fare_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baggage: Option<BaggageAllowance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refundable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchangeable: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightEndpoint {
    pub airport: String,
    /// `HH:MM`
    pub time: String,
    /// `YYYY-MM-DD`
    pub date: String,
}

/// Price information with amount and currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPrice {
    pub total: f64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_fare: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaggageAllowance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pieces: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// What every search hands back to the caller.
///
/// `warnings` and `errors` are always present on the wire, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub flights: Vec<FlightResult>,
    pub search_criteria: SearchCriteriaEcho,
    pub total_results: usize,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl SearchResponse {
    pub fn new(flights: Vec<FlightResult>, search_criteria: SearchCriteriaEcho, warnings: Vec<String>) -> Self {
        Self {
            total_results: flights.len(),
            flights,
            search_criteria,
            warnings,
            errors: Vec::new(),
        }
    }

    /// Empty response carrying a single error message
    pub fn failed(search_criteria: SearchCriteriaEcho, message: impl Into<String>) -> Self {
        Self {
            flights: Vec::new(),
            search_criteria,
            total_results: 0,
            warnings: Vec::new(),
            errors: vec![message.into()],
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
