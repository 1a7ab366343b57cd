//! Wire types for the SMP Air itinerary search API
//!
//! Request types serialize to the `POST /air/itinerary/search` body. Response
//! types are deliberately lenient: each itinerary decodes on its own so one
//! odd entry cannot sink the rest of the page.

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use crate::client::UpstreamError;
use crate::config::SmpMode;

/// Body of an itinerary search
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItinerarySearchRequest {
    pub itinerary_legs: Vec<ItineraryLeg>,
    pub passengers: Vec<PassengerDescriptor>,
    pub preferences: SearchPreferences,
    pub company_id: String,
    pub gds_code: String,
    pub office_id: String,
    pub mode: SmpMode,
    pub fields: ResponseFields,
    pub echo_token: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryLeg {
    pub departure_location: String,
    pub arrival_location: String,
    /// `YYYY-MM-DDT00:00:00Z`
    pub date_time: String,
    pub date_time_mode: DateTimeMode,
    pub preferred_cabin_classes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DateTimeMode {
    DepartureDateTime,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PassengerDescriptor {
    pub passenger_type: PassengerType,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PassengerType {
    Adult,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPreferences {
    pub max_number_of_stops: u32,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFields {
    None,
}

/// Outer envelope every SMP response is wrapped in
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<ApiError>>,
    pub warnings: Option<Vec<String>>,
    pub meta: Option<EnvelopeMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMeta {
    pub request_id: Option<String>,
    pub timestamp: Option<String>,
}

impl<T> Envelope<T> {
    /// Resolve the envelope into its payload, or the reason there isn't one.
    pub fn into_result(self) -> Result<T, UpstreamError> {
        match self.errors {
            Some(errors) if !errors.is_empty() => {
                return Err(UpstreamError::Rejected {
                    messages: errors.into_iter().map(|e| e.message).collect(),
                });
            }
            _ => {}
        }
        self.data.ok_or(UpstreamError::NoData)
    }
}

/// `data` payload of an itinerary search response
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ItinerarySearchData {
    #[serde(default)]
    pub itineraries: Vec<ItineraryEntry>,
    pub meta: Option<SearchMeta>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    pub total_results: Option<u32>,
    pub search_time: Option<f64>,
    pub currency: Option<String>,
}

/// One entry of the `itineraries` array
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ItineraryEntry {
    Itinerary(Box<Itinerary>),
    Malformed(IgnoredAny),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    pub id: String,
    #[serde(default)]
    pub legs: Vec<Leg>,
    #[serde(default)]
    pub pricing: Vec<Pricing>,
    pub validating_carrier: Option<String>,
    #[serde(default)]
    pub fare_type: String,
    pub booking_class: Option<String>,
    pub refundable: Option<bool>,
    pub exchangeable: Option<bool>,
    pub baggage: Option<Baggage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub id: Option<String>,
    /// ISO-8601 duration, e.g. `PT5H20M`
    pub duration: String,
    #[serde(default)]
    pub segments: Vec<Segment>,
    pub stops: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub id: Option<String>,
    pub departure_location: Location,
    pub arrival_location: Location,
    pub departure_date_time: String,
    pub arrival_date_time: String,
    pub duration: Option<String>,
    pub flight_number: String,
    pub airline: Airline,
    pub aircraft: Option<Aircraft>,
    pub cabin_class: String,
    pub booking_class: String,
    pub operating_carrier: Option<Airline>,
    pub code_share: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// IATA airport code
    pub code: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub terminal: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Airline {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Aircraft {
    pub code: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub currency: String,
    pub total_price: f64,
    pub base_price: Option<f64>,
    pub taxes: Option<f64>,
    pub fees: Option<f64>,
    pub passenger_type: Option<String>,
    pub passenger_count: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Baggage {
    pub pieces: Option<u32>,
    pub weight: Option<f64>,
    pub unit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_with_errors_is_rejected() {
        let envelope: Envelope<ItinerarySearchData> = serde_json::from_value(json!({
            "errors": [
                {"code": "E100", "message": "Invalid office ID"},
                {"code": "E101", "message": "Unknown GDS"}
            ]
        }))
        .unwrap();

        match envelope.into_result() {
            Err(UpstreamError::Rejected { messages }) => {
                assert_eq!(messages, vec!["Invalid office ID", "Unknown GDS"]);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_envelope_without_data() {
        let envelope: Envelope<ItinerarySearchData> =
            serde_json::from_value(json!({"errors": [], "warnings": ["slow"]})).unwrap();
        assert!(matches!(envelope.into_result(), Err(UpstreamError::NoData)));
    }

    #[test]
    fn test_errors_win_over_data() {
        let envelope: Envelope<ItinerarySearchData> = serde_json::from_value(json!({
            "data": {"itineraries": []},
            "errors": [{"code": "X", "message": "boom"}]
        }))
        .unwrap();
        assert!(matches!(envelope.into_result(), Err(UpstreamError::Rejected { .. })));
    }

    #[test]
    fn test_itinerary_entries_decode_independently() {
        let data: ItinerarySearchData = serde_json::from_value(json!({
            "itineraries": [
                {"id": "ok", "legs": [], "pricing": [], "fareType": "Basic"},
                {"id": 42, "legs": "not a list"},
                "garbage"
            ]
        }))
        .unwrap();

        assert_eq!(data.itineraries.len(), 3);
        assert!(matches!(&data.itineraries[0], ItineraryEntry::Itinerary(it) if it.id == "ok"));
        assert!(matches!(data.itineraries[1], ItineraryEntry::Malformed(_)));
        assert!(matches!(data.itineraries[2], ItineraryEntry::Malformed(_)));
        assert!(data.meta.is_none());
    }

    #[test]
    fn test_request_serializes_camel_case() {
        let request = ItinerarySearchRequest {
            itinerary_legs: vec![ItineraryLeg {
                departure_location: "LAX".into(),
                arrival_location: "JFK".into(),
                date_time: "2024-12-25T00:00:00Z".into(),
                date_time_mode: DateTimeMode::DepartureDateTime,
                preferred_cabin_classes: vec!["J".into()],
            }],
            passengers: vec![PassengerDescriptor { passenger_type: PassengerType::Adult }],
            preferences: SearchPreferences { max_number_of_stops: 3 },
            company_id: "company".into(),
            gds_code: "DUMMY".into(),
            office_id: "TEST".into(),
            mode: SmpMode::Real,
            fields: ResponseFields::None,
            echo_token: "token".into(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["itineraryLegs"][0]["dateTimeMode"], "departureDateTime");
        assert_eq!(value["itineraryLegs"][0]["preferredCabinClasses"], json!(["J"]));
        assert_eq!(value["passengers"][0]["passengerType"], "adult");
        assert_eq!(value["preferences"]["maxNumberOfStops"], 3);
        assert_eq!(value["mode"], "real");
        assert_eq!(value["fields"], "none");
        assert_eq!(value["echoToken"], "token");
        assert_eq!(value["companyId"], "company");
    }
}
