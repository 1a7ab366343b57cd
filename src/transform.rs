//! Flattens upstream itineraries into `FlightResult`s.
//!
//! Only the first leg's first and last segment and the first pricing option
//! make it into a result; `stops` and `duration` come from the whole leg.
//! An itinerary that cannot be flattened is skipped, never fatal.

use thiserror::Error;

use crate::time::{format_date_time, parse_duration, DisplayDateTime};
use crate::upstream::{Itinerary, ItineraryEntry, ItinerarySearchData};
use crate::{BaggageAllowance, FlightEndpoint, FlightPrice, FlightResult, SearchCriteria, SearchResponse};

pub const LIMITED_DATA_WARNING: &str = "Limited flight data available";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("itinerary has no legs")]
    NoLegs,

    #[error("first leg has no segments")]
    NoSegments,

    #[error("itinerary has no pricing options")]
    NoPricing,

    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },

    #[error("itinerary does not match the expected shape")]
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedItinerary {
    pub id: Option<String>,
    pub reason: TransformError,
}

/// Results of mapping a batch of itineraries, successes and skips side by side
#[derive(Debug, Clone, Default)]
pub struct MappedItineraries {
    pub flights: Vec<FlightResult>,
    pub skipped: Vec<SkippedItinerary>,
}

#[derive(Debug, Clone)]
pub struct TransformedSearch {
    pub response: SearchResponse,
    pub skipped: Vec<SkippedItinerary>,
}

pub fn transform_itinerary(itinerary: &Itinerary) -> Result<FlightResult, TransformError> {
    let first_leg = itinerary.legs.first().ok_or(TransformError::NoLegs)?;
    let first_segment = first_leg.segments.first().ok_or(TransformError::NoSegments)?;
    let last_segment = first_leg.segments.last().ok_or(TransformError::NoSegments)?;
    let pricing = itinerary.pricing.first().ok_or(TransformError::NoPricing)?;

    let departure = display_timestamp(&first_segment.departure_date_time)?;
    let arrival = display_timestamp(&last_segment.arrival_date_time)?;

    Ok(FlightResult {
        id: itinerary.id.clone(),
        departure: FlightEndpoint {
            airport: first_segment.departure_location.code.clone(),
            time: departure.time,
            date: departure.date,
        },
        arrival: FlightEndpoint {
            airport: last_segment.arrival_location.code.clone(),
            time: arrival.time,
            date: arrival.date,
        },
        duration: parse_duration(&first_leg.duration),
        stops: first_leg.stops,
        airline: first_segment.airline.name.clone(),
        flight_number: first_segment.flight_number.clone(),
        aircraft: first_segment.aircraft.as_ref().map(|a| a.name.clone()),
        cabin_class: first_segment.cabin_class.clone(),
        price: FlightPrice {
            total: pricing.total_price,
            currency: pricing.currency.clone(),
            base_fare: pricing.base_price,
            taxes: pricing.taxes,
        },
        booking_class: first_segment.booking_class.clone(),
        fare_type: itinerary.fare_type.clone(),
        baggage: itinerary.baggage.as_ref().map(|b| BaggageAllowance {
            pieces: b.pieces,
            weight: b.weight,
            unit: b.unit.clone(),
        }),
        refundable: itinerary.refundable,
        exchangeable: itinerary.exchangeable,
    })
}

fn display_timestamp(value: &str) -> Result<DisplayDateTime, TransformError> {
    format_date_time(value).map_err(|e| TransformError::Timestamp {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Map at most `max_results` entries, collecting what couldn't be mapped.
pub fn transform_itineraries(entries: &[ItineraryEntry], max_results: usize) -> MappedItineraries {
    let mut mapped = MappedItineraries::default();

    for entry in entries.iter().take(max_results) {
        let outcome = match entry {
            ItineraryEntry::Itinerary(itinerary) => transform_itinerary(itinerary)
                .map_err(|reason| SkippedItinerary { id: Some(itinerary.id.clone()), reason }),
            ItineraryEntry::Malformed(_) => Err(SkippedItinerary {
                id: None,
                reason: TransformError::Malformed,
            }),
        };

        match outcome {
            Ok(flight) => mapped.flights.push(flight),
            Err(skipped) => mapped.skipped.push(skipped),
        }
    }

    mapped
}

pub fn transform_response(data: &ItinerarySearchData, criteria: &SearchCriteria) -> TransformedSearch {
    let mapped = transform_itineraries(&data.itineraries, criteria.max_results);
    let warnings = if data.meta.is_some() {
        Vec::new()
    } else {
        vec![LIMITED_DATA_WARNING.to_string()]
    };

    TransformedSearch {
        response: SearchResponse::new(mapped.flights, criteria.echo(), warnings),
        skipped: mapped.skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    fn segment(from: &str, to: &str, departs: &str, arrives: &str, number: &str) -> Value {
        json!({
            "id": format!("seg-{}", number),
            "departureLocation": {"code": from, "name": from, "city": from, "country": "US"},
            "arrivalLocation": {"code": to, "name": to, "city": to, "country": "US"},
            "departureDateTime": departs,
            "arrivalDateTime": arrives,
            "duration": "PT2H0M",
            "flightNumber": number,
            "airline": {"code": "AA", "name": "American Airlines"},
            "aircraft": {"code": "738", "name": "Boeing 737-800"},
            "cabinClass": "economy",
            "bookingClass": "Y"
        })
    }

    fn itinerary(id: &str) -> Value {
        json!({
            "id": id,
            "legs": [{
                "id": "leg-1",
                "departureLocation": {"code": "LAX"},
                "arrivalLocation": {"code": "JFK"},
                "departureDateTime": "2024-12-25T08:00:00Z",
                "arrivalDateTime": "2024-12-25T18:30:00Z",
                "duration": "PT7H30M",
                "stops": 1,
                "segments": [
                    segment("LAX", "ORD", "2024-12-25T08:00:00Z", "2024-12-25T12:10:00Z", "AA100"),
                    segment("ORD", "JFK", "2024-12-25T14:00:00Z", "2024-12-25T18:30:00Z", "AA200")
                ]
            }],
            "pricing": [
                {"currency": "USD", "totalPrice": 412.5, "basePrice": 350.0, "taxes": 62.5, "fees": 0.0},
                {"currency": "EUR", "totalPrice": 390.0, "basePrice": 330.0, "taxes": 60.0, "fees": 0.0}
            ],
            "validatingCarrier": "AA",
            "fareType": "Economy Basic",
            "bookingClass": "Y",
            "refundable": false,
            "exchangeable": true,
            "baggage": {"pieces": 1, "weight": 23, "unit": "kg"}
        })
    }

    fn data(itineraries: Vec<Value>, with_meta: bool) -> ItinerarySearchData {
        let total = itineraries.len();
        let mut value = json!({ "itineraries": itineraries });
        if with_meta {
            value["meta"] = json!({"totalResults": total, "searchTime": 1.2, "currency": "USD"});
        }
        serde_json::from_value(value).unwrap()
    }

    fn criteria(max_results: usize) -> SearchCriteria {
        let mut criteria = SearchCriteria::one_way("LAX", "JFK", NaiveDate::from_ymd_opt(2024, 12, 25).unwrap());
        criteria.max_results = max_results;
        criteria
    }

    #[test]
    fn test_flattens_first_leg() {
        let itinerary: Itinerary = serde_json::from_value(itinerary("it-1")).unwrap();
        let flight = transform_itinerary(&itinerary).unwrap();

        assert_eq!(flight.id, "it-1");
        assert_eq!(flight.departure.airport, "LAX");
        assert_eq!(flight.departure.time, "08:00");
        assert_eq!(flight.departure.date, "2024-12-25");
        // arrival comes from the last segment
        assert_eq!(flight.arrival.airport, "JFK");
        assert_eq!(flight.arrival.time, "18:30");
        assert_eq!(flight.duration, "7h 30m");
        assert_eq!(flight.stops, 1);
        assert_eq!(flight.airline, "American Airlines");
        assert_eq!(flight.flight_number, "AA100");
        assert_eq!(flight.aircraft.as_deref(), Some("Boeing 737-800"));
        assert_eq!(flight.cabin_class, "economy");
        assert_eq!(flight.booking_class, "Y");
        assert_eq!(flight.fare_type, "Economy Basic");
        assert_eq!(flight.refundable, Some(false));
        assert_eq!(flight.exchangeable, Some(true));
    }

    #[test]
    fn test_uses_first_pricing_option() {
        let itinerary: Itinerary = serde_json::from_value(itinerary("it-1")).unwrap();
        let flight = transform_itinerary(&itinerary).unwrap();

        assert_eq!(flight.price.currency, "USD");
        assert_eq!(flight.price.total, 412.5);
        assert_eq!(flight.price.base_fare, Some(350.0));
        assert_eq!(flight.price.taxes, Some(62.5));
        let baggage = flight.baggage.unwrap();
        assert_eq!(baggage.pieces, Some(1));
        assert_eq!(baggage.unit.as_deref(), Some("kg"));
    }

    #[test]
    fn test_structural_failures() {
        let mut value = itinerary("no-pricing");
        value.as_object_mut().unwrap().remove("pricing");
        let it: Itinerary = serde_json::from_value(value).unwrap();
        assert_eq!(transform_itinerary(&it), Err(TransformError::NoPricing));

        let mut value = itinerary("no-legs");
        value["legs"] = json!([]);
        let it: Itinerary = serde_json::from_value(value).unwrap();
        assert_eq!(transform_itinerary(&it), Err(TransformError::NoLegs));

        let mut value = itinerary("no-segments");
        value["legs"][0]["segments"] = json!([]);
        let it: Itinerary = serde_json::from_value(value).unwrap();
        assert_eq!(transform_itinerary(&it), Err(TransformError::NoSegments));

        let mut value = itinerary("bad-time");
        value["legs"][0]["segments"][0]["departureDateTime"] = json!("yesterday");
        let it: Itinerary = serde_json::from_value(value).unwrap();
        assert!(matches!(transform_itinerary(&it), Err(TransformError::Timestamp { .. })));
    }

    #[test]
    fn test_one_malformed_itinerary_is_skipped() {
        let mut broken = itinerary("it-2");
        broken.as_object_mut().unwrap().remove("pricing");

        let result = transform_response(
            &data(vec![itinerary("it-1"), broken, itinerary("it-3")], true),
            &criteria(10),
        );

        assert_eq!(result.response.flights.len(), 2);
        assert_eq!(result.response.total_results, 2);
        assert!(result.response.errors.is_empty());
        assert_eq!(
            result.skipped,
            vec![SkippedItinerary { id: Some("it-2".to_string()), reason: TransformError::NoPricing }]
        );
        let ids: Vec<&str> = result.response.flights.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["it-1", "it-3"]);
    }

    #[test]
    fn test_shape_mismatch_is_skipped() {
        let mut wrong = itinerary("it-2");
        wrong["legs"][0]["stops"] = json!("one");

        let result = transform_response(&data(vec![itinerary("it-1"), wrong], true), &criteria(10));

        assert_eq!(result.response.flights.len(), 1);
        assert_eq!(result.skipped[0].reason, TransformError::Malformed);
        assert_eq!(result.skipped[0].id, None);
    }

    #[test]
    fn test_caps_at_max_results() {
        let itineraries = (1..=5).map(|i| itinerary(&format!("it-{}", i))).collect();
        let result = transform_response(&data(itineraries, true), &criteria(3));

        assert_eq!(result.response.flights.len(), 3);
        assert_eq!(result.response.total_results, 3);
    }

    #[test]
    fn test_cap_counts_skipped_entries() {
        let mut broken = itinerary("it-1");
        broken["legs"] = json!([]);
        let result = transform_response(&data(vec![broken, itinerary("it-2"), itinerary("it-3")], true), &criteria(2));

        assert_eq!(result.response.flights.len(), 1);
        assert_eq!(result.response.flights[0].id, "it-2");
    }

    #[test]
    fn test_limited_data_warning_without_meta() {
        let with_meta = transform_response(&data(vec![itinerary("it-1")], true), &criteria(10));
        assert!(with_meta.response.warnings.is_empty());

        let without_meta = transform_response(&data(vec![itinerary("it-1")], false), &criteria(10));
        assert_eq!(without_meta.response.warnings, vec![LIMITED_DATA_WARNING]);
    }

    #[test]
    fn test_echoes_criteria() {
        let result = transform_response(&data(Vec::new(), true), &criteria(10));
        assert_eq!(result.response.search_criteria.departure, "LAX");
        assert_eq!(result.response.search_criteria.departure_date, "2024-12-25");
        assert_eq!(result.response.search_criteria.cabin_class, "economy");
        assert!(result.response.flights.is_empty());
    }
}
