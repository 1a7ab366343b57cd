//! Canned flights used in fake mode and when the API is unreachable

use crate::{BaggageAllowance, FlightEndpoint, FlightPrice, FlightResult, SearchCriteria, SearchResponse};

pub const FAKE_MODE_WARNING: &str = "⚠️ Using mock data - SMP Air API unavailable or in fake mode";
pub const UNAVAILABLE_WARNING: &str =
    "⚠️ SMP Air API is currently unavailable. Showing mock flight data for demonstration.";

/// Both catalog entries, echoing the caller's route, date and cabin.
pub fn mock_flights(criteria: &SearchCriteria) -> Vec<FlightResult> {
    let date = criteria.departure_date.format("%Y-%m-%d").to_string();
    let endpoint = |airport: &str, time: &str| FlightEndpoint {
        airport: airport.to_string(),
        time: time.to_string(),
        date: date.clone(),
    };

    vec![
        FlightResult {
            id: "mock-flight-1".to_string(),
            departure: endpoint(&criteria.departure, "08:00"),
            arrival: endpoint(&criteria.arrival, "12:00"),
            duration: "4h 0m".to_string(),
            stops: 0,
            airline: "Mock Airlines".to_string(),
            flight_number: "MK123".to_string(),
            aircraft: Some("Boeing 737".to_string()),
            cabin_class: criteria.cabin_class.to_string(),
            price: FlightPrice {
                total: 299.99,
                currency: "USD".to_string(),
                base_fare: Some(250.00),
                taxes: Some(49.99),
            },
            booking_class: "Y".to_string(),
            fare_type: "Economy Basic".to_string(),
            baggage: Some(BaggageAllowance {
                pieces: Some(1),
                weight: Some(23.0),
                unit: Some("kg".to_string()),
            }),
            refundable: Some(false),
            exchangeable: Some(true),
        },
        FlightResult {
            id: "mock-flight-2".to_string(),
            departure: endpoint(&criteria.departure, "14:30"),
            arrival: endpoint(&criteria.arrival, "19:15"),
            duration: "4h 45m".to_string(),
            stops: 1,
            airline: "Demo Airways".to_string(),
            flight_number: "DA456".to_string(),
            aircraft: Some("Airbus A320".to_string()),
            cabin_class: criteria.cabin_class.to_string(),
            price: FlightPrice {
                total: 399.99,
                currency: "USD".to_string(),
                base_fare: Some(350.00),
                taxes: Some(49.99),
            },
            booking_class: "Y".to_string(),
            fare_type: "Economy Flex".to_string(),
            baggage: Some(BaggageAllowance {
                pieces: Some(2),
                weight: Some(23.0),
                unit: Some("kg".to_string()),
            }),
            refundable: Some(true),
            exchangeable: Some(true),
        },
    ]
}

/// Mock catalog cut down to `max_results`, carrying the given warnings.
pub fn mock_response(criteria: &SearchCriteria, warnings: Vec<String>) -> SearchResponse {
    let mut flights = mock_flights(criteria);
    flights.truncate(criteria.max_results);
    SearchResponse::new(flights, criteria.echo(), warnings)
}
