//! Builds the upstream search body from validated criteria

use chrono::NaiveDate;

use crate::config::SmpConfig;
use crate::upstream::{
    DateTimeMode, ItineraryLeg, ItinerarySearchRequest, PassengerDescriptor, PassengerType,
    ResponseFields, SearchPreferences,
};
use crate::{CabinClass, SearchCriteria};

/// Not caller-configurable.
pub const MAX_NUMBER_OF_STOPS: u32 = 3;

pub fn build_search_request(criteria: &SearchCriteria, config: &SmpConfig) -> ItinerarySearchRequest {
    let mut itinerary_legs = vec![build_leg(
        &criteria.departure,
        &criteria.arrival,
        criteria.departure_date,
        criteria.cabin_class,
    )];

    if let Some(return_date) = criteria.return_date {
        itinerary_legs.push(build_leg(
            &criteria.arrival,
            &criteria.departure,
            return_date,
            criteria.cabin_class,
        ));
    }

    ItinerarySearchRequest {
        itinerary_legs,
        passengers: vec![
            PassengerDescriptor { passenger_type: PassengerType::Adult };
            usize::from(criteria.passengers)
        ],
        preferences: SearchPreferences {
            max_number_of_stops: MAX_NUMBER_OF_STOPS,
        },
        company_id: config.company_id.clone(),
        gds_code: config.gds_code.clone(),
        office_id: config.office_id.clone(),
        mode: config.mode,
        fields: ResponseFields::None,
        echo_token: config.echo_token(),
    }
}

fn build_leg(from: &str, to: &str, date: NaiveDate, cabin_class: CabinClass) -> ItineraryLeg {
    ItineraryLeg {
        departure_location: from.to_string(),
        arrival_location: to.to_string(),
        date_time: format!("{}T00:00:00Z", date.format("%Y-%m-%d")),
        date_time_mode: DateTimeMode::DepartureDateTime,
        preferred_cabin_classes: cabin_class
            .booking_classes()
            .iter()
            .map(|letter| letter.to_string())
            .collect(),
    }
}
