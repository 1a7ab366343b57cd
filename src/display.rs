//! Human-readable rendering of a `SearchResponse`

use std::fmt::Write;

use crate::{FlightResult, SearchResponse};

pub fn format_flight_results(response: &SearchResponse) -> String {
    if response.has_errors() {
        return format!("❌ Flight search failed:\n{}", response.errors.join("\n"));
    }

    let criteria = &response.search_criteria;
    if response.flights.is_empty() {
        return format!(
            "No flights found for {} → {} on {}",
            criteria.departure, criteria.arrival, criteria.departure_date
        );
    }

    let mut output = String::new();
    let _ = writeln!(
        output,
        "✈️ Found {} flights for {} → {}",
        response.total_results, criteria.departure, criteria.arrival
    );
    let _ = write!(output, "📅 Departure: {}", criteria.departure_date);
    if let Some(return_date) = &criteria.return_date {
        let _ = write!(output, " | Return: {}", return_date);
    }
    let _ = writeln!(
        output,
        "\n👥 Passengers: {} | 🎫 Class: {}\n",
        criteria.passengers, criteria.cabin_class
    );

    for (index, flight) in response.flights.iter().enumerate() {
        let _ = writeln!(output, "🔸 Flight {}:", index + 1);
        write_flight(&mut output, flight);
        output.push('\n');
    }

    if !response.warnings.is_empty() {
        let _ = writeln!(output, "⚠️ Warnings:\n{}", response.warnings.join("\n"));
    }

    output.trim().to_string()
}

fn write_flight(output: &mut String, flight: &FlightResult) {
    let _ = writeln!(
        output,
        "   {} {} ({})",
        flight.airline,
        flight.flight_number,
        flight.aircraft.as_deref().unwrap_or("N/A")
    );
    let _ = writeln!(
        output,
        "   🛫 {} {} → 🛬 {} {}",
        flight.departure.airport, flight.departure.time, flight.arrival.airport, flight.arrival.time
    );
    let _ = writeln!(output, "   ⏱️ Duration: {} | 🔄 Stops: {}", flight.duration, flight.stops);
    let _ = writeln!(
        output,
        "   💰 {} {:.2} | 🎫 {} ({})",
        flight.price.currency, flight.price.total, flight.cabin_class, flight.booking_class
    );

    if let Some(baggage) = &flight.baggage {
        let _ = write!(output, "   🧳 Baggage: {} pieces", baggage.pieces.unwrap_or(0));
        if let Some(weight) = baggage.weight.filter(|w| *w != 0.0) {
            let _ = write!(output, " ({}{})", weight, baggage.unit.as_deref().unwrap_or("kg"));
        }
        output.push('\n');
    }

    let mut policies = Vec::new();
    if let Some(refundable) = flight.refundable {
        policies.push(if refundable { "✅ Refundable" } else { "❌ Non-refundable" });
    }
    if let Some(exchangeable) = flight.exchangeable {
        policies.push(if exchangeable { "✅ Exchangeable" } else { "❌ Non-exchangeable" });
    }
    if !policies.is_empty() {
        let _ = writeln!(output, "   📋 {}", policies.join(" | "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{mock_response, FAKE_MODE_WARNING};
    use crate::SearchCriteria;
    use chrono::NaiveDate;

    fn criteria() -> SearchCriteria {
        let mut criteria = SearchCriteria::one_way("LAX", "JFK", NaiveDate::from_ymd_opt(2024, 12, 25).unwrap());
        criteria.return_date = NaiveDate::from_ymd_opt(2025, 1, 2);
        criteria
    }

    #[test]
    fn test_error_block() {
        let response = SearchResponse::failed(criteria().echo(), "SMP API Error: Invalid office ID");
        assert_eq!(
            format_flight_results(&response),
            "❌ Flight search failed:\nSMP API Error: Invalid office ID"
        );
    }

    #[test]
    fn test_empty_result() {
        let response = SearchResponse::new(Vec::new(), criteria().echo(), Vec::new());
        assert_eq!(
            format_flight_results(&response),
            "No flights found for LAX → JFK on 2024-12-25"
        );
    }

    #[test]
    fn test_flight_blocks() {
        let response = mock_response(&criteria(), vec![FAKE_MODE_WARNING.to_string()]);
        let text = format_flight_results(&response);

        assert!(text.starts_with("✈️ Found 2 flights for LAX → JFK\n📅 Departure: 2024-12-25 | Return: 2025-01-02\n"));
        assert!(text.contains("👥 Passengers: 1 | 🎫 Class: economy"));
        assert!(text.contains("🔸 Flight 1:\n   Mock Airlines MK123 (Boeing 737)"));
        assert!(text.contains("   🛫 LAX 08:00 → 🛬 JFK 12:00"));
        assert!(text.contains("   ⏱️ Duration: 4h 45m | 🔄 Stops: 1"));
        assert!(text.contains("   💰 USD 299.99 | 🎫 economy (Y)"));
        assert!(text.contains("   🧳 Baggage: 1 pieces (23kg)"));
        assert!(text.contains("   📋 ❌ Non-refundable | ✅ Exchangeable"));
        assert!(text.ends_with(&format!("⚠️ Warnings:\n{}", FAKE_MODE_WARNING)));
    }
}
