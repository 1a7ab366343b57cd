//! Cabin tiers and the airline booking-class letters each tier accepts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ValidationError;

/// Caller-facing cabin tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CabinClass {
    #[default]
    Economy,
    EconomyPremium,
    Business,
    BusinessPremium,
    First,
    FirstPremium,
}

impl CabinClass {
    pub const ALL: [CabinClass; 6] = [
        CabinClass::Economy,
        CabinClass::EconomyPremium,
        CabinClass::Business,
        CabinClass::BusinessPremium,
        CabinClass::First,
        CabinClass::FirstPremium,
    ];

    /// Booking-class letters sent upstream as `preferredCabinClasses`, in fare order.
    pub fn booking_classes(self) -> &'static [&'static str] {
        match self {
            CabinClass::Economy => &["Y", "M", "L", "V", "S", "N", "Q", "O", "G", "X"],
            CabinClass::EconomyPremium => &["W", "E"],
            CabinClass::Business => &["C", "D", "I", "Z"],
            CabinClass::BusinessPremium => &["J"],
            CabinClass::First => &["F", "A"],
            CabinClass::FirstPremium => &["P"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::EconomyPremium => "economyPremium",
            CabinClass::Business => "business",
            CabinClass::BusinessPremium => "businessPremium",
            CabinClass::First => "first",
            CabinClass::FirstPremium => "firstPremium",
        }
    }
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CabinClass {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CabinClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| ValidationError::CabinClass(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_economy_booking_classes() {
        assert_eq!(
            CabinClass::Economy.booking_classes(),
            &["Y", "M", "L", "V", "S", "N", "Q", "O", "G", "X"]
        );
    }

    #[test]
    fn test_every_tier_has_booking_classes() {
        for class in CabinClass::ALL {
            assert!(!class.booking_classes().is_empty(), "{} has no letters", class);
        }
        assert_eq!(CabinClass::BusinessPremium.booking_classes(), &["J"]);
        assert_eq!(CabinClass::FirstPremium.booking_classes(), &["P"]);
    }

    #[test]
    fn test_cabin_class_parsing() {
        assert_eq!("economy".parse::<CabinClass>().unwrap(), CabinClass::Economy);
        assert_eq!("economyPremium".parse::<CabinClass>().unwrap(), CabinClass::EconomyPremium);
        assert_eq!("firstPremium".parse::<CabinClass>().unwrap(), CabinClass::FirstPremium);
        assert!("premium-economy".parse::<CabinClass>().is_err());
        assert!("Economy".parse::<CabinClass>().is_err());
    }

    #[test]
    fn test_serde_names_match_display() {
        for class in CabinClass::ALL {
            let json = serde_json::to_string(&class).unwrap();
            assert_eq!(json, format!("\"{}\"", class));
        }
    }
}
