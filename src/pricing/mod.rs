//! Pricing engine for console rental bookings.
//!
//! This module turns a [`BookingRequest`](crate::types::BookingRequest) into
//! an itemized [`Quote`]. Rates are fixed constants; the calculation order
//! is:
//!
//! 1. Plan price (hourly rate times hours, or a flat day/night price)
//! 2. Games, with the most expensive one free
//! 3. Controller surcharge
//! 4. Delivery charge by city
//! 5. Coupon discount on the subtotal
//! 6. UPI discount on what is left after the coupon
//!
//! Discounts compound: the UPI discount is taken from the post-coupon amount,
//! and both steps are floored at zero. Amounts are exact to the paisa; the
//! UPI discount is the only step that rounds (to whole rupees).

mod quote;

pub use quote::{GameLine, Quote};

use crate::types::Amount;

/// Hourly plan rate per hour
pub const HOURLY_RATE: Amount = Amount::rupees(198);
/// Flat day plan price
pub const DAY_PRICE: Amount = Amount::rupees(999);
/// Flat night plan price
pub const NIGHT_PRICE: Amount = Amount::rupees(1499);

/// Extra controller, hourly plan, per hour
pub const HOURLY_CONTROLLER_RATE: Amount = Amount::rupees(39);
/// Extra controller, day plan
pub const DAY_CONTROLLER_PRICE: Amount = Amount::rupees(199);
/// Extra controller, night plan
pub const NIGHT_CONTROLLER_PRICE: Amount = Amount::rupees(299);

/// Hours billed when the form leaves them out
pub const DEFAULT_HOURS: u32 = 2;

/// Delivery charge by exact city name
pub const DELIVERY_CHARGES: [(&str, Amount); 3] = [
    ("Neemuch", Amount::rupees(199)),
    ("Pratapgarh", Amount::rupees(199)),
    ("Mandsaur", Amount::rupees(99)),
];
/// Delivery charge for any city not in [`DELIVERY_CHARGES`]
pub const DEFAULT_DELIVERY_CHARGE: Amount = Amount::rupees(99);

/// The only coupon code (matched case-insensitively)
pub const COUPON_CODE: &str = "leazo";
/// Cities where the coupon has reduced flat discounts
pub const COUPON_LOCAL_CITIES: [&str; 2] = ["Pratapgarh", "Neemuch"];

/// UPI discount in percent of the post-coupon amount
pub const UPI_DISCOUNT_PERCENT: i64 = 5;

/// Delivery charge for a city
pub fn delivery_charge(city: &str) -> Amount {
    DELIVERY_CHARGES
        .iter()
        .find(|(name, _)| *name == city)
        .map(|(_, charge)| *charge)
        .unwrap_or(DEFAULT_DELIVERY_CHARGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_charge() {
        assert_eq!(delivery_charge("Neemuch"), Amount::rupees(199));
        assert_eq!(delivery_charge("Pratapgarh"), Amount::rupees(199));
        assert_eq!(delivery_charge("Mandsaur"), Amount::rupees(99));
        assert_eq!(delivery_charge("Indore"), DEFAULT_DELIVERY_CHARGE);
        assert_eq!(delivery_charge(""), DEFAULT_DELIVERY_CHARGE);
        // exact match only
        assert_eq!(delivery_charge("neemuch"), DEFAULT_DELIVERY_CHARGE);
    }
}
