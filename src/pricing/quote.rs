//! Itemized price quote.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{Amount, BookingRequest, PaymentMethod, Plan};

use super::*;

/// One game line on the receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameLine {
    /// Game title
    pub name: String,
    /// Listed price; kept even when the game is free
    pub price: Amount,
    /// Whether this game is the free one
    pub free: bool,
}

/// Price breakdown for a booking
///
/// Games are listed most expensive first. When several games share the top
/// price, the one submitted first is free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub plan_price: Amount,
    pub controller_charge: Amount,
    pub game_total: Amount,
    pub delivery_charge: Amount,
    pub subtotal: Amount,
    pub coupon_discount: Amount,
    pub after_coupon: Amount,
    pub upi_discount: Amount,
    pub total: Amount,
    pub games: Vec<GameLine>,
}

impl Quote {
    /// Price a booking request
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the amounts overflow, which only
    /// happens with absurd game prices.
    pub fn compute(request: &BookingRequest) -> Result<Self, Error> {
        let hours = i64::from(request.hours);

        let plan_price = match request.plan {
            Plan::Hourly => checked(HOURLY_RATE.checked_mul(hours))?,
            Plan::Day => DAY_PRICE,
            Plan::Night => NIGHT_PRICE,
            Plan::Other(_) => Amount::ZERO,
        };

        // sort_by is stable: ties keep submission order
        let mut ranked: Vec<_> = request.games.iter().collect();
        ranked.sort_by(|a, b| b.price.cmp(&a.price));

        let games: Vec<GameLine> = ranked
            .iter()
            .enumerate()
            .map(|(i, game)| GameLine {
                name: game.name.clone(),
                price: game.price,
                free: i == 0,
            })
            .collect();

        let game_total = games
            .iter()
            .filter(|line| !line.free)
            .try_fold(Amount::ZERO, |acc, line| acc.checked_add(line.price));
        let game_total = checked(game_total)?;

        let controller_charge = if request.add_controller {
            match request.plan {
                Plan::Hourly => checked(HOURLY_CONTROLLER_RATE.checked_mul(hours))?,
                Plan::Day => DAY_CONTROLLER_PRICE,
                Plan::Night => NIGHT_CONTROLLER_PRICE,
                Plan::Other(_) => Amount::ZERO,
            }
        } else {
            Amount::ZERO
        };

        let delivery_charge = delivery_charge(&request.city);

        let subtotal = checked(
            plan_price
                .checked_add(controller_charge)
                .and_then(|v| v.checked_add(game_total))
                .and_then(|v| v.checked_add(delivery_charge)),
        )?;

        let coupon_discount = coupon_discount(
            &request.plan,
            &request.city,
            plan_price,
            request.coupon.as_deref(),
        );
        let after_coupon = checked(subtotal.checked_sub(coupon_discount))?.max(Amount::ZERO);

        let upi_discount = match request.payment_method {
            PaymentMethod::Upi => upi_discount(after_coupon)?,
            _ => Amount::ZERO,
        };
        let total = checked(after_coupon.checked_sub(upi_discount))?.max(Amount::ZERO);

        Ok(Self {
            plan_price,
            controller_charge,
            game_total,
            delivery_charge,
            subtotal,
            coupon_discount,
            after_coupon,
            upi_discount,
            total,
            games,
        })
    }

    /// The game charged at zero, if any games were picked
    pub fn free_game(&self) -> Option<&GameLine> {
        self.games.iter().find(|line| line.free)
    }
}

fn checked(value: Option<Amount>) -> Result<Amount, Error> {
    value.ok_or_else(|| Error::Validation("Invalid amount".into()))
}

fn coupon_discount(plan: &Plan, city: &str, plan_price: Amount, coupon: Option<&str>) -> Amount {
    let applies = coupon.is_some_and(|code| code.eq_ignore_ascii_case(COUPON_CODE));
    if !applies {
        return Amount::ZERO;
    }

    if COUPON_LOCAL_CITIES.contains(&city) {
        match plan {
            Plan::Day => Amount::rupees(400),
            Plan::Night => Amount::rupees(700),
            _ => Amount::ZERO,
        }
    } else {
        match plan {
            // hourly prices are a multiple of an even rate, so half is exact
            Plan::Hourly => Amount::from_paise(plan_price.paise() / 2),
            Plan::Day => Amount::rupees(500),
            Plan::Night => Amount::rupees(800),
            Plan::Other(_) => Amount::ZERO,
        }
    }
}

/// UPI share of `amount`, rounded half away from zero to whole rupees
fn upi_discount(amount: Amount) -> Result<Amount, Error> {
    checked(amount.percent_rounded(UPI_DISCOUNT_PERCENT))
}
