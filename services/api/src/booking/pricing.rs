//! Rate-plan pricing
//!
//! Quotes the total amount for a booking window against a bike's rate
//! card, plus the fixed add-on fees.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::booking::window::Window;
use crate::error::ApiError;
use crate::models::RatePlan;

/// Fixed helmet add-on fee.
pub fn helmet_fee() -> Decimal {
    Decimal::from(50)
}

/// Fixed navigation add-on fee.
pub fn navigation_fee() -> Decimal {
    Decimal::from(100)
}

/// Per-unit rates of a bike listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCard {
    pub hourly: Decimal,
    pub daily: Decimal,
    pub monthly: Decimal,
}

/// Optional add-ons requested with a booking.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AddOns {
    #[serde(default)]
    pub helmet: bool,
    #[serde(default)]
    pub navigation: bool,
}

/// Quote the total amount for `window` under `plan`.
///
/// Monthly billing divides the window by a flat 30 days rather than
/// calendar months; this is a deliberate modeling simplification. A
/// non-positive base amount (for example a monthly booking shorter
/// than 30 days) is rejected before add-ons are applied.
pub fn quote(
    card: &RateCard,
    plan: RatePlan,
    window: &Window,
    add_ons: AddOns,
) -> Result<Decimal, ApiError> {
    let base = match plan {
        RatePlan::Hourly => card.hourly * Decimal::from(window.hours_ceil()),
        RatePlan::Daily => card.daily * Decimal::from(window.days_ceil()),
        RatePlan::Monthly => card.monthly * Decimal::from(window.months_floor()),
        RatePlan::Subscription => card.monthly,
    };

    if base <= Decimal::ZERO {
        return Err(ApiError::Validation(
            "Booking amount must be positive".to_string(),
        ));
    }

    let mut total = base;
    if add_ons.helmet {
        total += helmet_fee();
    }
    if add_ons.navigation {
        total += navigation_fee();
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    fn card() -> RateCard {
        RateCard {
            hourly: Decimal::from(40),
            daily: Decimal::from(500),
            monthly: Decimal::from(9_000),
        }
    }

    fn days(n: i64) -> Window {
        Window::new(day0(), day0() + Duration::days(n)).unwrap()
    }

    #[test]
    fn daily_two_days_at_500_costs_1000() {
        let total = quote(&card(), RatePlan::Daily, &days(2), AddOns::default()).unwrap();
        assert_eq!(total, Decimal::from(1_000));
    }

    #[test]
    fn hourly_rounds_partial_hours_up() {
        let window = Window::new(day0(), day0() + Duration::minutes(90)).unwrap();
        let total = quote(&card(), RatePlan::Hourly, &window, AddOns::default()).unwrap();
        assert_eq!(total, Decimal::from(80));
    }

    #[test]
    fn monthly_uses_flat_30_day_divisor() {
        let total = quote(&card(), RatePlan::Monthly, &days(45), AddOns::default()).unwrap();
        assert_eq!(total, Decimal::from(9_000));

        let total = quote(&card(), RatePlan::Monthly, &days(60), AddOns::default()).unwrap();
        assert_eq!(total, Decimal::from(18_000));
    }

    #[test]
    fn monthly_shorter_than_30_days_is_rejected() {
        let result = quote(&card(), RatePlan::Monthly, &days(10), AddOns::default());
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[test]
    fn subscription_is_flat_regardless_of_length() {
        let short = quote(&card(), RatePlan::Subscription, &days(3), AddOns::default()).unwrap();
        let long = quote(&card(), RatePlan::Subscription, &days(90), AddOns::default()).unwrap();
        assert_eq!(short, Decimal::from(9_000));
        assert_eq!(long, short);
    }

    #[test]
    fn add_on_fees_are_fixed_surcharges() {
        let add_ons = AddOns {
            helmet: true,
            navigation: true,
        };
        let total = quote(&card(), RatePlan::Daily, &days(1), add_ons).unwrap();
        assert_eq!(total, Decimal::from(500 + 50 + 100));

        let helmet_only = AddOns {
            helmet: true,
            navigation: false,
        };
        let total = quote(&card(), RatePlan::Daily, &days(1), helmet_only).unwrap();
        assert_eq!(total, Decimal::from(550));
    }

    #[test]
    fn price_is_monotone_in_window_length() {
        for plan in [
            RatePlan::Hourly,
            RatePlan::Daily,
            RatePlan::Monthly,
            RatePlan::Subscription,
        ] {
            let mut previous = Decimal::ZERO;
            // Start at 30 days so every plan has a positive base.
            for n in 30..120 {
                let total = quote(&card(), plan, &days(n), AddOns::default()).unwrap();
                assert!(
                    total >= previous,
                    "{:?} price decreased at {} days",
                    plan,
                    n
                );
                previous = total;
            }
        }
    }

    #[test]
    fn zero_rate_card_is_rejected() {
        let free = RateCard {
            hourly: Decimal::ZERO,
            daily: Decimal::ZERO,
            monthly: Decimal::ZERO,
        };
        let result = quote(&free, RatePlan::Daily, &days(2), AddOns::default());
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
