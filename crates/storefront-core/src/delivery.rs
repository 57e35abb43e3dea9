//! Delivery fee policy keyed on the requested date and time slot.

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

/// A delivery slot label such as `"18:00-22:00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryInterval {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DeliveryInterval {
    /// Parses `HH:MM-HH:MM`, tolerating spaces and en dashes around the
    /// separator. Returns `None` for anything else.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.replace('\u{2013}', "-");
        let (start, end) = normalized.split_once('-')?;
        let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").ok()?;
        let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").ok()?;
        Some(Self { start, end })
    }
}

/// Which rule of the policy produced a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeRule {
    NoDate,
    Urgent,
    Weekend,
    Evening,
    Standard,
}

/// Fee table for deliveries. [`DeliveryFeePolicy::default`] is the canonical
/// storefront table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryFeePolicy {
    pub default_fee: u32,
    pub urgent_fee: u32,
    pub weekend_fee: u32,
    pub evening_surcharge: u32,
    /// Slots starting at or after this time are evening slots.
    pub evening_starts_at: NaiveTime,
}

impl Default for DeliveryFeePolicy {
    fn default() -> Self {
        Self {
            default_fee: 200,
            urgent_fee: 200,
            weekend_fee: 300,
            evening_surcharge: 200,
            evening_starts_at: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl DeliveryFeePolicy {
    /// Classifies a delivery request. `today` is the customer's local date.
    #[must_use]
    pub fn rule(
        &self,
        date: Option<NaiveDate>,
        interval: Option<&str>,
        today: NaiveDate,
    ) -> FeeRule {
        let Some(date) = date else {
            return FeeRule::NoDate;
        };
        if date <= today {
            return FeeRule::Urgent;
        }
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return FeeRule::Weekend;
        }
        let evening = interval
            .and_then(DeliveryInterval::parse)
            .is_some_and(|slot| slot.start >= self.evening_starts_at);
        if evening {
            FeeRule::Evening
        } else {
            FeeRule::Standard
        }
    }

    /// Fee charged for a delivery request.
    #[must_use]
    pub fn fee(&self, date: Option<NaiveDate>, interval: Option<&str>, today: NaiveDate) -> u32 {
        match self.rule(date, interval, today) {
            FeeRule::NoDate | FeeRule::Standard => self.default_fee,
            FeeRule::Urgent => self.urgent_fee,
            FeeRule::Weekend => self.weekend_fee,
            FeeRule::Evening => self.default_fee + self.evening_surcharge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2026-10-14 is a Wednesday.
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn no_date_charges_default_fee() {
        let policy = DeliveryFeePolicy::default();
        assert_eq!(policy.fee(None, Some("18:00-22:00"), today()), 200);
        assert_eq!(policy.rule(None, None, today()), FeeRule::NoDate);
    }

    #[test]
    fn saturday_charges_weekend_fee() {
        let policy = DeliveryFeePolicy::default();
        assert_eq!(policy.fee(date(2026, 10, 17), None, today()), 300);
        assert_eq!(policy.fee(date(2026, 10, 18), Some("10:00-14:00"), today()), 300);
    }

    #[test]
    fn weekday_evening_slot_charges_surcharge() {
        let policy = DeliveryFeePolicy::default();
        assert_eq!(policy.fee(date(2026, 10, 16), Some("18:00-22:00"), today()), 400);
    }

    #[test]
    fn weekday_daytime_slot_charges_default() {
        let policy = DeliveryFeePolicy::default();
        assert_eq!(policy.fee(date(2026, 10, 16), Some("10:00-14:00"), today()), 200);
        assert_eq!(policy.fee(date(2026, 10, 16), Some("14:00-18:00"), today()), 200);
    }

    #[test]
    fn today_and_past_dates_are_urgent() {
        let policy = DeliveryFeePolicy::default();
        assert_eq!(policy.fee(Some(today()), Some("18:00-22:00"), today()), 200);
        assert_eq!(policy.rule(Some(today()), None, today()), FeeRule::Urgent);
        // A past Saturday is still urgent rather than weekend.
        assert_eq!(policy.rule(date(2026, 10, 10), None, today()), FeeRule::Urgent);
    }

    #[test]
    fn unparsable_interval_is_not_evening() {
        let policy = DeliveryFeePolicy::default();
        assert_eq!(policy.rule(date(2026, 10, 15), Some("evening"), today()), FeeRule::Standard);
    }

    #[test]
    fn interval_parse_accepts_spacing_and_en_dash() {
        let slot = DeliveryInterval::parse("18:00 \u{2013} 22:00").expect("parses");
        assert_eq!(slot.start, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(slot.end, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
        assert!(DeliveryInterval::parse("8-10").is_none());
    }
}
