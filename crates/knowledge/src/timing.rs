//! Clock-token parsing and pickup-time arithmetic.

use chrono::{Duration, NaiveTime};

/// Parse a free-form clock token such as "14:00", "2pm", "2:30 PM", or "9".
///
/// Returns `None` for anything that is not a valid time of day.
pub fn parse_clock(token: &str) -> Option<NaiveTime> {
    let compact: String = token
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect::<String>()
        .to_lowercase();

    let (digits, meridiem) = if let Some(rest) = compact.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = compact.strip_suffix("pm") {
        (rest, Some(true))
    } else {
        (compact.as_str(), None)
    };

    let (hour, minute) = match digits.split_once(':') {
        Some((h, m)) if m.len() == 2 => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        Some(_) => return None,
        None => (digits.parse::<u32>().ok()?, 0),
    };

    let hour = match meridiem {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Pickup time for a departure, `lead_minutes` earlier; wraps past midnight.
pub fn pickup_time(departure: NaiveTime, lead_minutes: u32) -> NaiveTime {
    let (pickup, _) = departure.overflowing_sub_signed(Duration::minutes(i64::from(lead_minutes)));
    pickup
}
