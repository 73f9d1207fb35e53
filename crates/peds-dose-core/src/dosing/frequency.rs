//! Administration frequency parsing.

use std::sync::LazyLock;

use regex::Regex;

/// Phrase table, checked in order. First match wins.
const FREQUENCY_PHRASES: &[(&[&str], u32)] = &[
    (&["once a day", "every 24 hours"], 1),
    (&["twice a day", "every 12 hours"], 2),
    (&["three times a day", "every 8 hours"], 3),
    (&["four times a day", "every 6 hours"], 4),
];

const HOURS_PER_DAY: u32 = 24;

static FIRST_NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[0-9]+").ok());

/// Number of administrations per day implied by a frequency description.
///
/// Unknown or ambiguous text maps to one dose per day. That keeps the full
/// daily amount in a single dose rather than inventing a split.
pub fn doses_per_day(frequency: Option<&str>) -> u32 {
    let Some(text) = frequency.map(str::trim).filter(|t| !t.is_empty()) else {
        return 1;
    };
    let lower = text.to_lowercase();

    for (phrases, count) in FREQUENCY_PHRASES {
        if phrases.iter().any(|p| lower.contains(p)) {
            return *count;
        }
    }

    if let Some(hours) = interval_hours(&lower) {
        if hours > 0 && HOURS_PER_DAY % hours == 0 {
            return HOURS_PER_DAY / hours;
        }
    }

    tracing::warn!(frequency = text, "unrecognized frequency, assuming one dose per day");
    1
}

/// First run of digits in the text.
fn interval_hours(text: &str) -> Option<u32> {
    FIRST_NUMBER.as_ref()?.find(text)?.as_str().parse().ok()
}
