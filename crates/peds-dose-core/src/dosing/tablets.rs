//! Tablet count display.
//!
//! Tablets are split in quarters at most, so a raw count such as 0.33 is
//! snapped to the nearest quarter label within a band of +/-0.125.

const BAND: f64 = 0.125;

/// Counts below this are shown as zero.
const NEGLIGIBLE: f64 = 0.001;

/// Quarter fractions and their labels.
const QUARTERS: [(f64, &str); 3] = [(0.25, "1/4"), (0.5, "1/2"), (0.75, "3/4")];

/// Format a tablet count as a clinician-friendly fraction.
///
/// Negative and non-finite counts yield an empty string.
pub fn format_tablets(tablets: f64) -> String {
    if !tablets.is_finite() || tablets < 0.0 {
        return String::new();
    }
    if tablets < NEGLIGIBLE {
        return "0".into();
    }

    let whole = tablets.floor();
    let fraction = tablets - whole;

    if fraction.abs() < BAND {
        return format!("{}", whole);
    }

    for (target, label) in QUARTERS {
        if (fraction - target).abs() < BAND {
            return if whole > 0.0 {
                format!("{} ({})", whole, label)
            } else {
                label.to_string()
            };
        }
    }

    if fraction > 1.0 - BAND {
        return format!("{}", whole + 1.0);
    }

    format!("{:.2}", tablets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input() {
        assert_eq!(format_tablets(-1.0), "");
        assert_eq!(format_tablets(f64::NAN), "");
        assert_eq!(format_tablets(f64::INFINITY), "");
        assert_eq!(format_tablets(f64::NEG_INFINITY), "");
    }

    #[test]
    fn test_negligible() {
        assert_eq!(format_tablets(0.0), "0");
        assert_eq!(format_tablets(0.0005), "0");
    }

    #[test]
    fn test_whole_numbers() {
        assert_eq!(format_tablets(1.0), "1");
        assert_eq!(format_tablets(2.1), "2");
        assert_eq!(format_tablets(0.1), "0");
    }

    #[test]
    fn test_quarters() {
        assert_eq!(format_tablets(0.25), "1/4");
        assert_eq!(format_tablets(0.2), "1/4");
        assert_eq!(format_tablets(0.5), "1/2");
        assert_eq!(format_tablets(0.33), "1/4");
        assert_eq!(format_tablets(0.7), "3/4");
        assert_eq!(format_tablets(1.5), "1 (1/2)");
        assert_eq!(format_tablets(2.74), "2 (3/4)");
        assert_eq!(format_tablets(3.3), "3 (1/4)");
    }

    #[test]
    fn test_rounds_up_past_upper_band() {
        assert_eq!(format_tablets(0.95), "1");
        assert_eq!(format_tablets(1.9), "2");
    }

    #[test]
    fn test_band_boundary_falls_back_to_decimal() {
        // 0.875 sits exactly on the edge of the 3/4 band and the round-up band.
        assert_eq!(format_tablets(0.875), "0.88");
    }
}
