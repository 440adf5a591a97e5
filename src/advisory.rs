/// Severity of a health advisory, used to choose log level when reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
}

pub const SAFE: &str = "Safe. Enjoy outdoor activities.";
pub const MODERATE: &str = "Moderate. Sensitive groups reduce exertion.";
pub const HIGH: &str = "High Pollution! Wear a mask.";
pub const UNKNOWN: &str = "Unknown";

/// Returns the health advice for an AQI category (1-5 from upstream).
///
/// The function is total, anything at or below 2 is safe and anything at or above 4 is high.
///
/// # Arguments
///
/// * 'aqi' - the AQI category
pub fn health_advice(aqi: i64) -> &'static str {
    advisory(aqi).0
}

/// Returns the health advice together with its severity
///
/// # Arguments
///
/// * 'aqi' - the AQI category
pub fn advisory(aqi: i64) -> (&'static str, Severity) {
    match aqi {
        a if a <= 2 => (SAFE, Severity::Info),
        3 => (MODERATE, Severity::Info),
        a if a >= 4 => (HIGH, Severity::Warning),
        _ => (UNKNOWN, Severity::Info),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_category() {
        assert_eq!(health_advice(1), SAFE);
        assert_eq!(health_advice(2), SAFE);
        assert_eq!(health_advice(3), MODERATE);
        assert_eq!(health_advice(4), HIGH);
        assert_eq!(health_advice(5), HIGH);
    }

    #[test]
    fn out_of_range_values_follow_the_comparisons() {
        assert_eq!(health_advice(0), SAFE);
        assert_eq!(health_advice(-7), SAFE);
        assert_eq!(health_advice(6), HIGH);
        assert_eq!(health_advice(i64::MAX), HIGH);
        assert_eq!(health_advice(i64::MIN), SAFE);
    }

    #[test]
    fn only_high_pollution_is_a_warning() {
        for aqi in -3..10 {
            let (text, severity) = advisory(aqi);
            assert_eq!(severity == Severity::Warning, text == HIGH);
        }
    }
}
