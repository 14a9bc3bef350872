//! Sensor parameter normalization.
//!
//! Upstream stations do not share a single naming convention for what
//! their sensors measure ("pm25", "PM2.5", "Ozone", "Nitrogen Dioxide",
//! ...). This maps any reported name onto the fixed [`Pollutant`]
//! vocabulary.

use airwatch_monitoring_models::Pollutant;

/// Maps a raw sensor parameter name to a [`Pollutant`].
///
/// Case-insensitive. Returns [`Pollutant::Other`] for names outside the
/// vocabulary.
#[must_use]
pub fn normalize_parameter(raw: &str) -> Pollutant {
    let lower = raw.trim().to_lowercase();

    if lower.contains("pm2") {
        return Pollutant::Pm25;
    }
    if lower.contains("pm10") {
        return Pollutant::Pm10;
    }
    if lower == "o3" || lower.contains("ozone") {
        return Pollutant::O3;
    }
    if lower == "no2" || lower.contains("nitrogen") {
        return Pollutant::No2;
    }
    if lower == "so2" || lower.contains("sulfur") {
        return Pollutant::So2;
    }
    if lower == "co" || lower.contains("carbon monoxide") {
        return Pollutant::Co;
    }

    Pollutant::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_common_labels() {
        assert_eq!(normalize_parameter("pm25"), Pollutant::Pm25);
        assert_eq!(normalize_parameter("PM2.5"), Pollutant::Pm25);
        assert_eq!(normalize_parameter("pm10"), Pollutant::Pm10);
        assert_eq!(normalize_parameter("o3"), Pollutant::O3);
        assert_eq!(normalize_parameter("Ozone"), Pollutant::O3);
        assert_eq!(normalize_parameter("NO2"), Pollutant::No2);
        assert_eq!(normalize_parameter("Nitrogen Dioxide"), Pollutant::No2);
        assert_eq!(normalize_parameter("so2"), Pollutant::So2);
        assert_eq!(normalize_parameter("Sulfur Dioxide"), Pollutant::So2);
        assert_eq!(normalize_parameter("CO"), Pollutant::Co);
        assert_eq!(normalize_parameter("Carbon Monoxide"), Pollutant::Co);
        assert_eq!(normalize_parameter(" pm25 "), Pollutant::Pm25);
    }

    #[test]
    fn unknown_fallback() {
        assert_eq!(normalize_parameter("temperature"), Pollutant::Other);
        assert_eq!(normalize_parameter("relativehumidity"), Pollutant::Other);
        assert_eq!(normalize_parameter("co2"), Pollutant::Other);
        assert_eq!(normalize_parameter("nox"), Pollutant::Other);
        assert_eq!(normalize_parameter(""), Pollutant::Other);
    }
}
