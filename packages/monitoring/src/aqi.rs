//! US EPA Air Quality Index conversion for PM2.5.

/// One row of the EPA breakpoint table: concentrations `c_lo..=c_hi`
/// (µg/m³) map linearly onto index values `i_lo..=i_hi`.
#[derive(Debug, Clone, Copy)]
struct Breakpoint {
    c_lo: f64,
    c_hi: f64,
    i_lo: u16,
    i_hi: u16,
}

impl Breakpoint {
    const fn new(c_lo: f64, c_hi: f64, i_lo: u16, i_hi: u16) -> Self {
        Self {
            c_lo,
            c_hi,
            i_lo,
            i_hi,
        }
    }
}

const PM25_BREAKPOINTS: [Breakpoint; 6] = [
    Breakpoint::new(0.0, 12.0, 0, 50),
    Breakpoint::new(12.1, 35.4, 51, 100),
    Breakpoint::new(35.5, 55.4, 101, 150),
    Breakpoint::new(55.5, 150.4, 151, 200),
    Breakpoint::new(150.5, 250.4, 201, 300),
    Breakpoint::new(250.5, 500.4, 301, 500),
];

/// Highest index value on the scale.
pub const MAX_AQI: u16 = 500;

/// Converts a PM2.5 concentration in µg/m³ to a US EPA AQI value.
///
/// Bands are closed on both ends and checked in table order. Values
/// above the top band saturate at [`MAX_AQI`]; negative (or `NaN`) values
/// map to 0. A concentration that falls in the gap between two bands
/// (e.g. `12.05`) takes the upper band's lowest index.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pm25_to_aqi(concentration: f64) -> u16 {
    if concentration.is_nan() || concentration < PM25_BREAKPOINTS[0].c_lo {
        return 0;
    }

    for bp in &PM25_BREAKPOINTS {
        if concentration <= bp.c_hi {
            let c = concentration.max(bp.c_lo);
            let slope = f64::from(bp.i_hi - bp.i_lo) / (bp.c_hi - bp.c_lo);
            let aqi = slope.mul_add(c - bp.c_lo, f64::from(bp.i_lo));
            return aqi.round() as u16;
        }
    }

    MAX_AQI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_edges() {
        assert_eq!(pm25_to_aqi(0.0), 0);
        assert_eq!(pm25_to_aqi(12.0), 50);
        assert_eq!(pm25_to_aqi(12.1), 51);
        assert_eq!(pm25_to_aqi(35.4), 100);
        assert_eq!(pm25_to_aqi(35.5), 101);
        assert_eq!(pm25_to_aqi(55.4), 150);
        assert_eq!(pm25_to_aqi(150.4), 200);
        assert_eq!(pm25_to_aqi(250.4), 300);
        assert_eq!(pm25_to_aqi(500.4), 500);
    }

    #[test]
    fn interpolates_within_band() {
        // 49 / 23.3 * (34.2 - 12.1) + 51 = 97.48
        assert_eq!(pm25_to_aqi(34.2), 97);
        // 49 / 94.9 * (100.0 - 55.5) + 151 = 173.98
        assert_eq!(pm25_to_aqi(100.0), 174);
    }

    #[test]
    fn saturates_outside_table() {
        assert_eq!(pm25_to_aqi(600.0), 500);
        assert_eq!(pm25_to_aqi(f64::INFINITY), 500);
        assert_eq!(pm25_to_aqi(-3.0), 0);
        assert_eq!(pm25_to_aqi(f64::NAN), 0);
    }

    #[test]
    fn gap_values_take_upper_band_floor() {
        assert_eq!(pm25_to_aqi(12.05), 51);
        assert_eq!(pm25_to_aqi(35.45), 101);
    }

    #[test]
    fn monotonic_non_decreasing() {
        let mut previous = 0;
        for tenths in 0..=6000 {
            let c = f64::from(tenths) / 10.0;
            let aqi = pm25_to_aqi(c);
            assert!(aqi >= previous, "AQI dropped at {c}: {previous} -> {aqi}");
            previous = aqi;
        }
    }
}
