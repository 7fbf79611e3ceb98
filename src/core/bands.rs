//! Category A VRT rates, charged on OMV according to CO2 emissions (g/km).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Coarse emission grouping used by the rate indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionLevel {
    Low,
    Medium,
    High,
}

impl EmissionLevel {
    pub fn display(&self) -> &'static str {
        match self {
            EmissionLevel::Low => "low",
            EmissionLevel::Medium => "medium",
            EmissionLevel::High => "high",
        }
    }
}

/// A CO2 band of the VRT table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateBand {
    /// Inclusive lower bound
    pub min_co2: u32,
    /// Inclusive upper bound, `None` for the open top band
    pub max_co2: Option<u32>,
    /// Percentage of OMV, e.g. 16 for 16%
    pub rate_percent: Decimal,
    /// Minimum VRT payable in EUR
    pub minimum_eur: Decimal,
    pub level: EmissionLevel,
    pub description: &'static str,
}

impl RateBand {
    pub fn contains(&self, co2: u32) -> bool {
        co2 >= self.min_co2 && self.max_co2.is_none_or(|max| co2 <= max)
    }

    /// Rate as a fraction of OMV
    pub fn rate(&self) -> Decimal {
        self.rate_percent / dec!(100)
    }

    /// Display as "51-80" or "191+"
    pub fn range_display(&self) -> String {
        match self.max_co2 {
            Some(max) => format!("{}-{}", self.min_co2, max),
            None => format!("{}+", self.min_co2),
        }
    }

    /// One-line summary shown next to the CO2 field
    pub fn indicator(&self) -> String {
        format!(
            "VRT Rate: {}% - {}",
            self.rate_percent.normalize(),
            self.description
        )
    }
}

const fn band(
    min_co2: u32,
    max_co2: Option<u32>,
    rate_percent: Decimal,
    minimum_eur: Decimal,
    level: EmissionLevel,
    description: &'static str,
) -> RateBand {
    RateBand {
        min_co2,
        max_co2,
        rate_percent,
        minimum_eur,
        level,
        description,
    }
}

use EmissionLevel::{High, Low, Medium};

/// Ordered and contiguous from 0 g/km; the last band is open-ended.
pub const BANDS: [RateBand; 20] = [
    band(0, Some(50), dec!(7), dec!(140), Low, "Very low emissions - Excellent"),
    band(51, Some(80), dec!(9), dec!(180), Low, "Low emissions - Very good"),
    band(81, Some(85), dec!(9.75), dec!(195), Low, "Low emissions - Good"),
    band(86, Some(90), dec!(10.5), dec!(210), Low, "Moderate emissions"),
    band(91, Some(95), dec!(11.25), dec!(225), Low, "Moderate emissions"),
    band(96, Some(100), dec!(12), dec!(240), Low, "Moderate emissions"),
    band(101, Some(105), dec!(12.75), dec!(255), Medium, "Moderate emissions"),
    band(106, Some(110), dec!(13.5), dec!(270), Medium, "Moderate emissions"),
    band(111, Some(115), dec!(15.25), dec!(305), Medium, "Higher emissions"),
    band(116, Some(120), dec!(16), dec!(320), Medium, "Higher emissions"),
    band(121, Some(125), dec!(16.75), dec!(335), Medium, "Higher emissions"),
    band(126, Some(130), dec!(17.5), dec!(350), Medium, "Higher emissions"),
    band(131, Some(135), dec!(19.25), dec!(385), Medium, "High emissions"),
    band(136, Some(140), dec!(20), dec!(400), Medium, "High emissions"),
    band(141, Some(145), dec!(21.5), dec!(430), High, "High emissions"),
    band(146, Some(150), dec!(25), dec!(500), High, "Very high emissions"),
    band(151, Some(155), dec!(27.5), dec!(550), High, "Very high emissions"),
    band(156, Some(170), dec!(30), dec!(600), High, "Very high emissions"),
    band(171, Some(190), dec!(35), dec!(700), High, "Extremely high emissions"),
    band(191, None, dec!(41), dec!(820), High, "Maximum VRT rate"),
];

/// Band for a CO2 value
pub fn lookup(co2: u32) -> &'static RateBand {
    let band = BANDS
        .iter()
        .find(|band| band.contains(co2))
        .unwrap_or(&BANDS[BANDS.len() - 1]);
    log::debug!("CO2 {} g/km -> band {} at {}%", co2, band.range_display(), band.rate_percent);
    band
}

/// VRT rate (percent) and band for a CO2 value
pub fn vrt_rate(co2: u32) -> (Decimal, &'static RateBand) {
    let band = lookup(co2);
    (band.rate_percent, band)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowest_band_covers_one_to_fifty() {
        for co2 in 1..=50 {
            assert_eq!(vrt_rate(co2).0, dec!(7), "co2 {}", co2);
        }
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(vrt_rate(50).0, dec!(7));
        assert_eq!(vrt_rate(51).0, dec!(9));
        assert_eq!(vrt_rate(85).0, dec!(9.75));
        assert_eq!(vrt_rate(86).0, dec!(10.5));
        assert_eq!(vrt_rate(120).0, dec!(16));
        assert_eq!(vrt_rate(121).0, dec!(16.75));
        assert_eq!(vrt_rate(155).0, dec!(27.5));
        assert_eq!(vrt_rate(156).0, dec!(30));
        assert_eq!(vrt_rate(170).0, dec!(30));
        assert_eq!(vrt_rate(190).0, dec!(35));
        assert_eq!(vrt_rate(191).0, dec!(41));
        assert_eq!(vrt_rate(500).0, dec!(41));
        assert_eq!(vrt_rate(u32::MAX).0, dec!(41));
    }

    #[test]
    fn thresholds_and_rates_match_table() {
        let uppers: Vec<u32> = BANDS.iter().filter_map(|b| b.max_co2).collect();
        assert_eq!(
            uppers,
            vec![
                50, 80, 85, 90, 95, 100, 105, 110, 115, 120, 125, 130, 135, 140, 145, 150,
                155, 170, 190
            ]
        );
        let rates: Vec<Decimal> = BANDS.iter().map(|b| b.rate_percent).collect();
        assert_eq!(
            rates,
            vec![
                dec!(7),
                dec!(9),
                dec!(9.75),
                dec!(10.5),
                dec!(11.25),
                dec!(12),
                dec!(12.75),
                dec!(13.5),
                dec!(15.25),
                dec!(16),
                dec!(16.75),
                dec!(17.5),
                dec!(19.25),
                dec!(20),
                dec!(21.5),
                dec!(25),
                dec!(27.5),
                dec!(30),
                dec!(35),
                dec!(41)
            ]
        );
    }

    #[test]
    fn bands_are_contiguous() {
        for pair in BANDS.windows(2) {
            let upper = pair[0].max_co2.unwrap();
            assert_eq!(pair[1].min_co2, upper + 1);
        }
        for co2 in 0..=600 {
            assert!(lookup(co2).contains(co2), "co2 {}", co2);
        }
    }

    #[test]
    fn minimums_and_levels() {
        assert_eq!(lookup(120).minimum_eur, dec!(320));
        assert_eq!(lookup(250).minimum_eur, dec!(820));
        assert_eq!(lookup(100).level, EmissionLevel::Low);
        assert_eq!(lookup(101).level, EmissionLevel::Medium);
        assert_eq!(lookup(141).level, EmissionLevel::High);
    }

    #[test]
    fn indicator_text() {
        assert_eq!(lookup(120).indicator(), "VRT Rate: 16% - Higher emissions");
        assert_eq!(lookup(83).indicator(), "VRT Rate: 9.75% - Low emissions - Good");
        assert_eq!(lookup(191).range_display(), "191+");
        assert_eq!(lookup(60).range_display(), "51-80");
    }
}
