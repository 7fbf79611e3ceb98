use crate::display;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Domain warnings attached to an estimate or assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Warning {
    /// The live exchange rate could not be fetched and the fallback was used.
    FallbackExchangeRate {
        #[schemars(with = "f64")]
        rate: Decimal,
    },
    /// The UK price is above the plausibility threshold.
    UnusuallyHighPrice,
    /// The statutory band minimum exceeded the computed VRT.
    MinimumVrtApplied {
        #[schemars(with = "f64")]
        computed: Decimal,
        #[schemars(with = "f64")]
        minimum: Decimal,
    },
}

impl Warning {
    pub fn message(&self) -> String {
        match self {
            Warning::FallbackExchangeRate { rate } => {
                format!(
                    "Using fallback rate {} - verify current rate",
                    display::rate(*rate)
                )
            }
            Warning::UnusuallyHighPrice => "Price seems unusually high. Please verify.".to_string(),
            Warning::MinimumVrtApplied { computed, minimum } => format!(
                "Computed VRT {} is below the band minimum; {} applies",
                display::eur(*computed, 2),
                display::eur(*minimum, 0)
            ),
        }
    }
}
