pub mod bands;
pub mod batch;
pub mod estimate;
pub mod html;
pub mod rate;
pub mod schema;
pub mod validate;
pub mod watch;

use crate::fx::{self, ExchangeRate, HttpRateProvider};
use clap::Args;
use rust_decimal::Decimal;

/// Where the GBP to EUR rate comes from
#[derive(Args, Debug, Clone)]
pub struct RateArgs {
    /// Use this GBP to EUR rate instead of fetching one
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Exchange rate endpoint
    #[arg(long, env = "VRTC_RATE_URL", default_value = fx::DEFAULT_RATE_URL)]
    pub rate_url: String,
}

impl RateArgs {
    /// The user's rate if given, else the live rate (or the fallback)
    pub fn resolve(&self) -> anyhow::Result<ExchangeRate> {
        match self.rate {
            Some(rate) if rate <= Decimal::ZERO => {
                anyhow::bail!("Exchange rate must be greater than 0, got {}", rate)
            }
            Some(rate) => Ok(ExchangeRate::manual(rate)),
            None => Ok(fx::fetch_or_fallback(&HttpRateProvider::new(&self.rate_url))),
        }
    }
}
