//! Rate command - show the current GBP to EUR exchange rate

use crate::cmd::RateArgs;
use crate::display;
use crate::fx::RateSource;
use clap::Args;

#[derive(Args, Debug)]
pub struct RateCommand {
    #[command(flatten)]
    rate: RateArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

impl RateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let rate = self.rate.resolve()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rate)?);
            return Ok(());
        }

        println!("1 GBP = {} EUR", display::rate(rate.gbp_to_eur));
        match rate.source {
            RateSource::Live => println!(
                "Updated: {}",
                rate.timestamp.format("%Y-%m-%d %H:%M:%S %:z")
            ),
            RateSource::Manual => println!("Rate supplied on the command line"),
            RateSource::Fallback => {
                println!("\u{26A0} Using fallback rate - verify current rate")
            }
        }
        Ok(())
    }
}
