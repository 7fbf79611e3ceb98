//! Bands command - print the CO2 rate table

use crate::core::{lookup, RateBand, BANDS};
use crate::display::{eur, percent};
use clap::Args;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct BandsCommand {
    /// Show only the band for this CO2 value (g/km)
    #[arg(short, long)]
    co2: Option<u32>,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct BandRow {
    #[tabled(rename = "CO2 (g/km)")]
    range: String,
    #[tabled(rename = "VRT Rate")]
    rate: String,
    #[tabled(rename = "Minimum VRT")]
    minimum: String,
    #[tabled(rename = "Emissions")]
    description: String,
}

impl From<&RateBand> for BandRow {
    fn from(band: &RateBand) -> Self {
        BandRow {
            range: band.range_display(),
            rate: percent(band.rate_percent),
            minimum: eur(band.minimum_eur, 0),
            description: band.description.to_string(),
        }
    }
}

/// JSON shape of a band; the open top band has `max_co2: "unlimited"`
#[derive(Debug, Serialize)]
struct BandJson {
    min_co2: u32,
    max_co2: serde_json::Value,
    rate_percent: String,
    minimum_vrt: String,
    level: &'static str,
}

impl BandsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let bands: Vec<&RateBand> = match self.co2 {
            Some(co2) => vec![lookup(co2)],
            None => BANDS.iter().collect(),
        };

        if self.json {
            let json: Vec<BandJson> = bands
                .iter()
                .map(|b| BandJson {
                    min_co2: b.min_co2,
                    max_co2: b
                        .max_co2
                        .map_or_else(|| "unlimited".into(), serde_json::Value::from),
                    rate_percent: b.rate_percent.normalize().to_string(),
                    minimum_vrt: b.minimum_eur.to_string(),
                    level: b.level.display(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        let rows: Vec<BandRow> = bands.into_iter().map(BandRow::from).collect();
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(1..3)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!("Category A rates. Always verify current rates with Revenue.");
        Ok(())
    }
}
