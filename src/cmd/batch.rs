//! Batch command - assess every vehicle in a CSV or JSON file

use crate::cmd::RateArgs;
use crate::core::{assess, validation, FieldCheck, ImportAssessment, VehicleRecord, Warning};
use crate::display::{eur, gbp, percent};
use crate::fx::ExchangeRate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct BatchCommand {
    /// CSV or JSON file of vehicles ("-" for CSV on stdin)
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    rate: RateArgs,

    /// Write results as CSV
    #[arg(long, conflicts_with = "json")]
    csv: bool,

    /// Output full assessments as JSON
    #[arg(long)]
    json: bool,
}

/// One line of the batch summary
#[derive(Debug, Serialize, Tabled)]
struct BatchRow {
    #[tabled(rename = "Vehicle")]
    id: String,
    #[tabled(rename = "UK Price")]
    uk_price: String,
    #[tabled(rename = "CO2")]
    co2: u32,
    #[tabled(rename = "From")]
    origin: &'static str,
    #[tabled(rename = "Age")]
    age: u32,
    #[tabled(rename = "Rate")]
    exchange_rate: String,
    #[tabled(rename = "VRT")]
    vrt: String,
    #[tabled(rename = "Duty")]
    customs_duty: String,
    #[tabled(rename = "VAT")]
    vat: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Warnings")]
    warnings: String,
}

impl BatchRow {
    fn new(index: usize, record: &VehicleRecord, a: &ImportAssessment, raw: bool) -> Self {
        let money = |amount: Decimal| {
            if raw {
                amount.to_string()
            } else {
                eur(amount, 0)
            }
        };
        BatchRow {
            id: record
                .id
                .clone()
                .unwrap_or_else(|| format!("#{}", index + 1)),
            uk_price: if raw {
                record.uk_price.to_string()
            } else {
                gbp(record.uk_price)
            },
            co2: a.vrt_calculation.co2_emissions,
            origin: a.purchase_details.import_origin.display(),
            age: a.purchase_details.vehicle_age,
            exchange_rate: crate::display::rate(a.purchase_details.exchange_rate),
            vrt: money(a.vrt_calculation.final_vrt),
            customs_duty: money(a.customs_duty),
            vat: money(a.vat_calculation.vat_amount),
            total: money(a.total_import_cost),
            warnings: a
                .warnings
                .iter()
                .map(|w| w.message())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchOutput<'a> {
    id: Option<&'a str>,
    #[serde(flatten)]
    assessment: &'a ImportAssessment,
}

impl BatchCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let records = read_records(&self.input)?;
        log::info!("Read {} vehicle records", records.len());

        let default_rate = if records.iter().any(|r| r.exchange_rate.is_none()) {
            let rate = self.rate.resolve()?;
            if rate.is_fallback() {
                eprintln!("\u{26A0} Using fallback rate {} - verify current rate", rate.display());
            }
            rate
        } else {
            ExchangeRate::manual(crate::fx::FALLBACK_RATE)
        };

        let assessments = assess_records(&records, &default_rate)?;

        if self.json {
            let output: Vec<BatchOutput> = records
                .iter()
                .zip(&assessments)
                .map(|(r, a)| BatchOutput {
                    id: r.id.as_deref(),
                    assessment: a,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        let rows: Vec<BatchRow> = records
            .iter()
            .zip(&assessments)
            .enumerate()
            .map(|(i, (r, a))| BatchRow::new(i, r, a, self.csv))
            .collect();

        if self.csv {
            let mut wtr = csv::Writer::from_writer(io::stdout());
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        } else {
            let table = Table::new(&rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(5..10)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
        }
        Ok(())
    }
}

/// Assess each record, filling in missing exchange rates from `default_rate`.
///
/// Records are held to the same price and CO2 rules as the form.
fn assess_records(
    records: &[VehicleRecord],
    default_rate: &ExchangeRate,
) -> anyhow::Result<Vec<ImportAssessment>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut warnings = Vec::new();
            match validation::check_price_value(record.uk_price) {
                FieldCheck::Invalid(msg) => anyhow::bail!("Record {}: {}", i + 1, msg),
                FieldCheck::Flagged(_) => warnings.push(Warning::UnusuallyHighPrice),
                FieldCheck::Valid => {}
            }
            if let FieldCheck::Invalid(msg) =
                validation::check_co2_value(i64::from(record.co2_emissions))
            {
                anyhow::bail!("Record {}: {}", i + 1, msg);
            }
            match record.exchange_rate {
                Some(rate) if rate <= Decimal::ZERO => {
                    anyhow::bail!("Record {}: exchange rate must be greater than 0", i + 1);
                }
                Some(_) => {}
                None if default_rate.is_fallback() => {
                    warnings.push(Warning::FallbackExchangeRate {
                        rate: default_rate.gbp_to_eur,
                    });
                }
                None => {}
            }

            let input = record.to_assessment_input(default_rate.gbp_to_eur);
            let mut assessment =
                assess(&input).map_err(|e| anyhow::anyhow!("Record {}: {}", i + 1, e))?;
            warnings.append(&mut assessment.warnings);
            assessment.warnings = warnings;
            log::debug!(
                "Record {}: total {} ({} VRT)",
                i + 1,
                assessment.total_import_cost,
                percent(assessment.vrt_calculation.co2_rate_percent)
            );
            Ok(assessment)
        })
        .collect()
}

fn read_records(path: &Path) -> anyhow::Result<Vec<VehicleRecord>> {
    if path.as_os_str() == "-" {
        return read_csv(io::stdin().lock());
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => Ok(serde_json::from_reader(reader)?),
        _ => read_csv(reader),
    }
}

fn read_csv<R: Read>(reader: R) -> anyhow::Result<Vec<VehicleRecord>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let records: Result<Vec<VehicleRecord>, _> = rdr.deserialize().collect();
    Ok(records?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ImportOrigin, TransportMethod};
    use rust_decimal_macros::dec;

    const CSV: &str = "\
id,uk_price,co2_emissions,fuel_type,import_origin,vehicle_age,transport_method,exchange_rate
161-D-1,20000,120,petrol,uk,,,
NI car,20000,191,diesel,ni,5,drive,1.2
";

    #[test]
    fn reads_csv_with_optional_columns() {
        let records = read_csv(CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("161-D-1"));
        assert_eq!(records[0].vehicle_age, None);
        assert_eq!(records[0].exchange_rate, None);
        assert_eq!(records[1].import_origin, Some(ImportOrigin::Ni));
        assert_eq!(records[1].transport_method, Some(TransportMethod::Drive));
        assert_eq!(records[1].exchange_rate, Some(dec!(1.2)));
    }

    #[test]
    fn minimal_columns() {
        let csv = "uk_price,co2_emissions,fuel_type\n15000,95,hybrid\n";
        let records = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(records[0].import_origin, None);
        assert_eq!(records[0].co2_emissions, 95);
    }

    #[test]
    fn rejects_unknown_fuel() {
        let csv = "uk_price,co2_emissions,fuel_type\n15000,95,steam\n";
        assert!(read_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn per_record_rate_overrides_default() {
        let records = read_csv(CSV.as_bytes()).unwrap();
        let assessments = assess_records(&records, &ExchangeRate::manual(dec!(1.17))).unwrap();
        assert_eq!(assessments[0].purchase_details.exchange_rate, dec!(1.17));
        assert_eq!(assessments[0].total_import_cost, dec!(36614.3536));
        assert_eq!(assessments[1].purchase_details.exchange_rate, dec!(1.2));
        assert!(!assessments[1].customs_duty_applicable);
    }

    #[test]
    fn rejects_non_positive_price() {
        let csv = "uk_price,co2_emissions,fuel_type\n0,95,petrol\n";
        let records = read_csv(csv.as_bytes()).unwrap();
        let err = assess_records(&records, &ExchangeRate::fallback()).unwrap_err();
        assert!(err.to_string().contains("Record 1"));
    }

    #[test]
    fn rows_fall_back_to_index_ids() {
        let csv = "uk_price,co2_emissions,fuel_type\n15000,95,hybrid\n";
        let records = read_csv(csv.as_bytes()).unwrap();
        let assessments = assess_records(&records, &ExchangeRate::fallback()).unwrap();
        let row = BatchRow::new(0, &records[0], &assessments[0], false);
        assert_eq!(row.id, "#1");
        assert_eq!(row.origin, "UK");
        assert!(row.total.starts_with('\u{20AC}'));
    }

    #[test]
    fn rejects_co2_outside_form_range() {
        let csv = "uk_price,co2_emissions,fuel_type\n15000,95,petrol\n15000,0,petrol\n";
        let records = read_csv(csv.as_bytes()).unwrap();
        let err = assess_records(&records, &ExchangeRate::fallback()).unwrap_err();
        assert_eq!(err.to_string(), "Record 2: Please enter valid CO2 emissions");

        let csv = "uk_price,co2_emissions,fuel_type\n15000,501,petrol\n";
        let records = read_csv(csv.as_bytes()).unwrap();
        let err = assess_records(&records, &ExchangeRate::fallback()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Record 1: CO2 emissions seem unusually high. Please verify."
        );
    }

    #[test]
    fn high_price_is_flagged() {
        let csv = "uk_price,co2_emissions,fuel_type,exchange_rate\n1500000,120,petrol,1.17\n";
        let records = read_csv(csv.as_bytes()).unwrap();
        let assessments = assess_records(&records, &ExchangeRate::manual(dec!(1.17))).unwrap();
        assert_eq!(assessments[0].warnings, vec![Warning::UnusuallyHighPrice]);
    }

    #[test]
    fn fallback_rate_is_reported_on_rows_that_use_it() {
        let records = read_csv(CSV.as_bytes()).unwrap();
        let assessments = assess_records(&records, &ExchangeRate::fallback()).unwrap();
        assert_eq!(
            assessments[0].warnings,
            vec![Warning::FallbackExchangeRate { rate: dec!(1.17) }]
        );
        // second row carries its own rate
        assert!(assessments[1].warnings.is_empty());

        let row = BatchRow::new(0, &records[0], &assessments[0], true);
        assert_eq!(row.warnings, "Using fallback rate 1.1700 - verify current rate");
    }

    #[test]
    fn overflowing_record_is_an_error() {
        let record = VehicleRecord {
            id: None,
            uk_price: Decimal::MAX,
            co2_emissions: 120,
            fuel_type: crate::core::FuelType::Petrol,
            import_origin: None,
            vehicle_age: None,
            transport_method: None,
            exchange_rate: Some(dec!(1.17)),
        };
        let err = assess_records(&[record], &ExchangeRate::fallback()).unwrap_err();
        assert!(err.to_string().starts_with("Record 1: amounts too large"));
    }
}
