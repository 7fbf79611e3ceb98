//! Estimate command - VRT, duty, VAT and total cost for one vehicle

use crate::cmd::RateArgs;
use crate::core::{
    assess, bands, quick_estimate, validation, vehicle, AssessmentInput, EstimateInput,
    EstimateResult, FieldCheck, FuelType, ImportAssessment, ImportOrigin, TransportMethod, Warning,
};
use crate::display::{eur, gbp, percent};
use crate::fx::ExchangeRate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct EstimateCommand {
    #[command(flatten)]
    pub vehicle: VehicleArgs,

    /// Full assessment with transport, depreciation, band minimum and motor tax
    #[arg(long)]
    full: bool,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// Vehicle details as entered on the form
#[derive(Args, Debug, Clone)]
pub struct VehicleArgs {
    /// UK purchase price in GBP
    #[arg(short, long)]
    pub price: String,

    /// CO2 emissions in g/km
    #[arg(short, long)]
    pub co2: String,

    #[arg(short, long, value_enum, default_value_t = FuelType::Petrol)]
    pub fuel: FuelType,

    #[arg(short, long, value_enum, default_value_t = ImportOrigin::Uk)]
    pub origin: ImportOrigin,

    /// Vehicle age in whole years
    #[arg(short, long, default_value = "0")]
    pub age: String,

    #[arg(short, long, value_enum, default_value_t = TransportMethod::Ferry)]
    pub transport: TransportMethod,

    #[command(flatten)]
    pub rate: RateArgs,
}

impl VehicleArgs {
    /// Run the form checks, failing if submission would be blocked
    pub fn checked(&self) -> anyhow::Result<Vec<Warning>> {
        let price_check = validation::check_uk_price(&self.price);
        let co2_check = validation::check_co2_emissions(&self.co2);

        if !validation::validate_form(&self.price, &self.co2) {
            let mut messages: Vec<&str> = [&price_check, &co2_check]
                .iter()
                .filter_map(|c| match c {
                    FieldCheck::Invalid(msg) => Some(*msg),
                    _ => None,
                })
                .collect();
            messages.extend(validation::FORM_ERRORS);
            anyhow::bail!("{}", messages.join("\n"));
        }

        let mut warnings = Vec::new();
        if let FieldCheck::Flagged(msg) = price_check {
            log::warn!("{}", msg);
            warnings.push(Warning::UnusuallyHighPrice);
        }
        Ok(warnings)
    }

    pub fn assessment_input(&self, rate: &ExchangeRate) -> anyhow::Result<AssessmentInput> {
        Ok(AssessmentInput {
            vehicle: EstimateInput {
                uk_price: vehicle::parse_decimal(&self.price)
                    .ok_or_else(|| vehicle::InputError::InvalidPrice(self.price.clone()))?,
                co2_emissions: vehicle::parse_co2(&self.co2)?,
                fuel_type: self.fuel,
                import_origin: self.origin,
                exchange_rate: rate.gbp_to_eur,
            },
            vehicle_age: vehicle::parse_age(&self.age)?,
            transport_method: self.transport,
        })
    }
}

#[derive(Debug, Serialize)]
struct QuickEstimateOutput<'a> {
    exchange_rate: &'a ExchangeRate,
    estimate: &'a EstimateResult,
    warnings: &'a [Warning],
}

#[derive(Debug, Serialize)]
struct AssessmentOutput<'a> {
    exchange_rate: &'a ExchangeRate,
    assessment: &'a ImportAssessment,
}

/// Line of the breakdown table
#[derive(Debug, Clone, Tabled)]
pub struct CostLine {
    #[tabled(rename = "Item")]
    pub item: String,
    #[tabled(rename = "Amount")]
    pub amount: String,
}

impl CostLine {
    fn new(item: impl Into<String>, amount: String) -> Self {
        CostLine {
            item: item.into(),
            amount,
        }
    }
}

impl EstimateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut warnings = self.vehicle.checked()?;
        let rate = self.vehicle.rate.resolve()?;
        if rate.is_fallback() {
            warnings.push(Warning::FallbackExchangeRate {
                rate: rate.gbp_to_eur,
            });
        }
        let input = self.vehicle.assessment_input(&rate)?;

        if self.full {
            let mut assessment = assess(&input)?;
            warnings.append(&mut assessment.warnings);
            assessment.warnings = warnings;
            if self.json {
                let output = AssessmentOutput {
                    exchange_rate: &rate,
                    assessment: &assessment,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_assessment(&assessment, &rate);
            }
        } else {
            let estimate = quick_estimate(&input.vehicle)?;
            if self.json {
                let output = QuickEstimateOutput {
                    exchange_rate: &rate,
                    estimate: &estimate,
                    warnings: &warnings,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_quick_estimate(&estimate, &input.vehicle, &rate, &warnings);
            }
        }
        Ok(())
    }
}

fn print_table(lines: &[CostLine]) {
    let table = Table::new(lines)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}

fn print_warnings(warnings: &[Warning]) {
    for warning in warnings {
        println!("\u{26A0} {}", warning.message());
    }
}

pub fn quick_estimate_lines(estimate: &EstimateResult) -> Vec<CostLine> {
    let duty = if estimate.import_origin.customs_duty_applies() {
        eur(estimate.customs_duty, 0)
    } else {
        format!("{} (No duty)", eur(Decimal::ZERO, 0))
    };
    vec![
        CostLine::new("Vehicle value", eur(estimate.vehicle_value_eur, 0)),
        CostLine::new("Transport (rough)", eur(estimate.transport_costs, 0)),
        CostLine::new(
            format!("VRT ({})", percent(estimate.vrt_rate)),
            eur(estimate.vrt_amount, 0),
        ),
        CostLine::new("Customs Duty", duty),
        CostLine::new("VAT (21%)", eur(estimate.vat_amount, 0)),
        CostLine::new("Registration fee", eur(crate::core::estimate::REGISTRATION_FEE, 0)),
        CostLine::new("Total Cost", eur(estimate.total, 0)),
    ]
}

fn print_quick_estimate(
    estimate: &EstimateResult,
    input: &EstimateInput,
    rate: &ExchangeRate,
    warnings: &[Warning],
) {
    println!();
    println!("QUICK ESTIMATE ({} import)", input.import_origin.display());
    println!();
    println!("UK price:      {}", gbp(input.uk_price));
    println!("Exchange rate: {}", rate.display());
    println!(
        "CO2:           {} g/km ({})",
        input.co2_emissions,
        bands::lookup(input.co2_emissions).indicator()
    );
    println!();
    print_table(&quick_estimate_lines(estimate));
    println!("Rough estimate - use --full for a detailed breakdown");
    print_warnings(warnings);
}

pub fn assessment_lines(a: &ImportAssessment) -> Vec<CostLine> {
    let vrt = &a.vrt_calculation;
    let mut lines = vec![
        CostLine::new(
            "Vehicle value",
            eur(a.purchase_details.vehicle_value_eur, 2),
        ),
        CostLine::new("Transport", eur(a.transport_costs.transport, 2)),
        CostLine::new("Transit insurance", eur(a.transport_costs.insurance, 2)),
        CostLine::new(
            "Customs clearance",
            eur(a.transport_costs.customs_clearance, 2),
        ),
        CostLine::new("Open Market Value", eur(a.omv, 2)),
        CostLine::new(
            format!("VRT ({} at {} g/km)", percent(vrt.co2_rate_percent), vrt.co2_emissions),
            eur(vrt.final_vrt, 2),
        ),
    ];
    if a.customs_duty_applicable {
        lines.push(CostLine::new("Customs Duty (10%)", eur(a.customs_duty, 2)));
    } else {
        lines.push(CostLine::new("Customs Duty", "No duty".to_string()));
    }
    lines.extend([
        CostLine::new(
            format!("VAT ({})", percent(a.vat_calculation.vat_rate_percent)),
            eur(a.vat_calculation.vat_amount, 2),
        ),
        CostLine::new(
            "Registration fee",
            eur(a.additional_costs.registration_fee, 2),
        ),
        CostLine::new("Total import cost", eur(a.total_import_cost, 2)),
    ]);
    lines
}

fn print_assessment(a: &ImportAssessment, rate: &ExchangeRate) {
    let purchase = &a.purchase_details;
    println!();
    println!(
        "IMPORT COST ASSESSMENT ({} import)",
        purchase.import_origin.display()
    );
    println!();
    println!("UK price:      {}", gbp(purchase.uk_price_gbp));
    println!("Exchange rate: {}", rate.display());
    println!();
    print_table(&assessment_lines(a));

    println!();
    println!("ONGOING COSTS");
    println!(
        "Motor tax (annual): {}",
        eur(a.additional_costs.motor_tax_annual, 2)
    );
    if !a.additional_costs.nct_test.is_zero() {
        println!("NCT test:           {}", eur(a.additional_costs.nct_test, 2));
    }
    print_warnings(&a.warnings);
}
