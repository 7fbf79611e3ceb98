//! HTML report of the estimate and full assessment
//!
//! Generates a self-contained HTML file with embedded CSS; no network access is
//! needed to view it.

use crate::cmd::estimate::{assessment_lines, quick_estimate_lines, CostLine, VehicleArgs};
use crate::core::{assess, bands, quick_estimate, EstimateResult, ImportAssessment, Warning};
use crate::display::{eur, gbp};
use crate::fx::ExchangeRate;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct HtmlCommand {
    #[command(flatten)]
    vehicle: VehicleArgs,

    /// Output file path (default: opens in browser)
    #[arg(long)]
    output: Option<PathBuf>,
}

impl HtmlCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let mut warnings = self.vehicle.checked()?;
        let rate = self.vehicle.rate.resolve()?;
        if rate.is_fallback() {
            warnings.push(Warning::FallbackExchangeRate {
                rate: rate.gbp_to_eur,
            });
        }
        let input = self.vehicle.assessment_input(&rate)?;
        let estimate = quick_estimate(&input.vehicle)?;
        let mut assessment = assess(&input)?;
        warnings.append(&mut assessment.warnings);
        assessment.warnings = warnings;

        let html = generate(&estimate, &assessment, &rate);

        if let Some(ref output_path) = self.output {
            std::fs::write(output_path, &html)?;
            println!("HTML report written to: {}", output_path.display());
        } else {
            let temp_path = std::env::temp_dir().join("vrtc-estimate.html");
            std::fs::write(&temp_path, &html)?;
            opener::open(&temp_path)?;
            println!("Opened HTML report in browser: {}", temp_path.display());
        }

        Ok(())
    }
}

pub fn generate(estimate: &EstimateResult, a: &ImportAssessment, rate: &ExchangeRate) -> String {
    let purchase = &a.purchase_details;
    let band = bands::lookup(a.vrt_calculation.co2_emissions);
    let rate_note = if rate.is_fallback() {
        r#"<span class="warning-text">(fallback)</span>"#
    } else {
        ""
    };
    let nct_row = if a.additional_costs.nct_test.is_zero() {
        String::new()
    } else {
        row("NCT test", &eur(a.additional_costs.nct_test, 2))
    };
    let warnings: String = a
        .warnings
        .iter()
        .map(|w| format!("            <li>{}</li>\n", escape(&w.message())))
        .collect();
    let warnings_section = if warnings.is_empty() {
        String::new()
    } else {
        format!(
            "        <section class=\"warnings\">\n            <h2>Warnings</h2>\n            <ul>\n{}            </ul>\n        </section>\n",
            warnings
        )
    };

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Irish VRT Estimate</title>
    <style>
{css}
    </style>
</head>
<body>
    <header>
        <h1>Irish VRT Estimate</h1>
        <p class="subtitle">{origin} import &middot; {fuel} &middot; {age} years old &middot; {co2} g/km</p>
    </header>

    <main>
        <section class="summary-cards">
            <div class="card">
                <h3>UK Price</h3>
                <p class="value">{uk_price}</p>
                <p class="detail">1 GBP = {rate} EUR {rate_note}</p>
            </div>
            <div class="card">
                <h3>VRT</h3>
                <p class="value">{vrt}</p>
                <p class="detail indicator {level_class}">{indicator}</p>
            </div>
            <div class="card">
                <h3>Customs Duty</h3>
                <p class="value">{duty}</p>
            </div>
            <div class="card">
                <h3>VAT</h3>
                <p class="value">{vat}</p>
            </div>
            <div class="card total">
                <h3>Total Import Cost</h3>
                <p class="value">{total}</p>
                <p class="detail">Quick estimate: {quick_total}</p>
            </div>
        </section>

        <section class="data-section">
            <h2>Detailed Breakdown</h2>
            <table>
                <tbody>
{assessment_rows}
                </tbody>
            </table>
        </section>

        <section class="data-section">
            <h2>Quick Estimate</h2>
            <table>
                <tbody>
{quick_rows}
                </tbody>
            </table>
        </section>

        <section class="data-section">
            <h2>Ongoing Costs</h2>
            <table>
                <tbody>
{motor_tax_row}
{nct_row}
                </tbody>
            </table>
        </section>

{warnings_section}
        <p class="disclaimer">Estimates only. Always verify current rates and your vehicle's Open Market Value with Revenue before importing.</p>
        <p class="generated">Calculated {calculation_date}</p>
    </main>
</body>
</html>"##,
        css = CSS,
        origin = purchase.import_origin.display(),
        fuel = purchase.fuel_type.display(),
        age = purchase.vehicle_age,
        co2 = a.vrt_calculation.co2_emissions,
        uk_price = gbp(purchase.uk_price_gbp),
        rate = crate::display::rate(rate.gbp_to_eur),
        rate_note = rate_note,
        vrt = eur(a.vrt_calculation.final_vrt, 0),
        level_class = band.level.display(),
        indicator = escape(&band.indicator()),
        duty = if a.customs_duty_applicable {
            eur(a.customs_duty, 0)
        } else {
            "No duty".to_string()
        },
        vat = eur(a.vat_calculation.vat_amount, 0),
        total = eur(a.total_import_cost, 0),
        quick_total = eur(estimate.total, 0),
        assessment_rows = rows(&assessment_lines(a)),
        quick_rows = rows(&quick_estimate_lines(estimate)),
        motor_tax_row = row(
            "Motor tax (annual)",
            &eur(a.additional_costs.motor_tax_annual, 2)
        ),
        nct_row = nct_row,
        warnings_section = warnings_section,
        calculation_date = a.calculation_date.format("%Y-%m-%d %H:%M UTC"),
    )
}

fn rows(lines: &[CostLine]) -> String {
    lines
        .iter()
        .map(|line| row(&line.item, &line.amount))
        .collect::<Vec<_>>()
        .join("\n")
}

fn row(item: &str, amount: &str) -> String {
    format!(
        "                    <tr><td>{}</td><td class=\"amount\">{}</td></tr>",
        escape(item),
        escape(amount)
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const CSS: &str = r#"
:root {
    --primary: #169b62;
    --primary-dark: #0f7a4c;
    --warning: #d97706;
    --danger: #dc2626;
    --gray-50: #f9fafb;
    --gray-100: #f3f4f6;
    --gray-200: #e5e7eb;
    --gray-500: #6b7280;
    --gray-700: #374151;
    --gray-900: #111827;
    /* Emission level colors */
    --level-low: #16a34a;
    --level-medium: #d97706;
    --level-high: #dc2626;
}

* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
    background: var(--gray-50);
    color: var(--gray-900);
    line-height: 1.5;
}

header {
    background: white;
    border-bottom: 1px solid var(--gray-200);
    padding: 1.5rem 2rem;
}

header h1 {
    font-size: 1.5rem;
    font-weight: 600;
    color: var(--primary-dark);
}

.subtitle {
    color: var(--gray-500);
    font-size: 0.875rem;
}

main {
    max-width: 960px;
    margin: 0 auto;
    padding: 2rem;
}

.summary-cards {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(170px, 1fr));
    gap: 1rem;
    margin-bottom: 2rem;
}

.card {
    background: white;
    border: 1px solid var(--gray-200);
    border-radius: 0.5rem;
    padding: 1rem 1.25rem;
    opacity: 0;
    transform: translateY(20px);
    animation: fade-in 0.5s ease forwards;
}

.card:nth-child(2) { animation-delay: 0.1s; }
.card:nth-child(3) { animation-delay: 0.2s; }
.card:nth-child(4) { animation-delay: 0.3s; }
.card:nth-child(5) { animation-delay: 0.4s; }

@keyframes fade-in {
    to {
        opacity: 1;
        transform: translateY(0);
    }
}

.card h3 {
    font-size: 0.75rem;
    font-weight: 500;
    color: var(--gray-500);
    text-transform: uppercase;
    letter-spacing: 0.05em;
}

.card .value {
    font-size: 1.5rem;
    font-weight: 600;
}

.card .detail {
    font-size: 0.8125rem;
    color: var(--gray-500);
}

.card.total {
    border-color: var(--primary);
}

.card.total .value {
    color: var(--primary-dark);
}

.indicator.low { color: var(--level-low); }
.indicator.medium { color: var(--level-medium); }
.indicator.high { color: var(--level-high); }

.warning-text {
    color: var(--warning);
}

.data-section {
    background: white;
    border: 1px solid var(--gray-200);
    border-radius: 0.5rem;
    padding: 1.25rem;
    margin-bottom: 1.5rem;
}

.data-section h2 {
    font-size: 1.125rem;
    font-weight: 600;
    margin-bottom: 0.75rem;
}

table {
    width: 100%;
    border-collapse: collapse;
    font-size: 0.875rem;
}

td {
    padding: 0.5rem 0.75rem;
    border-bottom: 1px solid var(--gray-100);
}

tr:last-child td {
    border-bottom: none;
    font-weight: 600;
}

td.amount {
    text-align: right;
    font-variant-numeric: tabular-nums;
}

.warnings {
    background: #fef3c7;
    border: 1px solid var(--warning);
    border-radius: 0.5rem;
    padding: 1rem 1.25rem;
    margin-bottom: 1.5rem;
}

.warnings h2 {
    font-size: 1rem;
    color: var(--warning);
}

.warnings ul {
    padding-left: 1.25rem;
}

.disclaimer,
.generated {
    font-size: 0.75rem;
    color: var(--gray-500);
    margin-top: 0.5rem;
}
"#;
