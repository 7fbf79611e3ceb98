//! Validate command - run the form checks without calculating anything

use crate::core::validation::{self, FORM_ERRORS};
use crate::core::FieldCheck;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// UK purchase price in GBP
    #[arg(short, long, default_value = "")]
    price: String,

    /// CO2 emissions in g/km
    #[arg(short, long, default_value = "")]
    co2: String,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A field result for output
#[derive(Debug, Clone, Serialize)]
struct FieldResult {
    field: &'static str,
    value: String,
    #[serde(flatten)]
    check: FieldCheck,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput {
    valid: bool,
    fields: Vec<FieldResult>,
    errors: Vec<&'static str>,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let fields = vec![
            FieldResult {
                field: "uk_price",
                value: self.price.clone(),
                check: validation::check_uk_price(&self.price),
            },
            FieldResult {
                field: "co2_emissions",
                value: self.co2.clone(),
                check: validation::check_co2_emissions(&self.co2),
            },
        ];
        let valid = validation::validate_form(&self.price, &self.co2);
        let errors = if valid { Vec::new() } else { FORM_ERRORS.to_vec() };

        if self.json {
            let output = ValidationOutput {
                valid,
                fields,
                errors,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            self.print_text(&fields, &errors);
        }

        // Exit with code 1 if submission would be blocked
        if !valid {
            std::process::exit(1);
        }
        Ok(())
    }

    fn print_text(&self, fields: &[FieldResult], errors: &[&str]) {
        println!();
        println!("VALIDATION RESULTS");
        println!();

        for field in fields {
            let status = match field.check {
                FieldCheck::Valid => "\u{2713}",
                FieldCheck::Flagged(_) => "\u{26A0}",
                FieldCheck::Invalid(_) => "\u{2717}",
            };
            print!("  {} {:14} {:>12}", status, field.field, format!("'{}'", field.value));
            match field.check.message() {
                Some(msg) => println!("  {}", msg),
                None => println!(),
            }
        }
        println!();

        if errors.is_empty() {
            println!("\u{2713} Form can be submitted.");
        } else {
            println!("Please correct the following errors:");
            for error in errors {
                println!("  - {}", error);
            }
        }
    }
}
