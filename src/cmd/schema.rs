//! Schema command - print the batch input format

use crate::core::VehicleRecord;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for one vehicle record
    JsonSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(VehicleRecord);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        let columns: Vec<&str> = CSV_FIELDS.iter().map(|(name, _, _)| *name).collect();
        println!("{}", columns.join(","));
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("CSV Input Format");
        println!("================");
        println!();
        for (name, required, description) in CSV_FIELDS {
            let req = if *required { "required" } else { "optional" };
            println!("{:18} ({:8})  {}", name, req, description);
        }
        println!();
        println!("exchange_rate is GBP to EUR; leave empty to use the fetched rate");
        Ok(())
    }
}

const CSV_FIELDS: &[(&str, bool, &str)] = &[
    ("id", false, "Identifier echoed in the output (e.g. registration)"),
    ("uk_price", true, "Purchase price in GBP"),
    ("co2_emissions", true, "CO2 emissions in whole g/km"),
    ("fuel_type", true, "petrol, diesel, electric or hybrid"),
    ("import_origin", false, "uk (default) or ni"),
    ("vehicle_age", false, "Age in whole years (default 0)"),
    ("transport_method", false, "ferry (default) or drive"),
    ("exchange_rate", false, "GBP to EUR rate for this row"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_fields_match_record() {
        let schema = serde_json::to_value(schema_for!(VehicleRecord)).unwrap();
        let properties = schema["properties"].as_object().unwrap();
        assert_eq!(properties.len(), CSV_FIELDS.len());
        for (name, _, _) in CSV_FIELDS {
            assert!(properties.contains_key(*name), "missing {}", name);
        }
    }

    #[test]
    fn required_fields_match_record() {
        let schema = serde_json::to_value(schema_for!(VehicleRecord)).unwrap();
        let mut required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        required.sort();
        let mut expected: Vec<&str> = CSV_FIELDS
            .iter()
            .filter(|(_, required, _)| *required)
            .map(|(name, _, _)| *name)
            .collect();
        expected.sort();
        assert_eq!(required, expected);
    }
}
