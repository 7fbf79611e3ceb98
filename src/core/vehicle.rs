use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("invalid UK price: '{0}'")]
    InvalidPrice(String),
    #[error("invalid CO2 emissions: '{0}' (expected whole g/km)")]
    InvalidCo2(String),
    #[error("invalid vehicle age: '{0}'")]
    InvalidAge(String),
    #[error("unknown fuel type: '{0}'")]
    UnknownFuelType(String),
    #[error("unknown import origin: '{0}' (expected uk or ni)")]
    UnknownImportOrigin(String),
    #[error("amounts too large to calculate; check the UK price and exchange rate")]
    AmountTooLarge,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[default]
    Petrol,
    Diesel,
    Electric,
    Hybrid,
}

impl FuelType {
    pub fn from_str(s: &str) -> Option<FuelType> {
        match s.trim().to_lowercase().as_str() {
            "petrol" => Some(FuelType::Petrol),
            "diesel" => Some(FuelType::Diesel),
            "electric" => Some(FuelType::Electric),
            "hybrid" => Some(FuelType::Hybrid),
            _ => None,
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            FuelType::Petrol => "Petrol",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
        }
    }
}

/// Where the vehicle is shipped from. Great Britain is outside the EU customs
/// union, Northern Ireland is not.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ImportOrigin {
    #[default]
    Uk,
    Ni,
}

impl ImportOrigin {
    pub fn from_str(s: &str) -> Option<ImportOrigin> {
        match s.trim().to_lowercase().as_str() {
            "uk" => Some(ImportOrigin::Uk),
            "ni" => Some(ImportOrigin::Ni),
            _ => None,
        }
    }

    pub fn customs_duty_applies(&self) -> bool {
        matches!(self, ImportOrigin::Uk)
    }

    pub fn display(&self) -> &'static str {
        match self {
            ImportOrigin::Uk => "UK",
            ImportOrigin::Ni => "NI",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TransportMethod {
    #[default]
    Ferry,
    Drive,
}

/// Inputs of the quick estimate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateInput {
    /// Purchase price in GBP
    pub uk_price: Decimal,
    /// CO2 emissions in g/km
    pub co2_emissions: u32,
    pub fuel_type: FuelType,
    pub import_origin: ImportOrigin,
    /// GBP to EUR
    pub exchange_rate: Decimal,
}

impl EstimateInput {
    /// Parse the raw text of the estimate fields.
    ///
    /// Only checks that every value is a number; positivity and range checks
    /// belong to [`crate::core::validation`].
    pub fn parse(
        uk_price: &str,
        co2_emissions: &str,
        fuel_type: &str,
        import_origin: &str,
        exchange_rate: Decimal,
    ) -> Result<Self, InputError> {
        Ok(EstimateInput {
            uk_price: parse_decimal(uk_price)
                .ok_or_else(|| InputError::InvalidPrice(uk_price.to_string()))?,
            co2_emissions: parse_co2(co2_emissions)?,
            fuel_type: FuelType::from_str(fuel_type)
                .ok_or_else(|| InputError::UnknownFuelType(fuel_type.to_string()))?,
            import_origin: ImportOrigin::from_str(import_origin)
                .ok_or_else(|| InputError::UnknownImportOrigin(import_origin.to_string()))?,
            exchange_rate,
        })
    }
}

/// Inputs of the full import assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentInput {
    pub vehicle: EstimateInput,
    /// Whole years since first registration
    pub vehicle_age: u32,
    pub transport_method: TransportMethod,
}

/// One vehicle as read from a batch CSV or JSON file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VehicleRecord {
    /// Free-form identifier echoed in the output (e.g. registration)
    #[serde(default)]
    pub id: Option<String>,
    /// Purchase price in GBP
    #[schemars(with = "f64")]
    pub uk_price: Decimal,
    /// CO2 emissions in g/km
    pub co2_emissions: u32,
    /// petrol, diesel, electric or hybrid
    pub fuel_type: FuelType,
    /// uk (default) or ni
    #[serde(default)]
    pub import_origin: Option<ImportOrigin>,
    /// Age in whole years (default 0)
    #[serde(default)]
    pub vehicle_age: Option<u32>,
    /// ferry (default) or drive
    #[serde(default)]
    pub transport_method: Option<TransportMethod>,
    /// GBP to EUR rate; the fetched rate is used when absent
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub exchange_rate: Option<Decimal>,
}

impl VehicleRecord {
    pub fn to_assessment_input(&self, default_rate: Decimal) -> AssessmentInput {
        AssessmentInput {
            vehicle: EstimateInput {
                uk_price: self.uk_price,
                co2_emissions: self.co2_emissions,
                fuel_type: self.fuel_type,
                import_origin: self.import_origin.unwrap_or_default(),
                exchange_rate: self.exchange_rate.unwrap_or(default_rate),
            },
            vehicle_age: self.vehicle_age.unwrap_or(0),
            transport_method: self.transport_method.unwrap_or_default(),
        }
    }
}

pub(crate) fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}

pub(crate) fn parse_co2(s: &str) -> Result<u32, InputError> {
    s.trim()
        .parse::<u32>()
        .map_err(|_| InputError::InvalidCo2(s.to_string()))
}

pub(crate) fn parse_age(s: &str) -> Result<u32, InputError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0);
    }
    s.parse::<u32>()
        .map_err(|_| InputError::InvalidAge(s.to_string()))
}
