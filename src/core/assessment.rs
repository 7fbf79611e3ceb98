//! Full import assessment: transport, depreciation, band minimum and running costs.

use super::bands;
use super::estimate::{customs_duty, mul, sum, REGISTRATION_FEE, VAT_RATE};
use super::motor_tax::estimate_motor_tax;
use super::vehicle::{AssessmentInput, FuelType, ImportOrigin, InputError, TransportMethod};
use super::warnings::Warning;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

const FERRY_COST: Decimal = dec!(300);
const DRIVE_COST: Decimal = dec!(150);
/// Transit insurance as a fraction of vehicle value
const TRANSIT_INSURANCE_RATE: Decimal = dec!(0.015);
const CUSTOMS_CLEARANCE: Decimal = dec!(50);
/// VRT relief per year of age, capped at MAX_DEPRECIATION
const DEPRECIATION_PER_YEAR: Decimal = dec!(0.02);
const MAX_DEPRECIATION: Decimal = dec!(0.10);
const NCT_FEE: Decimal = dec!(55);
const NCT_MIN_AGE: u32 = 4;

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseDetails {
    pub uk_price_gbp: Decimal,
    pub exchange_rate: Decimal,
    pub vehicle_value_eur: Decimal,
    pub import_origin: ImportOrigin,
    pub fuel_type: FuelType,
    pub vehicle_age: u32,
    pub transport_method: TransportMethod,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransportCosts {
    pub transport: Decimal,
    pub insurance: Decimal,
    pub customs_clearance: Decimal,
    pub total: Decimal,
}

impl TransportCosts {
    pub fn estimate(
        vehicle_value_eur: Decimal,
        method: TransportMethod,
    ) -> Result<Self, InputError> {
        let transport = match method {
            TransportMethod::Ferry => FERRY_COST,
            TransportMethod::Drive => DRIVE_COST,
        };
        let insurance = mul(vehicle_value_eur, TRANSIT_INSURANCE_RATE)?;
        Ok(TransportCosts {
            transport,
            insurance,
            customs_clearance: CUSTOMS_CLEARANCE,
            total: sum(&[transport, insurance, CUSTOMS_CLEARANCE])?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VrtCalculation {
    pub co2_emissions: u32,
    pub co2_band: String,
    pub co2_rate_percent: Decimal,
    /// After age depreciation, before the minimum
    pub base_vrt: Decimal,
    pub minimum_vrt: Decimal,
    pub final_vrt: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct VatCalculation {
    pub vat_base: Decimal,
    pub vat_rate_percent: Decimal,
    pub vat_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdditionalCosts {
    pub motor_tax_annual: Decimal,
    pub nct_test: Decimal,
    pub registration_fee: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportAssessment {
    pub purchase_details: PurchaseDetails,
    pub transport_costs: TransportCosts,
    pub omv: Decimal,
    pub customs_duty: Decimal,
    pub customs_duty_applicable: bool,
    pub vrt_calculation: VrtCalculation,
    pub vat_calculation: VatCalculation,
    pub additional_costs: AdditionalCosts,
    pub total_import_cost: Decimal,
    pub calculation_date: DateTime<Utc>,
    pub warnings: Vec<Warning>,
}

/// Age relief applied to the VRT, as a fraction
pub fn depreciation_rate(vehicle_age: u32) -> Decimal {
    (Decimal::from(vehicle_age) * DEPRECIATION_PER_YEAR).min(MAX_DEPRECIATION)
}

/// Assess the full cost of importing a vehicle.
///
/// Fails with [`InputError::AmountTooLarge`] if any amount overflows.
pub fn assess(input: &AssessmentInput) -> Result<ImportAssessment, InputError> {
    let vehicle = &input.vehicle;
    let vehicle_value_eur = mul(vehicle.uk_price, vehicle.exchange_rate)?;

    let transport_costs = TransportCosts::estimate(vehicle_value_eur, input.transport_method)?;
    let omv = sum(&[vehicle_value_eur, transport_costs.total])?;
    let customs_duty = customs_duty(vehicle.import_origin, vehicle_value_eur)?;

    let band = bands::lookup(vehicle.co2_emissions);
    let mut base_vrt = mul(omv, band.rate())?;
    if input.vehicle_age > 0 {
        base_vrt = mul(base_vrt, Decimal::ONE - depreciation_rate(input.vehicle_age))?;
    }

    let mut warnings = Vec::new();
    let final_vrt = if base_vrt < band.minimum_eur {
        log::debug!(
            "VRT {} below band minimum {}, minimum applies",
            base_vrt,
            band.minimum_eur
        );
        warnings.push(Warning::MinimumVrtApplied {
            computed: base_vrt.round_dp(2),
            minimum: band.minimum_eur,
        });
        band.minimum_eur
    } else {
        base_vrt
    };

    let vat_base = sum(&[vehicle_value_eur, customs_duty, final_vrt])?;
    let vat_amount = mul(vat_base, VAT_RATE)?;

    let nct_test = if input.vehicle_age >= NCT_MIN_AGE {
        NCT_FEE
    } else {
        Decimal::ZERO
    };

    let total_import_cost = sum(&[
        vehicle_value_eur,
        transport_costs.total,
        customs_duty,
        final_vrt,
        vat_amount,
        REGISTRATION_FEE,
    ])?;

    log::debug!(
        "Assessment: omv={}, duty={}, vrt={}, vat={}, total={}",
        omv,
        customs_duty,
        final_vrt,
        vat_amount,
        total_import_cost
    );

    Ok(ImportAssessment {
        purchase_details: PurchaseDetails {
            uk_price_gbp: vehicle.uk_price,
            exchange_rate: vehicle.exchange_rate,
            vehicle_value_eur,
            import_origin: vehicle.import_origin,
            fuel_type: vehicle.fuel_type,
            vehicle_age: input.vehicle_age,
            transport_method: input.transport_method,
        },
        transport_costs,
        omv,
        customs_duty,
        customs_duty_applicable: vehicle.import_origin.customs_duty_applies(),
        vrt_calculation: VrtCalculation {
            co2_emissions: vehicle.co2_emissions,
            co2_band: band.range_display(),
            co2_rate_percent: band.rate_percent,
            base_vrt,
            minimum_vrt: band.minimum_eur,
            final_vrt,
        },
        vat_calculation: VatCalculation {
            vat_base,
            vat_rate_percent: VAT_RATE * dec!(100),
            vat_amount,
        },
        additional_costs: AdditionalCosts {
            motor_tax_annual: estimate_motor_tax(vehicle.co2_emissions, vehicle.fuel_type),
            nct_test,
            registration_fee: REGISTRATION_FEE,
        },
        total_import_cost,
        calculation_date: Utc::now(),
        warnings,
    })
}
