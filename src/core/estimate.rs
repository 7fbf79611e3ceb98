//! Quick estimate: a rough preview of the landed cost, using a flat transport
//! allowance and no depreciation or band minimum.

use super::bands;
use super::vehicle::{EstimateInput, ImportOrigin, InputError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Flat transport allowance in EUR
pub const TRANSPORT_ALLOWANCE: Decimal = dec!(350);
/// Customs duty on vehicles from outside the customs union
pub const CUSTOMS_DUTY_RATE: Decimal = dec!(0.10);
pub const VAT_RATE: Decimal = dec!(0.21);
pub const REGISTRATION_FEE: Decimal = dec!(102);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateResult {
    pub import_origin: ImportOrigin,
    pub vehicle_value_eur: Decimal,
    pub transport_costs: Decimal,
    pub omv: Decimal,
    pub customs_duty: Decimal,
    /// Percent, e.g. 16 for 16%
    pub vrt_rate: Decimal,
    pub co2_band: String,
    pub vrt_amount: Decimal,
    pub vat_base: Decimal,
    pub vat_amount: Decimal,
    pub total: Decimal,
}

/// Calculate the quick estimate. Nothing is rounded.
pub fn quick_estimate(input: &EstimateInput) -> Result<EstimateResult, InputError> {
    let vehicle_value_eur = mul(input.uk_price, input.exchange_rate)?;
    let omv = sum(&[vehicle_value_eur, TRANSPORT_ALLOWANCE])?;
    let customs_duty = customs_duty(input.import_origin, vehicle_value_eur)?;

    let (vrt_rate, band) = bands::vrt_rate(input.co2_emissions);
    let vrt_amount = mul(omv, vrt_rate / dec!(100))?;

    let vat_base = sum(&[vehicle_value_eur, customs_duty, vrt_amount])?;
    let vat_amount = mul(vat_base, VAT_RATE)?;

    let total = sum(&[
        vehicle_value_eur,
        TRANSPORT_ALLOWANCE,
        customs_duty,
        vrt_amount,
        vat_amount,
        REGISTRATION_FEE,
    ])?;

    log::debug!(
        "Quick estimate: value={}, omv={}, duty={}, vrt={}, vat={}, total={}",
        vehicle_value_eur,
        omv,
        customs_duty,
        vrt_amount,
        vat_amount,
        total
    );

    Ok(EstimateResult {
        import_origin: input.import_origin,
        vehicle_value_eur,
        transport_costs: TRANSPORT_ALLOWANCE,
        omv,
        customs_duty,
        vrt_rate,
        co2_band: band.range_display(),
        vrt_amount,
        vat_base,
        vat_amount,
        total,
    })
}

/// Parse the raw field text and estimate. Unparseable input yields an error and
/// no computation.
pub fn estimate_from_fields(
    uk_price: &str,
    co2_emissions: &str,
    fuel_type: &str,
    import_origin: &str,
    exchange_rate: Decimal,
) -> Result<EstimateResult, InputError> {
    let input = EstimateInput::parse(uk_price, co2_emissions, fuel_type, import_origin, exchange_rate)?;
    quick_estimate(&input)
}

pub(crate) fn customs_duty(
    origin: ImportOrigin,
    vehicle_value_eur: Decimal,
) -> Result<Decimal, InputError> {
    if origin.customs_duty_applies() {
        mul(vehicle_value_eur, CUSTOMS_DUTY_RATE)
    } else {
        Ok(Decimal::ZERO)
    }
}

pub(crate) fn mul(a: Decimal, b: Decimal) -> Result<Decimal, InputError> {
    a.checked_mul(b).ok_or(InputError::AmountTooLarge)
}

pub(crate) fn sum(amounts: &[Decimal]) -> Result<Decimal, InputError> {
    amounts.iter().try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(*amount).ok_or(InputError::AmountTooLarge)
    })
}
