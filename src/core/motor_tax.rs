use super::vehicle::FuelType;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Flat annual rate for electric vehicles
const ELECTRIC_RATE: Decimal = dec!(120);

/// (inclusive CO2 upper bound, annual EUR)
const CO2_RATES: [(u32, Decimal); 10] = [
    (80, dec!(120)),
    (100, dec!(170)),
    (110, dec!(190)),
    (120, dec!(200)),
    (130, dec!(270)),
    (140, dec!(330)),
    (155, dec!(481)),
    (170, dec!(677)),
    (190, dec!(920)),
    (u32::MAX, dec!(1200)),
];

/// Approximate annual motor tax for a recently registered car.
///
/// Real rates also depend on the registration year; this is an estimate.
pub fn estimate_motor_tax(co2_emissions: u32, fuel_type: FuelType) -> Decimal {
    if fuel_type == FuelType::Electric {
        return ELECTRIC_RATE;
    }
    CO2_RATES
        .iter()
        .find(|(upper, _)| co2_emissions <= *upper)
        .map(|(_, rate)| *rate)
        .unwrap_or(dec!(1200))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn electric_is_flat() {
        assert_eq!(estimate_motor_tax(0, FuelType::Electric), dec!(120));
        assert_eq!(estimate_motor_tax(300, FuelType::Electric), dec!(120));
    }

    #[test]
    fn co2_bands() {
        assert_eq!(estimate_motor_tax(80, FuelType::Petrol), dec!(120));
        assert_eq!(estimate_motor_tax(81, FuelType::Petrol), dec!(170));
        assert_eq!(estimate_motor_tax(120, FuelType::Diesel), dec!(200));
        assert_eq!(estimate_motor_tax(141, FuelType::Hybrid), dec!(481));
        assert_eq!(estimate_motor_tax(190, FuelType::Petrol), dec!(920));
        assert_eq!(estimate_motor_tax(191, FuelType::Petrol), dec!(1200));
    }
}
