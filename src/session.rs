//! Live-preview state of the estimate form.
//!
//! [`EstimatorForm`] owns the raw text of every field, the last known exchange
//! rate and the debounce timer. Callers feed it edits and clock readings; it
//! recomputes the quick estimate at most once per idle window.

use crate::core::bands::{self, RateBand};
use crate::core::estimate::{estimate_from_fields, EstimateResult};
use crate::core::validation::{self, FieldCheck};
use crate::core::vehicle::{self, FuelType, ImportOrigin};
use crate::fx::ExchangeRate;
use std::time::{Duration, Instant};

pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Single-shot timer that is re-armed on every trigger
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and schedule a new one
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True once the deadline has passed; the timer is then disarmed
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Fields of the estimate form, named by their element ids
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    UkPrice,
    Co2Emissions,
    FuelType,
    VehicleAge,
    ImportOrigin,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::UkPrice,
        FormField::Co2Emissions,
        FormField::FuelType,
        FormField::VehicleAge,
        FormField::ImportOrigin,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            FormField::UkPrice => "uk_price",
            FormField::Co2Emissions => "co2_emissions",
            FormField::FuelType => "fuel_type",
            FormField::VehicleAge => "vehicle_age",
            FormField::ImportOrigin => "import_origin",
        }
    }

    pub fn from_id(id: &str) -> Option<FormField> {
        FormField::ALL.into_iter().find(|f| f.id() == id.trim())
    }
}

#[derive(Debug, Clone)]
pub struct EstimatorForm {
    uk_price: String,
    co2_emissions: String,
    fuel_type: String,
    vehicle_age: String,
    import_origin: String,
    exchange_rate: Option<ExchangeRate>,
    debouncer: Debouncer,
    estimate: Option<EstimateResult>,
    recomputations: usize,
}

impl Default for EstimatorForm {
    fn default() -> Self {
        EstimatorForm::new(DEBOUNCE_DELAY)
    }
}

impl EstimatorForm {
    pub fn new(delay: Duration) -> Self {
        EstimatorForm {
            uk_price: String::new(),
            co2_emissions: String::new(),
            fuel_type: "petrol".to_string(),
            vehicle_age: String::new(),
            import_origin: "uk".to_string(),
            exchange_rate: None,
            debouncer: Debouncer::new(delay),
            estimate: None,
            recomputations: 0,
        }
    }

    /// Store a field edit, check it, and re-arm the debounce timer
    pub fn set_field(&mut self, field: FormField, text: &str, now: Instant) -> FieldCheck {
        let text = text.to_string();
        let check = match field {
            FormField::UkPrice => validation::check_uk_price(&text),
            FormField::Co2Emissions => validation::check_co2_emissions(&text),
            FormField::FuelType => match FuelType::from_str(&text) {
                Some(_) => FieldCheck::Valid,
                None => FieldCheck::Invalid("Please select a fuel type"),
            },
            FormField::VehicleAge => match vehicle::parse_age(&text) {
                Ok(_) => FieldCheck::Valid,
                Err(_) => FieldCheck::Invalid("Please enter the vehicle age in whole years"),
            },
            FormField::ImportOrigin => match ImportOrigin::from_str(&text) {
                Some(_) => FieldCheck::Valid,
                None => FieldCheck::Invalid("Please select uk or ni"),
            },
        };

        match field {
            FormField::UkPrice => self.uk_price = text,
            FormField::Co2Emissions => self.co2_emissions = text,
            FormField::FuelType => self.fuel_type = text,
            FormField::VehicleAge => self.vehicle_age = text,
            FormField::ImportOrigin => self.import_origin = text,
        }

        self.debouncer.trigger(now);
        check
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::UkPrice => &self.uk_price,
            FormField::Co2Emissions => &self.co2_emissions,
            FormField::FuelType => &self.fuel_type,
            FormField::VehicleAge => &self.vehicle_age,
            FormField::ImportOrigin => &self.import_origin,
        }
    }

    /// Replace the exchange rate. The latest call wins regardless of when the
    /// rate was fetched.
    pub fn apply_exchange_rate(&mut self, rate: ExchangeRate) {
        self.exchange_rate = Some(rate);
    }

    pub fn exchange_rate(&self) -> Option<&ExchangeRate> {
        self.exchange_rate.as_ref()
    }

    /// When the pending recomputation is due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Recompute the estimate if the debounce deadline has passed.
    ///
    /// Returns true when a new estimate was produced. Unparseable input, or
    /// amounts too large to compute, keep the previous estimate.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.debouncer.fire(now) {
            return false;
        }
        let Some(rate) = self.exchange_rate.as_ref() else {
            log::debug!("No exchange rate yet, estimate deferred");
            return false;
        };
        match estimate_from_fields(
            &self.uk_price,
            &self.co2_emissions,
            &self.fuel_type,
            &self.import_origin,
            rate.gbp_to_eur,
        ) {
            Ok(estimate) => {
                self.estimate = Some(estimate);
                self.recomputations += 1;
                true
            }
            Err(e) => {
                log::debug!("{}; keeping previous estimate", e);
                false
            }
        }
    }

    pub fn estimate(&self) -> Option<&EstimateResult> {
        self.estimate.as_ref()
    }

    /// Number of estimates computed so far
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    /// Band for the CO2 currently entered
    pub fn rate_indicator(&self) -> Option<&'static RateBand> {
        vehicle::parse_co2(&self.co2_emissions)
            .ok()
            .map(bands::lookup)
    }

    pub fn can_submit(&self) -> bool {
        validation::validate_form(&self.uk_price, &self.co2_emissions)
    }
}
