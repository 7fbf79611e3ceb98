pub mod assessment;
pub mod bands;
pub mod estimate;
pub mod motor_tax;
pub mod validation;
pub mod vehicle;
pub mod warnings;

// Flat public surface for domain types and functions.
pub use assessment::{assess, ImportAssessment};
pub use bands::{lookup, RateBand, BANDS};
pub use estimate::{quick_estimate, EstimateResult};
pub use validation::FieldCheck;
pub use vehicle::{
    AssessmentInput, EstimateInput, FuelType, ImportOrigin, TransportMethod, VehicleRecord,
};
pub use warnings::Warning;
