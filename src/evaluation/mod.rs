pub mod cost;
pub mod dimension;
pub mod penalty;

pub use cost::CostModel;
pub use dimension::{CapacityDimension, DimensionViolation};
pub use penalty::ArcPenalties;
