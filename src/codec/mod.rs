// Binary payload codecs for CI-V numeric fields
pub mod bcd;
pub mod frequency;
pub mod meter;

pub use bcd::BcdError;
pub use meter::{decode2, level_percent, Measurement, MeterScale, MeterUnit};
