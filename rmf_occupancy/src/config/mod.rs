pub mod map_metadata;
pub mod thresholds;
