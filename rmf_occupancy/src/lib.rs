pub extern crate nalgebra as na;
use na::Vector2;

pub mod config;
pub mod error;
pub mod map_representation;
pub mod sampling;
pub mod state;
pub mod steer;

pub use crate::config::map_metadata::MapMetadata;
pub use crate::config::thresholds::OccupancyThresholds;
pub use crate::error::{OccupancyError, Result};
pub use crate::map_representation::grid_frame::GridFrame;
pub use crate::map_representation::grid_storage::{CellBuffer, GridStorage};
pub use crate::map_representation::map::Map;
pub use crate::map_representation::object_radius::ObjectRadius;
pub use crate::map_representation::occupancy_grid::OccupancyGrid2D;
pub use crate::map_representation::value_model::{RawCell, ValueConvention};
pub use crate::sampling::sampler::SamplerConfig;
pub use crate::state::pose_2d::Pose2D;
pub use crate::state::state::State2D;
pub use crate::steer::linear_steer::LinearSteer;
pub use crate::steer::steer::Steer;

/// Point in the world frame
pub type Point = Vector2<f64>;

/// 2-vector
pub type Vec2f = Vector2<f64>;
