use na::Rotation2;

use crate::error::{OccupancyError, Result};
use crate::state::pose_2d::Pose2D;
use crate::state::state::State2D;
use crate::{Point, Vec2f};

/// Placement of a grid in the world.
///
/// Cell `(col, row)` has its centre at `origin + R(theta) * (col, row) * resolution`,
/// so the origin pose sits on the centre of cell `(0, 0)` and `col` runs along
/// the rotated x axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridFrame {
    /// Size of a cell edge in world units
    resolution: f64,
    origin: Pose2D,
    rotation: Rotation2<f64>,
}

impl GridFrame {
    pub fn new<S: State2D>(resolution: f64, origin: &S) -> Result<Self> {
        if !(resolution > 0f64 && resolution.is_finite()) {
            return Err(OccupancyError::InvalidResolution(resolution));
        }
        Ok(Self {
            resolution,
            origin: Pose2D::new(origin.x(), origin.y(), origin.theta()),
            rotation: Rotation2::new(origin.theta()),
        })
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn origin(&self) -> Pose2D {
        self.origin
    }

    /// Rotation from the grid frame into the world frame
    pub fn rotation(&self) -> Rotation2<f64> {
        self.rotation
    }

    /// World position in continuous grid coordinates, measured in cells.
    ///
    /// Cell `(col, row)` is the unit square centred on `(col, row)`. Returns
    /// `None` for non-finite input.
    pub fn world_to_grid(&self, point: Point) -> Option<Vec2f> {
        let local = self.rotation.inverse() * (point - self.origin.position()) / self.resolution;
        if !(local.x.is_finite() && local.y.is_finite()) {
            return None;
        }
        Some(local)
    }

    /// Nearest cell to a world position, rounding half away from zero.
    ///
    /// The cell may lie outside the grid. Returns `None` only for non-finite
    /// input, which has no nearest cell.
    pub fn world_to_cell(&self, point: Point) -> Option<(i64, i64)> {
        self.world_to_grid(point)
            .map(|local| (local.x.round() as i64, local.y.round() as i64))
    }

    /// World position of a cell centre. Heading is not part of the result.
    pub fn cell_to_world(&self, col: i64, row: i64) -> Point {
        self.origin.position() + self.rotation * Vec2f::new(col as f64, row as f64) * self.resolution
    }
}
