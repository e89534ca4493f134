use crate::error::{OccupancyError, Result};
use crate::Vec2f;

/// Robot footprint used to inflate point queries into disk queries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObjectRadius {
    radius: f64,
    /// Safety margin added on top of `radius`
    epsilon: f64,
}

/// Grid-frame cell coordinate, rounded half away from zero like a point query
fn nearest_cell(v: f64) -> i64 {
    v.round() as i64
}

impl ObjectRadius {
    pub fn new(radius: f64, epsilon: f64) -> Result<Self> {
        let valid = |v: f64| v >= 0f64 && v.is_finite();
        if !valid(radius) || !valid(epsilon) {
            return Err(OccupancyError::InvalidObjectRadius { radius, epsilon });
        }
        Ok(Self { radius, epsilon })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn inflated(&self) -> f64 {
        self.radius + self.epsilon
    }

    /// Inflated radius measured in cells
    fn radius_in_cells(&self, resolution: f64) -> f64 {
        self.inflated() / resolution
    }

    /// Cells holding the extreme points of the inflated disk, as
    /// `(left, right, bottom, top)`.
    ///
    /// `centre` is in continuous grid coordinates, where cell `(col, row)` is
    /// the unit square centred on `(col, row)`. Every cell the disk touches
    /// lies inside these bounds.
    pub fn cell_bounds(&self, centre: Vec2f, resolution: f64) -> (i64, i64, i64, i64) {
        let reach = self.radius_in_cells(resolution);
        (
            nearest_cell(centre.x - reach),
            nearest_cell(centre.x + reach),
            nearest_cell(centre.y - reach),
            nearest_cell(centre.y + reach),
        )
    }

    /// True when the inflated disk reaches the square of cell `(col, row)`.
    ///
    /// Distance is taken to the closest point of the square, so a disk that
    /// only clips a corner still counts.
    pub fn touches_cell(&self, centre: Vec2f, resolution: f64, col: i64, row: i64) -> bool {
        let dx = ((centre.x - col as f64).abs() - 0.5f64).max(0f64);
        let dy = ((centre.y - row as f64).abs() - 0.5f64).max(0f64);
        let reach = self.radius_in_cells(resolution);
        dx * dx + dy * dy <= reach * reach
    }
}
