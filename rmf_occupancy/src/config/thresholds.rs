use crate::error::{OccupancyError, Result};
use crate::map_representation::value_model::UNKNOWN_PROBABILITY;

/// Probability cut-offs for classifying a cell.
///
/// A cell is occupied strictly above `occupied` and free strictly below
/// `free`. Both default to one half. `free <= occupied` always holds, so no
/// cell can be both.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OccupancyThresholds {
    occupied: f64,
    free: f64,
}

impl Default for OccupancyThresholds {
    fn default() -> Self {
        Self {
            occupied: UNKNOWN_PROBABILITY,
            free: UNKNOWN_PROBABILITY,
        }
    }
}

impl OccupancyThresholds {
    pub fn new(occupied: f64, free: f64) -> Result<Self> {
        for (name, value) in [("occupied", occupied), ("free", free)] {
            if !(0f64..=1f64).contains(&value) {
                return Err(OccupancyError::Config(format!(
                    "{} threshold must be a probability, got {}",
                    name, value
                )));
            }
        }
        if free > occupied {
            return Err(OccupancyError::Config(format!(
                "free threshold {} is above occupied threshold {}",
                free, occupied
            )));
        }
        Ok(Self { occupied, free })
    }

    pub fn occupied(&self) -> f64 {
        self.occupied
    }

    pub fn free(&self) -> f64 {
        self.free
    }
}
