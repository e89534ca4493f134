//! Rejection sampling of free states.
//!
//! Candidates are drawn uniformly over the world bounding box of the grid and
//! kept only when the inflated footprint is free. The box is axis aligned, so
//! a rotated grid wastes some draws on its corners.

use std::f64::consts::TAU;

use log::{trace, warn};
use rand::Rng;

use crate::error::{OccupancyError, Result};
use crate::map_representation::occupancy_grid::OccupancyGrid2D;
use crate::state::state::State2D;

pub const DEFAULT_MAX_ATTEMPTS: usize = 100_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Draws allowed before giving up on a grid with no reachable free space
    max_attempts: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl SamplerConfig {
    pub fn new(max_attempts: usize) -> Result<Self> {
        if max_attempts == 0 {
            return Err(OccupancyError::Config(
                "sampler needs at least one attempt".to_string(),
            ));
        }
        Ok(Self { max_attempts })
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

impl<S: State2D> OccupancyGrid2D<S> {
    /// Draws a uniformly random free state with a heading in `[0, 2pi)`.
    pub fn random_state<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<S> {
        let (min, max) = self.world_bounds();
        let max_attempts = self.sampler_config().max_attempts();

        for attempt in 1..=max_attempts {
            let candidate = S::from_components(
                uniform(rng, min.x, max.x),
                uniform(rng, min.y, max.y),
                rng.gen_range(0f64..TAU),
            );
            if self.is_free(&candidate) {
                trace!("Sampled free state after {} attempts", attempt);
                return Ok(candidate);
            }
        }

        warn!(
            "No free state found in a {}x{} grid after {} attempts",
            self.width(),
            self.height(),
            max_attempts
        );
        Err(OccupancyError::NoFreeState {
            attempts: max_attempts,
        })
    }

    pub fn random_state_thread_rng(&self) -> Result<S> {
        self.random_state(&mut rand::thread_rng())
    }
}
