use std::f64::consts::PI;

use crate::state::state::State2D;
use crate::steer::steer::Steer;

/// Straight-line motion between two states.
///
/// Position is interpolated linearly and heading along the shortest arc.
#[derive(Clone, Debug)]
pub struct LinearSteer<S: State2D> {
    pub start: S,
    pub end: S,
}

/// Wraps an angle difference into [-pi, pi)
fn shortest_arc(delta: f64) -> f64 {
    (delta + PI).rem_euclid(2f64 * PI) - PI
}

impl<S: State2D> LinearSteer<S> {
    pub fn new(start: S, end: S) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end.position() - self.start.position()).norm()
    }

    fn interpolate(&self, t: f64) -> S {
        let position = self.start.position() + (self.end.position() - self.start.position()) * t;
        let theta = self.start.theta() + shortest_arc(self.end.theta() - self.start.theta()) * t;
        S::from_components(position.x, position.y, theta)
    }
}

impl<S: State2D> Steer<S> for LinearSteer<S> {
    fn states(&self, step_size: f64) -> Box<dyn Iterator<Item = S> + '_> {
        let intervals = if step_size > 0f64 && step_size.is_finite() {
            ((self.length() / step_size).ceil() as usize).max(1)
        } else {
            1
        };
        Box::new((0..=intervals).map(move |i| self.interpolate(i as f64 / intervals as f64)))
    }
}
