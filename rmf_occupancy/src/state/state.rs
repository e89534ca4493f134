use crate::Point;

/// Capability interface for anything that can be placed on a planar map.
///
/// Collision queries only read the position and heading; the sampler also
/// needs to build fresh states, hence `from_components`.
pub trait State2D: Clone {
    fn x(&self) -> f64;

    fn y(&self) -> f64;

    /// Heading in radians.
    fn theta(&self) -> f64;

    fn from_components(x: f64, y: f64, theta: f64) -> Self;

    fn position(&self) -> Point {
        Point::new(self.x(), self.y())
    }
}
