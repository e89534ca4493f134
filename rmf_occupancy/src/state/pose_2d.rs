use crate::state::state::State2D;

/// Plain world-frame pose
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose2D {
    /// X position in world units
    pub x: f64,
    /// Y position in world units
    pub y: f64,
    /// Heading angle in radians, counter-clockwise from the X axis
    pub theta: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    pub const fn identity() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            theta: 0.0,
        }
    }
}

impl State2D for Pose2D {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn theta(&self) -> f64 {
        self.theta
    }

    fn from_components(x: f64, y: f64, theta: f64) -> Self {
        Self::new(x, y, theta)
    }
}
