use crate::state::state::State2D;

/// A motion connecting two states.
pub trait Steer<S: State2D> {
    /// Intermediate states along the motion, no further than `step_size` apart.
    ///
    /// Every call starts a fresh pass over the motion, so the same steer can
    /// be walked any number of times.
    fn states(&self, step_size: f64) -> Box<dyn Iterator<Item = S> + '_>;
}
