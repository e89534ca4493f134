use crate::map_representation::occupancy_grid::OccupancyGrid2D;
use crate::state::state::State2D;
use crate::steer::steer::Steer;

impl<S: State2D> OccupancyGrid2D<S> {
    /// Walks the steer at a sub-cell step and checks that every state is free.
    ///
    /// Stops at the first state that is not free. A steer producing no states
    /// is free.
    pub fn is_segment_free<T: Steer<S> + ?Sized>(&self, steer: &T) -> bool {
        let step_size = self.segment_step_fraction() * self.resolution();
        steer.states(step_size).all(|state| self.is_free(&state))
    }
}
