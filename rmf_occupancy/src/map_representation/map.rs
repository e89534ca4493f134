use crate::state::state::State2D;

/// Abstract interface for map representation.
pub trait Map<S: State2D> {
    /// `Some(true)` if occupied, `Some(false)` if free, `None` if unknown.
    fn get_occupancy(&self, state: &S) -> Option<bool>;
}
