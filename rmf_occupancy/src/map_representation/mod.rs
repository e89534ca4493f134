pub mod grid_frame;
pub mod grid_storage;
pub mod map;
pub mod object_radius;
pub mod occupancy_grid;
pub mod segment_checker;
pub mod value_model;
