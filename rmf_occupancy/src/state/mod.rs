pub mod pose_2d;
pub mod state;
