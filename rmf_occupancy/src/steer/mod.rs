pub mod linear_steer;
pub mod steer;
