use nalgebra as na;

pub type Vector2f = na::Vector2::<f32>;
