pub mod canvas;
pub mod halfblock;

pub use canvas::{Canvas, ColorMode};
