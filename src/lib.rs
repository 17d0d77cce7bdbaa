pub mod canvas;
pub mod color;
pub mod config;
pub mod dom;
pub mod effect;
pub mod external;
pub mod host;
pub mod media;
pub mod render;
pub mod scheduler;
pub mod surface;

pub use color::apply_opacity;
pub use effect::{EffectConfig, EffectType, EffectUpdate, Engine};
pub use host::{EffectHost, Layer, Lifecycle};
