mod canvas;
mod clock;
mod component;
mod engine;
mod render;
mod surface;

pub use component::ConstellationCanvas;
