use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::simulation::config::Rgba;
use crate::simulation::geometry::Point;

#[derive(Debug, Error)]
pub enum RenderError {
	#[error("canvas call failed: {0}")]
	Canvas(String),

	#[error("2d context unavailable")]
	ContextUnavailable,
}

impl From<JsValue> for RenderError {
	fn from(value: JsValue) -> Self {
		Self::Canvas(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
	pub offset: f64,
	pub color: Rgba,
}

impl ColorStop {
	pub fn new(offset: f64, color: Rgba) -> Self {
		Self { offset, color }
	}
}

/// The draw calls the renderer needs, in logical (CSS pixel) coordinates.
pub trait Surface {
	fn clear(&mut self, width: f64, height: f64) -> Result<(), RenderError>;

	fn fill_polygon(&mut self, points: &[Point], color: Rgba) -> Result<(), RenderError>;

	/// Strokes `from → to` with a linear gradient running along the segment.
	fn stroke_gradient_line(
		&mut self,
		from: Point,
		to: Point,
		width: f64,
		stops: &[ColorStop],
	) -> Result<(), RenderError>;

	/// Fills a disc with a radial gradient from its centre to `radius`.
	fn fill_radial_gradient(
		&mut self,
		center: Point,
		radius: f64,
		stops: &[ColorStop],
	) -> Result<(), RenderError>;

	fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) -> Result<(), RenderError>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_prefixes_are_stable() {
		assert!(
			RenderError::Canvas("boom".into())
				.to_string()
				.starts_with("canvas call failed:")
		);
		assert_eq!(RenderError::ContextUnavailable.to_string(), "2d context unavailable");
	}
}
