use std::f64::consts::TAU;

use wasm_bindgen::JsCast;
use web_sys::{CanvasGradient, CanvasRenderingContext2d, HtmlCanvasElement};

use crate::simulation::SurfaceConfig;
use crate::simulation::config::Rgba;
use crate::simulation::geometry::Point;

use super::surface::{ColorStop, RenderError, Surface};

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, RenderError> {
	canvas
		.get_context("2d")?
		.ok_or(RenderError::ContextUnavailable)?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| RenderError::ContextUnavailable)
}

/// Sizes the backing store in device pixels and scales the context so drawing
/// happens in logical pixels.
pub fn configure_backing_store(
	canvas: &HtmlCanvasElement,
	ctx: &CanvasRenderingContext2d,
	surface: &SurfaceConfig,
) -> Result<(), RenderError> {
	let (w, h) = surface.backing_size();
	canvas.set_width(w);
	canvas.set_height(h);
	let style = canvas.style();
	style.set_property("width", &format!("{}px", surface.width))?;
	style.set_property("height", &format!("{}px", surface.height))?;
	let dpr = surface.pixel_density;
	ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
	Ok(())
}

pub struct CanvasSurface<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}
}

fn add_stops(gradient: &CanvasGradient, stops: &[ColorStop]) -> Result<(), RenderError> {
	for stop in stops {
		gradient.add_color_stop(stop.offset as f32, &stop.color.to_string())?;
	}
	Ok(())
}

impl Surface for CanvasSurface<'_> {
	fn clear(&mut self, width: f64, height: f64) -> Result<(), RenderError> {
		self.ctx.clear_rect(0.0, 0.0, width, height);
		Ok(())
	}

	fn fill_polygon(&mut self, points: &[Point], color: Rgba) -> Result<(), RenderError> {
		let Some((first, rest)) = points.split_first() else {
			return Ok(());
		};
		let ctx = self.ctx;
		ctx.begin_path();
		ctx.move_to(first.x, first.y);
		for p in rest {
			ctx.line_to(p.x, p.y);
		}
		ctx.close_path();
		ctx.set_fill_style_str(&color.to_string());
		ctx.fill();
		Ok(())
	}

	fn stroke_gradient_line(
		&mut self,
		from: Point,
		to: Point,
		width: f64,
		stops: &[ColorStop],
	) -> Result<(), RenderError> {
		let ctx = self.ctx;
		let gradient = ctx.create_linear_gradient(from.x, from.y, to.x, to.y);
		add_stops(&gradient, stops)?;
		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);
		ctx.set_line_width(width);
		ctx.set_line_cap("round");
		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.line_to(to.x, to.y);
		ctx.stroke();
		Ok(())
	}

	fn fill_radial_gradient(
		&mut self,
		center: Point,
		radius: f64,
		stops: &[ColorStop],
	) -> Result<(), RenderError> {
		if radius <= 0.0 {
			return Ok(());
		}
		let ctx = self.ctx;
		let gradient = ctx.create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)?;
		add_stops(&gradient, stops)?;
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.begin_path();
		ctx.arc(center.x, center.y, radius, 0.0, TAU)?;
		ctx.fill();
		Ok(())
	}

	fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) -> Result<(), RenderError> {
		let ctx = self.ctx;
		ctx.begin_path();
		ctx.arc(center.x, center.y, radius.max(0.0), 0.0, TAU)?;
		ctx.set_fill_style_str(&color.to_string());
		ctx.fill();
		Ok(())
	}
}
