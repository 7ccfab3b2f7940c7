//! Tunable constants and surface-dependent limits.
//!
//! Every timing, population cap and visual weight used by the engine lives here;
//! nothing downstream hard-codes a number that changes the look of the field.

use std::fmt;

/// An opaque colour; alpha is supplied at draw time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	pub fn with_alpha(self, alpha: f64) -> Rgba {
		Rgba {
			rgb: self,
			alpha: alpha.clamp(0.0, 1.0),
		}
	}
}

/// A colour with its alpha resolved, formatted as a CSS `rgba()` string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
	pub rgb: Rgb,
	pub alpha: f64,
}

impl fmt::Display for Rgba {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"rgba({}, {}, {}, {:.3})",
			self.rgb.r, self.rgb.g, self.rgb.b, self.alpha
		)
	}
}

// Nodes
pub const NODE_LIFESPAN_MIN_MS: f64 = 9_000.0;
pub const NODE_LIFESPAN_MAX_MS: f64 = 16_000.0;
pub const NODE_SPAWN_INTERVAL_MS: f64 = 450.0;
pub const NODE_FADE_IN_MS: f64 = 1_200.0;
pub const NODE_FADE_OUT_MS: f64 = 2_000.0;
pub const NODE_RADIUS_MIN: f64 = 1.5;
pub const NODE_RADIUS_MAX: f64 = 3.0;
/// Drift speed range in logical pixels per second.
pub const DRIFT_SPEED_MIN: f64 = 4.0;
pub const DRIFT_SPEED_MAX: f64 = 14.0;
pub const SPAWN_MARGIN: f64 = 40.0;
/// Fraction of a lifespan used to stagger the initial population.
pub const INITIAL_AGE_STAGGER: f64 = 0.5;

// Lines
pub const LINE_TRAVEL_MIN_MS: f64 = 1_500.0;
pub const LINE_TRAVEL_MAX_MS: f64 = 3_500.0;
pub const LINE_SPAWN_INTERVAL_MS: f64 = 350.0;
pub const LINE_FADE_OUT_MS: f64 = 800.0;

// Pulses
pub const PULSE_DURATION_MS: f64 = 650.0;

// Structures
pub const STRUCTURE_LIFESPAN_MIN_MS: f64 = 4_000.0;
pub const STRUCTURE_LIFESPAN_MAX_MS: f64 = 8_000.0;
pub const STRUCTURE_FADE_OUT_MS: f64 = 1_500.0;
pub const STRUCTURE_MIN_SIZE: usize = 3;

// Driver
pub const MAX_FRAME_DELTA_MS: f64 = 50.0;
/// Logical width under which a surface is treated as reduced capacity.
pub const REDUCED_CAPACITY_BREAKPOINT: f64 = 768.0;

// Colours and opacities
pub const NODE_CORE_COLOR: Rgb = Rgb::new(226, 236, 255);
pub const NODE_GLOW_COLOR: Rgb = Rgb::new(120, 170, 255);
pub const NODE_GLOW_MULTIPLIER: f64 = 4.0;
pub const NODE_GLOW_OPACITY: f64 = 0.55;
pub const LINE_COLOR: Rgb = Rgb::new(130, 180, 255);
pub const LINE_WIDTH: f64 = 1.0;
pub const LINE_ORIGIN_OPACITY: f64 = 0.08;
pub const LINE_EXTENDING_OPACITY: f64 = 0.45;
pub const LINE_LOCKED_OPACITY: f64 = 0.7;
/// Below this length a line segment is not drawn.
pub const LINE_MIN_DRAW_LENGTH: f64 = 0.5;
pub const PULSE_COLOR: Rgb = Rgb::new(200, 225, 255);
pub const PULSE_MIN_RADIUS: f64 = 2.0;
pub const PULSE_MAX_RADIUS: f64 = 26.0;
pub const STRUCTURE_COLOR: Rgb = Rgb::new(110, 150, 255);
/// Opacity a structure is born with; dimmer than a fully active node.
pub const STRUCTURE_LOCKED_OPACITY: f64 = 0.6;
pub const STRUCTURE_FILL_OPACITY: f64 = 0.12;

/// Drawing surface description supplied by the host.
///
/// Simulation math only reads the logical `width`/`height`; `pixel_density` is
/// consumed when the backing store is sized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceConfig {
	pub width: f64,
	pub height: f64,
	pub pixel_density: f64,
	pub reduced_capacity: bool,
}

impl SurfaceConfig {
	pub fn new(width: f64, height: f64, pixel_density: f64, reduced_capacity: bool) -> Self {
		Self {
			width: width.max(0.0),
			height: height.max(0.0),
			pixel_density: if pixel_density > 0.0 { pixel_density } else { 1.0 },
			reduced_capacity,
		}
	}

	/// Picks reduced capacity from the logical width alone.
	pub fn detect(width: f64, height: f64, pixel_density: f64) -> Self {
		Self::new(
			width,
			height,
			pixel_density,
			width < REDUCED_CAPACITY_BREAKPOINT,
		)
	}

	/// Backing-store size in device pixels.
	pub fn backing_size(&self) -> (u32, u32) {
		(
			(self.width * self.pixel_density).round() as u32,
			(self.height * self.pixel_density).round() as u32,
		)
	}
}

/// Population and concurrency caps for one class of surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceLimits {
	pub min_nodes: usize,
	pub max_nodes: usize,
	pub max_lines: usize,
	pub max_pulses: usize,
	pub max_structures: usize,
}

pub const STANDARD_LIMITS: DeviceLimits = DeviceLimits {
	min_nodes: 28,
	max_nodes: 44,
	max_lines: 40,
	max_pulses: 12,
	max_structures: 6,
};

pub const REDUCED_LIMITS: DeviceLimits = DeviceLimits {
	min_nodes: 18,
	max_nodes: 18,
	max_lines: 16,
	max_pulses: 5,
	max_structures: 3,
};

impl DeviceLimits {
	pub fn for_surface(surface: &SurfaceConfig) -> Self {
		if surface.reduced_capacity {
			REDUCED_LIMITS
		} else {
			STANDARD_LIMITS
		}
	}

	/// Size of the population seeded at start-up.
	pub fn initial_nodes(&self) -> usize {
		(self.min_nodes + self.max_nodes) / 2
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reduced_surfaces_have_a_fixed_population() {
		let limits = DeviceLimits::for_surface(&SurfaceConfig::new(400.0, 800.0, 2.0, true));
		assert_eq!(limits, REDUCED_LIMITS);
		assert_eq!(limits.min_nodes, limits.max_nodes);
		assert_eq!(limits.initial_nodes(), limits.max_nodes);
	}

	#[test]
	fn standard_surfaces_seed_the_midpoint() {
		let limits = DeviceLimits::for_surface(&SurfaceConfig::new(1280.0, 720.0, 1.0, false));
		assert_eq!(limits.initial_nodes(), (28 + 44) / 2);
		assert!(limits.max_structures > REDUCED_LIMITS.max_structures);
	}

	#[test]
	fn detect_uses_the_width_breakpoint() {
		assert!(SurfaceConfig::detect(500.0, 900.0, 3.0).reduced_capacity);
		assert!(!SurfaceConfig::detect(1440.0, 900.0, 1.0).reduced_capacity);
	}

	#[test]
	fn colours_format_as_css() {
		assert_eq!(Rgb::new(1, 2, 3).with_alpha(0.5).to_string(), "rgba(1, 2, 3, 0.500)");
		assert_eq!(Rgb::new(1, 2, 3).with_alpha(4.0).alpha, 1.0);
	}

	#[test]
	fn degenerate_dimensions_are_sanitised() {
		let surface = SurfaceConfig::new(-10.0, 0.0, 0.0, false);
		assert_eq!(surface.width, 0.0);
		assert_eq!(surface.pixel_density, 1.0);
		assert_eq!(surface.backing_size(), (0, 0));
		assert_eq!(SurfaceConfig::new(100.0, 50.0, 2.0, false).backing_size(), (200, 100));
	}
}
