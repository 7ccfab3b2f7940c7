use std::f64::consts::TAU;

use super::math::lerp;
use super::rng::Prng;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		let (dx, dy) = (other.x - self.x, other.y - self.y);
		(dx * dx + dy * dy).sqrt()
	}

	pub fn lerp(self, other: Point, t: f64) -> Point {
		Point::new(lerp(self.x, other.x, t), lerp(self.y, other.y, t))
	}
}

/// Velocity in units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
	pub vx: f64,
	pub vy: f64,
}

/// Axis-aligned region nodes are kept inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	/// Shrinks `width × height` by `margin` on every side.
	///
	/// When a dimension is smaller than twice the margin the inset collapses to
	/// that dimension's centre line instead of inverting.
	pub fn inset(width: f64, height: f64, margin: f64) -> Self {
		let (mx, my) = (margin.min(width / 2.0), margin.min(height / 2.0));
		Self {
			min_x: mx,
			min_y: my,
			max_x: (width - mx).max(mx),
			max_y: (height - my).max(my),
		}
	}

	pub fn clamp(&self, p: Point) -> Point {
		Point::new(
			p.x.clamp(self.min_x, self.max_x),
			p.y.clamp(self.min_y, self.max_y),
		)
	}
}

pub fn random_position(rng: &mut Prng, bounds: &Bounds) -> Point {
	Point::new(
		rng.range(bounds.min_x, bounds.max_x),
		rng.range(bounds.min_y, bounds.max_y),
	)
}

/// Random heading with a speed drawn from `[min_speed, max_speed)`.
pub fn random_velocity(rng: &mut Prng, min_speed: f64, max_speed: f64) -> Velocity {
	let angle = rng.range(0.0, TAU);
	let speed = rng.range(min_speed, max_speed);
	Velocity {
		vx: angle.cos() * speed,
		vy: angle.sin() * speed,
	}
}

/// Reflects the velocity off any bound the position has crossed, then clamps
/// the position back inside so a long step cannot escape.
pub fn reflect(position: Point, velocity: Velocity, bounds: &Bounds) -> (Point, Velocity) {
	let mut v = velocity;
	if position.x < bounds.min_x {
		v.vx = v.vx.abs();
	} else if position.x > bounds.max_x {
		v.vx = -v.vx.abs();
	}
	if position.y < bounds.min_y {
		v.vy = v.vy.abs();
	} else if position.y > bounds.max_y {
		v.vy = -v.vy.abs();
	}
	(bounds.clamp(position), v)
}

/// Mean of the points; the origin when there are none.
pub fn centroid(points: &[Point]) -> Point {
	if points.is_empty() {
		return Point::default();
	}
	let n = points.len() as f64;
	let (sx, sy) = points
		.iter()
		.fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
	Point::new(sx / n, sy / n)
}

/// Orders points by angle around their centroid so they trace a simple polygon.
pub fn sort_around_centroid(points: &mut [Point]) {
	let c = centroid(points);
	points.sort_by(|a, b| {
		let (ta, tb) = ((a.y - c.y).atan2(a.x - c.x), (b.y - c.y).atan2(b.x - c.x));
		ta.total_cmp(&tb)
	});
}
