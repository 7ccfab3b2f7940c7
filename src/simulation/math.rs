//! Easing curves and scalar helpers. Inputs outside `[0, 1]` are clamped first.

pub fn clamp01(t: f64) -> f64 {
	if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
	a + (b - a) * t
}

/// Position of `value` within `[min, max]`, clamped to `[0, 1]`. An empty or
/// inverted range counts as already complete.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
	if max <= min {
		return 1.0;
	}
	clamp01((value - min) / (max - min))
}

pub fn ease_out_cubic(t: f64) -> f64 {
	let t = clamp01(t);
	1.0 - (1.0 - t).powi(3)
}

pub fn ease_out_quad(t: f64) -> f64 {
	let t = clamp01(t);
	1.0 - (1.0 - t) * (1.0 - t)
}

pub fn ease_in_out_cubic(t: f64) -> f64 {
	let t = clamp01(t);
	if t < 0.5 {
		4.0 * t * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
	}
}

pub fn ease_out_expo(t: f64) -> f64 {
	let t = clamp01(t);
	if t >= 1.0 {
		1.0
	} else {
		1.0 - 2f64.powf(-10.0 * t)
	}
}
