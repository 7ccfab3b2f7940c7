use crate::simulation::config::MAX_FRAME_DELTA_MS;

/// Turns animation-frame timestamps into clamped per-tick deltas.
#[derive(Clone, Debug)]
pub struct FrameClock {
	last: Option<f64>,
	max_delta: f64,
}

impl Default for FrameClock {
	fn default() -> Self {
		Self::new(MAX_FRAME_DELTA_MS)
	}
}

impl FrameClock {
	pub fn new(max_delta: f64) -> Self {
		Self {
			last: None,
			max_delta,
		}
	}

	/// Delta since the previous timestamp, clamped to `[0, max_delta]`. The
	/// first call after a reset yields 0.
	pub fn advance(&mut self, timestamp: f64) -> f64 {
		let delta = self
			.last
			.map(|last| (timestamp - last).clamp(0.0, self.max_delta))
			.unwrap_or(0.0);
		self.last = Some(timestamp);
		delta
	}

	/// Forgets the reference point so the next frame does not see the gap.
	pub fn reset(&mut self) {
		self.last = None;
	}
}

/// Host signals that decide whether a frame does any work.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visibility {
	pub document_visible: bool,
	pub in_viewport: bool,
}

impl Default for Visibility {
	fn default() -> Self {
		Self {
			document_visible: true,
			in_viewport: true,
		}
	}
}

impl Visibility {
	pub fn is_active(&self) -> bool {
		self.document_visible && self.in_viewport
	}
}
