use log::{debug, error};

use crate::simulation::{Simulation, SurfaceConfig};

use super::clock::{FrameClock, Visibility};
use super::render::render;
use super::surface::Surface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
	/// Hidden or off-screen; nothing advanced, the last frame stays on screen.
	Skipped,
	Rendered,
	/// The tick ran but drawing failed. Already logged.
	Failed,
}

/// Per-frame driver: visibility gate, delta clamp, tick, render.
pub struct Engine {
	simulation: Simulation,
	clock: FrameClock,
	visibility: Visibility,
}

impl Engine {
	pub fn new(surface: SurfaceConfig, seed: u64, now: f64) -> Self {
		Self {
			simulation: Simulation::new(surface, seed, now),
			clock: FrameClock::default(),
			visibility: Visibility::default(),
		}
	}

	pub fn set_document_visible(&mut self, visible: bool) {
		if !visible && self.visibility.document_visible {
			let (lines, pulses) = self.simulation.pool_stats();
			let limits = self.simulation.limits();
			debug!(
				"paused at frame {} (cap {} lines); line pool {lines:?}, pulse pool {pulses:?}",
				self.simulation.state().frame,
				limits.max_lines
			);
		}
		self.visibility.document_visible = visible;
	}

	pub fn set_in_viewport(&mut self, visible: bool) {
		self.visibility.in_viewport = visible;
	}

	pub fn resize(&mut self, surface: SurfaceConfig) {
		self.simulation.resize(surface);
	}

	#[cfg(test)]
	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	/// Runs one animation frame. Errors are logged here and never escape, so
	/// the caller can keep scheduling frames unconditionally.
	pub fn frame<S: Surface>(&mut self, timestamp: f64, surface: &mut S) -> FrameOutcome {
		if !self.visibility.is_active() {
			self.clock.reset();
			return FrameOutcome::Skipped;
		}
		let delta = self.clock.advance(timestamp);
		self.simulation.tick(delta, timestamp);
		match render(surface, self.simulation.state(), self.simulation.surface()) {
			Ok(()) => FrameOutcome::Rendered,
			Err(err) => {
				error!("frame {} failed: {err}", self.simulation.state().frame);
				FrameOutcome::Failed
			}
		}
	}
}
