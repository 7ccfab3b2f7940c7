use log::{debug, info};

use super::config::{DeviceLimits, STANDARD_LIMITS, SurfaceConfig};
use super::connections::{advance_pulses, detect_connections, pulse_pool};
use super::lines::{advance_lines, line_pool};
use super::nodes::{advance_nodes, seed_population};
use super::pool::{Pool, PoolStats};
use super::rng::Prng;
use super::structures::process_structures;
use super::types::{ConnectionPulse, Line, SimulationState};

/// Owns the authoritative state and steps it one frame at a time.
///
/// A tick runs nodes, lines, connections, pulses and structures in that order,
/// each step taking the state exclusively, so no step sees the output of a
/// later one. Adjacency sets are mutated in place by the connection step only.
pub struct Simulation {
	state: SimulationState,
	surface: SurfaceConfig,
	rng: Prng,
	lines: Pool<Line>,
	pulses: Pool<ConnectionPulse>,
}

impl Simulation {
	/// Builds a simulation with its start-up population already seeded.
	pub fn new(surface: SurfaceConfig, seed: u64, now: f64) -> Self {
		let mut rng = Prng::new(seed);
		let mut state = SimulationState::default();
		seed_population(&mut state, &surface, &mut rng, now);
		state.last_line_spawn_time = now;
		info!(
			"simulation seeded with {} nodes on {}x{} (reduced capacity: {})",
			state.nodes.len(),
			surface.width,
			surface.height,
			surface.reduced_capacity
		);
		// Pools are sized for the larger limits so a resize never shrinks them.
		Self {
			state,
			surface,
			rng,
			lines: line_pool(STANDARD_LIMITS.max_lines),
			pulses: pulse_pool(STANDARD_LIMITS.max_pulses),
		}
	}

	pub fn tick(&mut self, delta: f64, now: f64) {
		let state = &mut self.state;
		advance_nodes(state, &self.surface, &mut self.rng, delta, now);
		advance_lines(state, &self.surface, &mut self.rng, &mut self.lines, now);
		detect_connections(state, &mut self.pulses, now);
		advance_pulses(state, &mut self.pulses, delta);
		process_structures(state, &self.surface, &mut self.rng, delta);
		state.frame += 1;
	}

	/// Swaps in a new surface. Entities keep their positions and ages; the
	/// motion bounds pick up the new size on the next tick.
	pub fn resize(&mut self, surface: SurfaceConfig) {
		if surface != self.surface {
			let limits = DeviceLimits::for_surface(&surface);
			debug!(
				"surface resized to {}x{} @{} (nodes {}..={})",
				surface.width,
				surface.height,
				surface.pixel_density,
				limits.min_nodes,
				limits.max_nodes
			);
		}
		self.surface = surface;
	}

	pub fn state(&self) -> &SimulationState {
		&self.state
	}

	pub fn surface(&self) -> &SurfaceConfig {
		&self.surface
	}

	pub fn limits(&self) -> DeviceLimits {
		DeviceLimits::for_surface(&self.surface)
	}

	/// Line and pulse pool counters, in that order.
	pub fn pool_stats(&self) -> (&PoolStats, &PoolStats) {
		(self.lines.stats(), self.pulses.stats())
	}
}
