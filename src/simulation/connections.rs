use std::collections::BTreeMap;

use log::trace;

use super::config::PULSE_DURATION_MS;
use super::math::ease_out_expo;
use super::pool::Pool;
use super::types::{ConnectionPulse, LinePhase, Node, NodeId, SimulationState};

pub fn pulse_pool(capacity: usize) -> Pool<ConnectionPulse> {
	Pool::new(capacity, ConnectionPulse::default, |pulse| {
		*pulse = ConnectionPulse::default()
	})
}

/// Adds `a` and `b` to each other's adjacency. Returns `false` if either is gone
/// or they are the same node.
pub fn connect(nodes: &mut BTreeMap<NodeId, Node>, a: NodeId, b: NodeId) -> bool {
	if a == b || !nodes.contains_key(&a) || !nodes.contains_key(&b) {
		return false;
	}
	if let Some(node) = nodes.get_mut(&a) {
		node.connections.insert(b);
	}
	if let Some(node) = nodes.get_mut(&b) {
		node.connections.insert(a);
	}
	true
}

/// Connects every line that has finished extending, emits a pulse at its
/// target and locks it. Locked lines are never revisited.
///
/// Returns the number of connections made.
pub fn detect_connections(
	state: &mut SimulationState,
	pool: &mut Pool<ConnectionPulse>,
	now: f64,
) -> usize {
	let mut made = 0;
	for line in state.lines.values_mut() {
		if line.phase != LinePhase::Extending || line.progress < 1.0 {
			continue;
		}
		let Some(position) = state.nodes.get(&line.target).map(|n| n.position) else {
			continue;
		};
		if !connect(&mut state.nodes, line.source, line.target) {
			continue;
		}

		let mut pulse = pool.acquire();
		pulse.id = state.ids.next_pulse();
		pulse.position = position;
		pulse.progress = 0.0;
		pulse.start_time = now;
		state.pulses.push(pulse);

		line.phase = LinePhase::Locked;
		line.progress = 1.0;
		made += 1;
		trace!("line {} locked {} -> {}", line.id, line.source, line.target);
	}
	made
}

/// Advances a pulse. Returns `false` as soon as progress would reach 1; the
/// pulse is never held at full progress for a frame.
pub fn update_pulse(pulse: &mut ConnectionPulse, delta: f64) -> bool {
	pulse.progress += delta / PULSE_DURATION_MS;
	pulse.progress < 1.0
}

pub fn advance_pulses(state: &mut SimulationState, pool: &mut Pool<ConnectionPulse>, delta: f64) {
	let mut i = 0;
	while i < state.pulses.len() {
		if update_pulse(&mut state.pulses[i], delta) {
			i += 1;
		} else {
			pool.release(state.pulses.remove(i));
		}
	}
}

/// Brightness of a pulse: an immediate flash with a long tail.
pub fn pulse_intensity(progress: f64) -> f64 {
	1.0 - ease_out_expo(progress)
}
