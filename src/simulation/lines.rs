use std::collections::BTreeMap;

use log::trace;

use super::config::{
	DeviceLimits, LINE_FADE_OUT_MS, LINE_SPAWN_INTERVAL_MS, LINE_TRAVEL_MAX_MS, LINE_TRAVEL_MIN_MS,
	SurfaceConfig,
};
use super::math::{clamp01, ease_out_cubic, ease_out_quad, lerp, normalize};
use super::pool::Pool;
use super::rng::Prng;
use super::types::{Line, LineId, LinePhase, Node, NodeId, SimulationState};

pub fn line_pool(capacity: usize) -> Pool<Line> {
	Pool::new(capacity, Line::default, |line| *line = Line::default())
}

/// Linear completion in `[0, 1]`. A non-positive duration is already complete.
pub fn raw_progress(start_time: f64, duration: f64, now: f64) -> f64 {
	normalize(now, start_time, start_time + duration)
}

/// Eased completion; exactly 1 once the raw value reaches 1.
pub fn line_progress(start_time: f64, duration: f64, now: f64) -> f64 {
	let raw = raw_progress(start_time, duration, now);
	if raw >= 1.0 { 1.0 } else { ease_out_cubic(raw) }
}

pub fn create_line(
	pool: &mut Pool<Line>,
	id: LineId,
	source: NodeId,
	target: NodeId,
	now: f64,
	rng: &mut Prng,
) -> Line {
	let mut line = pool.acquire();
	line.id = id;
	line.source = source;
	line.target = target;
	line.start_time = now;
	line.duration = rng.range(LINE_TRAVEL_MIN_MS, LINE_TRAVEL_MAX_MS);
	line.phase = LinePhase::Extending;
	line.progress = line_progress(line.start_time, line.duration, now);
	line.opacity = 1.0;
	line
}

/// Advances one line to `now`. Returns `false` when a fading line has reached
/// zero opacity and should be dropped.
///
/// Extension pins progress at 1 but leaves the phase alone; locking belongs to
/// connection detection.
pub fn update_line(line: &mut Line, now: f64) -> bool {
	match line.phase {
		LinePhase::Extending => {
			line.progress = line_progress(line.start_time, line.duration, now).max(line.progress);
		}
		LinePhase::Locked => line.progress = 1.0,
		LinePhase::Fading => {
			line.progress = line_progress(line.start_time, line.duration, now).max(line.progress);
			let fade_start = line.end_time();
			let fraction = normalize(now, fade_start, fade_start + LINE_FADE_OUT_MS);
			line.opacity = clamp01(lerp(1.0, 0.0, ease_out_quad(fraction)));
			if line.opacity <= 0.0 {
				return false;
			}
		}
	}
	true
}

enum Endpoints {
	Missing,
	Faded,
	Fading,
	Live,
}

fn endpoints(nodes: &BTreeMap<NodeId, Node>, line: &Line) -> Endpoints {
	let (Some(source), Some(target)) = (nodes.get(&line.source), nodes.get(&line.target)) else {
		return Endpoints::Missing;
	};
	let faded = |n: &Node| n.is_fading() && n.opacity <= 0.0;
	if faded(source) || faded(target) {
		Endpoints::Faded
	} else if source.is_fading() || target.is_fading() {
		Endpoints::Fading
	} else {
		Endpoints::Live
	}
}

/// Picks a non-fading target that is not the source and has no line to it yet.
pub fn select_target(state: &SimulationState, source: NodeId, rng: &mut Prng) -> Option<NodeId> {
	let candidates: Vec<NodeId> = state
		.nodes
		.values()
		.filter(|n| n.id != source && !n.is_fading() && !state.line_between(source, n.id))
		.map(|n| n.id)
		.collect();
	rng.choose(&candidates).copied()
}

pub fn should_spawn_line(
	count: usize,
	eligible_nodes: usize,
	last_spawn: f64,
	now: f64,
	limits: &DeviceLimits,
) -> bool {
	count < limits.max_lines && eligible_nodes >= 2 && now - last_spawn >= LINE_SPAWN_INTERVAL_MS
}

pub fn advance_lines(
	state: &mut SimulationState,
	surface: &SurfaceConfig,
	rng: &mut Prng,
	pool: &mut Pool<Line>,
	now: f64,
) {
	let mut removed = Vec::new();
	let nodes = &state.nodes;
	for line in state.lines.values_mut() {
		let keep = match endpoints(nodes, line) {
			Endpoints::Missing | Endpoints::Faded => false,
			Endpoints::Fading => {
				line.phase = LinePhase::Fading;
				update_line(line, now)
			}
			Endpoints::Live => update_line(line, now),
		};
		if !keep {
			removed.push(line.id);
		}
	}
	for id in removed {
		if let Some(line) = state.lines.remove(&id) {
			trace!("line {id} removed");
			pool.release(line);
		}
	}

	let limits = DeviceLimits::for_surface(surface);
	let eligible = state.nodes.values().filter(|n| !n.is_fading()).count();
	if !should_spawn_line(
		state.lines.len(),
		eligible,
		state.last_line_spawn_time,
		now,
		&limits,
	) {
		return;
	}
	state.last_line_spawn_time = now;

	let sources: Vec<NodeId> = state
		.nodes
		.values()
		.filter(|n| !n.is_fading())
		.map(|n| n.id)
		.collect();
	let Some(&source) = rng.choose(&sources) else {
		return;
	};
	if let Some(target) = select_target(state, source, rng) {
		let id = state.ids.next_line();
		let line = create_line(pool, id, source, target, now, rng);
		state.lines.insert(id, line);
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use super::*;
	use crate::simulation::config::STANDARD_LIMITS;
	use crate::simulation::geometry::{Point, Velocity};
	use crate::simulation::types::NodePhase;

	fn surface() -> SurfaceConfig {
		SurfaceConfig::new(800.0, 600.0, 1.0, false)
	}

	fn node(id: NodeId, phase: NodePhase, opacity: f64) -> Node {
		Node {
			id,
			position: Point::new(id as f64 * 10.0, 0.0),
			velocity: Velocity::default(),
			radius: 2.0,
			opacity,
			phase,
			lifespan: 10_000.0,
			age: 5_000.0,
			connections: BTreeSet::new(),
		}
	}

	fn line(id: LineId, source: NodeId, target: NodeId, start: f64, duration: f64) -> Line {
		Line {
			id,
			source,
			target,
			progress: 0.0,
			phase: LinePhase::Extending,
			start_time: start,
			duration,
			opacity: 1.0,
		}
	}

	fn state_with(nodes: &[Node]) -> SimulationState {
		let mut state = SimulationState::default();
		for n in nodes {
			state.nodes.insert(n.id, n.clone());
		}
		state
	}

	#[test]
	fn halfway_progress_is_cubic_eased() {
		let p = line_progress(0.0, 3_000.0, 1_500.0);
		assert!((p - 0.875).abs() < 1e-9);
	}

	#[test]
	fn degenerate_durations_complete_instantly() {
		assert_eq!(line_progress(100.0, 0.0, 100.0), 1.0);
		assert_eq!(line_progress(100.0, -5.0, 0.0), 1.0);
		let mut l = line(1, 1, 2, 0.0, 0.0);
		assert!(update_line(&mut l, 0.0));
		assert_eq!(l.progress, 1.0);
		assert_eq!(l.phase, LinePhase::Extending);
	}

	#[test]
	fn progress_rises_then_pins_at_one() {
		let mut l = line(1, 1, 2, 0.0, 1_000.0);
		let mut last = 0.0;
		let mut t = 0.0;
		while t < 1_000.0 {
			t += 16.0;
			update_line(&mut l, t);
			assert!((0.0..=1.0).contains(&l.progress));
			if t < 1_000.0 {
				assert!(l.progress > last);
			}
			last = l.progress;
		}
		assert_eq!(l.progress, 1.0);
		l.phase = LinePhase::Locked;
		update_line(&mut l, 5_000.0);
		assert_eq!(l.progress, 1.0);
	}

	#[test]
	fn fading_is_measured_from_extension_end() {
		let mut l = line(1, 1, 2, 0.0, 1_000.0);
		l.phase = LinePhase::Fading;
		assert!(update_line(&mut l, 900.0));
		assert_eq!(l.opacity, 1.0);
		assert!(update_line(&mut l, 1_000.0 + LINE_FADE_OUT_MS / 2.0));
		assert!(l.opacity > 0.0 && l.opacity < 1.0);
		assert!(!update_line(&mut l, 1_000.0 + LINE_FADE_OUT_MS));
	}

	#[test]
	fn orphaned_lines_are_removed_and_recycled() {
		let mut state = state_with(&[node(1, NodePhase::Active, 1.0)]);
		state.lines.insert(1, line(1, 1, 2, 0.0, 1_000.0));
		state.last_line_spawn_time = f64::INFINITY;
		let mut pool = line_pool(4);
		let taken = pool.acquire();
		let before = pool.available();
		advance_lines(&mut state, &surface(), &mut Prng::new(1), &mut pool, 10.0);
		assert!(state.lines.is_empty());
		assert_eq!(pool.available(), before + 1);
		pool.release(taken);
	}

	#[test]
	fn fading_endpoints_fade_the_line_and_faded_ones_drop_it() {
		let mut state = state_with(&[
			node(1, NodePhase::Active, 1.0),
			node(2, NodePhase::Fading, 0.5),
			node(3, NodePhase::Fading, 0.0),
		]);
		state.lines.insert(1, line(1, 1, 2, 0.0, 1_000.0));
		state.lines.insert(2, line(2, 3, 1, 0.0, 1_000.0));
		state.last_line_spawn_time = f64::INFINITY;
		let mut pool = line_pool(4);
		advance_lines(&mut state, &surface(), &mut Prng::new(1), &mut pool, 500.0);
		assert_eq!(state.lines[&1].phase, LinePhase::Fading);
		assert!(!state.lines.contains_key(&2));
	}

	#[test]
	fn target_selection_skips_ineligible_nodes() {
		let mut state = state_with(&[
			node(1, NodePhase::Active, 1.0),
			node(2, NodePhase::Active, 1.0),
			node(3, NodePhase::Fading, 0.4),
			node(4, NodePhase::Spawning, 0.2),
		]);
		// An existing line in the reverse direction still counts.
		state.lines.insert(1, line(1, 2, 1, 0.0, 1_000.0));
		let mut rng = Prng::new(3);
		for _ in 0..50 {
			assert_eq!(select_target(&state, 1, &mut rng), Some(4));
		}
		state.lines.insert(2, line(2, 1, 4, 0.0, 1_000.0));
		assert_eq!(select_target(&state, 1, &mut rng), None);
	}

	#[test]
	fn spawn_gate() {
		let limits = STANDARD_LIMITS;
		assert!(should_spawn_line(0, 2, 0.0, LINE_SPAWN_INTERVAL_MS, &limits));
		assert!(!should_spawn_line(0, 1, 0.0, 1e9, &limits));
		assert!(!should_spawn_line(limits.max_lines, 5, 0.0, 1e9, &limits));
		assert!(!should_spawn_line(0, 5, 0.0, LINE_SPAWN_INTERVAL_MS - 1.0, &limits));
	}

	#[test]
	fn spawns_between_distinct_live_nodes() {
		let mut state = state_with(&[node(1, NodePhase::Active, 1.0), node(2, NodePhase::Active, 1.0)]);
		let mut pool = line_pool(2);
		advance_lines(&mut state, &surface(), &mut Prng::new(4), &mut pool, 1_000.0);
		assert_eq!(state.lines.len(), 1);
		let l = &state.lines[&1];
		assert_ne!(l.source, l.target);
		assert!((LINE_TRAVEL_MIN_MS..LINE_TRAVEL_MAX_MS).contains(&l.duration));
		assert_eq!(l.start_time, 1_000.0);
		assert_eq!(pool.available(), 1);

		// Only one pair exists, so the next attempt finds no target but still
		// consumes the interval.
		advance_lines(&mut state, &surface(), &mut Prng::new(4), &mut pool, 2_000.0);
		assert_eq!(state.lines.len(), 1);
		assert_eq!(state.last_line_spawn_time, 2_000.0);
	}
}
