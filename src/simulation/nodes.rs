use std::collections::BTreeSet;

use log::trace;

use super::config::{
	DRIFT_SPEED_MAX, DRIFT_SPEED_MIN, DeviceLimits, INITIAL_AGE_STAGGER, NODE_FADE_IN_MS,
	NODE_FADE_OUT_MS, NODE_LIFESPAN_MAX_MS, NODE_LIFESPAN_MIN_MS, NODE_RADIUS_MAX, NODE_RADIUS_MIN,
	NODE_SPAWN_INTERVAL_MS, SPAWN_MARGIN, SurfaceConfig,
};
use super::geometry::{Bounds, Point, random_position, random_velocity, reflect};
use super::math::{ease_in_out_cubic, ease_out_quad, normalize};
use super::rng::Prng;
use super::types::{Node, NodeId, NodePhase, SimulationState};

pub fn spawn_bounds(surface: &SurfaceConfig) -> Bounds {
	Bounds::inset(surface.width, surface.height, SPAWN_MARGIN)
}

pub fn node_phase(age: f64, lifespan: f64) -> NodePhase {
	if age < NODE_FADE_IN_MS {
		NodePhase::Spawning
	} else if age < lifespan - NODE_FADE_OUT_MS {
		NodePhase::Active
	} else {
		NodePhase::Fading
	}
}

pub fn node_opacity(age: f64, lifespan: f64) -> f64 {
	match node_phase(age, lifespan) {
		NodePhase::Spawning => ease_in_out_cubic(normalize(age, 0.0, NODE_FADE_IN_MS)),
		NodePhase::Active => 1.0,
		NodePhase::Fading => {
			let fade_start = lifespan - NODE_FADE_OUT_MS;
			1.0 - ease_out_quad(normalize(age, fade_start, fade_start + NODE_FADE_OUT_MS))
		}
	}
}

fn refresh(node: &mut Node) {
	node.phase = node_phase(node.age, node.lifespan);
	node.opacity = node_opacity(node.age, node.lifespan);
}

pub fn create_node(id: NodeId, surface: &SurfaceConfig, rng: &mut Prng) -> Node {
	let position = random_position(rng, &spawn_bounds(surface));
	let velocity = random_velocity(rng, DRIFT_SPEED_MIN, DRIFT_SPEED_MAX);
	let radius = rng.range(NODE_RADIUS_MIN, NODE_RADIUS_MAX);
	let lifespan = rng.range(NODE_LIFESPAN_MIN_MS, NODE_LIFESPAN_MAX_MS);
	let mut node = Node {
		id,
		position,
		velocity,
		radius,
		opacity: 0.0,
		phase: NodePhase::Spawning,
		lifespan,
		age: 0.0,
		connections: BTreeSet::new(),
	};
	refresh(&mut node);
	node
}

/// Ages and moves one node. Returns `false` once the node has outlived its
/// lifespan; position and phase are left untouched in that case.
pub fn update_node(node: &mut Node, bounds: &Bounds, delta: f64) -> bool {
	node.age += delta;
	if node.age >= node.lifespan {
		return false;
	}
	let secs = delta / 1000.0;
	let moved = Point::new(
		node.position.x + node.velocity.vx * secs,
		node.position.y + node.velocity.vy * secs,
	);
	(node.position, node.velocity) = reflect(moved, node.velocity, bounds);
	refresh(node);
	true
}

pub fn should_spawn_node(count: usize, last_spawn: f64, now: f64, limits: &DeviceLimits) -> bool {
	count < limits.max_nodes && now - last_spawn >= NODE_SPAWN_INTERVAL_MS
}

/// Removes a node and scrubs it from its neighbours' adjacency.
pub fn remove_node(state: &mut SimulationState, id: NodeId) -> Option<Node> {
	let node = state.nodes.remove(&id)?;
	for neighbour in &node.connections {
		if let Some(other) = state.nodes.get_mut(neighbour) {
			other.connections.remove(&id);
		}
	}
	Some(node)
}

/// Seeds the start-up population with ages staggered over the first part of
/// each lifespan so the nodes do not fade out together.
pub fn seed_population(state: &mut SimulationState, surface: &SurfaceConfig, rng: &mut Prng, now: f64) {
	let limits = DeviceLimits::for_surface(surface);
	for _ in 0..limits.initial_nodes() {
		let id = state.ids.next_node();
		let mut node = create_node(id, surface, rng);
		node.age = rng.range(0.0, node.lifespan * INITIAL_AGE_STAGGER);
		refresh(&mut node);
		state.nodes.insert(id, node);
	}
	state.last_node_spawn_time = now;
}

pub fn advance_nodes(
	state: &mut SimulationState,
	surface: &SurfaceConfig,
	rng: &mut Prng,
	delta: f64,
	now: f64,
) {
	let bounds = spawn_bounds(surface);
	let mut expired = Vec::new();
	for node in state.nodes.values_mut() {
		if !update_node(node, &bounds, delta) {
			expired.push(node.id);
		}
	}
	for id in expired {
		remove_node(state, id);
		trace!("node {id} expired");
	}

	let limits = DeviceLimits::for_surface(surface);
	if should_spawn_node(state.nodes.len(), state.last_node_spawn_time, now, &limits) {
		let id = state.ids.next_node();
		state.nodes.insert(id, create_node(id, surface, rng));
		state.last_node_spawn_time = now;
	}
}
