use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::config::{
	DeviceLimits, STRUCTURE_FADE_OUT_MS, STRUCTURE_LIFESPAN_MAX_MS, STRUCTURE_LIFESPAN_MIN_MS,
	STRUCTURE_LOCKED_OPACITY, STRUCTURE_MIN_SIZE, SurfaceConfig,
};
use super::math::{ease_out_quad, normalize};
use super::rng::Prng;
use super::types::{Node, NodeId, SimulationState, Structure, StructurePhase};

fn is_live(nodes: &BTreeMap<NodeId, Node>, id: &NodeId) -> bool {
	nodes.get(id).is_some_and(|n| !n.is_fading())
}

/// Finds triangles among non-fading nodes that are not already a structure.
///
/// Every node of degree two or more is a seed; a pair of its neighbours that
/// are themselves adjacent closes a triangle. Candidates come back as sorted id
/// lists, deduplicated and in ascending order.
pub fn detect_structures(state: &SimulationState) -> Vec<Vec<NodeId>> {
	let existing: BTreeSet<Vec<NodeId>> = state.structures.values().map(Structure::key).collect();
	let mut found = BTreeSet::new();
	let mut neighbours = Vec::new();

	for node in state
		.nodes
		.values()
		.filter(|n| n.connections.len() >= 2 && !n.is_fading())
	{
		neighbours.clear();
		neighbours.extend(
			node.connections
				.iter()
				.copied()
				.filter(|id| is_live(&state.nodes, id)),
		);
		for (i, &a) in neighbours.iter().enumerate() {
			for &b in &neighbours[i + 1..] {
				if !state.nodes.get(&a).is_some_and(|n| n.is_connected_to(b)) {
					continue;
				}
				let mut key = vec![node.id, a, b];
				key.sort_unstable();
				if !existing.contains(&key) {
					found.insert(key);
				}
			}
		}
	}
	found.into_iter().collect()
}

/// At least three members, all present, every pair adjacent.
pub fn is_valid_structure(state: &SimulationState, members: &[NodeId]) -> bool {
	if members.len() < STRUCTURE_MIN_SIZE {
		return false;
	}
	let Some(nodes) = members
		.iter()
		.map(|id| state.nodes.get(id))
		.collect::<Option<Vec<_>>>()
	else {
		return false;
	};
	nodes.iter().enumerate().all(|(i, a)| {
		nodes[i + 1..]
			.iter()
			.all(|b| a.id != b.id && a.is_connected_to(b.id) && b.is_connected_to(a.id))
	})
}

pub fn create_structure(state: &mut SimulationState, members: &[NodeId], rng: &mut Prng) -> Structure {
	let nodes: BTreeSet<NodeId> = members.iter().copied().collect();
	let lines = state
		.lines
		.values()
		.filter(|l| nodes.contains(&l.source) && nodes.contains(&l.target))
		.map(|l| l.id)
		.collect();
	Structure {
		id: state.ids.next_structure(),
		nodes,
		lines,
		opacity: STRUCTURE_LOCKED_OPACITY,
		age: 0.0,
		lifespan: rng.range(STRUCTURE_LIFESPAN_MIN_MS, STRUCTURE_LIFESPAN_MAX_MS),
		phase: StructurePhase::Active,
	}
}

/// Ages one structure. Returns `false` when it should be dropped: a member is
/// gone or fading, or its own lifespan is over.
pub fn update_structure(structure: &mut Structure, nodes: &BTreeMap<NodeId, Node>, delta: f64) -> bool {
	if !structure.nodes.iter().all(|id| is_live(nodes, id)) {
		return false;
	}
	structure.age += delta;
	if structure.age >= structure.lifespan {
		return false;
	}
	let fade_start = structure.lifespan - STRUCTURE_FADE_OUT_MS;
	if structure.age >= fade_start {
		structure.phase = StructurePhase::Fading;
		let fraction = normalize(structure.age, fade_start, fade_start + STRUCTURE_FADE_OUT_MS);
		structure.opacity = STRUCTURE_LOCKED_OPACITY * (1.0 - ease_out_quad(fraction));
	} else {
		structure.phase = StructurePhase::Active;
		structure.opacity = STRUCTURE_LOCKED_OPACITY;
	}
	true
}

/// Ages existing structures, then forms new ones up to the surface cap.
/// Returns how many were created.
pub fn process_structures(
	state: &mut SimulationState,
	surface: &SurfaceConfig,
	rng: &mut Prng,
	delta: f64,
) -> usize {
	let nodes = &state.nodes;
	state
		.structures
		.retain(|_, structure| update_structure(structure, nodes, delta));

	let limits = DeviceLimits::for_surface(surface);
	let mut created = 0;
	for members in detect_structures(state) {
		if state.structures.len() >= limits.max_structures {
			break;
		}
		if !is_valid_structure(state, &members) {
			continue;
		}
		let structure = create_structure(state, &members, rng);
		debug!("structure {} formed from {:?}", structure.id, members);
		state.structures.insert(structure.id, structure);
		created += 1;
	}
	created
}
