use std::collections::{BTreeMap, BTreeSet};

use super::geometry::{Point, Velocity};

pub type NodeId = u64;
pub type LineId = u64;
pub type PulseId = u64;
pub type StructureId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodePhase {
	Spawning,
	Active,
	Fading,
}

#[derive(Clone, Debug)]
pub struct Node {
	pub id: NodeId,
	pub position: Point,
	pub velocity: Velocity,
	pub radius: f64,
	pub opacity: f64,
	/// Cached from `age` each frame; never advanced on its own.
	pub phase: NodePhase,
	pub lifespan: f64,
	pub age: f64,
	/// Symmetric adjacency; only the connection step adds to it.
	pub connections: BTreeSet<NodeId>,
}

impl Node {
	pub fn is_fading(&self) -> bool {
		self.phase == NodePhase::Fading
	}

	pub fn is_connected_to(&self, other: NodeId) -> bool {
		self.connections.contains(&other)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinePhase {
	#[default]
	Extending,
	Locked,
	Fading,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Line {
	pub id: LineId,
	pub source: NodeId,
	pub target: NodeId,
	/// Eased progress in `[0, 1]`.
	pub progress: f64,
	pub phase: LinePhase,
	pub start_time: f64,
	pub duration: f64,
	pub opacity: f64,
}

impl Line {
	/// Time at which extension finishes.
	pub fn end_time(&self) -> f64 {
		self.start_time + self.duration.max(0.0)
	}

	pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
		(self.source == a && self.target == b) || (self.source == b && self.target == a)
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionPulse {
	pub id: PulseId,
	pub position: Point,
	pub progress: f64,
	pub start_time: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StructurePhase {
	Active,
	Fading,
}

#[derive(Clone, Debug)]
pub struct Structure {
	pub id: StructureId,
	pub nodes: BTreeSet<NodeId>,
	pub lines: BTreeSet<LineId>,
	pub opacity: f64,
	pub age: f64,
	pub lifespan: f64,
	pub phase: StructurePhase,
}

impl Structure {
	/// Sorted member ids; two structures over the same nodes share a key.
	pub fn key(&self) -> Vec<NodeId> {
		self.nodes.iter().copied().collect()
	}
}

/// Per-entity id counters. Each sequence is independent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdCounters {
	pub node: NodeId,
	pub line: LineId,
	pub pulse: PulseId,
	pub structure: StructureId,
}

impl Default for IdCounters {
	fn default() -> Self {
		Self {
			node: 1,
			line: 1,
			pulse: 1,
			structure: 1,
		}
	}
}

fn take(counter: &mut u64) -> u64 {
	let id = *counter;
	*counter += 1;
	id
}

impl IdCounters {
	pub fn next_node(&mut self) -> NodeId {
		take(&mut self.node)
	}

	pub fn next_line(&mut self) -> LineId {
		take(&mut self.line)
	}

	pub fn next_pulse(&mut self) -> PulseId {
		take(&mut self.pulse)
	}

	pub fn next_structure(&mut self) -> StructureId {
		take(&mut self.structure)
	}
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct SimulationState {
	pub nodes: BTreeMap<NodeId, Node>,
	pub lines: BTreeMap<LineId, Line>,
	pub pulses: Vec<ConnectionPulse>,
	pub structures: BTreeMap<StructureId, Structure>,
	pub ids: IdCounters,
	pub last_node_spawn_time: f64,
	pub last_line_spawn_time: f64,
	pub frame: u64,
}

impl SimulationState {
	pub fn line_between(&self, a: NodeId, b: NodeId) -> bool {
		self.lines.values().any(|line| line.joins(a, b))
	}
}
