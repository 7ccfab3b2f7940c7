use crate::simulation::config::{
	LINE_COLOR, LINE_EXTENDING_OPACITY, LINE_LOCKED_OPACITY, LINE_MIN_DRAW_LENGTH,
	LINE_ORIGIN_OPACITY, LINE_WIDTH, NODE_CORE_COLOR, NODE_GLOW_COLOR, NODE_GLOW_MULTIPLIER,
	NODE_GLOW_OPACITY, PULSE_COLOR, PULSE_MAX_RADIUS, PULSE_MIN_RADIUS, STRUCTURE_COLOR,
	STRUCTURE_FILL_OPACITY, STRUCTURE_MIN_SIZE, SurfaceConfig,
};
use crate::simulation::connections::pulse_intensity;
use crate::simulation::geometry::sort_around_centroid;
use crate::simulation::math::lerp;
use crate::simulation::SimulationState;

use super::surface::{ColorStop, RenderError, Surface};

/// Draws one frame: structures, then lines, pulses and nodes on top.
pub fn render<S: Surface>(
	surface: &mut S,
	state: &SimulationState,
	config: &SurfaceConfig,
) -> Result<(), RenderError> {
	surface.clear(config.width, config.height)?;
	draw_structures(surface, state)?;
	draw_lines(surface, state)?;
	draw_pulses(surface, state)?;
	draw_nodes(surface, state)
}

fn draw_structures<S: Surface>(surface: &mut S, state: &SimulationState) -> Result<(), RenderError> {
	let mut points = Vec::new();
	for structure in state.structures.values() {
		if structure.opacity <= 0.0 {
			continue;
		}
		points.clear();
		points.extend(
			structure
				.nodes
				.iter()
				.filter_map(|id| state.nodes.get(id))
				.map(|n| n.position),
		);
		if points.len() < STRUCTURE_MIN_SIZE {
			continue;
		}
		sort_around_centroid(&mut points);
		let color = STRUCTURE_COLOR.with_alpha(STRUCTURE_FILL_OPACITY * structure.opacity);
		surface.fill_polygon(&points, color)?;
	}
	Ok(())
}

fn draw_lines<S: Surface>(surface: &mut S, state: &SimulationState) -> Result<(), RenderError> {
	for line in state.lines.values() {
		let (Some(source), Some(target)) = (state.nodes.get(&line.source), state.nodes.get(&line.target))
		else {
			continue;
		};
		let (start, end) = (
			source.position,
			source.position.lerp(target.position, line.progress),
		);
		if start.distance(end) < LINE_MIN_DRAW_LENGTH {
			continue;
		}
		let head = if line.progress >= 1.0 {
			LINE_LOCKED_OPACITY
		} else {
			LINE_EXTENDING_OPACITY
		};
		let stops = [
			ColorStop::new(0.0, LINE_COLOR.with_alpha(LINE_ORIGIN_OPACITY * line.opacity)),
			ColorStop::new(1.0, LINE_COLOR.with_alpha(head * line.opacity)),
		];
		surface.stroke_gradient_line(start, end, LINE_WIDTH, &stops)?;
	}
	Ok(())
}

fn draw_pulses<S: Surface>(surface: &mut S, state: &SimulationState) -> Result<(), RenderError> {
	for pulse in &state.pulses {
		let intensity = pulse_intensity(pulse.progress);
		if intensity <= 0.0 {
			continue;
		}
		let radius = lerp(PULSE_MIN_RADIUS, PULSE_MAX_RADIUS, pulse.progress);
		let stops = [
			ColorStop::new(0.0, PULSE_COLOR.with_alpha(intensity)),
			ColorStop::new(0.4, PULSE_COLOR.with_alpha(intensity * 0.35)),
			ColorStop::new(1.0, PULSE_COLOR.with_alpha(0.0)),
		];
		surface.fill_radial_gradient(pulse.position, radius, &stops)?;
	}
	Ok(())
}

fn draw_nodes<S: Surface>(surface: &mut S, state: &SimulationState) -> Result<(), RenderError> {
	for node in state.nodes.values() {
		if node.opacity <= 0.0 {
			continue;
		}
		let glow = NODE_GLOW_OPACITY * node.opacity;
		let stops = [
			ColorStop::new(0.0, NODE_GLOW_COLOR.with_alpha(glow)),
			ColorStop::new(0.45, NODE_GLOW_COLOR.with_alpha(glow * 0.25)),
			ColorStop::new(1.0, NODE_GLOW_COLOR.with_alpha(0.0)),
		];
		surface.fill_radial_gradient(node.position, node.radius * NODE_GLOW_MULTIPLIER, &stops)?;
		surface.fill_circle(
			node.position,
			node.radius,
			NODE_CORE_COLOR.with_alpha(node.opacity),
		)?;
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use super::*;
	use crate::simulation::config::{Rgba, STRUCTURE_LOCKED_OPACITY};
	use crate::simulation::geometry::{Point, Velocity};
	use crate::simulation::types::{
		ConnectionPulse, Line, LinePhase, Node, NodeId, NodePhase, Structure, StructurePhase,
	};

	#[derive(Debug, PartialEq)]
	enum Op {
		Clear,
		Polygon(usize),
		Line { end: Point, head_alpha: f64 },
		Radial { center: Point, radius: f64 },
		Circle { radius: f64, alpha: f64 },
	}

	#[derive(Default)]
	struct Recorder {
		ops: Vec<Op>,
		fail_circles: bool,
	}

	impl Surface for Recorder {
		fn clear(&mut self, _: f64, _: f64) -> Result<(), RenderError> {
			self.ops.push(Op::Clear);
			Ok(())
		}

		fn fill_polygon(&mut self, points: &[Point], _: Rgba) -> Result<(), RenderError> {
			self.ops.push(Op::Polygon(points.len()));
			Ok(())
		}

		fn stroke_gradient_line(
			&mut self,
			_: Point,
			to: Point,
			_: f64,
			stops: &[ColorStop],
		) -> Result<(), RenderError> {
			let head_alpha = stops.last().map(|s| s.color.alpha).unwrap_or(0.0);
			self.ops.push(Op::Line { end: to, head_alpha });
			Ok(())
		}

		fn fill_radial_gradient(
			&mut self,
			center: Point,
			radius: f64,
			_: &[ColorStop],
		) -> Result<(), RenderError> {
			self.ops.push(Op::Radial { center, radius });
			Ok(())
		}

		fn fill_circle(&mut self, _: Point, radius: f64, color: Rgba) -> Result<(), RenderError> {
			if self.fail_circles {
				return Err(RenderError::Canvas("lost context".into()));
			}
			self.ops.push(Op::Circle {
				radius,
				alpha: color.alpha,
			});
			Ok(())
		}
	}

	fn config() -> SurfaceConfig {
		SurfaceConfig::new(400.0, 300.0, 2.0, false)
	}

	fn node(id: NodeId, x: f64, y: f64, opacity: f64) -> Node {
		Node {
			id,
			position: Point::new(x, y),
			velocity: Velocity::default(),
			radius: 2.0,
			opacity,
			phase: NodePhase::Active,
			lifespan: 10_000.0,
			age: 5_000.0,
			connections: BTreeSet::new(),
		}
	}

	fn line(id: u64, source: NodeId, target: NodeId, progress: f64, phase: LinePhase) -> Line {
		Line {
			id,
			source,
			target,
			progress,
			phase,
			start_time: 0.0,
			duration: 1_000.0,
			opacity: 1.0,
		}
	}

	fn scene() -> SimulationState {
		let mut state = SimulationState::default();
		state.nodes.insert(1, node(1, 0.0, 0.0, 1.0));
		state.nodes.insert(2, node(2, 100.0, 0.0, 1.0));
		state.nodes.insert(3, node(3, 50.0, 80.0, 1.0));
		state.lines.insert(1, line(1, 1, 2, 0.5, LinePhase::Extending));
		state.pulses.push(ConnectionPulse {
			id: 1,
			position: Point::new(50.0, 80.0),
			progress: 0.5,
			start_time: 0.0,
		});
		state.structures.insert(
			1,
			Structure {
				id: 1,
				nodes: [1, 2, 3].into_iter().collect(),
				lines: BTreeSet::new(),
				opacity: STRUCTURE_LOCKED_OPACITY,
				age: 0.0,
				lifespan: 5_000.0,
				phase: StructurePhase::Active,
			},
		);
		state
	}

	fn rank(op: &Op) -> u8 {
		match op {
			Op::Clear => 0,
			Op::Polygon(_) => 1,
			Op::Line { .. } => 2,
			Op::Radial { .. } | Op::Circle { .. } => 3,
		}
	}

	#[test]
	fn layers_are_drawn_in_fixed_order() {
		let mut recorder = Recorder::default();
		render(&mut recorder, &scene(), &config()).expect("render");
		assert_eq!(recorder.ops[0], Op::Clear);
		assert_eq!(recorder.ops[1], Op::Polygon(3));
		assert!(recorder.ops.windows(2).all(|w| rank(&w[0]) <= rank(&w[1])));
		// Pulse glow comes before any node glow.
		assert_eq!(
			recorder.ops[3],
			Op::Radial {
				center: Point::new(50.0, 80.0),
				radius: lerp(PULSE_MIN_RADIUS, PULSE_MAX_RADIUS, 0.5),
			}
		);
		let circles = recorder
			.ops
			.iter()
			.filter(|op| matches!(op, Op::Circle { .. }))
			.count();
		assert_eq!(circles, 3);
	}

	#[test]
	fn lines_stop_at_their_progress_point() {
		let mut recorder = Recorder::default();
		render(&mut recorder, &scene(), &config()).expect("render");
		assert!(recorder.ops.contains(&Op::Line {
			end: Point::new(50.0, 0.0),
			head_alpha: LINE_EXTENDING_OPACITY,
		}));
	}

	#[test]
	fn locked_lines_are_brighter_at_the_head() {
		let mut state = scene();
		state.lines.insert(1, line(1, 1, 2, 1.0, LinePhase::Locked));
		let mut recorder = Recorder::default();
		render(&mut recorder, &state, &config()).expect("render");
		assert!(recorder.ops.contains(&Op::Line {
			end: Point::new(100.0, 0.0),
			head_alpha: LINE_LOCKED_OPACITY,
		}));
	}

	#[test]
	fn degenerate_and_orphaned_lines_are_skipped() {
		let mut state = scene();
		state.lines.insert(1, line(1, 1, 2, 0.0, LinePhase::Extending));
		state.lines.insert(2, line(2, 1, 9, 0.5, LinePhase::Extending));
		let mut recorder = Recorder::default();
		render(&mut recorder, &state, &config()).expect("render");
		assert!(!recorder.ops.iter().any(|op| matches!(op, Op::Line { .. })));
	}

	#[test]
	fn invisible_nodes_are_not_drawn() {
		let mut state = SimulationState::default();
		state.nodes.insert(1, node(1, 10.0, 10.0, 0.0));
		state.nodes.insert(2, node(2, 20.0, 10.0, 0.5));
		let mut recorder = Recorder::default();
		render(&mut recorder, &state, &config()).expect("render");
		assert_eq!(
			recorder.ops,
			vec![
				Op::Clear,
				Op::Radial {
					center: Point::new(20.0, 10.0),
					radius: 2.0 * NODE_GLOW_MULTIPLIER,
				},
				Op::Circle {
					radius: 2.0,
					alpha: 0.5,
				},
			]
		);
	}

	#[test]
	fn structures_missing_members_are_skipped() {
		let mut state = scene();
		state.nodes.remove(&3);
		let mut recorder = Recorder::default();
		render(&mut recorder, &state, &config()).expect("render");
		assert!(!recorder.ops.iter().any(|op| matches!(op, Op::Polygon(_))));
	}

	#[test]
	fn surface_errors_propagate() {
		let mut recorder = Recorder {
			fail_circles: true,
			..Recorder::default()
		};
		let result = render(&mut recorder, &scene(), &config());
		assert!(matches!(result, Err(RenderError::Canvas(_))));
	}
}
