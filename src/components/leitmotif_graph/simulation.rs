//! Per-frame force integration.
//!
//! Every node is compared with every other node, so one step is O(n²). Linked
//! nodes pull towards an ideal edge length, unlinked nodes push apart, and a
//! weak gravity plus friction keep the layout centred and settling.

use std::f64::consts::TAU;

use super::camera::Point;
use super::config::SimulationConfig;
use super::graph::{Graph, Node, NodeId};

/// Distances below this are treated as coincident.
const MIN_DISTANCE: f64 = 1e-6;

#[derive(Clone, Debug, Default)]
pub struct Simulator {
	config: SimulationConfig,
}

impl Simulator {
	pub fn new(config: SimulationConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &SimulationConfig {
		&self.config
	}

	/// Advances every node except `pinned` by one frame.
	///
	/// Velocities pick up last frame's acceleration first, then acceleration
	/// is rebuilt from gravity, friction and the pairwise forces. Positions
	/// move in a separate pass so all pairs see the same frame.
	pub fn step(&self, graph: &mut Graph, pinned: Option<NodeId>) {
		let SimulationConfig {
			gravity, friction, ..
		} = self.config;

		for id in 0..graph.len() {
			if pinned == Some(id) {
				continue;
			}
			let Some(node) = graph.get_mut(id) else {
				continue;
			};
			node.velocity = node.velocity + node.acceleration;
			node.acceleration = node.position * -gravity - node.velocity * friction;

			let Some(node) = graph.get(id) else {
				continue;
			};
			let pull = graph
				.nodes()
				.enumerate()
				.filter(|&(other_id, other)| other_id != id && other.enabled)
				.fold(Point::default(), |sum, (other_id, other)| {
					sum + self.pair_acceleration(
						(id, node.position),
						(other_id, other.position),
						node.is_linked(other_id),
					)
				});

			if let Some(node) = graph.get_mut(id) {
				node.acceleration = node.acceleration + pull;
			}
		}

		for (id, node) in graph.nodes_mut().enumerate() {
			if pinned != Some(id) {
				advance(node);
			}
		}
	}

	/// Acceleration that `b` exerts on `a`.
	pub fn pair_acceleration(&self, a: (NodeId, Point), b: (NodeId, Point), linked: bool) -> Point {
		let cfg = &self.config;
		let delta = a.1 - b.1;
		let length = delta.length();
		let (direction, dist) = if length > MIN_DISTANCE {
			(delta * (1.0 / length), length)
		} else {
			(separation_direction(a.0, b.0), MIN_DISTANCE)
		};

		let magnitude = if linked {
			(-cfg.spring_constant * (dist - cfg.ideal_length)).clamp(-cfg.max_force, cfg.max_force)
		} else {
			(cfg.permittivity / dist.powf(1.5).max(cfg.repulse_distance_min)).min(cfg.max_force)
		};
		direction * magnitude
	}
}

/// Fixed unit vector for a coincident pair, pointing the opposite way for
/// each side of the pair.
fn separation_direction(a: NodeId, b: NodeId) -> Point {
	let (low, high) = if a < b { (a, b) } else { (b, a) };
	let angle = (low as f64 * 0.618_034 + high as f64 * 0.414_214 + 0.25) * TAU;
	let direction = Point::new(angle.cos(), angle.sin());
	if a < b { direction } else { direction * -1.0 }
}

fn advance(node: &mut Node) {
	let v = node.velocity;
	node.position = node.position + v;
	node.angle += (v.length() * 0.125).min(25.0) * sign(v.x) * sign(v.y);
}

fn sign(value: f64) -> f64 {
	if value > 0.0 {
		1.0
	} else if value < 0.0 {
		-1.0
	} else {
		0.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::leitmotif_graph::config::GraphStyle;
	use crate::components::leitmotif_graph::source::LeitmotifDocument;
	use serde_json::json;

	fn graph(linked: bool, a: Point, b: Point) -> Graph {
		let associations = if linked { json!(["b"]) } else { json!([]) };
		let doc = LeitmotifDocument::from_value(json!({
			"leitmotifs": { "a": { "name": "a", "associations": associations } },
			"trackData": { "b": "b" }
		}))
		.unwrap();
		let mut graph = Graph::build(&doc, &GraphStyle::default());
		graph.get_mut(0).unwrap().position = a;
		graph.get_mut(1).unwrap().position = b;
		graph
	}

	fn finite(p: Point) -> bool {
		p.x.is_finite() && p.y.is_finite()
	}

	#[test]
	fn spring_forces_are_equal_and_opposite() {
		let sim = Simulator::default();
		let a = (0, Point::new(-30.0, 10.0));
		let b = (1, Point::new(90.0, 170.0));

		let on_a = sim.pair_acceleration(a, b, true);
		let on_b = sim.pair_acceleration(b, a, true);

		assert!((on_a.x + on_b.x).abs() < 1e-12);
		assert!((on_a.y + on_b.y).abs() < 1e-12);
		// 200 apart, 75 beyond the rest length: pulled together.
		assert!((on_a.length() - 0.0025 * 75.0).abs() < 1e-12);
		assert!(on_a.x > 0.0 && on_a.y > 0.0);
		// Parallel to the connecting axis.
		let axis = b.1 - a.1;
		assert!((on_a.x * axis.y - on_a.y * axis.x).abs() < 1e-9);
	}

	#[test]
	fn compressed_spring_pushes_apart() {
		let sim = Simulator::default();
		let on_a = sim.pair_acceleration(
			(0, Point::new(0.0, 0.0)),
			(1, Point::new(25.0, 0.0)),
			true,
		);
		assert!((on_a.x + 0.0025 * 100.0).abs() < 1e-12);
		assert_eq!(on_a.y, 0.0);
	}

	#[test]
	fn spring_is_capped() {
		let sim = Simulator::default();
		let on_a = sim.pair_acceleration(
			(0, Point::new(0.0, 0.0)),
			(1, Point::new(1e9, 0.0)),
			true,
		);
		assert_eq!(on_a.x, 1000.0);
	}

	#[test]
	fn repulsion_uses_distance_floor() {
		let sim = Simulator::default();
		let near = sim.pair_acceleration(
			(0, Point::new(0.0, 0.0)),
			(1, Point::new(10.0, 0.0)),
			false,
		);
		assert!((near.x + 250.0 / 127.0).abs() < 1e-12);

		let far = sim.pair_acceleration(
			(0, Point::new(0.0, 0.0)),
			(1, Point::new(0.0, 400.0)),
			false,
		);
		assert!((far.y + 250.0 / 8000.0).abs() < 1e-12);
	}

	#[test]
	fn coincident_nodes_separate_without_nan() {
		let sim = Simulator::default();
		let mut graph = graph(false, Point::new(5.0, 5.0), Point::new(5.0, 5.0));

		sim.step(&mut graph, None);
		sim.step(&mut graph, None);

		let a = graph.get(0).unwrap();
		let b = graph.get(1).unwrap();
		for node in [a, b] {
			assert!(finite(node.position));
			assert!(finite(node.velocity));
			assert!(finite(node.acceleration));
		}
		assert!(a.position.distance(b.position) > 0.0);
	}

	#[test]
	fn near_coincident_nodes_stay_finite() {
		let sim = Simulator::default();
		for gap in [1e-300, 1e-12, 1e-7] {
			let mut graph = graph(false, Point::new(0.0, 0.0), Point::new(gap, 0.0));
			sim.step(&mut graph, None);
			sim.step(&mut graph, None);
			for node in graph.nodes() {
				assert!(finite(node.position));
				assert!(finite(node.velocity));
			}
		}
	}

	#[test]
	fn coincident_direction_is_antisymmetric() {
		let forward = separation_direction(3, 8);
		let backward = separation_direction(8, 3);
		assert!((forward.length() - 1.0).abs() < 1e-12);
		assert_eq!(forward, backward * -1.0);
	}

	#[test]
	fn velocity_uses_previous_acceleration() {
		let sim = Simulator::default();
		let mut graph = graph(false, Point::new(100.0, 0.0), Point::new(100.0, 0.0));
		graph.set_enabled("b", false);

		sim.step(&mut graph, None);
		let a = graph.get(0).unwrap();
		assert_eq!(a.velocity, Point::default());
		assert_eq!(a.position, Point::new(100.0, 0.0));
		assert!((a.acceleration.x + 0.0005 * 100.0).abs() < 1e-12);

		sim.step(&mut graph, None);
		let a = graph.get(0).unwrap();
		assert!((a.velocity.x + 0.05).abs() < 1e-12);
		assert!((a.position.x - 99.95).abs() < 1e-12);
	}

	#[test]
	fn mirrored_pair_stays_mirrored() {
		let sim = Simulator::default();
		let mut graph = graph(true, Point::new(-150.0, 40.0), Point::new(150.0, -40.0));
		for _ in 0..25 {
			sim.step(&mut graph, None);
		}
		let a = graph.get(0).unwrap().position;
		let b = graph.get(1).unwrap().position;
		assert!((a.x + b.x).abs() < 1e-9);
		assert!((a.y + b.y).abs() < 1e-9);
	}

	#[test]
	fn pinned_node_is_not_integrated_but_still_pushes() {
		let sim = Simulator::default();
		let mut graph = graph(false, Point::new(0.0, 0.0), Point::new(20.0, 0.0));
		graph.get_mut(0).unwrap().velocity = Point::new(3.0, 3.0);

		for _ in 0..3 {
			sim.step(&mut graph, Some(0));
		}

		let pinned = graph.get(0).unwrap();
		assert_eq!(pinned.position, Point::new(0.0, 0.0));
		assert_eq!(pinned.velocity, Point::new(3.0, 3.0));
		assert!(graph.get(1).unwrap().position.x > 20.0);
	}

	#[test]
	fn disabled_nodes_exert_no_force() {
		let sim = Simulator::default();
		let mut graph = graph(false, Point::new(0.0, 0.0), Point::new(10.0, 0.0));
		graph.set_enabled("b", false);

		sim.step(&mut graph, None);
		assert_eq!(graph.get(0).unwrap().acceleration, Point::default());
	}

	#[test]
	fn rotation_follows_velocity_quadrant() {
		let mut node = graph(false, Point::default(), Point::default()).get(0).unwrap().clone();
		node.velocity = Point::new(0.0, 8.0);
		advance(&mut node);
		assert_eq!(node.angle, 0.0);

		node.velocity = Point::new(-3.0, 4.0);
		advance(&mut node);
		assert!((node.angle + 0.625).abs() < 1e-12);

		node.velocity = Point::new(1000.0, 1000.0);
		advance(&mut node);
		assert!((node.angle - 24.375).abs() < 1e-12);
	}

	#[test]
	fn empty_graph_steps_cleanly() {
		let mut graph = Graph::default();
		Simulator::default().step(&mut graph, None);
		assert!(graph.is_empty());
	}
}
