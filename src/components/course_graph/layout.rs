//! Adapter around the `force_graph` simulation: the only writer of node
//! positions.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::store::GraphStore;
use super::widget::WidgetVisuals;

/// Simulation body metadata mapping back to a store node.
#[derive(Clone, Debug, Default)]
struct NodeBody {
	id: String,
}

/// Wraps the force simulation and reconciles it against the append-only
/// store: nodes and links the simulation has not seen become bodies and
/// springs, and computed positions flow back through the store's position
/// channel.
pub struct LayoutEngine {
	sim: ForceGraph<NodeBody, ()>,
	indices: HashMap<String, DefaultNodeIdx>,
	synced_nodes: usize,
	synced_links: usize,
}

impl LayoutEngine {
	/// Creates the simulation with the configured charge cutoff. The
	/// simulation clamps repulsion by force rather than by distance, so the
	/// cutoff maps onto that clamp.
	pub fn new(visuals: &WidgetVisuals) -> Self {
		let sim = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: visuals.charge_distance_max as f32,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		LayoutEngine {
			sim,
			indices: HashMap::new(),
			synced_nodes: 0,
			synced_links: 0,
		}
	}

	/// Appends bodies and springs for anything the store added since the
	/// last sync. New nodes seed next to their parent when a link already
	/// names one, otherwise on a ring around the origin.
	pub fn sync(&mut self, store: &GraphStore) {
		let nodes = store.nodes();
		let total = nodes.len().max(1);
		for (offset, node) in nodes.iter().enumerate().skip(self.synced_nodes) {
			let (x, y) = self.seed_position(store, &node.id, offset, total);
			let idx = self.sim.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeBody {
					id: node.id.clone(),
				},
			});
			self.indices.insert(node.id.clone(), idx);
		}
		self.synced_nodes = nodes.len();

		let links = store.links();
		for link in links.iter().skip(self.synced_links) {
			if let (Some(&src), Some(&tgt)) = (
				self.indices.get(&link.source_id),
				self.indices.get(&link.target_id),
			) {
				self.sim.add_edge(src, tgt, EdgeData::default());
			}
		}
		self.synced_links = links.len();
	}

	fn seed_position(
		&self,
		store: &GraphStore,
		node_id: &str,
		offset: usize,
		total: usize,
	) -> (f32, f32) {
		// A click-created node spawns beside its parent instead of flying in
		// from the seed ring.
		for link in store.links() {
			if link.target_id != node_id {
				continue;
			}
			if let Some(&parent_idx) = self.indices.get(&link.source_id) {
				let mut parent = None;
				self.sim.visit_nodes(|node| {
					if node.index() == parent_idx {
						parent = Some((node.x(), node.y()));
					}
				});
				if let Some((px, py)) = parent {
					let angle = offset as f64 * 2.399963;
					return (
						px + (15.0 * angle.cos()) as f32,
						py + (15.0 * angle.sin()) as f32,
					);
				}
			}
		}

		let angle = offset as f64 * 2.0 * PI / total as f64;
		((100.0 * angle.cos()) as f32, (100.0 * angle.sin()) as f32)
	}

	/// Advances the simulation and writes positions back to the store.
	pub fn step(&mut self, dt: f32, store: &mut GraphStore) {
		self.sim.update(dt);
		self.sim.visit_nodes(|node| {
			store.assign_position(&node.data.user_data.id, node.x() as f64, node.y() as f64);
		});
	}

	/// Pins a node to a position while it is being dragged.
	pub fn pin(&mut self, id: &str, x: f64, y: f64) {
		if let Some(&idx) = self.indices.get(id) {
			self.sim.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.x = x as f32;
					node.data.y = y as f32;
					node.data.is_anchor = true;
				}
			});
		}
	}

	/// Anchors a node at its current position after a drag ends.
	pub fn anchor(&mut self, id: &str) {
		if let Some(&idx) = self.indices.get(id) {
			self.sim.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.is_anchor = true;
				}
			});
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::course_graph::types::{Link, Node, NodeKind};

	fn node(id: &str, level: u32) -> Node {
		Node {
			id: id.to_string(),
			name: id.to_string(),
			level,
			color: "lightblue".to_string(),
			kind: NodeKind::Course { course_id: 1 },
			x: 0.0,
			y: 0.0,
		}
	}

	fn link(source: &str, target: &str) -> Link {
		Link {
			source_id: source.to_string(),
			target_id: target.to_string(),
			label: format!("Link: {source} to {target}"),
		}
	}

	#[test]
	fn positions_flow_back_to_the_store() {
		let mut store = GraphStore::load(
			vec![node("a", 0), node("b", 1)],
			vec![link("a", "b")],
		)
		.expect("load");
		let mut layout = LayoutEngine::new(&WidgetVisuals::default());

		layout.sync(&store);
		layout.step(0.016, &mut store);

		for n in store.nodes() {
			assert!(n.x != 0.0 || n.y != 0.0, "layout should place {}", n.id);
		}
	}

	#[test]
	fn sync_picks_up_appended_nodes() {
		let mut store = GraphStore::load(vec![node("a", 0)], vec![]).expect("load");
		let mut layout = LayoutEngine::new(&WidgetVisuals::default());
		layout.sync(&store);
		layout.step(0.016, &mut store);

		store.add_node(node("b", 1)).expect("add node");
		store.add_link(link("a", "b")).expect("add link");
		layout.sync(&store);
		layout.step(0.016, &mut store);

		let b = store.node("b").expect("b present");
		assert!(b.x != 0.0 || b.y != 0.0);
	}

	#[test]
	fn pinned_nodes_stay_where_they_are_dropped() {
		let mut store = GraphStore::load(
			vec![node("a", 0), node("b", 1)],
			vec![link("a", "b")],
		)
		.expect("load");
		let mut layout = LayoutEngine::new(&WidgetVisuals::default());
		layout.sync(&store);

		layout.pin("a", 42.0, -7.0);
		layout.step(0.016, &mut store);

		let a = store.node("a").expect("a present");
		assert!((a.x - 42.0).abs() < 1.0);
		assert!((a.y + 7.0).abs() < 1.0);
	}
}
