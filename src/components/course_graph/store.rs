//! Append-only node/link collections with validated insertion.

use std::collections::HashMap;

use super::error::GraphError;
use super::types::{Link, Node, NodeKind};

/// Category totals derived from the store, used to seed
/// [`NodeIdentityState`](super::identity::NodeIdentityState).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CategoryCounts {
	/// Highest course number present (0 if there are no courses).
	pub max_course_id: u32,
	/// Number of module nodes.
	pub module_count: u32,
}

/// Owns the diagram's nodes and links for one session.
///
/// Collections are append-only: nodes and links enter through validated
/// insertion and are never mutated or removed afterwards. Every successful
/// mutation bumps a generation counter; the rendering host holds a live
/// reference to the session and reconciles against the generation on its
/// next frame, so an insertion is always visible by then.
#[derive(Debug)]
pub struct GraphStore {
	nodes: Vec<Node>,
	links: Vec<Link>,
	index: HashMap<String, usize>,
	generation: u64,
}

impl GraphStore {
	/// Builds a store from the initial dataset, validating ids and link
	/// endpoints. No partially constructed store escapes a failure.
	pub fn load(nodes: Vec<Node>, links: Vec<Link>) -> Result<Self, GraphError> {
		let mut store = GraphStore {
			nodes: Vec::new(),
			links: Vec::new(),
			index: HashMap::new(),
			generation: 0,
		};
		for node in nodes {
			store.add_node(node)?;
		}
		for link in links {
			store.add_link(link)?;
		}
		Ok(store)
	}

	/// Appends a node. The id must not already be present.
	pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
		if self.index.contains_key(&node.id) {
			return Err(GraphError::DuplicateId(node.id));
		}
		self.index.insert(node.id.clone(), self.nodes.len());
		self.nodes.push(node);
		self.generation += 1;
		Ok(())
	}

	/// Appends a link. Both endpoints must resolve to nodes already present;
	/// on failure the store is left untouched.
	pub fn add_link(&mut self, link: Link) -> Result<(), GraphError> {
		for endpoint in [&link.source_id, &link.target_id] {
			if !self.index.contains_key(endpoint.as_str()) {
				return Err(GraphError::DanglingReference {
					label: link.label.clone(),
					missing: endpoint.clone(),
				});
			}
		}
		self.links.push(link);
		self.generation += 1;
		Ok(())
	}

	/// Removes the most recently appended node, unwinding a failed two-step
	/// insertion before the host has observed it. A no-op for any other id.
	pub(crate) fn retract_node(&mut self, id: &str) {
		if self.nodes.last().is_some_and(|node| node.id == id) {
			self.nodes.pop();
			self.index.remove(id);
			self.generation += 1;
		}
	}

	/// Maximum course number and module count across the store.
	pub fn category_counts(&self) -> CategoryCounts {
		let mut counts = CategoryCounts::default();
		for node in &self.nodes {
			match &node.kind {
				NodeKind::Course { course_id } => {
					counts.max_course_id = counts.max_course_id.max(*course_id);
				}
				NodeKind::Module { .. } => counts.module_count += 1,
			}
		}
		counts
	}

	/// Looks up a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.index.get(id).map(|&i| &self.nodes[i])
	}

	/// Whether a node with this id is present.
	pub fn contains(&self, id: &str) -> bool {
		self.index.contains_key(id)
	}

	/// All nodes, in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// All links, in insertion order.
	pub fn links(&self) -> &[Link] {
		&self.links
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of links.
	pub fn link_count(&self) -> usize {
		self.links.len()
	}

	/// Topology generation, bumped by every successful mutation.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Position write channel for the layout engine. The core itself never
	/// writes coordinates, and position updates do not advance the
	/// generation.
	pub fn assign_position(&mut self, id: &str, x: f64, y: f64) {
		if let Some(&i) = self.index.get(id) {
			self.nodes[i].x = x;
			self.nodes[i].y = y;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn course(id: &str, course_id: u32, level: u32) -> Node {
		Node {
			id: id.to_string(),
			name: id.to_string(),
			level,
			color: "lightblue".to_string(),
			kind: NodeKind::Course { course_id },
			x: 0.0,
			y: 0.0,
		}
	}

	fn module(id: &str, level: u32) -> Node {
		Node {
			id: id.to_string(),
			name: id.to_string(),
			level,
			color: "lightblue".to_string(),
			kind: NodeKind::Module {
				image_url: String::new(),
			},
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
	fn load_rejects_dangling_links() {
		let err = GraphStore::load(vec![course("a", 1, 0)], vec![link("a", "ghost")])
			.expect_err("dangling link should fail");
		assert_eq!(
			err,
			GraphError::DanglingReference {
				label: "Link: a to ghost".to_string(),
				missing: "ghost".to_string(),
			}
		);
	}

	#[test]
	fn add_node_rejects_duplicate_ids() {
		let mut store = GraphStore::load(vec![course("a", 1, 0)], vec![]).expect("load");
		let err = store.add_node(course("a", 2, 1)).expect_err("duplicate id");
		assert_eq!(err, GraphError::DuplicateId("a".to_string()));
		assert_eq!(store.node_count(), 1);
	}

	#[test]
	fn add_link_failure_leaves_counts_unchanged() {
		let mut store =
			GraphStore::load(vec![course("a", 1, 0), module("b", 1)], vec![link("a", "b")])
				.expect("load");
		let err = store.add_link(link("a", "ghost")).expect_err("dangling");
		assert!(matches!(err, GraphError::DanglingReference { .. }));
		assert_eq!(store.node_count(), 2);
		assert_eq!(store.link_count(), 1);
	}

	#[test]
	fn category_counts_track_max_course_and_module_count() {
		let store = GraphStore::load(
			vec![course("a", 3, 0), course("b", 7, 1), module("c", 1)],
			vec![],
		)
		.expect("load");
		assert_eq!(
			store.category_counts(),
			CategoryCounts {
				max_course_id: 7,
				module_count: 1,
			}
		);
	}

	#[test]
	fn empty_store_counts_are_zero() {
		let store = GraphStore::load(vec![], vec![]).expect("load");
		assert_eq!(store.category_counts(), CategoryCounts::default());
	}

	#[test]
	fn generation_advances_on_mutation_but_not_position() {
		let mut store = GraphStore::load(vec![course("a", 1, 0)], vec![]).expect("load");
		let before = store.generation();
		store.add_node(module("b", 1)).expect("add node");
		store.add_link(link("a", "b")).expect("add link");
		assert_eq!(store.generation(), before + 2);

		let topo = store.generation();
		store.assign_position("b", 12.0, -3.5);
		assert_eq!(store.generation(), topo);
		let b = store.node("b").expect("b present");
		assert_eq!((b.x, b.y), (12.0, -3.5));
	}

	#[test]
	fn retract_removes_only_the_latest_node() {
		let mut store = GraphStore::load(vec![course("a", 1, 0)], vec![]).expect("load");
		store.add_node(module("b", 1)).expect("add node");
		store.retract_node("a");
		assert!(store.contains("a"));
		store.retract_node("b");
		assert!(!store.contains("b"));
		assert_eq!(store.node_count(), 1);
	}
}
