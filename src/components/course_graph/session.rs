//! Session context threading the store and identity state through operations.

use std::cell::RefCell;
use std::rc::Rc;

use log::info;

use super::error::GraphError;
use super::identity::NodeIdentityState;
use super::store::GraphStore;
use super::types::{GraphData, Link, Node};

/// Per-session context owning the graph collections and identity counters.
///
/// The store and the image cache sit behind separate cells so that a render
/// callback can populate the avatar cache while the frame loop is reading
/// node positions from the store.
#[derive(Debug)]
pub struct GraphSession {
	/// The append-only node/link collections.
	pub store: RefCell<GraphStore>,
	/// Counters and the avatar cache.
	pub identity: RefCell<NodeIdentityState>,
}

/// Builds the session from the initial dataset.
///
/// The identity counters are seeded from the dataset's category counts
/// before any interaction can advance them.
pub fn load_graph(data: GraphData) -> Result<Rc<GraphSession>, GraphError> {
	let nodes: Vec<Node> = data.nodes.into_iter().map(Node::from_wire).collect();
	let links: Vec<Link> = data.links.into_iter().map(Link::from_wire).collect();
	let store = GraphStore::load(nodes, links)?;
	let identity = NodeIdentityState::new(store.category_counts());
	info!(
		"course-graph: loaded {} nodes, {} links",
		store.node_count(),
		store.link_count()
	);
	Ok(Rc::new(GraphSession {
		store: RefCell::new(store),
		identity: RefCell::new(identity),
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::course_graph::error::GraphError;
	use crate::components::course_graph::types::{GraphLink, GraphNode};

	fn wire_node(id: &str, course_id: Option<u32>) -> GraphNode {
		GraphNode {
			id: id.to_string(),
			name: id.to_string(),
			level: if course_id.is_some() { 0 } else { 1 },
			color: None,
			course_id,
			img: None,
		}
	}

	#[test]
	fn load_graph_seeds_identity_from_category_counts() {
		let data = GraphData {
			nodes: vec![
				wire_node("a", Some(3)),
				wire_node("b", Some(7)),
				wire_node("c", None),
			],
			links: vec![],
		};
		let session = load_graph(data).expect("load");
		assert_eq!(session.store.borrow().node_count(), 3);
		assert_eq!(session.identity.borrow_mut().increment_courses(), 8);
		assert_eq!(session.identity.borrow_mut().increment_images(), 2);
	}

	#[test]
	fn load_graph_rejects_dangling_links() {
		let data = GraphData {
			nodes: vec![wire_node("a", Some(1))],
			links: vec![GraphLink {
				source: "a".to_string(),
				target: "ghost".to_string(),
				name: "Link: a to ghost".to_string(),
			}],
		};
		let err = load_graph(data).expect_err("dangling link should fail");
		assert!(matches!(err, GraphError::DanglingReference { .. }));
	}
}
