//! Graph data structures: the JSON wire format and the validated domain model.

use serde::Deserialize;

use super::config;

/// A node as it appears in the initial dataset.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier, a URL/DOM-safe slug derived from the name.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Hierarchy depth from the root (0).
	#[serde(default)]
	pub level: u32,
	/// Optional CSS fill override.
	#[serde(default)]
	pub color: Option<String>,
	/// Course number, present only on course nodes.
	#[serde(default, rename = "courseId")]
	pub course_id: Option<u32>,
	/// Avatar image URL, present only on module nodes.
	#[serde(default)]
	pub img: Option<String>,
}

/// A directed edge between two nodes in the dataset.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Display label, typically "Link: A to B".
	pub name: String,
}

/// Complete dataset: nodes and links.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

/// Classification of a node, fixed at construction.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
	/// A course carrying its session-unique number.
	Course {
		/// Monotonically assigned course number.
		course_id: u32,
	},
	/// A module rendered with an avatar image.
	Module {
		/// Avatar image URL; may be empty, in which case the node never
		/// reaches readiness and is simply not drawn.
		image_url: String,
	},
}

/// A validated node owned by the store.
#[derive(Clone, Debug)]
pub struct Node {
	/// Unique identifier within the store.
	pub id: String,
	/// Display name.
	pub name: String,
	/// Hierarchy depth from the root (0).
	pub level: u32,
	/// Fallback fill color.
	pub color: String,
	/// Course or module classification.
	pub kind: NodeKind,
	/// Screen x coordinate, written exclusively by the layout engine.
	pub x: f64,
	/// Screen y coordinate, written exclusively by the layout engine.
	pub y: f64,
}

impl Node {
	/// Builds a domain node from its wire form.
	///
	/// A present `courseId` classifies the node as a course; anything else is
	/// a module whose avatar URL is `img` or empty.
	pub fn from_wire(raw: GraphNode) -> Self {
		let kind = match raw.course_id {
			Some(course_id) => NodeKind::Course { course_id },
			None => NodeKind::Module {
				image_url: raw.img.unwrap_or_default(),
			},
		};
		Node {
			id: raw.id,
			name: raw.name,
			level: raw.level,
			color: raw
				.color
				.unwrap_or_else(|| config::DEFAULT_NODE_FILL.to_string()),
			kind,
			x: 0.0,
			y: 0.0,
		}
	}

	/// Whether this node is a course.
	pub fn is_course(&self) -> bool {
		matches!(self.kind, NodeKind::Course { .. })
	}
}

/// A directed edge owned by the store.
#[derive(Clone, Debug)]
pub struct Link {
	/// Source node id.
	pub source_id: String,
	/// Target node id.
	pub target_id: String,
	/// Display label.
	pub label: String,
}

impl Link {
	/// Builds a domain link from its wire form.
	pub fn from_wire(raw: GraphLink) -> Self {
		Link {
			source_id: raw.source,
			target_id: raw.target,
			label: raw.name,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_the_wire_format() {
		let data: GraphData = serde_json::from_str(
			r##"{
				"nodes": [
					{ "id": "rust", "name": "Rust", "level": 0, "courseId": 1 },
					{ "id": "intro", "name": "Intro", "level": 1, "img": "intro.svg", "color": "#abc" }
				],
				"links": [
					{ "source": "rust", "target": "intro", "name": "Link: Rust to Intro" }
				]
			}"##,
		)
		.expect("dataset should decode");

		assert_eq!(data.nodes.len(), 2);
		assert_eq!(data.links.len(), 1);

		let course = Node::from_wire(data.nodes[0].clone());
		assert_eq!(course.kind, NodeKind::Course { course_id: 1 });
		assert_eq!(course.color, config::DEFAULT_NODE_FILL);

		let module = Node::from_wire(data.nodes[1].clone());
		assert_eq!(
			module.kind,
			NodeKind::Module {
				image_url: "intro.svg".to_string()
			}
		);
		assert_eq!(module.color, "#abc");

		let link = Link::from_wire(data.links[0].clone());
		assert_eq!(link.source_id, "rust");
		assert_eq!(link.target_id, "intro");
		assert_eq!(link.label, "Link: Rust to Intro");
	}

	#[test]
	fn course_id_takes_precedence_over_img() {
		let raw: GraphNode = serde_json::from_str(
			r#"{ "id": "x", "name": "X", "level": 1, "courseId": 4, "img": "x.svg" }"#,
		)
		.expect("node should decode");
		let node = Node::from_wire(raw);
		assert_eq!(node.kind, NodeKind::Course { course_id: 4 });
	}

	#[test]
	fn missing_kind_fields_default_to_module() {
		let raw: GraphNode = serde_json::from_str(r#"{ "id": "c", "name": "C" }"#)
			.expect("node should decode");
		let node = Node::from_wire(raw);
		assert!(!node.is_course());
		assert_eq!(
			node.kind,
			NodeKind::Module {
				image_url: String::new()
			}
		);
	}
}
