//! Hover highlighting and click-driven node creation.

use std::collections::HashSet;
use std::rc::Rc;

use log::debug;

use super::config;
use super::error::GraphError;
use super::render;
use super::session::GraphSession;
use super::types::{Link, Node, NodeKind};
use super::widget::GraphWidget;

/// Form input backing a click-created node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewNodeForm {
	/// Display name of the new node.
	pub name: String,
	/// Either `"course"` or `"module"`.
	pub node_type: String,
}

/// Lowercases a name and collapses whitespace runs into single hyphens.
pub fn slugify(name: &str) -> String {
	let lower = name.to_lowercase();
	lower.split_whitespace().collect::<Vec<_>>().join("-")
}

/// Connected links (by index) and nodes (by id) for a hovered node, gathered
/// in a single pass over the link list.
fn find_connected(node_id: &str, links: &[Link]) -> (HashSet<String>, HashSet<usize>) {
	let mut nodes = HashSet::new();
	let mut link_indices = HashSet::new();
	for (index, link) in links.iter().enumerate() {
		if link.source_id == node_id || link.target_id == node_id {
			link_indices.insert(index);
			nodes.insert(link.source_id.clone());
			nodes.insert(link.target_id.clone());
		}
	}
	(nodes, link_indices)
}

/// Recomputes the hover neighborhood from scratch and re-registers the
/// widget's draw callbacks so connected nodes and links render highlighted.
///
/// Stateless between invocations; `None` restores base styling everywhere.
pub fn handle_hover(widget: &mut GraphWidget, hovered_id: Option<&str>, session: &Rc<GraphSession>) {
	let (connected_nodes, connected_links) = match hovered_id {
		Some(id) => find_connected(id, session.store.borrow().links()),
		None => (HashSet::new(), HashSet::new()),
	};

	let draw_session = Rc::clone(session);
	widget.set_node_draw(Rc::new(move |node, ctx, global_scale| {
		let fill = connected_nodes
			.contains(&node.id)
			.then_some(config::HIGHLIGHT_NODE_COLOR);
		render::draw_node(node, &draw_session.identity, ctx, global_scale, fill);
	}));

	let links = Rc::new(connected_links);
	let for_strokes = Rc::clone(&links);
	widget.set_link_color(Rc::new(move |index, _| {
		if for_strokes.contains(&index) {
			config::ACTIVE_LINK_COLOR.to_string()
		} else {
			config::LINK_COLOR.to_string()
		}
	}));
	widget.set_arrow_color(Rc::new(move |index, _| {
		if links.contains(&index) {
			config::ACTIVE_LINK_COLOR.to_string()
		} else {
			config::LINK_ARROW_COLOR.to_string()
		}
	}));
}

/// Creates a node and its link from the clicked parent and the submitted
/// form, appending both to the store.
///
/// The two insertions happen in one synchronous call, so no frame observes
/// the link without its node; a link failure rolls the node back so no
/// orphan remains either. Returns the new node's id.
pub fn handle_click(
	widget: &mut GraphWidget,
	parent_id: &str,
	session: &Rc<GraphSession>,
	form: &NewNodeForm,
) -> Result<String, GraphError> {
	let name = form.name.trim();
	if name.is_empty() {
		return Err(GraphError::InvalidInput("name must not be empty".to_string()));
	}
	let is_course = match form.node_type.as_str() {
		"course" => true,
		"module" => false,
		other => {
			return Err(GraphError::InvalidInput(format!(
				"unknown node type {other:?}"
			)));
		}
	};

	let mut store = session.store.borrow_mut();
	let parent = store
		.node(parent_id)
		.ok_or_else(|| GraphError::UnknownNode(parent_id.to_string()))?;
	let (parent_name, parent_level) = (parent.name.clone(), parent.level);

	let new_id = slugify(name);
	if store.contains(&new_id) {
		return Err(GraphError::DuplicateId(new_id));
	}

	// Counters advance only once the insertion can no longer fail.
	let kind = if is_course {
		NodeKind::Course {
			course_id: session.identity.borrow_mut().increment_courses(),
		}
	} else {
		NodeKind::Module {
			image_url: config::default_image(session.identity.borrow_mut().increment_images()),
		}
	};

	let node = Node {
		id: new_id.clone(),
		name: name.to_string(),
		level: parent_level + 1,
		color: config::DEFAULT_NODE_FILL.to_string(),
		kind,
		x: 0.0,
		y: 0.0,
	};
	let link = Link {
		source_id: parent_id.to_string(),
		target_id: new_id.clone(),
		label: format!("Link: {parent_name} to {name}"),
	};

	store.add_node(node)?;
	if let Err(err) = store.add_link(link) {
		store.retract_node(&new_id);
		return Err(err);
	}
	drop(store);

	debug!("course-graph: added node {new_id} under {parent_id}");
	widget.notify_data_changed();
	Ok(new_id)
}
