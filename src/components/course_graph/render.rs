//! Canvas rendering: the frame pass over links and nodes, and the per-node
//! drawing rule dispatched through the host widget.

use std::cell::RefCell;
use std::f64::consts::PI;

use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::config;
use super::identity::NodeIdentityState;
use super::types::{Link, Node, NodeKind};
use super::widget::GraphWidget;

/// Node size at the root level before zoom compensation.
pub const BASE_SIZE: f64 = 18.0;
/// Smallest node size before zoom compensation.
pub const MIN_SIZE: f64 = 4.0;
/// Size decrease per hierarchy level.
pub const LEVEL_FACTOR: f64 = 1.5;
/// Label font size in screen pixels.
pub const LABEL_FONT_SIZE: f64 = 9.0;

const BACKGROUND_COLOR: &str = "#ffffff";

/// Node radius for a hierarchy level, compensated for the camera scale so
/// the on-screen size stays stable across zoom levels. Deeper levels shrink
/// down to a visible floor.
pub fn node_radius(level: u32, global_scale: f64) -> f64 {
	(BASE_SIZE - LEVEL_FACTOR * level as f64).max(MIN_SIZE) / global_scale
}

/// Display label: courses carry their number, modules their name alone.
pub fn node_label(node: &Node) -> String {
	match &node.kind {
		NodeKind::Course { course_id } => format!("{course_id}. {}", node.name),
		NodeKind::Module { .. } => node.name.clone(),
	}
}

/// Draws a single node.
///
/// Never fails: an unready or failed avatar degrades to nothing drawn this
/// frame and is retried automatically once the asset completes.
pub fn draw_node(
	node: &Node,
	identity: &RefCell<NodeIdentityState>,
	ctx: &CanvasRenderingContext2d,
	global_scale: f64,
	fill_override: Option<&str>,
) {
	let radius = node_radius(node.level, global_scale);
	let font_size = LABEL_FONT_SIZE / global_scale;

	match &node.kind {
		NodeKind::Course { .. } => {
			let fill = fill_override.unwrap_or_else(|| config::level_color(node.level));
			draw_circle(ctx, node.x, node.y, radius, fill);
		}
		NodeKind::Module { image_url } => {
			let mut identity = identity.borrow_mut();
			let Some(handle) = identity.image(&node.id, image_url) else {
				return;
			};
			if !handle.is_ready() {
				return;
			}
			draw_avatar(ctx, handle.element(), node.x, node.y, radius);
			if let Some(color) = fill_override {
				draw_ring(ctx, node.x, node.y, radius, color, global_scale);
			}
		}
	}

	ctx.set_font(&format!("{font_size}px Arial"));
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str("black");
	let _ = ctx.fill_text(&node_label(node), node.x, node.y + radius + font_size);
}

/// Renders one frame: background, links with directional arrows, then each
/// node through the widget's registered draw callback.
pub fn render(widget: &GraphWidget, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	ctx.set_fill_style_str(BACKGROUND_COLOR);
	ctx.fill_rect(0.0, 0.0, width, height);

	let Some(session) = widget.session() else {
		return;
	};
	let store = session.store.borrow();
	let k = widget.transform.k;

	ctx.save();
	let _ = ctx.translate(widget.transform.x, widget.transform.y);
	let _ = ctx.scale(k, k);

	for (index, link) in store.links().iter().enumerate() {
		let (Some(source), Some(target)) =
			(store.node(&link.source_id), store.node(&link.target_id))
		else {
			continue;
		};
		draw_link(widget, ctx, index, link, source, target, k);
	}

	if let Some(draw) = widget.node_draw() {
		for node in store.nodes() {
			draw(node, ctx, k);
		}
	}

	ctx.restore();
}

#[allow(clippy::too_many_arguments)]
fn draw_link(
	widget: &GraphWidget,
	ctx: &CanvasRenderingContext2d,
	index: usize,
	link: &Link,
	source: &Node,
	target: &Node,
	k: f64,
) {
	let (x1, y1, x2, y2) = (source.x, source.y, target.x, target.y);
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);

	let source_radius = node_radius(source.level, k);
	let target_radius = node_radius(target.level, k);
	let arrow = widget.visuals().arrow_length;

	ctx.set_stroke_style_str(&widget.link_color(index, link));
	ctx.set_line_width(1.0 / k);
	ctx.begin_path();
	ctx.move_to(x1 + ux * source_radius, y1 + uy * source_radius);
	ctx.line_to(
		x2 - ux * (target_radius + arrow),
		y2 - uy * (target_radius + arrow),
	);
	ctx.stroke();

	// Arrowhead sits against the target node's rim.
	ctx.set_fill_style_str(&widget.arrow_color(index, link));
	let (tip_x, tip_y) = (x2 - ux * target_radius, y2 - uy * target_radius);
	let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
	let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);

	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64, fill: &str) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(fill);
	ctx.fill();
}

fn draw_avatar(ctx: &CanvasRenderingContext2d, img: &HtmlImageElement, x: f64, y: f64, radius: f64) {
	ctx.save();
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.clip();
	let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
		img,
		x - radius,
		y - radius,
		2.0 * radius,
		2.0 * radius,
	);
	ctx.restore();
}

fn draw_ring(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	color: &str,
	global_scale: f64,
) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(color);
	ctx.set_line_width(2.0 / global_scale);
	ctx.stroke();
}

#[cfg(test)]
mod tests {
	use super::*;

	fn course(level: u32) -> Node {
		Node {
			id: "algebra".to_string(),
			name: "Algebra".to_string(),
			level,
			color: "lightblue".to_string(),
			kind: NodeKind::Course { course_id: 3 },
			x: 0.0,
			y: 0.0,
		}
	}

	#[test]
	fn radius_shrinks_with_level_down_to_the_floor() {
		assert_eq!(node_radius(0, 1.0), 18.0);
		assert_eq!(node_radius(1, 1.0), 16.5);
		for level in 0..30 {
			assert!(node_radius(level + 1, 1.0) <= node_radius(level, 1.0));
			assert!(node_radius(level, 1.0) >= MIN_SIZE);
		}
		assert_eq!(node_radius(30, 1.0), MIN_SIZE);
	}

	#[test]
	fn radius_compensates_for_zoom() {
		assert_eq!(node_radius(0, 2.0), 9.0);
		assert_eq!(node_radius(30, 2.0), MIN_SIZE / 2.0);
	}

	#[test]
	fn labels_carry_the_course_number() {
		assert_eq!(node_label(&course(1)), "3. Algebra");

		let module = Node {
			kind: NodeKind::Module {
				image_url: "a.svg".to_string(),
			},
			..course(1)
		};
		assert_eq!(node_label(&module), "Algebra");
	}
}
