//! Host-widget handle: data binding, visual parameters, camera transform,
//! and the draw callbacks the interaction layer re-registers.

use std::rc::Rc;

use web_sys::CanvasRenderingContext2d;

use super::session::GraphSession;
use super::types::{Link, Node};

/// Per-node draw callback, invoked once per node per frame.
pub type NodeDrawFn = Rc<dyn Fn(&Node, &CanvasRenderingContext2d, f64)>;
/// Per-link color callback, keyed by the link's index in the store.
pub type LinkColorFn = Rc<dyn Fn(usize, &Link) -> String>;
/// Zoom-change handler with mutable access to the visual parameters.
pub type ZoomHandler = Box<dyn FnMut(f64, &mut WidgetVisuals)>;

/// Visual-mapping parameters applied once by the configurator.
#[derive(Clone, Debug)]
pub struct WidgetVisuals {
	/// Stroke color for links without a registered color callback.
	pub link_color: String,
	/// Fill color for directional arrows without a registered callback.
	pub arrow_color: String,
	/// Directional arrow length in world units.
	pub arrow_length: f64,
	/// Default node fill.
	pub node_fill: String,
	/// Lower camera zoom bound.
	pub min_zoom: f64,
	/// Initial camera center in graph coordinates.
	pub center: (f64, f64),
	/// Repulsion distance cutoff handed to the layout engine.
	pub charge_distance_max: f64,
}

impl Default for WidgetVisuals {
	fn default() -> Self {
		WidgetVisuals {
			link_color: "#999999".to_string(),
			arrow_color: "#808080".to_string(),
			arrow_length: 3.0,
			node_fill: "#888888".to_string(),
			min_zoom: 0.1,
			center: (0.0, 0.0),
			charge_distance_max: 100.0,
		}
	}
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	/// Horizontal pan offset in screen pixels.
	pub x: f64,
	/// Vertical pan offset in screen pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
}

impl ViewTransform {
	/// Converts screen coordinates into graph coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}
}

/// Handle to the rendering host.
///
/// The core wires the data binding, visual parameters and draw callbacks
/// into this handle; the canvas component reads them back each frame and
/// mutates the camera from input events.
pub struct GraphWidget {
	session: Option<Rc<GraphSession>>,
	visuals: WidgetVisuals,
	/// Camera state, mutated by the component's pan/zoom handling.
	pub transform: ViewTransform,
	node_draw: Option<NodeDrawFn>,
	link_color_fn: Option<LinkColorFn>,
	arrow_color_fn: Option<LinkColorFn>,
	on_zoom: Option<ZoomHandler>,
	configured: bool,
	data_dirty: bool,
}

impl GraphWidget {
	/// Creates an unconfigured widget.
	pub fn new() -> Self {
		GraphWidget {
			session: None,
			visuals: WidgetVisuals::default(),
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			node_draw: None,
			link_color_fn: None,
			arrow_color_fn: None,
			on_zoom: None,
			configured: false,
			data_dirty: false,
		}
	}

	/// Binds the session whose store this widget renders. The next frame
	/// reconciles against the new data source.
	pub fn bind_data(&mut self, session: Rc<GraphSession>) {
		self.session = Some(session);
		self.data_dirty = true;
	}

	/// The bound session, if any.
	pub fn session(&self) -> Option<&Rc<GraphSession>> {
		self.session.as_ref()
	}

	/// Current visual parameters.
	pub fn visuals(&self) -> &WidgetVisuals {
		&self.visuals
	}

	/// Mutable visual parameters, for the configurator.
	pub fn visuals_mut(&mut self) -> &mut WidgetVisuals {
		&mut self.visuals
	}

	/// Registers the per-node draw callback.
	pub fn set_node_draw(&mut self, draw: NodeDrawFn) {
		self.node_draw = Some(draw);
	}

	/// The registered per-node draw callback.
	pub fn node_draw(&self) -> Option<&NodeDrawFn> {
		self.node_draw.as_ref()
	}

	/// Registers the per-link stroke color callback.
	pub fn set_link_color(&mut self, color: LinkColorFn) {
		self.link_color_fn = Some(color);
	}

	/// Registers the per-link arrow color callback.
	pub fn set_arrow_color(&mut self, color: LinkColorFn) {
		self.arrow_color_fn = Some(color);
	}

	/// Stroke color for a link, falling back to the configured base color.
	pub fn link_color(&self, index: usize, link: &Link) -> String {
		match &self.link_color_fn {
			Some(color) => color(index, link),
			None => self.visuals.link_color.clone(),
		}
	}

	/// Arrow color for a link, falling back to the configured base color.
	pub fn arrow_color(&self, index: usize, link: &Link) -> String {
		match &self.arrow_color_fn {
			Some(color) => color(index, link),
			None => self.visuals.arrow_color.clone(),
		}
	}

	/// Registers the zoom-change handler.
	pub fn set_on_zoom(&mut self, handler: ZoomHandler) {
		self.on_zoom = Some(handler);
	}

	/// Sets the camera zoom, clamped to the configured minimum, and lets the
	/// registered zoom handler adjust zoom-dependent visuals.
	pub fn set_zoom(&mut self, k: f64) {
		let k = k.max(self.visuals.min_zoom);
		self.transform.k = k;
		if let Some(handler) = self.on_zoom.as_mut() {
			handler(k, &mut self.visuals);
		}
	}

	/// Tells the widget its data view changed; the next frame resyncs.
	pub fn notify_data_changed(&mut self) {
		self.data_dirty = true;
	}

	/// Consumes the data-changed flag.
	pub fn take_data_dirty(&mut self) -> bool {
		std::mem::take(&mut self.data_dirty)
	}

	/// Whether `configure` has already run.
	pub fn is_configured(&self) -> bool {
		self.configured
	}

	/// Marks one-time configuration as done.
	pub fn mark_configured(&mut self) {
		self.configured = true;
	}
}

impl Default for GraphWidget {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn link(source: &str, target: &str) -> Link {
		Link {
			source_id: source.to_string(),
			target_id: target.to_string(),
			label: format!("Link: {source} to {target}"),
		}
	}

	#[test]
	fn link_colors_fall_back_to_visuals() {
		let mut widget = GraphWidget::new();
		widget.visuals_mut().link_color = "#123".to_string();
		assert_eq!(widget.link_color(0, &link("a", "b")), "#123");

		widget.set_link_color(Rc::new(|_, _| "#456".to_string()));
		assert_eq!(widget.link_color(0, &link("a", "b")), "#456");
	}

	#[test]
	fn set_zoom_clamps_and_dispatches() {
		let mut widget = GraphWidget::new();
		widget.visuals_mut().min_zoom = 2.0;
		widget.set_on_zoom(Box::new(|k, visuals| {
			visuals.arrow_length = 12.0 / k;
		}));

		widget.set_zoom(4.0);
		assert_eq!(widget.transform.k, 4.0);
		assert_eq!(widget.visuals().arrow_length, 3.0);

		widget.set_zoom(0.5);
		assert_eq!(widget.transform.k, 2.0);
		assert_eq!(widget.visuals().arrow_length, 6.0);
	}

	#[test]
	fn screen_to_graph_inverts_the_camera() {
		let transform = ViewTransform {
			x: 100.0,
			y: 50.0,
			k: 2.0,
		};
		assert_eq!(transform.screen_to_graph(100.0, 50.0), (0.0, 0.0));
		assert_eq!(transform.screen_to_graph(120.0, 40.0), (10.0, -5.0));
	}
}
