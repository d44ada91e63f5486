//! Visual-mapping parameters and one-time host wiring.

use std::rc::Rc;

use log::debug;

use super::interact;
use super::session::GraphSession;
use super::widget::GraphWidget;

/// Link stroke color.
pub const LINK_COLOR: &str = "#999";
/// Stroke color for links connected to the hovered node.
pub const ACTIVE_LINK_COLOR: &str = "#FF79CD";
/// Directional arrow color.
pub const LINK_ARROW_COLOR: &str = "#808080";
/// Fill for nodes connected to the hovered node.
pub const HIGHLIGHT_NODE_COLOR: &str = "#638C6D";
/// Fallback node fill when the dataset supplies no color.
pub const DEFAULT_NODE_FILL: &str = "lightblue";
/// Lower camera zoom bound.
pub const MIN_ZOOM: f64 = 2.2;
/// Initial camera center in graph coordinates.
pub const CENTER_AT: (f64, f64) = (0.0, 20.0);
/// Repulsion distance cutoff handed to the layout engine.
pub const CHARGE_DISTANCE_MAX: f64 = 85.0;
/// Directional arrow base length.
pub const ARROW_LENGTH: f64 = 3.0;
/// Numerator of the zoom-compensated arrow length (`ARROW_ZOOM_SCALE / k`).
pub const ARROW_ZOOM_SCALE: f64 = 12.0;

/// Course fill palette indexed by `level - 1`.
pub const LEVEL_PALETTE: &[&str] = &["#5E1675", "#8F3BAD", "#C170E6", "#F2A6FF"];

/// Palette color for a course at the given level. Levels outside the palette
/// (the root included) clamp to the last entry.
pub fn level_color(level: u32) -> &'static str {
	let last = LEVEL_PALETTE.len() - 1;
	let index = (level as usize).checked_sub(1).unwrap_or(last).min(last);
	LEVEL_PALETTE[index]
}

/// Default avatar URL for a freshly numbered module.
pub fn default_image(num: u32) -> String {
	format!("https://api.multiavatar.com/Bin{num}%20Bond.svg")
}

/// One-time wiring of the visual parameters and draw callbacks into the
/// host widget.
///
/// Reconfiguring an already configured widget rebinds the data source and
/// leaves every other visual parameter untouched.
pub fn configure(widget: &mut GraphWidget, session: &Rc<GraphSession>) {
	if widget.is_configured() {
		debug!("course-graph: rebinding data source");
		widget.bind_data(Rc::clone(session));
		return;
	}

	widget.bind_data(Rc::clone(session));

	let visuals = widget.visuals_mut();
	visuals.link_color = LINK_COLOR.to_string();
	visuals.arrow_color = LINK_ARROW_COLOR.to_string();
	visuals.arrow_length = ARROW_LENGTH;
	visuals.node_fill = DEFAULT_NODE_FILL.to_string();
	visuals.min_zoom = MIN_ZOOM;
	visuals.center = CENTER_AT;
	visuals.charge_distance_max = CHARGE_DISTANCE_MAX;

	// Keeps arrows visually proportionate at any zoom.
	widget.set_on_zoom(Box::new(|k, visuals| {
		visuals.arrow_length = ARROW_ZOOM_SCALE / k;
	}));

	// Base styling registers the same callbacks a hover reset does.
	interact::handle_hover(widget, None, session);

	widget.mark_configured();
}
