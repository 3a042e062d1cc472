//! Canvas rendering for the collaboration graph.
//!
//! Passes, back to front: background, edges, nodes, labels. Labels are
//! gated by the viewport's level-of-detail policy so zooming out trims
//! text before it clutters.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::ScaledValues;
use super::state::GraphState;
use super::theme::Theme;
use super::types::NodeKind;
use super::viewport::label_visible;

/// Renders the complete graph to the canvas.
pub fn render(state: &GraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let scale = ScaledValues::new(state.viewport.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.viewport.transform.x, state.viewport.transform.y);
	let _ = ctx.scale(state.viewport.transform.k, state.viewport.transform.k);

	draw_edges(state, ctx, &scale, theme);
	draw_nodes(state, ctx, &scale, theme);
	draw_labels(state, ctx, &scale, theme);

	ctx.restore();
}

fn draw_background(state: &GraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (w, h) = (state.viewport.width, state.viewport.height);
	if theme.use_gradient {
		let gradient = ctx
			.create_radial_gradient(w / 2.0, h / 2.0, 0.0, w / 2.0, h / 2.0, w.max(h) * 0.8)
			.unwrap();
		gradient
			.add_color_stop(0.0, &theme.background_secondary.to_css())
			.unwrap();
		gradient
			.add_color_stop(1.0, &theme.background.to_css())
			.unwrap();
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&theme.background.to_css());
	}
	ctx.fill_rect(0.0, 0.0, w, h);
}

fn draw_edges(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let nodes = state.sim.nodes();
	let max_strength = state
		.sim
		.edges()
		.iter()
		.map(|e| e.strength)
		.fold(0.0, f64::max)
		.max(1.0);

	for edge in state.sim.edges() {
		let (a, b) = (&nodes[edge.source], &nodes[edge.target]);
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);

		// Stronger collaborations draw heavier strokes; the faded look is
		// reserved for edges not touching the hovered node.
		let emphasis = 1.0 + (edge.strength / max_strength).sqrt();
		let dimmed = state
			.hovered
			.is_some_and(|h| h != edge.source && h != edge.target);
		let alpha = if dimmed { theme.edge.a * 0.35 } else { theme.edge.a };

		ctx.set_stroke_style_str(&theme.edge.with_alpha(alpha).to_css());
		ctx.set_line_width(scale.edge_line_width * emphasis);
		ctx.begin_path();
		ctx.move_to(a.x + ux * a.radius, a.y + uy * a.radius);
		ctx.line_to(b.x - ux * b.radius, b.y - uy * b.radius);
		ctx.stroke();
	}
}

fn draw_nodes(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	for (idx, node) in state.sim.nodes().iter().enumerate() {
		let color = theme.color_for(node.kind);
		let gradient = ctx
			.create_radial_gradient(
				node.x - node.radius * 0.3,
				node.y - node.radius * 0.3,
				0.0,
				node.x,
				node.y,
				node.radius,
			)
			.unwrap();
		gradient
			.add_color_stop(0.0, &color.lighten(0.4).to_css())
			.unwrap();
		gradient.add_color_stop(0.7, &color.to_css()).unwrap();
		gradient
			.add_color_stop(1.0, &color.darken(0.2).to_css())
			.unwrap();

		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, node.radius, 0.0, 2.0 * PI);
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill();

		// The focal person and the hovered node get a ring.
		if node.kind == NodeKind::Primary || state.hovered == Some(idx) {
			ctx.begin_path();
			let _ = ctx.arc(
				node.x,
				node.y,
				node.radius + scale.ring_width * 2.0,
				0.0,
				2.0 * PI,
			);
			ctx.set_stroke_style_str(&theme.ring.to_css());
			ctx.set_line_width(scale.ring_width);
			ctx.stroke();
		}
	}
}

fn draw_labels(
	state: &GraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let max_weight = state.sim.max_weight;
	ctx.set_font(&scale.label_font);
	for (idx, node) in state.sim.nodes().iter().enumerate() {
		let hovered = state.hovered == Some(idx);
		if !hovered && !label_visible(node.kind, node.weight, max_weight, scale.k) {
			continue;
		}
		ctx.set_fill_style_str(&theme.label.to_css());
		let _ = ctx.fill_text(&node.label, node.x + node.radius + 4.0, node.y + 3.0);
	}
}
