mod canvas;
mod utils;

use eframe::egui::{Align2, Color32, Pos2, Rect, vec2};

use crate::config::{ConfigError, RenderConfig};
use crate::util::short_label;

use super::geometry::Point;
use super::interaction::InteractionState;
use super::model::GraphModel;
use super::viewport::Viewport;
use utils::{blend_color, circle_visible, dim_color, draw_background, edge_visible, with_alpha};

pub use canvas::{Canvas, DisplayList, DrawCommand};

const EDGE_COLOR: Color32 = Color32::from_rgb(110, 120, 134);
const EDGE_HIGHLIGHT: Color32 = Color32::from_rgb(241, 146, 94);
const EDGE_DIMMED: Color32 = Color32::from_rgb(58, 64, 74);
const NODE_OUTLINE: Color32 = Color32::from_rgb(12, 12, 12);
const LABEL_COLOR: Color32 = Color32::from_gray(230);
const LABEL_DIMMED: Color32 = Color32::from_gray(120);
const EMPHASIS_OUTLINE: Color32 = Color32::WHITE;
const GLOW_STEP_PX: f32 = 4.0;
const LABEL_GAP_PX: f32 = 3.0;

/// Paints the graph for the current frame. Reads the model, viewport and
/// interaction state; never writes to them.
pub struct Renderer {
    config: RenderConfig,
    screen_positions: Vec<Option<Pos2>>,
    neighbor_mask: Vec<bool>,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            screen_positions: Vec::new(),
            neighbor_mask: Vec::new(),
        })
    }

    pub fn label_font_size(&self, scale: f64) -> f32 {
        (self.config.label_font_px * scale as f32)
            .clamp(self.config.min_label_font_px, self.config.max_label_font_px)
    }

    pub fn draw(
        &mut self,
        model: &GraphModel,
        viewport: &Viewport,
        interaction: &InteractionState,
        canvas: &mut impl Canvas,
    ) {
        let (width, height) = viewport.size();
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(width as f32, height as f32));
        let scale = viewport.scale();
        let origin = viewport.world_to_screen(Point::ZERO);

        draw_background(
            canvas,
            rect,
            Pos2::new(origin.x as f32, origin.y as f32),
            scale as f32,
            self.config.show_grid,
        );

        if model.is_empty() {
            return;
        }

        self.project(model, viewport);

        let focus = interaction
            .focus_id()
            .and_then(|id| model.index_of(id));
        self.neighbor_mask.clear();
        self.neighbor_mask.resize(model.node_count(), false);
        if let Some(focus) = focus {
            for &neighbor in model.neighbor_indices(focus) {
                self.neighbor_mask[neighbor] = true;
            }
        }

        let zoom_sqrt = (scale as f32).sqrt();
        let mut edge_labels = Vec::new();
        for (edge, &(source, target)) in model.edges().iter().zip(model.links()) {
            if source == target {
                continue;
            }
            let (Some(start), Some(end)) = (self.screen_positions[source], self.screen_positions[target])
            else {
                continue;
            };
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }

            let incident = focus.is_some_and(|focus| focus == source || focus == target);
            let (width, color) = if incident {
                ((2.2 * zoom_sqrt).clamp(1.2, 4.4), EDGE_HIGHLIGHT)
            } else if focus.is_some() {
                ((0.82 * zoom_sqrt).clamp(0.45, 2.0), with_alpha(EDGE_DIMMED, 120))
            } else {
                ((1.18 * zoom_sqrt).clamp(0.6, 3.4), with_alpha(EDGE_COLOR, 190))
            };
            canvas.line(start, end, width, color);

            if incident {
                let text = if edge.label.is_empty() {
                    &edge.kind
                } else {
                    &edge.label
                };
                if !text.is_empty() {
                    edge_labels.push((start + (end - start) * 0.5, text.as_str()));
                }
            }
        }

        for index in 0..model.node_count() {
            if Some(index) != focus {
                self.draw_node(model, index, scale, rect, focus.is_some(), false, canvas);
            }
        }

        let edge_font = (self.label_font_size(scale) * 0.85).max(self.config.min_label_font_px);
        for (anchor, text) in edge_labels {
            canvas.text(anchor, Align2::CENTER_CENTER, text, edge_font, EDGE_HIGHLIGHT);
        }

        if let Some(focus) = focus {
            self.draw_node(model, focus, scale, rect, true, true, canvas);
        }
    }

    fn project(&mut self, model: &GraphModel, viewport: &Viewport) {
        self.screen_positions.clear();
        self.screen_positions.extend(model.nodes().iter().map(|node| {
            let screen = viewport.world_to_screen(node.position);
            screen
                .is_finite()
                .then(|| Pos2::new(screen.x as f32, screen.y as f32))
        }));
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_node(
        &self,
        model: &GraphModel,
        index: usize,
        scale: f64,
        rect: Rect,
        focus_active: bool,
        emphasized: bool,
        canvas: &mut impl Canvas,
    ) {
        let Some(center) = self.screen_positions[index] else {
            return;
        };
        let node = &model.nodes()[index];

        let mut radius = (node.radius * scale) as f32;
        if emphasized {
            radius *= self.config.emphasis_scale as f32;
        }
        let glow_reach = if emphasized {
            f32::from(self.config.glow_layers) * GLOW_STEP_PX
        } else {
            0.0
        };
        if !circle_visible(rect, center, radius + glow_reach) {
            return;
        }

        let dimmed = focus_active && !emphasized && !self.neighbor_mask[index];
        let fill = if dimmed {
            dim_color(node.color, 0.45)
        } else if emphasized {
            blend_color(node.color, Color32::WHITE, 0.18)
        } else {
            node.color
        };

        if emphasized {
            for layer in (1..=self.config.glow_layers).rev() {
                let alpha = (72 / u16::from(layer)) as u8;
                canvas.circle_filled(
                    center,
                    radius + f32::from(layer) * GLOW_STEP_PX,
                    with_alpha(node.color, alpha),
                );
            }
        }

        canvas.circle_filled(center, radius, fill);
        if emphasized {
            canvas.circle_stroke(center, radius, 2.0, EMPHASIS_OUTLINE);
        } else {
            canvas.circle_stroke(center, radius, 1.0, with_alpha(NODE_OUTLINE, 190));
        }

        let label_color = if emphasized {
            Color32::WHITE
        } else if dimmed {
            LABEL_DIMMED
        } else {
            LABEL_COLOR
        };
        canvas.text(
            center + vec2(0.0, radius + LABEL_GAP_PX),
            Align2::CENTER_TOP,
            &short_label(&node.display_name, self.config.max_label_chars),
            self.label_font_size(scale),
            label_color,
        );
    }
}
