use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Stroke, Vec2};

use knowledge_graph_viz::engine::render::Canvas;

/// Paints engine output through egui, shifting surface-local coordinates
/// to the allocated rect.
pub(super) struct PainterCanvas<'a> {
    painter: &'a Painter,
    offset: Vec2,
}

impl<'a> PainterCanvas<'a> {
    pub(super) fn new(painter: &'a Painter, surface: Rect) -> Self {
        Self {
            painter,
            offset: surface.min.to_vec2(),
        }
    }
}

impl Canvas for PainterCanvas<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.painter.rect_filled(rect.translate(self.offset), 0.0, color);
    }

    fn line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32) {
        self.painter
            .line_segment([from + self.offset, to + self.offset], Stroke::new(width, color));
    }

    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.painter.circle_filled(center + self.offset, radius, color);
    }

    fn circle_stroke(&mut self, center: Pos2, radius: f32, width: f32, color: Color32) {
        self.painter
            .circle_stroke(center + self.offset, radius, Stroke::new(width, color));
    }

    fn text(&mut self, anchor: Pos2, align: Align2, text: &str, size: f32, color: Color32) {
        self.painter.text(
            anchor + self.offset,
            align,
            text,
            FontId::proportional(size),
            color,
        );
    }
}
