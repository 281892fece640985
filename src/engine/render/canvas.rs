use eframe::egui::{Align2, Color32, Pos2, Rect};

/// Drawing surface the renderer paints onto, in surface-local pixels.
pub trait Canvas {
    fn fill_rect(&mut self, rect: Rect, color: Color32);
    fn line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32);
    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32);
    fn circle_stroke(&mut self, center: Pos2, radius: f32, width: f32, color: Color32);
    fn text(&mut self, anchor: Pos2, align: Align2, text: &str, size: f32, color: Color32);
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        color: Color32,
    },
    Line {
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
    },
    CircleFilled {
        center: Pos2,
        radius: f32,
        color: Color32,
    },
    CircleStroke {
        center: Pos2,
        radius: f32,
        width: f32,
        color: Color32,
    },
    Text {
        anchor: Pos2,
        align: Align2,
        text: String,
        size: f32,
        color: Color32,
    },
}

/// Records draw calls instead of painting them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = (&str, f32)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, size, .. } => Some((text.as_str(), *size)),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Pos2, Pos2)> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line { from, to, .. } => Some((*from, *to)),
            _ => None,
        })
    }
}

impl Canvas for DisplayList {
    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.commands.push(DrawCommand::CircleFilled {
            center,
            radius,
            color,
        });
    }

    fn circle_stroke(&mut self, center: Pos2, radius: f32, width: f32, color: Color32) {
        self.commands.push(DrawCommand::CircleStroke {
            center,
            radius,
            width,
            color,
        });
    }

    fn text(&mut self, anchor: Pos2, align: Align2, text: &str, size: f32, color: Color32) {
        self.commands.push(DrawCommand::Text {
            anchor,
            align,
            text: text.to_owned(),
            size,
            color,
        });
    }
}
