use std::time::{Duration, Instant};

use eframe::egui::{self, Align2, Color32, CursorIcon, Event, FontId, Pos2, Rect, Sense, Ui};

use knowledge_graph_viz::engine::geometry::{Point, point};
use knowledge_graph_viz::engine::interaction::{PointerButton, PointerEvent};

use super::ViewModel;
use super::canvas::PainterCanvas;

fn local_point(rect: Rect, position: Pos2) -> Point {
    point(
        f64::from(position.x - rect.min.x),
        f64::from(position.y - rect.min.y),
    )
}

fn engine_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

impl ViewModel {
    pub(super) fn draw_surface(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        if rect.size() != self.surface_size {
            self.surface_size = rect.size();
            self.engine
                .resize(f64::from(rect.width()), f64::from(rect.height()));
        }

        self.forward_pointer_input(ui, rect, &response);

        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);

        let started = Instant::now();
        let active = self
            .engine
            .tick(Duration::from_secs_f32(frame_delta_seconds));
        let simulated = started.elapsed();

        let painter = ui.painter_at(rect);
        let started = Instant::now();
        self.engine.draw(&mut PainterCanvas::new(&painter, rect));
        let drawn = started.elapsed();
        self.frame_stats
            .record(frame_delta_seconds, simulated, drawn);

        self.drain_engine_events();

        if self.engine.model().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No nodes to show for this mode.",
                FontId::proportional(15.0),
                Color32::from_gray(170),
            );
        }

        if self.hovered.is_some() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        let dragging = self.engine.interaction_state().dragged_node_id.is_some();
        if active || dragging {
            ui.ctx().request_repaint();
        }
    }

    fn forward_pointer_input(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        let events = ui.input(|input| input.events.clone());
        for event in events {
            match event {
                Event::PointerMoved(position) => {
                    if rect.contains(position) {
                        self.pointer_inside = true;
                        self.engine.handle_pointer(PointerEvent::Moved {
                            position: local_point(rect, position),
                        });
                    } else if self.pointer_inside {
                        self.pointer_inside = false;
                        self.engine.handle_pointer(PointerEvent::Left);
                    }
                }
                Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    ..
                } => {
                    let Some(button) = engine_button(button) else {
                        continue;
                    };
                    let position = local_point(rect, pos);
                    if !pressed {
                        self.engine
                            .handle_pointer(PointerEvent::Released { position, button });
                    } else if rect.contains(pos) {
                        self.engine
                            .handle_pointer(PointerEvent::Pressed { position, button });
                    }
                }
                Event::PointerGone => {
                    if self.pointer_inside {
                        self.pointer_inside = false;
                        self.engine.handle_pointer(PointerEvent::Left);
                    }
                }
                _ => {}
            }
        }

        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        self.engine.handle_pointer(PointerEvent::Wheel {
            position: local_point(rect, pointer),
            delta: f64::from(scroll),
        });
    }
}
