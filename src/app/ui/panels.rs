use eframe::egui::{self, Align, Color32, Context, Layout};

use knowledge_graph_viz::source::GraphMode;

use super::super::{PanelActions, ViewModel};

impl ViewModel {
    pub(in crate::app) fn show(&mut self, ctx: &Context, is_loading: bool) -> PanelActions {
        let mut actions = PanelActions::default();

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Knowledge Graph");
                    ui.separator();
                    ui.label(format!("source: {}", self.source_label));

                    egui::ComboBox::from_id_salt("graph_mode")
                        .selected_text(self.mode.label())
                        .show_ui(ui, |ui| {
                            for mode in GraphMode::ALL {
                                ui.selectable_value(&mut self.mode, mode, mode.label());
                            }
                        });

                    ui.label("focus:");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.focus_input)
                            .hint_text("node id")
                            .desired_width(140.0),
                    );

                    let load_button = ui.add_enabled(!is_loading, egui::Button::new("Load"));
                    if load_button.clicked() {
                        actions.reload = Some(self.current_request());
                    }
                    if ui.button("Reset view").clicked() {
                        self.engine.reset_view();
                    }
                    if ui.button("Reheat").clicked() {
                        self.engine.reheat();
                    }
                    if is_loading {
                        ui.spinner();
                    }
                    if let Some(error) = &self.load_error {
                        ui.colored_label(Color32::from_rgb(240, 110, 110), error);
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let model = self.engine.model();
                        ui.label(format!(
                            "nodes: {}  edges: {}",
                            model.node_count(),
                            model.edge_count()
                        ));
                        if let Some(fps_text) = self.frame_stats.display_text() {
                            ui.label(fps_text);
                        }
                    });
                });
            });

        egui::SidePanel::left("search")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_search(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_surface(ui));

        actions
    }
}
