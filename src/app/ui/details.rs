use eframe::egui::{self, RichText, Ui};

use knowledge_graph_viz::engine::model::GraphModel;

use super::super::ViewModel;

/// One edge touching the selected node, seen from the selection.
#[derive(Clone, Debug, PartialEq)]
struct Connection {
    other_id: String,
    other_name: String,
    relation: String,
    outgoing: bool,
}

fn connections_of(model: &GraphModel, node_id: &str) -> Vec<Connection> {
    let mut connections: Vec<Connection> = model
        .edges()
        .iter()
        .filter(|edge| !edge.is_self_loop())
        .filter_map(|edge| {
            let (other_id, outgoing) = if edge.source_id == node_id {
                (&edge.target_id, true)
            } else if edge.target_id == node_id {
                (&edge.source_id, false)
            } else {
                return None;
            };
            let other = model.get_node(other_id)?;
            let relation = if edge.label.is_empty() {
                edge.kind.clone()
            } else {
                edge.label.clone()
            };
            Some(Connection {
                other_id: other.id.clone(),
                other_name: other.display_name.clone(),
                relation,
                outgoing,
            })
        })
        .collect();

    connections.sort_by(|left, right| {
        right
            .outgoing
            .cmp(&left.outgoing)
            .then_with(|| left.other_name.cmp(&right.other_name))
    });
    connections
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a node in the graph or pick a search result.");
            return;
        };

        let model = self.engine.model();
        let Some(node) = model.get_node(&selected_id) else {
            ui.label("Selected node no longer exists in the graph.");
            return;
        };

        let display_name = node.display_name.clone();
        let kind = node.kind;
        let description = node.description.clone();
        let metadata: Vec<(String, String)> = node
            .metadata
            .iter()
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();
        let connections = connections_of(model, &selected_id);

        ui.label(RichText::new(display_name).strong());
        ui.small(selected_id.as_str());
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label("Kind:");
            ui.colored_label(kind.color(), kind.label());
        });
        if let Some(description) = &description {
            ui.add_space(4.0);
            ui.label(description);
        }

        if !metadata.is_empty() {
            ui.separator();
            egui::Grid::new("node_metadata")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    for (key, value) in &metadata {
                        ui.label(key);
                        ui.label(value);
                        ui.end_row();
                    }
                });
        }

        ui.separator();
        ui.label(RichText::new(format!("Connections ({})", connections.len())).strong());
        if connections.is_empty() {
            ui.label("This node has no connections.");
            return;
        }

        let mut pending = None;
        egui::ScrollArea::vertical()
            .id_salt("connections_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for connection in &connections {
                    let arrow = if connection.outgoing { "->" } else { "<-" };
                    let label = format!(
                        "{arrow} {}  ({})",
                        connection.other_name, connection.relation
                    );
                    if ui
                        .link(label)
                        .on_hover_text(connection.other_id.as_str())
                        .clicked()
                    {
                        pending = Some(connection.other_id.clone());
                    }
                }
            });

        if let Some(id) = pending {
            self.select(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use knowledge_graph_viz::engine::model::{Edge, GraphSnapshot, NodeKind, NodeSpec};

    use super::*;

    #[test]
    fn connections_list_outgoing_first_and_skip_self_loops() {
        let model = GraphModel::from_snapshot(GraphSnapshot {
            nodes: vec![
                NodeSpec::new("s1", "Ana", NodeKind::Student),
                NodeSpec::new("k1", "Python", NodeKind::Skill),
                NodeSpec::new("c1", "Data Scientist", NodeKind::Career),
                NodeSpec::new("m1", "INTJ", NodeKind::PersonalityType),
            ],
            edges: vec![
                Edge::new("s1", "k1", "has_skill", ""),
                Edge::new("m1", "s1", "typed_as", "personality"),
                Edge::new("s1", "c1", "suits", "suits"),
                Edge::new("s1", "s1", "self", ""),
            ],
        });

        let connections = connections_of(&model, "s1");
        let names: Vec<&str> = connections
            .iter()
            .map(|connection| connection.other_name.as_str())
            .collect();
        assert_eq!(names, vec!["Data Scientist", "Python", "INTJ"]);
        assert_eq!(connections[1].relation, "has_skill");
        assert!(!connections[2].outgoing);
    }

    #[test]
    fn unknown_node_has_no_connections() {
        let model = GraphModel::new();
        assert!(connections_of(&model, "missing").is_empty());
    }
}
