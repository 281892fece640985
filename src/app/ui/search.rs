use eframe::egui::{self, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use knowledge_graph_viz::engine::model::{GraphModel, NodeKind};

use super::super::ViewModel;

const MAX_SEARCH_RESULTS: usize = 40;

#[derive(Clone, Debug, PartialEq)]
struct SearchHit {
    id: String,
    display_name: String,
    kind: NodeKind,
    score: i64,
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher.fuzzy_match(text, query).or_else(|| {
        matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase())
    })
}

/// Best matches by display name or id, highest score first.
fn search_nodes(model: &GraphModel, query: &str, limit: usize) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut hits: Vec<SearchHit> = model
        .nodes()
        .iter()
        .filter_map(|node| {
            let by_name = fuzzy_match_score(&matcher, &node.display_name, query);
            let by_id = fuzzy_match_score(&matcher, &node.id, query);
            let score = by_name.max(by_id)?;
            Some(SearchHit {
                id: node.id.clone(),
                display_name: node.display_name.clone(),
                kind: node.kind,
                score,
            })
        })
        .collect();

    hits.sort_by(|left, right| {
        right
            .score
            .cmp(&left.score)
            .then_with(|| left.display_name.cmp(&right.display_name))
            .then_with(|| left.id.cmp(&right.id))
    });
    hits.truncate(limit);
    hits
}

/// Last search, reused until the query changes or the graph is replaced.
#[derive(Default)]
pub(in crate::app) struct SearchCache {
    query: String,
    revision: u64,
    hits: Vec<SearchHit>,
}

impl SearchCache {
    fn refresh(&mut self, model: &GraphModel, query: &str) -> &[SearchHit] {
        if self.query != query || self.revision != model.revision() {
            self.query = query.to_owned();
            self.revision = model.revision();
            self.hits = search_nodes(model, query, MAX_SEARCH_RESULTS);
        }
        &self.hits
    }
}

fn kind_counts(model: &GraphModel) -> [(NodeKind, usize); NodeKind::ALL.len()] {
    NodeKind::ALL.map(|kind| {
        let count = model.nodes().iter().filter(|node| node.kind == kind).count();
        (kind, count)
    })
}

impl ViewModel {
    pub(in crate::app) fn draw_search(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("name or id")
                .desired_width(f32::INFINITY),
        );

        let hits = self.search_cache.refresh(self.engine.model(), &self.search);
        let mut pending = None;

        if !self.search.trim().is_empty() {
            ui.add_space(4.0);
            if hits.is_empty() {
                ui.label("No matches.");
            } else {
                egui::ScrollArea::vertical()
                    .id_salt("search_results_scroll")
                    .max_height(320.0)
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        for hit in hits {
                            let is_selected = self.selected.as_deref() == Some(hit.id.as_str());
                            let label = format!("{}  ({})", hit.display_name, hit.kind.label());
                            if ui
                                .selectable_label(is_selected, label)
                                .on_hover_text(hit.id.as_str())
                                .clicked()
                            {
                                pending = Some(hit.id.clone());
                            }
                        }
                    });
            }
        }

        ui.separator();
        ui.heading("Legend");
        for (kind, count) in kind_counts(self.engine.model()) {
            ui.horizontal(|ui| {
                let (rect, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                ui.painter().circle_filled(rect.center(), 5.0, kind.color());
                ui.label(format!("{} ({count})", kind.label()));
            });
        }

        if let Some(id) = pending {
            self.select(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use knowledge_graph_viz::engine::model::{GraphSnapshot, NodeSpec};

    use super::*;

    fn sample_model() -> GraphModel {
        GraphModel::from_snapshot(GraphSnapshot {
            nodes: vec![
                NodeSpec::new("skill-python", "Python", NodeKind::Skill),
                NodeSpec::new("skill-sql", "SQL", NodeKind::Skill),
                NodeSpec::new("career-ds", "Data Scientist", NodeKind::Career),
                NodeSpec::new("student-1", "Priya Patel", NodeKind::Student),
            ],
            edges: Vec::new(),
        })
    }

    #[test]
    fn blank_query_returns_nothing() {
        let model = sample_model();
        assert!(search_nodes(&model, "   ", 10).is_empty());
        assert!(search_nodes(&model, "python", 0).is_empty());
    }

    #[test]
    fn matches_display_name_case_insensitively() {
        let model = sample_model();
        let hits = search_nodes(&model, "python", 10);
        assert_eq!(hits.first().map(|hit| hit.id.as_str()), Some("skill-python"));
    }

    #[test]
    fn matches_by_id_and_respects_limit() {
        let model = sample_model();
        let hits = search_nodes(&model, "skill", 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, NodeKind::Skill);
    }

    #[test]
    fn cache_follows_query_and_graph_revision() {
        let mut model = sample_model();
        let mut cache = SearchCache::default();
        assert_eq!(cache.refresh(&model, "sql").len(), 1);

        model.replace(GraphSnapshot {
            nodes: vec![
                NodeSpec::new("skill-sql", "SQL", NodeKind::Skill),
                NodeSpec::new("course-sql", "SQL Basics", NodeKind::Course),
            ],
            edges: Vec::new(),
        });
        assert_eq!(cache.refresh(&model, "sql").len(), 2);
        assert!(cache.refresh(&model, "").is_empty());
    }

    #[test]
    fn legend_counts_every_kind() {
        let counts = kind_counts(&sample_model());
        assert_eq!(counts.len(), NodeKind::ALL.len());
        assert!(counts.contains(&(NodeKind::Skill, 2)));
        assert!(counts.contains(&(NodeKind::Course, 0)));
    }
}
