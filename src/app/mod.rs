use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Vec2};

use knowledge_graph_viz::EngineConfig;
use knowledge_graph_viz::GraphEngine;
use knowledge_graph_viz::engine::model::GraphSnapshot;
use knowledge_graph_viz::source::{GraphMode, GraphSource, SnapshotRequest};

mod canvas;
mod surface;
mod ui;

use ui::fps::FrameStats;
use ui::search::SearchCache;

type LoadResult = Result<GraphSnapshot, String>;

pub struct ExplorerApp {
    source: Arc<dyn GraphSource>,
    config: EngineConfig,
    request: SnapshotRequest,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

/// Engine callbacks land here and are drained once per frame.
#[derive(Default)]
struct EngineEvents {
    clicked: Option<String>,
    hovered: Option<String>,
}

struct ViewModel {
    engine: GraphEngine,
    events: Rc<RefCell<EngineEvents>>,
    source_label: String,
    mode: GraphMode,
    focus_input: String,
    search: String,
    search_cache: SearchCache,
    selected: Option<String>,
    hovered: Option<String>,
    load_error: Option<String>,
    surface_size: Vec2,
    pointer_inside: bool,
    frame_stats: FrameStats,
}

/// What the panels asked the app to do this frame.
#[derive(Default)]
struct PanelActions {
    reload: Option<SnapshotRequest>,
}

impl ExplorerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: Arc<dyn GraphSource>,
        config: EngineConfig,
        request: SnapshotRequest,
    ) -> Self {
        let state = AppState::Loading {
            rx: Self::spawn_load(Arc::clone(&source), request.clone()),
        };
        Self {
            source,
            config,
            request,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: Arc<dyn GraphSource>, request: SnapshotRequest) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            tracing::info!(source = %source.describe(), ?request, "loading graph snapshot");
            let result = source.fetch(&request).map_err(|error| format!("{error:#}"));
            if let Err(error) = &result {
                tracing::warn!(%error, "graph snapshot failed to load");
            }
            let _ = tx.send(result);
        });

        rx
    }

    fn ready_state(&self, snapshot: GraphSnapshot) -> AppState {
        match ViewModel::new(
            self.config.clone(),
            self.source.describe(),
            &self.request,
            snapshot,
        ) {
            Ok(model) => AppState::Ready(Box::new(model)),
            Err(error) => AppState::Error(error),
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(snapshot)) => transition = Some(Ok(snapshot)),
                    Ok(Err(error)) => transition = Some(Err(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading knowledge graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                let mut retry = false;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load the knowledge graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
                if retry {
                    self.state = AppState::Loading {
                        rx: Self::spawn_load(Arc::clone(&self.source), self.request.clone()),
                    };
                }
            }
            AppState::Ready(model) => {
                let is_reloading = self.reload_rx.is_some();
                let actions = model.show(ctx, is_reloading);

                if let Some(request) = actions.reload
                    && self.reload_rx.is_none()
                {
                    self.request = request.clone();
                    self.reload_rx = Some(Self::spawn_load(Arc::clone(&self.source), request));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(snapshot)) => model.install(snapshot),
                        Ok(Err(error)) => model.install_failed(error),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.install_failed("Background load worker disconnected".to_owned());
                        }
                    }
                }
            }
        }

        if let Some(result) = transition {
            self.state = match result {
                Ok(snapshot) => self.ready_state(snapshot),
                Err(error) => AppState::Error(error),
            };
        }
    }
}

impl ViewModel {
    fn new(
        config: EngineConfig,
        source_label: String,
        request: &SnapshotRequest,
        snapshot: GraphSnapshot,
    ) -> Result<Self, String> {
        let mut engine = GraphEngine::new(config, 1.0, 1.0).map_err(|error| error.to_string())?;

        let events = Rc::new(RefCell::new(EngineEvents::default()));
        {
            let events = Rc::clone(&events);
            engine.on_node_click(move |node| {
                events.borrow_mut().clicked = Some(node.id.clone());
            });
        }
        {
            let events = Rc::clone(&events);
            engine.on_node_hover(move |node| {
                events.borrow_mut().hovered = node.map(|node| node.id.clone());
            });
        }

        let mut model = Self {
            engine,
            events,
            source_label,
            mode: request.mode,
            focus_input: request.focus_id.clone().unwrap_or_default(),
            search: String::new(),
            search_cache: SearchCache::default(),
            selected: None,
            hovered: None,
            load_error: None,
            surface_size: Vec2::ZERO,
            pointer_inside: false,
            frame_stats: FrameStats::default(),
        };
        model.install(snapshot);
        Ok(model)
    }

    fn install(&mut self, snapshot: GraphSnapshot) {
        self.load_error = None;
        self.engine.set_model(snapshot);
        if self
            .selected
            .as_deref()
            .is_some_and(|id| self.engine.model().get_node(id).is_none())
        {
            self.selected = None;
        }
    }

    fn install_failed(&mut self, error: String) {
        self.engine.set_model(GraphSnapshot::empty());
        self.selected = None;
        self.load_error = Some(error);
    }

    fn current_request(&self) -> SnapshotRequest {
        SnapshotRequest::new(self.mode, Some(self.focus_input.clone()))
    }

    fn select(&mut self, id: &str) {
        if self.engine.center_on(id) {
            self.selected = Some(id.to_owned());
        }
    }

    fn drain_engine_events(&mut self) {
        let mut events = self.events.borrow_mut();
        if let Some(clicked) = events.clicked.take() {
            self.selected = Some(clicked);
        }
        self.hovered = events.hovered.clone();
    }
}

impl Drop for ViewModel {
    fn drop(&mut self) {
        self.engine.dispose();
    }
}
