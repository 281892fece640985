//! Force-directed graph engine: model, simulation, camera, input and
//! painting, driven one frame at a time by the host.

pub mod geometry;
pub mod interaction;
pub mod model;
pub mod physics;
pub mod render;
pub mod viewport;

use std::time::Duration;

use crate::config::{ConfigError, EngineConfig};

use interaction::{
    InteractionController, InteractionNotice, InteractionState, InteractionTargets, PointerEvent,
};
use model::{GraphModel, GraphSnapshot, Node, ReplaceReport};
use physics::ForceSimulator;
use render::{Canvas, Renderer};
use viewport::Viewport;

type ClickCallback = Box<dyn FnMut(&Node)>;
type HoverCallback = Box<dyn FnMut(Option<&Node>)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Lifecycle {
    Running,
    Disposed,
}

/// Owns one graph surface. The host feeds it snapshots, pointer events and
/// frame ticks; the engine never schedules work on its own.
pub struct GraphEngine {
    config: EngineConfig,
    model: GraphModel,
    simulator: ForceSimulator,
    viewport: Viewport,
    controller: InteractionController,
    renderer: Renderer,
    lifecycle: Lifecycle,
    fit_after_settle: bool,
    on_click: Option<ClickCallback>,
    on_hover: Option<HoverCallback>,
}

impl GraphEngine {
    pub fn new(config: EngineConfig, width: f64, height: f64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            model: GraphModel::new(),
            simulator: ForceSimulator::new(config.simulation.clone())?,
            viewport: Viewport::new(config.viewport.clone(), width, height)?,
            controller: InteractionController::new(config.interaction.clone())?,
            renderer: Renderer::new(config.render.clone())?,
            config,
            lifecycle: Lifecycle::Running,
            fit_after_settle: false,
            on_click: None,
            on_hover: None,
        })
    }

    pub fn on_node_click(&mut self, callback: impl FnMut(&Node) + 'static) {
        self.on_click = Some(Box::new(callback));
    }

    pub fn on_node_hover(&mut self, callback: impl FnMut(Option<&Node>) + 'static) {
        self.on_hover = Some(Box::new(callback));
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn simulator(&self) -> &ForceSimulator {
        &self.simulator
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.controller.state()
    }

    pub fn is_disposed(&self) -> bool {
        self.lifecycle == Lifecycle::Disposed
    }

    /// Replaces the displayed graph. Surviving ids keep their positions and
    /// the simulation restarts hot; the view fits the graph once it settles.
    pub fn set_model(&mut self, snapshot: GraphSnapshot) -> ReplaceReport {
        if self.is_disposed() {
            return ReplaceReport::default();
        }

        let report = self.model.replace(snapshot);
        tracing::info!(
            nodes = report.nodes,
            edges = report.edges,
            dropped_edges = report.dropped_edges,
            duplicate_nodes = report.duplicate_nodes,
            carried_positions = report.carried_positions,
            "graph model replaced"
        );

        self.simulator.reheat();
        self.fit_after_settle = !self.model.is_empty();
        let notices = self.controller.model_replaced(&self.model);
        self.dispatch(notices);
        report
    }

    /// Animates the camera onto the node with `id`. Returns `false` when the
    /// node is unknown or has no position yet.
    pub fn center_on(&mut self, id: &str) -> bool {
        if self.is_disposed() {
            return false;
        }
        let Some(position) = self
            .model
            .get_node(id)
            .map(|node| node.position)
            .filter(|position| position.is_finite())
        else {
            return false;
        };

        self.fit_after_settle = false;
        self.viewport
            .center_on(position, self.config.viewport.focus_zoom);
        true
    }

    /// Fits every node into view, or recenters on the origin when nothing
    /// has a position.
    pub fn reset_view(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.fit_after_settle = false;
        if !self
            .viewport
            .fit_to_bounds(self.model.nodes(), self.config.viewport.fit_padding_px)
        {
            self.viewport.reset();
        }
    }

    pub fn reheat(&mut self) {
        if self.is_disposed() {
            return;
        }
        self.simulator.reheat();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if self.is_disposed() {
            return;
        }
        self.viewport.resize(width, height);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        if self.is_disposed() {
            return;
        }
        // Presses start a drag, pan or click; the wheel zooms. Either way the
        // user now owns the camera.
        if matches!(
            event,
            PointerEvent::Pressed { .. } | PointerEvent::Wheel { .. }
        ) {
            self.fit_after_settle = false;
        }
        let notices = self.controller.handle(
            event,
            InteractionTargets {
                model: &mut self.model,
                simulator: &mut self.simulator,
                viewport: &mut self.viewport,
            },
        );
        self.dispatch(notices);
    }

    /// Runs one simulation step and advances the camera. Returns `true`
    /// while anything is still moving.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.is_disposed() {
            return false;
        }

        let simulating = self.simulator.step(&mut self.model);
        let mut animating = self.viewport.advance(dt);

        if self.fit_after_settle && self.simulator.is_settled() {
            self.fit_after_settle = false;
            animating |= self
                .viewport
                .fit_to_bounds(self.model.nodes(), self.config.viewport.fit_padding_px);
        }

        simulating || animating
    }

    pub fn draw(&mut self, canvas: &mut impl Canvas) {
        if self.is_disposed() {
            return;
        }
        let state = self.controller.state();
        self.renderer
            .draw(&self.model, &self.viewport, &state, canvas);
    }

    /// One display frame: simulate fully, then paint fully.
    pub fn frame(&mut self, dt: Duration, canvas: &mut impl Canvas) -> bool {
        let active = self.tick(dt);
        self.draw(canvas);
        active
    }

    /// Stops the engine for good and drops the host callbacks.
    pub fn dispose(&mut self) {
        if self.is_disposed() {
            return;
        }
        tracing::debug!(nodes = self.model.node_count(), "graph engine disposed");
        self.lifecycle = Lifecycle::Disposed;
        self.on_click = None;
        self.on_hover = None;
    }

    fn dispatch(&mut self, notices: Vec<InteractionNotice>) {
        for notice in notices {
            match notice {
                InteractionNotice::HoverChanged(id) => {
                    if let Some(callback) = self.on_hover.as_mut() {
                        callback(id.as_deref().and_then(|id| self.model.get_node(id)));
                    }
                }
                InteractionNotice::NodeClicked(id) => {
                    if let (Some(callback), Some(node)) =
                        (self.on_click.as_mut(), self.model.get_node(&id))
                    {
                        callback(node);
                    }
                }
            }
        }
    }
}
