use crate::config::{ConfigError, InteractionConfig};

use super::geometry::Point;
use super::model::GraphModel;
use super::physics::ForceSimulator;
use super::viewport::Viewport;

const WHEEL_FACTOR_MIN: f64 = 0.85;
const WHEEL_FACTOR_MAX: f64 = 1.15;
/// A click always zooms in by at least this factor, up to the zoom cap.
const CLICK_ZOOM_STEP: f64 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Pointer input in surface-local screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Moved { position: Point },
    Pressed { position: Point, button: PointerButton },
    Released { position: Point, button: PointerButton },
    /// Positive `delta` zooms in.
    Wheel { position: Point, delta: f64 },
    Left,
}

/// What the renderer needs to know about the current gesture.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
    pub hovered_node_id: Option<String>,
    pub dragged_node_id: Option<String>,
}

impl InteractionState {
    /// The node that should be emphasized: the dragged one, else the hovered one.
    pub fn focus_id(&self) -> Option<&str> {
        self.dragged_node_id
            .as_deref()
            .or(self.hovered_node_id.as_deref())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionNotice {
    HoverChanged(Option<String>),
    NodeClicked(String),
}

#[derive(Clone, Debug, PartialEq)]
enum Gesture {
    Idle,
    Hovering {
        node_id: String,
    },
    Dragging {
        node_id: String,
        /// Node center minus the pointer's world position at press time. The
        /// pin follows the pointer plus this offset, so the node does not jump.
        grab_offset: Point,
        press_position: Point,
        travel: f64,
    },
    Panning {
        last_position: Point,
    },
}

/// Mutable views the controller acts on while handling one event.
pub struct InteractionTargets<'a> {
    pub model: &'a mut GraphModel,
    pub simulator: &'a mut ForceSimulator,
    pub viewport: &'a mut Viewport,
}

/// Nearest node whose disc contains `screen`; ties go to the smallest id.
pub fn hit_test(model: &GraphModel, viewport: &Viewport, screen: Point) -> Option<usize> {
    let world = viewport.screen_to_world(screen);
    if !world.is_finite() {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for (index, node) in model.nodes().iter().enumerate() {
        if !node.position.is_finite() {
            continue;
        }
        let distance = node.position.distance(world);
        if distance > node.radius {
            continue;
        }

        let better = match best {
            None => true,
            Some((best_index, best_distance)) => {
                distance < best_distance
                    || (distance == best_distance && node.id < model.nodes()[best_index].id)
            }
        };
        if better {
            best = Some((index, distance));
        }
    }

    best.map(|(index, _)| index)
}

pub struct InteractionController {
    config: InteractionConfig,
    gesture: Gesture,
    hovered: Option<String>,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            gesture: Gesture::Idle,
            hovered: None,
        })
    }

    pub fn state(&self) -> InteractionState {
        InteractionState {
            hovered_node_id: self.hovered.clone(),
            dragged_node_id: self.dragged_node_id().map(str::to_owned),
        }
    }

    pub fn hovered_node_id(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn dragged_node_id(&self) -> Option<&str> {
        match &self.gesture {
            Gesture::Dragging { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, Gesture::Panning { .. })
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        targets: InteractionTargets<'_>,
    ) -> Vec<InteractionNotice> {
        let mut notices = Vec::new();

        match event {
            PointerEvent::Moved { position } => {
                self.pointer_moved(position, targets, &mut notices);
            }
            PointerEvent::Pressed { position, button } => {
                self.pointer_pressed(position, button, targets, &mut notices);
            }
            PointerEvent::Released { position, button } => {
                self.pointer_released(position, button, targets, &mut notices);
            }
            PointerEvent::Wheel { position, delta } => {
                let factor = (1.0 + (delta * self.config.wheel_zoom_sensitivity))
                    .clamp(WHEEL_FACTOR_MIN, WHEEL_FACTOR_MAX);
                targets.viewport.zoom_by(factor, position);
            }
            PointerEvent::Left => {
                if let Gesture::Dragging { node_id, .. } = &self.gesture {
                    tracing::debug!(node_id = %node_id, "pointer left mid-drag; releasing node");
                    targets.model.set_pin(node_id, None);
                    targets.simulator.reheat();
                }
                self.gesture = Gesture::Idle;
                self.set_hovered(None, &mut notices);
            }
        }

        notices
    }

    /// Drops gesture state that refers to nodes no longer in `model`.
    pub fn model_replaced(&mut self, model: &GraphModel) -> Vec<InteractionNotice> {
        let mut notices = Vec::new();

        let stale_gesture = match &self.gesture {
            Gesture::Dragging { node_id, .. } | Gesture::Hovering { node_id } => {
                model.get_node(node_id).is_none()
            }
            _ => false,
        };
        if stale_gesture {
            tracing::debug!("gesture target vanished with the new model; resetting to idle");
            self.gesture = Gesture::Idle;
        }

        let hover_gone = self
            .hovered
            .as_deref()
            .is_some_and(|hovered| model.get_node(hovered).is_none());
        if hover_gone {
            self.set_hovered(None, &mut notices);
        }

        notices
    }

    fn pointer_moved(
        &mut self,
        position: Point,
        targets: InteractionTargets<'_>,
        notices: &mut Vec<InteractionNotice>,
    ) {
        match &mut self.gesture {
            Gesture::Dragging {
                node_id,
                grab_offset,
                press_position,
                travel,
            } => {
                *travel = travel.max(position.distance(*press_position));
                let pin = targets.viewport.screen_to_world(position) + *grab_offset;
                if targets.model.set_pin(node_id, Some(pin)) {
                    return;
                }
                tracing::debug!(node_id = %node_id, "dragged node is gone; aborting drag");
            }
            Gesture::Panning { last_position } => {
                let delta = position - *last_position;
                *last_position = position;
                targets.viewport.pan_by(delta.x, delta.y);
                return;
            }
            Gesture::Idle | Gesture::Hovering { .. } => {}
        }

        self.refresh_hover(position, targets.model, targets.viewport, notices);
    }

    fn pointer_pressed(
        &mut self,
        position: Point,
        button: PointerButton,
        targets: InteractionTargets<'_>,
        notices: &mut Vec<InteractionNotice>,
    ) {
        if !matches!(self.gesture, Gesture::Idle | Gesture::Hovering { .. }) {
            return;
        }

        let hit = match button {
            PointerButton::Primary => hit_test(targets.model, targets.viewport, position),
            PointerButton::Secondary | PointerButton::Middle => None,
        };

        let Some(index) = hit else {
            tracing::debug!(?button, "pan started");
            self.gesture = Gesture::Panning {
                last_position: position,
            };
            return;
        };

        let node = &targets.model.nodes()[index];
        let node_id = node.id.clone();
        let anchor = node.position;
        let grab_offset = anchor - targets.viewport.screen_to_world(position);

        tracing::debug!(node_id = %node_id, "drag started");
        targets.model.set_pin(&node_id, Some(anchor));
        targets.simulator.reheat();
        self.set_hovered(Some(node_id.clone()), notices);
        self.gesture = Gesture::Dragging {
            node_id,
            grab_offset,
            press_position: position,
            travel: 0.0,
        };
    }

    fn pointer_released(
        &mut self,
        position: Point,
        button: PointerButton,
        targets: InteractionTargets<'_>,
        notices: &mut Vec<InteractionNotice>,
    ) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Dragging {
                node_id,
                press_position,
                travel,
                ..
            } if button == PointerButton::Primary => {
                let travel = travel.max(position.distance(press_position));
                targets.model.set_pin(&node_id, None);
                targets.simulator.reheat();
                tracing::debug!(node_id = %node_id, travel, "drag ended");

                if travel <= self.config.click_threshold_px
                    && let Some(node) = targets.model.get_node(&node_id)
                {
                    let focus_zoom = targets.viewport.config().focus_zoom;
                    let scale = (targets.viewport.scale() * CLICK_ZOOM_STEP).max(focus_zoom);
                    targets.viewport.center_on(node.position, scale);
                    notices.push(InteractionNotice::NodeClicked(node_id));
                }
            }
            gesture @ Gesture::Dragging { .. } => {
                self.gesture = gesture;
                return;
            }
            Gesture::Panning { .. } => {
                tracing::debug!("pan ended");
            }
            Gesture::Idle | Gesture::Hovering { .. } => {}
        }

        self.refresh_hover(position, targets.model, targets.viewport, notices);
    }

    fn refresh_hover(
        &mut self,
        position: Point,
        model: &GraphModel,
        viewport: &Viewport,
        notices: &mut Vec<InteractionNotice>,
    ) {
        let hovered = hit_test(model, viewport, position).map(|index| model.nodes()[index].id.clone());
        self.gesture = match &hovered {
            Some(node_id) => Gesture::Hovering {
                node_id: node_id.clone(),
            },
            None => Gesture::Idle,
        };
        self.set_hovered(hovered, notices);
    }

    fn set_hovered(&mut self, hovered: Option<String>, notices: &mut Vec<InteractionNotice>) {
        if self.hovered != hovered {
            self.hovered = hovered.clone();
            notices.push(InteractionNotice::HoverChanged(hovered));
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::config::ViewportConfig;
    use crate::engine::geometry::point;
    use crate::engine::model::{GraphSnapshot, NodeKind, NodeSpec};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_hit_test_matches_nearest_containing_disc(
            positions in proptest::collection::vec((-300.0f64..300.0, -300.0f64..300.0), 1..30),
            pointer_x in 0.0f64..800.0,
            pointer_y in 0.0f64..600.0,
            zoom in 0.2f64..4.0,
        ) {
            let model = GraphModel::from_snapshot(GraphSnapshot {
                nodes: positions
                    .iter()
                    .enumerate()
                    .map(|(index, &(x, y))| {
                        NodeSpec::new(format!("n{index:02}"), "node", NodeKind::Course)
                            .with_position(point(x, y))
                    })
                    .collect(),
                edges: Vec::new(),
            });
            let mut viewport = Viewport::new(ViewportConfig::default(), 800.0, 600.0)
                .expect("valid config");
            viewport.zoom_by(zoom, point(400.0, 300.0));

            let pointer = point(pointer_x, pointer_y);
            let world = viewport.screen_to_world(pointer);
            let expected = model
                .nodes()
                .iter()
                .enumerate()
                .filter(|(_, node)| node.position.distance(world) <= node.radius)
                .min_by(|(_, a), (_, b)| {
                    a.position
                        .distance(world)
                        .total_cmp(&b.position.distance(world))
                        .then_with(|| a.id.cmp(&b.id))
                })
                .map(|(index, _)| index);

            prop_assert_eq!(hit_test(&model, &viewport, pointer), expected);
        }
    }
}
