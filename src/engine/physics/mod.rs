mod forces;
mod quadtree;

use crate::config::{ConfigError, SimulationConfig};
use crate::util::stable_pair;

use super::geometry::{Point, point};
use super::model::{GraphModel, Node};
use forces::{RepulsionParams, accumulate_repulsion_pairs, tie_break_direction};
use quadtree::QuadNode;

const INITIAL_RADIUS: f64 = 10.0;
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
const PLACEMENT_JITTER: f64 = 0.5;
const RECOVERY_RADIUS: f64 = 10.0;

#[derive(Default)]
struct PhysicsScratch {
    forces: Vec<Point>,
    positions: Vec<Point>,
    keys: Vec<u64>,
}

/// Force-directed layout integrator. Holds the cooling state (`alpha`) and
/// advances a [`GraphModel`] one discrete step at a time.
pub struct ForceSimulator {
    config: SimulationConfig,
    alpha: f64,
    steps: u64,
    scratch: PhysicsScratch,
}

impl ForceSimulator {
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            alpha: 1.0,
            steps: 0,
            scratch: PhysicsScratch::default(),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.alpha_min
    }

    /// Restores full energy without touching positions.
    pub fn reheat(&mut self) {
        self.alpha = 1.0;
    }

    /// Advances the layout by one step. Returns `false` without doing any work
    /// once the simulation has settled.
    pub fn step(&mut self, model: &mut GraphModel) -> bool {
        if self.is_settled() {
            return false;
        }

        self.alpha *= 1.0 - self.config.alpha_decay;
        self.steps += 1;

        let seed = self.config.seed;
        for (index, node) in model.nodes_mut().iter_mut().enumerate() {
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Point::ZERO;
            } else if !node.position.is_finite() {
                place_on_spiral(node, index, seed);
            }
        }

        self.accumulate_forces(model);
        self.integrate(model);
        true
    }

    fn accumulate_forces(&mut self, model: &GraphModel) {
        let config = &self.config;
        let scratch = &mut self.scratch;
        let node_count = model.node_count();

        scratch.forces.clear();
        scratch.forces.resize(node_count, Point::ZERO);
        scratch.positions.clear();
        scratch.keys.clear();
        for node in model.nodes() {
            scratch.positions.push(node.position);
            scratch.keys.push(node.key);
        }

        let positions = &scratch.positions;
        let keys = &scratch.keys;
        let forces = &mut scratch.forces;

        if node_count > 1
            && let Some(tree) = QuadNode::build(positions)
        {
            let params = RepulsionParams {
                strength: config.charge.abs(),
                max_distance_sq: config.distance_max * config.distance_max,
                min_distance_sq: config.distance_min * config.distance_min,
                seed: config.seed,
            };
            accumulate_repulsion_pairs(&tree, &tree, true, positions, keys, params, forces);
        }

        for &(source, target) in model.links() {
            if source == target {
                continue;
            }

            let delta = positions[target] - positions[source];
            let distance = delta.length();
            let direction = if distance > 1e-9 {
                delta / distance
            } else {
                tie_break_direction(config.seed, (keys[target], target), (keys[source], source))
            };

            let stretch = (distance - config.rest_length) * config.spring_constant;
            let correction = direction * (stretch * 0.5);
            forces[source] += correction;
            forces[target] -= correction;
        }
    }

    fn integrate(&mut self, model: &mut GraphModel) {
        let config = &self.config;
        let forces = &self.scratch.forces;
        let damping = 1.0 - config.velocity_decay;
        let max_speed_sq = config.max_speed * config.max_speed;

        for (index, node) in model.nodes_mut().iter_mut().enumerate() {
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Point::ZERO;
                continue;
            }

            let mut velocity = (node.velocity + forces[index] * self.alpha) * damping;
            let speed_sq = velocity.length_sq();
            if speed_sq > max_speed_sq {
                velocity = velocity * (config.max_speed / speed_sq.sqrt());
            }

            let position = node.position + velocity * config.time_step;
            if !position.is_finite() || !velocity.is_finite() {
                tracing::warn!(
                    node_id = %node.id,
                    step = self.steps,
                    "node left the finite plane; resetting near origin"
                );
                let (jx, jy) = stable_pair(config.seed, &node.id);
                node.position = point(jx, jy) * RECOVERY_RADIUS;
                node.velocity = Point::ZERO;
                continue;
            }

            node.velocity = velocity;
            node.position = position;
        }
    }
}

fn place_on_spiral(node: &mut Node, index: usize, seed: u64) {
    let radius = INITIAL_RADIUS * (index as f64 + 0.5).sqrt();
    let angle = index as f64 * GOLDEN_ANGLE;
    let (jx, jy) = stable_pair(seed, &node.id);
    node.position = point(angle.cos() * radius, angle.sin() * radius)
        + point(jx, jy) * PLACEMENT_JITTER;
    node.velocity = Point::ZERO;
}
