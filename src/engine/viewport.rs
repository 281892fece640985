use std::time::Duration;

use crate::config::{ConfigError, ViewportConfig};

use super::geometry::{Point, point};
use super::model::Node;

const MIN_BOUNDS_EXTENT: f64 = 1e-6;

pub(crate) fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

/// Affine map `screen = world * scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale: f64,
}

impl ViewportTransform {
    pub fn new(translate_x: f64, translate_y: f64, scale: f64) -> Self {
        Self {
            translate_x,
            translate_y,
            scale,
        }
    }

    pub fn translate(&self) -> Point {
        point(self.translate_x, self.translate_y)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        world * self.scale + self.translate()
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        (screen - self.translate()) / self.scale
    }

    /// Transform that shows `world` at `screen` with the given scale.
    pub fn looking_at(world: Point, screen: Point, scale: f64) -> Self {
        let translate = screen - world * scale;
        Self::new(translate.x, translate.y, scale)
    }
}

#[derive(Clone, Copy, Debug)]
struct ViewportAnimation {
    start: ViewportTransform,
    end: ViewportTransform,
    anchor: Point,
    start_center: Point,
    end_center: Point,
    duration_secs: f64,
    elapsed_secs: f64,
}

impl ViewportAnimation {
    fn new(start: ViewportTransform, end: ViewportTransform, anchor: Point, duration: Duration) -> Self {
        Self {
            start,
            end,
            anchor,
            start_center: start.screen_to_world(anchor),
            end_center: end.screen_to_world(anchor),
            duration_secs: duration.as_secs_f64(),
            elapsed_secs: 0.0,
        }
    }

    fn progress(&self) -> f64 {
        (self.elapsed_secs / self.duration_secs).clamp(0.0, 1.0)
    }

    fn sample(&self) -> ViewportTransform {
        let eased = ease_out_cubic(self.progress());
        let scale = self.start.scale * (self.end.scale / self.start.scale).powf(eased);
        let center = self.start_center.lerp(self.end_center, eased);
        ViewportTransform::looking_at(center, self.anchor, scale)
    }

    fn shift(&mut self, delta: Point) {
        for transform in [&mut self.start, &mut self.end] {
            transform.translate_x += delta.x;
            transform.translate_y += delta.y;
        }
        self.anchor += delta;
    }
}

/// Camera over the simulation plane: pan, anchored zoom and eased
/// transitions, all clamped to the configured zoom range.
#[derive(Clone, Debug)]
pub struct Viewport {
    config: ViewportConfig,
    transform: ViewportTransform,
    width: f64,
    height: f64,
    animation: Option<ViewportAnimation>,
}

impl Viewport {
    pub fn new(config: ViewportConfig, width: f64, height: f64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut viewport = Self {
            config,
            transform: ViewportTransform::new(0.0, 0.0, 1.0),
            width: width.max(0.0),
            height: height.max(0.0),
            animation: None,
        };
        viewport.reset();
        Ok(viewport)
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn transform(&self) -> ViewportTransform {
        self.transform
    }

    pub fn scale(&self) -> f64 {
        self.transform.scale
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn screen_center(&self) -> Point {
        point(self.width * 0.5, self.height * 0.5)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform.world_to_screen(world)
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.transform.screen_to_world(screen)
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn animation_target(&self) -> Option<ViewportTransform> {
        self.animation.as_ref().map(|animation| animation.end)
    }

    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.config.min_zoom, self.config.max_zoom)
    }

    /// Origin at the surface center, unit scale (clamped into range).
    pub fn reset(&mut self) {
        self.animation = None;
        self.transform =
            ViewportTransform::looking_at(Point::ZERO, self.screen_center(), self.clamp_scale(1.0));
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.animation = None;
        self.transform.translate_x += dx;
        self.transform.translate_y += dy;
    }

    /// Multiplies the scale by `factor`, keeping the world point under
    /// `anchor` fixed on screen.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        if !factor.is_finite() || factor <= 0.0 || !anchor.is_finite() {
            return;
        }
        self.animation = None;

        let world_anchor = self.transform.screen_to_world(anchor);
        let scale = self.clamp_scale(self.transform.scale * factor);
        self.transform = ViewportTransform::looking_at(world_anchor, anchor, scale);
    }

    /// Starts an eased transition to `target`, replacing any transition
    /// already in flight.
    pub fn animate_to(&mut self, target: ViewportTransform, duration: Duration) {
        if !target.translate().is_finite() || !target.scale.is_finite() || target.scale <= 0.0 {
            return;
        }

        let target = ViewportTransform {
            scale: self.clamp_scale(target.scale),
            ..target
        };

        if duration.is_zero() {
            self.animation = None;
            self.transform = target;
            return;
        }

        self.animation = Some(ViewportAnimation::new(
            self.transform,
            target,
            self.screen_center(),
            duration,
        ));
    }

    pub fn default_duration(&self) -> Duration {
        Duration::from_millis(self.config.animation_ms)
    }

    /// Animates so that `world` ends up at the surface center, zooming in to
    /// at least `min_scale`.
    pub fn center_on(&mut self, world: Point, min_scale: f64) {
        if !world.is_finite() {
            return;
        }
        let scale = self.clamp_scale(self.transform.scale.max(min_scale));
        let target = ViewportTransform::looking_at(world, self.screen_center(), scale);
        self.animate_to(target, self.default_duration());
    }

    /// Smallest-zoom-out transform that shows every node disc with
    /// `padding_px` of margin. `None` when no node has a position yet.
    pub fn fit_transform<'a>(
        &self,
        nodes: impl IntoIterator<Item = &'a Node>,
        padding_px: f64,
    ) -> Option<ViewportTransform> {
        let mut min = point(f64::INFINITY, f64::INFINITY);
        let mut max = point(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for node in nodes {
            if !node.position.is_finite() {
                continue;
            }
            let reach = point(node.radius, node.radius);
            min = min.min(node.position - reach);
            max = max.max(node.position + reach);
        }
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let extent_x = (max.x - min.x).max(MIN_BOUNDS_EXTENT);
        let extent_y = (max.y - min.y).max(MIN_BOUNDS_EXTENT);
        let available_x = (self.width - 2.0 * padding_px).max(1.0);
        let available_y = (self.height - 2.0 * padding_px).max(1.0);
        let scale = self.clamp_scale((available_x / extent_x).min(available_y / extent_y));

        Some(ViewportTransform::looking_at(
            (min + max) * 0.5,
            self.screen_center(),
            scale,
        ))
    }

    pub fn fit_to_bounds<'a>(
        &mut self,
        nodes: impl IntoIterator<Item = &'a Node>,
        padding_px: f64,
    ) -> bool {
        let Some(target) = self.fit_transform(nodes, padding_px) else {
            return false;
        };
        self.animate_to(target, self.default_duration());
        true
    }

    /// Advances the in-flight transition. Returns `true` while animating.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };

        animation.elapsed_secs += dt.as_secs_f64();
        if animation.progress() >= 1.0 {
            self.transform = animation.end;
            self.animation = None;
            return false;
        }

        self.transform = animation.sample();
        true
    }

    /// Changes the surface size while keeping the world point at its center.
    pub fn resize(&mut self, width: f64, height: f64) {
        if !width.is_finite() || !height.is_finite() {
            return;
        }
        let old_center = self.screen_center();
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        let delta = self.screen_center() - old_center;
        if delta == Point::ZERO {
            return;
        }

        self.transform.translate_x += delta.x;
        self.transform.translate_y += delta.y;
        if let Some(animation) = self.animation.as_mut() {
            animation.shift(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::model::{GraphModel, GraphSnapshot, NodeKind, NodeSpec};

    fn viewport() -> Viewport {
        Viewport::new(ViewportConfig::default(), 800.0, 600.0).expect("valid config")
    }

    fn assert_close(a: Point, b: Point) {
        assert!(a.distance(b) < 1e-6, "{a:?} != {b:?}");
    }

    #[test]
    fn starts_centered_on_origin() {
        let viewport = viewport();
        assert_close(viewport.world_to_screen(Point::ZERO), point(400.0, 300.0));
        assert_eq!(viewport.scale(), 1.0);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut viewport = viewport();
        let anchor = point(120.0, 480.0);
        let world = viewport.screen_to_world(anchor);
        viewport.zoom_by(2.5, anchor);
        assert_eq!(viewport.scale(), 2.5);
        assert_close(viewport.world_to_screen(world), anchor);
    }

    #[test]
    fn zoom_clamps_to_range() {
        let mut viewport = viewport();
        viewport.zoom_by(1000.0, point(10.0, 10.0));
        assert_eq!(viewport.scale(), viewport.config().max_zoom);
        viewport.zoom_by(1e-9, point(10.0, 10.0));
        assert_eq!(viewport.scale(), viewport.config().min_zoom);
        viewport.zoom_by(f64::NAN, point(10.0, 10.0));
        assert_eq!(viewport.scale(), viewport.config().min_zoom);
    }

    #[test]
    fn animation_reaches_target_with_easing() {
        let mut viewport = viewport();
        let target = ViewportTransform::new(-200.0, 50.0, 3.0);
        viewport.animate_to(target, Duration::from_millis(500));
        assert!(viewport.is_animating());

        assert!(viewport.advance(Duration::from_millis(250)));
        let halfway = viewport.transform();
        assert!(halfway.scale > 1.0 && halfway.scale < 3.0);

        assert!(!viewport.advance(Duration::from_millis(300)));
        assert_eq!(viewport.transform(), target);
        assert!(!viewport.is_animating());
    }

    #[test]
    fn new_animation_replaces_in_flight_one() {
        let mut viewport = viewport();
        viewport.animate_to(ViewportTransform::new(0.0, 0.0, 4.0), Duration::from_secs(1));
        viewport.advance(Duration::from_millis(100));

        let second = ViewportTransform::new(10.0, 20.0, 0.5);
        viewport.animate_to(second, Duration::from_secs(1));
        assert_eq!(viewport.animation_target(), Some(second));

        viewport.advance(Duration::from_secs(2));
        assert_eq!(viewport.transform(), second);
    }

    #[test]
    fn manual_pan_cancels_animation() {
        let mut viewport = viewport();
        viewport.animate_to(ViewportTransform::new(0.0, 0.0, 4.0), Duration::from_secs(1));
        viewport.pan_by(5.0, -5.0);
        assert!(!viewport.is_animating());
        assert_eq!(viewport.transform().translate(), point(405.0, 295.0));
    }

    #[test]
    fn animation_target_scale_is_clamped() {
        let mut viewport = viewport();
        viewport.animate_to(ViewportTransform::new(0.0, 0.0, 100.0), Duration::ZERO);
        assert_eq!(viewport.scale(), viewport.config().max_zoom);
    }

    #[test]
    fn ease_out_cubic_ends_flat() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        let late_slope = (ease_out_cubic(1.0) - ease_out_cubic(0.99)) / 0.01;
        let early_slope = ease_out_cubic(0.01) / 0.01;
        assert!(late_slope < 0.01);
        assert!(early_slope > 2.9);
    }

    #[test]
    fn fit_contains_every_node() {
        let snapshot = GraphSnapshot {
            nodes: vec![
                NodeSpec::new("a", "A", NodeKind::Career).with_position(point(-300.0, 40.0)),
                NodeSpec::new("b", "B", NodeKind::Skill).with_position(point(500.0, -120.0)),
                NodeSpec::new("c", "C", NodeKind::Course).with_position(point(20.0, 260.0)),
            ],
            edges: Vec::new(),
        };
        let model = GraphModel::from_snapshot(snapshot);
        let mut viewport = viewport();
        let padding = 40.0;
        let target = viewport
            .fit_transform(model.nodes(), padding)
            .expect("placed nodes have bounds");

        for node in model.nodes() {
            let screen = target.world_to_screen(node.position);
            let radius = node.radius * target.scale;
            assert!(screen.x - radius >= padding - 1e-6);
            assert!(screen.x + radius <= 800.0 - padding + 1e-6);
            assert!(screen.y - radius >= padding - 1e-6);
            assert!(screen.y + radius <= 600.0 - padding + 1e-6);
        }

        assert!(viewport.fit_to_bounds(model.nodes(), padding));
        viewport.advance(Duration::from_secs(5));
        assert_eq!(viewport.transform(), target);
    }

    #[test]
    fn fit_without_positions_is_skipped() {
        let model = GraphModel::from_snapshot(GraphSnapshot {
            nodes: vec![NodeSpec::new("a", "A", NodeKind::Career)],
            edges: Vec::new(),
        });
        let mut viewport = viewport();
        assert!(!viewport.fit_to_bounds(model.nodes(), 10.0));
        assert!(!viewport.is_animating());
    }

    #[test]
    fn center_on_zooms_in_and_centers() {
        let mut viewport = viewport();
        viewport.center_on(point(150.0, -75.0), 2.0);
        viewport.advance(Duration::from_secs(5));
        assert_eq!(viewport.scale(), 2.0);
        assert_close(viewport.world_to_screen(point(150.0, -75.0)), point(400.0, 300.0));
    }

    #[test]
    fn resize_keeps_center_world_point() {
        let mut viewport = viewport();
        viewport.zoom_by(1.7, point(100.0, 100.0));
        let world_center = viewport.screen_to_world(viewport.screen_center());
        viewport.resize(1280.0, 720.0);
        assert_eq!(viewport.size(), (1280.0, 720.0));
        assert_close(viewport.world_to_screen(world_center), point(640.0, 360.0));
        assert_eq!(viewport.scale(), 1.7);
    }

    #[test]
    fn inverted_zoom_range_fails_construction() {
        let config = ViewportConfig {
            min_zoom: 3.0,
            max_zoom: 1.0,
            ..ViewportConfig::default()
        };
        assert!(matches!(
            Viewport::new(config, 100.0, 100.0),
            Err(ConfigError::ZoomRangeInverted { .. })
        ));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn transform_strategy() -> impl Strategy<Value = ViewportTransform> {
        (-5_000.0f64..5_000.0, -5_000.0f64..5_000.0, 0.1f64..8.0)
            .prop_map(|(x, y, scale)| ViewportTransform::new(x, y, scale))
    }

    proptest! {
        #[test]
        fn prop_screen_world_round_trip(
            transform in transform_strategy(),
            x in -10_000.0f64..10_000.0,
            y in -10_000.0f64..10_000.0,
        ) {
            let screen = point(x, y);
            let back = transform.world_to_screen(transform.screen_to_world(screen));
            prop_assert!(back.distance(screen) < 1e-6, "{:?} -> {:?}", screen, back);

            let world = point(x, y);
            let again = transform.screen_to_world(transform.world_to_screen(world));
            prop_assert!(again.distance(world) < 1e-6, "{:?} -> {:?}", world, again);
        }

        #[test]
        fn prop_zoom_stays_in_range(
            factors in proptest::collection::vec(0.01f64..50.0, 1..40),
            anchor_x in 0.0f64..800.0,
            anchor_y in 0.0f64..600.0,
        ) {
            let mut viewport = Viewport::new(ViewportConfig::default(), 800.0, 600.0)
                .expect("valid config");
            let (min, max) = (viewport.config().min_zoom, viewport.config().max_zoom);
            for factor in factors {
                viewport.zoom_by(factor, point(anchor_x, anchor_y));
                prop_assert!(viewport.scale() >= min && viewport.scale() <= max);
            }
        }
    }
}
