use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_ALPHA_MIN: f64 = 0.001;

/// Raised when the engine is constructed with parameters outside their valid
/// ranges. These are programmer errors and surface at construction time.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("charge must be negative (repulsive), got {0}")]
    ChargeNotRepulsive(f64),
    #[error("{name} must be strictly positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f64 },
    #[error("spring constant must lie in (0, 1], got {0}")]
    SpringConstantOutOfRange(f64),
    #[error("velocity decay must lie in [0, 1), got {0}")]
    VelocityDecayOutOfRange(f64),
    #[error("{name} must lie in (0, 1), got {value}")]
    UnitIntervalExpected { name: &'static str, value: f64 },
    #[error("min zoom {min} exceeds max zoom {max}")]
    ZoomRangeInverted { min: f64, max: f64 },
    #[error("label font floor {min} exceeds label font cap {max}")]
    FontRangeInverted { min: f32, max: f32 },
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub simulation: SimulationConfig,
    pub viewport: ViewportConfig,
    pub interaction: InteractionConfig,
    pub render: RenderConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Repulsion strength shared by every node pair. Negative repels.
    pub charge: f64,
    /// Pairs farther apart than this do not repel at all.
    pub distance_max: f64,
    /// Floor applied to pair distances, also the coincidence epsilon.
    pub distance_min: f64,
    pub rest_length: f64,
    pub spring_constant: f64,
    pub velocity_decay: f64,
    pub alpha_decay: f64,
    pub alpha_min: f64,
    pub time_step: f64,
    pub max_speed: f64,
    /// Seed for tie-breaking directions and initial jitter.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            charge: -3000.0,
            distance_max: 600.0,
            distance_min: 1.0,
            rest_length: 90.0,
            spring_constant: 0.25,
            velocity_decay: 0.4,
            alpha_decay: 1.0 - DEFAULT_ALPHA_MIN.powf(1.0 / 300.0),
            alpha_min: DEFAULT_ALPHA_MIN,
            time_step: 1.0,
            max_speed: 50.0,
            seed: 0x6b67_7669_7a00_0001,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Scale used when a click focuses a node.
    pub focus_zoom: f64,
    pub animation_ms: u64,
    pub fit_padding_px: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 8.0,
            focus_zoom: 1.8,
            animation_ms: 650,
            fit_padding_px: 48.0,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pointer travel (screen pixels) below which a press/release is a click.
    pub click_threshold_px: f64,
    pub wheel_zoom_sensitivity: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            click_threshold_px: 4.0,
            wheel_zoom_sensitivity: 0.0018,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    pub label_font_px: f32,
    pub min_label_font_px: f32,
    pub max_label_font_px: f32,
    pub max_label_chars: usize,
    pub emphasis_scale: f64,
    pub glow_layers: u8,
    pub show_grid: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            label_font_px: 12.0,
            min_label_font_px: 9.0,
            max_label_font_px: 22.0,
            max_label_chars: 28,
            emphasis_scale: 1.25,
            glow_layers: 3,
            show_grid: true,
        }
    }
}

fn finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if finite(name, value)? > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn open_unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
    let value = finite(name, value)?;
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::UnitIntervalExpected { name, value })
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if finite("charge", self.charge)? >= 0.0 {
            return Err(ConfigError::ChargeNotRepulsive(self.charge));
        }
        positive("distance_max", self.distance_max)?;
        positive("distance_min", self.distance_min)?;
        positive("rest_length", self.rest_length)?;

        let spring = finite("spring_constant", self.spring_constant)?;
        if !(spring > 0.0 && spring <= 1.0) {
            return Err(ConfigError::SpringConstantOutOfRange(spring));
        }

        let decay = finite("velocity_decay", self.velocity_decay)?;
        if !(0.0..1.0).contains(&decay) {
            return Err(ConfigError::VelocityDecayOutOfRange(decay));
        }

        open_unit("alpha_decay", self.alpha_decay)?;
        open_unit("alpha_min", self.alpha_min)?;
        positive("time_step", self.time_step)?;
        positive("max_speed", self.max_speed)
    }
}

impl ViewportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("min_zoom", self.min_zoom)?;
        positive("max_zoom", self.max_zoom)?;
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::ZoomRangeInverted {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        positive("focus_zoom", self.focus_zoom)?;
        if finite("fit_padding_px", self.fit_padding_px)? < 0.0 {
            return Err(ConfigError::Negative {
                name: "fit_padding_px",
                value: self.fit_padding_px,
            });
        }
        Ok(())
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if finite("click_threshold_px", self.click_threshold_px)? < 0.0 {
            return Err(ConfigError::Negative {
                name: "click_threshold_px",
                value: self.click_threshold_px,
            });
        }
        positive("wheel_zoom_sensitivity", self.wheel_zoom_sensitivity)
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("label_font_px", self.label_font_px as f64)?;
        positive("min_label_font_px", self.min_label_font_px as f64)?;
        if self.min_label_font_px > self.max_label_font_px {
            return Err(ConfigError::FontRangeInverted {
                min: self.min_label_font_px,
                max: self.max_label_font_px,
            });
        }
        positive("emphasis_scale", self.emphasis_scale)
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        self.viewport.validate()?;
        self.interaction.validate()?;
        self.render.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_alpha_decay_settles_in_three_hundred_steps() {
        let config = SimulationConfig::default();
        let alpha = (1.0 - config.alpha_decay).powi(300);
        assert!((alpha - config.alpha_min).abs() < 1e-9);
    }

    #[test]
    fn inverted_zoom_range_is_rejected() {
        let config = ViewportConfig {
            min_zoom: 4.0,
            max_zoom: 2.0,
            ..ViewportConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZoomRangeInverted { min: 4.0, max: 2.0 })
        );
    }

    #[test]
    fn attractive_charge_is_rejected() {
        let config = SimulationConfig {
            charge: 30.0,
            ..SimulationConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ChargeNotRepulsive(30.0)));
    }

    #[test]
    fn spring_and_decay_ranges_are_enforced() {
        let spring = SimulationConfig {
            spring_constant: 1.5,
            ..SimulationConfig::default()
        };
        assert_eq!(
            spring.validate(),
            Err(ConfigError::SpringConstantOutOfRange(1.5))
        );

        let decay = SimulationConfig {
            velocity_decay: 1.0,
            ..SimulationConfig::default()
        };
        assert_eq!(
            decay.validate(),
            Err(ConfigError::VelocityDecayOutOfRange(1.0))
        );

        let cutoff = SimulationConfig {
            distance_max: 0.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            cutoff.validate(),
            Err(ConfigError::NotPositive {
                name: "distance_max",
                ..
            })
        ));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "simulation": { "charge": -120.0 }, "viewport": { "max_zoom": 3.0 } }"#)
                .expect("config parses");
        assert_eq!(config.simulation.charge, -120.0);
        assert_eq!(config.simulation.rest_length, 90.0);
        assert_eq!(config.viewport.max_zoom, 3.0);
        assert_eq!(config.viewport.min_zoom, 0.1);
    }
}
