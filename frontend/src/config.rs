use log::{warn, Level};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::dom::{ElementLookup, FormControls};

/// Id of the optional `<script type="application/json">` block carrying
/// overrides.
pub const CONFIG_ELEMENT_ID: &str = "interaction-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose console output when running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("interaction config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("interaction config must be a JSON object")]
    NotAnObject,
    #[error("interaction config field `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Every timing and threshold used by the page interactions. All delays are
/// milliseconds unless the field name says otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Height of the fixed header subtracted from anchor scroll targets.
    pub header_offset: f64,
    pub reveal: RevealConfig,
    pub hero: HeroConfig,
    pub contact: ContactConfig,
    pub notification: NotificationConfig,
    pub mascot: MascotConfig,
    pub features: StaggerConfig,
    pub pricing: StaggerConfig,
    pub floating_icon_stagger_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Fraction of the viewport height an element's top must rise above.
    pub viewport_ratio: f64,
    pub stagger_secs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeroConfig {
    pub letter_base_ms: u32,
    pub letter_step_ms: u32,
    pub tagline_delay_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactConfig {
    pub submit_latency_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub enter_ms: u32,
    pub hold_ms: u32,
    pub exit_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MascotConfig {
    pub max_offset: f64,
    pub divisor: f64,
}

/// Observer-driven cascade: fires when `threshold` of the watched element is
/// visible, element `i` starts after `base_ms + i * step_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaggerConfig {
    pub threshold: f64,
    pub base_ms: u32,
    pub step_ms: u32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            header_offset: 80.0,
            reveal: RevealConfig {
                viewport_ratio: 0.85,
                stagger_secs: 0.1,
            },
            hero: HeroConfig {
                letter_base_ms: 100,
                letter_step_ms: 100,
                tagline_delay_ms: 600,
            },
            contact: ContactConfig {
                submit_latency_ms: 1500,
            },
            notification: NotificationConfig {
                enter_ms: 10,
                hold_ms: 4000,
                exit_ms: 300,
            },
            mascot: MascotConfig {
                max_offset: 3.0,
                divisor: 50.0,
            },
            features: StaggerConfig {
                threshold: 0.3,
                base_ms: 200,
                step_ms: 150,
            },
            pricing: StaggerConfig {
                threshold: 0.2,
                base_ms: 100,
                step_ms: 150,
            },
            floating_icon_stagger_secs: 0.3,
        }
    }
}

impl InteractionConfig {
    /// Defaults with the fields named in `raw` replaced. Nested objects are
    /// merged key by key, so `{"pricing": {"threshold": 0.5}}` keeps the
    /// pricing delays.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let overrides: Value = serde_json::from_str(raw)?;
        if !overrides.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let mut merged = serde_json::to_value(Self::default())?;
        merge(&mut merged, overrides);
        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the animations cannot work with, such as a negative
    /// eye offset or a visibility threshold outside `0..=1`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |value: f64| (0.0..=1.0).contains(&value);
        let checks = [
            ("header_offset", self.header_offset, self.header_offset >= 0.0),
            ("reveal.viewport_ratio", self.reveal.viewport_ratio, unit(self.reveal.viewport_ratio)),
            ("reveal.stagger_secs", self.reveal.stagger_secs, self.reveal.stagger_secs >= 0.0),
            ("mascot.max_offset", self.mascot.max_offset, self.mascot.max_offset >= 0.0),
            ("mascot.divisor", self.mascot.divisor, self.mascot.divisor > 0.0),
            ("features.threshold", self.features.threshold, unit(self.features.threshold)),
            ("pricing.threshold", self.pricing.threshold, unit(self.pricing.threshold)),
            (
                "floating_icon_stagger_secs",
                self.floating_icon_stagger_secs,
                self.floating_icon_stagger_secs >= 0.0,
            ),
        ];
        match checks.into_iter().find(|&(_, _, ok)| !ok) {
            Some((field, value, _)) => Err(ConfigError::OutOfRange { field, value }),
            None => Ok(()),
        }
    }

    /// Reads the overrides block from the page, if there is one.
    pub fn load<P: ElementLookup + FormControls>(page: &P) -> Self {
        let Some(element) = page.by_id(CONFIG_ELEMENT_ID) else {
            return Self::default();
        };
        let raw = page.text(&element);
        if raw.trim().is_empty() {
            return Self::default();
        }
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(err) => {
                warn!("Ignoring #{}: {}", CONFIG_ELEMENT_ID, err);
                Self::default()
            }
        }
    }
}

fn merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
