//! TOML presets for noise procedural textures.
//!
//! A config names any number of presets under `[textures.<name>]`. Each value
//! is optional: a preset falls back to `[defaults]`, which falls back to the
//! built-in `NoiseParameters` defaults. The `[clock]` table configures the
//! reference frame used to turn wall-clock deltas into animation ratios.
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use proctex::{
    FrameClock, NoiseParameters, NoiseProceduralTexture, SceneHandle, TextureError,
    TextureFactory, DEFAULT_REFERENCE_FRAME, DEFAULT_TEXTURE_SIZE, MAX_TEXTURE_SIZE,
};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextureConfig {
    pub version: u32,
    #[serde(default)]
    pub clock: ClockSettings,
    #[serde(default)]
    pub defaults: PresetValues,
    #[serde(default)]
    pub textures: BTreeMap<String, PresetValues>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClockSettings {
    #[serde(
        default = "default_reference_frame",
        deserialize_with = "deserialize_duration"
    )]
    pub reference_frame: Duration,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            reference_frame: default_reference_frame(),
        }
    }
}

/// Optional overrides shared by `[defaults]` and every `[textures.*]` table.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PresetValues {
    pub size: Option<u32>,
    pub generate_mip_maps: Option<bool>,
    pub brightness: Option<f32>,
    pub first_octave: Option<i32>,
    pub octaves: Option<i32>,
    pub persistence: Option<f32>,
    pub animation_speed_x: Option<f32>,
    pub animation_speed_y: Option<f32>,
}

impl PresetValues {
    /// Takes each value from `self`, then `fallback`.
    fn layered_over(&self, fallback: &PresetValues) -> PresetValues {
        PresetValues {
            size: self.size.or(fallback.size),
            generate_mip_maps: self.generate_mip_maps.or(fallback.generate_mip_maps),
            brightness: self.brightness.or(fallback.brightness),
            first_octave: self.first_octave.or(fallback.first_octave),
            octaves: self.octaves.or(fallback.octaves),
            persistence: self.persistence.or(fallback.persistence),
            animation_speed_x: self.animation_speed_x.or(fallback.animation_speed_x),
            animation_speed_y: self.animation_speed_y.or(fallback.animation_speed_y),
        }
    }

    fn validate(&self, scope: &str) -> Result<(), ConfigError> {
        if let Some(size) = self.size {
            if size == 0 || size > MAX_TEXTURE_SIZE {
                return Err(ConfigError::Invalid(format!(
                    "{scope} size must be within 1..={MAX_TEXTURE_SIZE}, got {size}"
                )));
            }
        }
        if let Some(brightness) = self.brightness {
            if !(0.0..=1.0).contains(&brightness) {
                return Err(ConfigError::Invalid(format!(
                    "{scope} brightness must be within [0, 1], got {brightness}"
                )));
            }
        }
        if let Some(first_octave) = self.first_octave {
            if first_octave < 0 {
                return Err(ConfigError::Invalid(format!(
                    "{scope} first_octave must be >= 0"
                )));
            }
        }
        if let Some(octaves) = self.octaves {
            if octaves < 0 {
                return Err(ConfigError::Invalid(format!("{scope} octaves must be >= 0")));
            }
        }
        Ok(())
    }
}

/// A preset with every value filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPreset {
    pub name: String,
    pub size: u32,
    pub generate_mip_maps: bool,
    pub parameters: NoiseParameters,
}

impl ResolvedPreset {
    /// Constructs a noise texture named after the preset.
    pub fn build<F>(
        &self,
        scene: SceneHandle,
        factory: &F,
    ) -> Result<NoiseProceduralTexture<F::Texture>, TextureError>
    where
        F: TextureFactory,
    {
        NoiseProceduralTexture::with_parameters(
            &self.name,
            Some(self.size),
            scene,
            None,
            Some(self.generate_mip_maps),
            self.parameters,
            factory,
        )
    }
}

fn default_reference_frame() -> Duration {
    DEFAULT_REFERENCE_FRAME
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Duration;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of seconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Duration::from_secs(v as u64))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Duration::from_secs(v))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v.is_nan() || v.is_sign_negative() || v.is_infinite() {
                return Err(E::custom("duration must be a finite non-negative number"));
            }
            Ok(Duration::from_secs_f64(v))
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl TextureConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: TextureConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read texture config {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("failed to load texture config {}", path.display()))?;
        debug!(
            path = %path.display(),
            presets = config.textures.len(),
            "loaded texture config"
        );
        Ok(config)
    }

    pub fn preset_names(&self) -> impl Iterator<Item = &str> {
        self.textures.keys().map(String::as_str)
    }

    pub fn preset(&self, name: &str) -> Option<ResolvedPreset> {
        let values = self.textures.get(name)?.layered_over(&self.defaults);
        let builtin = NoiseParameters::default();
        Some(ResolvedPreset {
            name: name.to_string(),
            size: values.size.unwrap_or(DEFAULT_TEXTURE_SIZE),
            generate_mip_maps: values.generate_mip_maps.unwrap_or(true),
            parameters: NoiseParameters {
                brightness: values.brightness.unwrap_or(builtin.brightness),
                first_octave: values.first_octave.unwrap_or(builtin.first_octave),
                octaves: values.octaves.unwrap_or(builtin.octaves),
                persistence: values.persistence.unwrap_or(builtin.persistence),
                animation_speed_factor_x: values
                    .animation_speed_x
                    .unwrap_or(builtin.animation_speed_factor_x),
                animation_speed_factor_y: values
                    .animation_speed_y
                    .unwrap_or(builtin.animation_speed_factor_y),
            },
        })
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clock.reference_frame)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.clock.reference_frame.is_zero() {
            return Err(ConfigError::Invalid(
                "clock.reference_frame must be greater than zero".into(),
            ));
        }

        self.defaults.validate("defaults")?;

        for (name, values) in &self.textures {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "texture preset name may not be empty".into(),
                ));
            }
            values.validate(&format!("texture '{name}'"))?;
        }

        Ok(())
    }
}
