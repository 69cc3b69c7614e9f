//! Parameter binder for the host's `noise` shader.
//!
//! The shader itself lives with the host. This module keeps the tunable
//! parameters, accumulates the animated time offset, and pushes both into the
//! base texture's uniforms once per render.
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::clock::SceneHandle;
use crate::record::TextureRecord;
use crate::texture::{
    FallbackTexture, TextureBase, TextureDescriptor, TextureError, TextureFactory,
    DEFAULT_TEXTURE_SIZE,
};

/// Shader program the base texture compiles for noise textures.
pub const NOISE_SHADER: &str = "noise";

/// Discriminator stored under `customType` in serialized noise textures.
pub const NOISE_CUSTOM_TYPE: &str = "BABYLON.NoiseProceduralTexture";

/// Scale applied to `animation_ratio * speed_factor` on every tick.
const TIME_STEP: f64 = 0.001;

const BRIGHTNESS: &str = "brightness";
const FIRST_OCTAVE: &str = "firstOctave";
const OCTAVES: &str = "octaves";
const PERSISTENCE: &str = "persistence";
const SPEED_X: &str = "animationSpeedFactorX";
const SPEED_Y: &str = "animationSpeedFactorY";
const TIME_SCALE: &str = "timeScale";

/// Tunables consumed by the noise shader. No range checks are applied here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoiseParameters {
    /// Overall brightness, nominally within `[0, 1]`.
    pub brightness: f32,
    /// First octave the shader sums from.
    pub first_octave: i32,
    /// Number of octaves to sum.
    pub octaves: i32,
    /// Amplitude falloff between octaves.
    pub persistence: f32,
    pub animation_speed_factor_x: f32,
    pub animation_speed_factor_y: f32,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        Self {
            brightness: 0.2,
            first_octave: 3,
            octaves: 8,
            persistence: 0.8,
            animation_speed_factor_x: 1.0,
            animation_speed_factor_y: 1.0,
        }
    }
}

impl NoiseParameters {
    /// Writes all six parameters into `record` under their camelCase keys.
    ///
    /// JSON has no NaN or infinity, so non-finite floats are written as `null`
    /// and read back as the default by `apply_record`.
    pub fn write_record(&self, record: &mut TextureRecord) {
        for (key, value) in [
            (BRIGHTNESS, self.brightness),
            (PERSISTENCE, self.persistence),
            (SPEED_X, self.animation_speed_factor_x),
            (SPEED_Y, self.animation_speed_factor_y),
        ] {
            if !value.is_finite() {
                debug!(key, value, "non-finite noise parameter serialized as null");
            }
        }
        record.insert(BRIGHTNESS, self.brightness);
        record.insert(FIRST_OCTAVE, self.first_octave);
        record.insert(OCTAVES, self.octaves);
        record.insert(PERSISTENCE, self.persistence);
        record.insert(SPEED_X, self.animation_speed_factor_x);
        record.insert(SPEED_Y, self.animation_speed_factor_y);
    }

    /// Copies every parameter present in `record`; absent or mistyped keys
    /// leave the current value untouched.
    pub fn apply_record(&mut self, record: &TextureRecord) {
        if let Some(value) = record.f32(BRIGHTNESS) {
            self.brightness = value;
        }
        if let Some(value) = record.i32(FIRST_OCTAVE) {
            self.first_octave = value;
        }
        if let Some(value) = record.i32(OCTAVES) {
            self.octaves = value;
        }
        if let Some(value) = record.f32(PERSISTENCE) {
            self.persistence = value;
        }
        if let Some(value) = record.f32(SPEED_X) {
            self.animation_speed_factor_x = value;
        }
        if let Some(value) = record.f32(SPEED_Y) {
            self.animation_speed_factor_y = value;
        }
    }
}

/// Noise procedural texture: parameters plus the base texture they drive.
pub struct NoiseProceduralTexture<B: TextureBase> {
    pub parameters: NoiseParameters,
    time: [f64; 2],
    scene: SceneHandle,
    base: B,
}

impl<B: TextureBase> NoiseProceduralTexture<B> {
    /// Creates the base texture through `factory` and performs the first
    /// uniform push. Factory failures are returned unchanged.
    pub fn new<F>(
        name: &str,
        size: Option<u32>,
        scene: SceneHandle,
        fallback: Option<&FallbackTexture>,
        generate_mip_maps: Option<bool>,
        factory: &F,
    ) -> Result<Self, TextureError>
    where
        F: TextureFactory<Texture = B>,
    {
        Self::with_parameters(
            name,
            size,
            scene,
            fallback,
            generate_mip_maps,
            NoiseParameters::default(),
            factory,
        )
    }

    /// Like `new`, but the first uniform push already uses `parameters`.
    #[allow(clippy::too_many_arguments)]
    pub fn with_parameters<F>(
        name: &str,
        size: Option<u32>,
        scene: SceneHandle,
        fallback: Option<&FallbackTexture>,
        generate_mip_maps: Option<bool>,
        parameters: NoiseParameters,
        factory: &F,
    ) -> Result<Self, TextureError>
    where
        F: TextureFactory<Texture = B>,
    {
        let descriptor = TextureDescriptor::new(
            name,
            size.unwrap_or(DEFAULT_TEXTURE_SIZE),
            NOISE_SHADER,
            generate_mip_maps,
        );
        let base = factory.create(&descriptor, fallback)?;
        let mut texture = Self {
            parameters,
            time: [0.0, 0.0],
            scene,
            base,
        };
        texture.update_shader_uniforms();
        debug!(name, size = descriptor.size, "noise texture constructed");
        Ok(texture)
    }

    /// Rebuilds a texture from a serialized record.
    ///
    /// `name`, `_size` and `_generateMipMaps` drive construction; the six
    /// parameters are then copied over the defaults. Unknown keys are ignored.
    pub fn parse<F>(
        record: &TextureRecord,
        scene: SceneHandle,
        root_url: &str,
        factory: &F,
    ) -> Result<Self, TextureError>
    where
        F: TextureFactory<Texture = B>,
    {
        let name = record.str("name").unwrap_or_default();
        let mut texture = Self::new(
            name,
            record.u32("_size"),
            scene,
            None,
            record.bool("_generateMipMaps"),
            factory,
        )?;
        texture.parameters.apply_record(record);
        debug!(name, root_url, "noise texture parsed");
        Ok(texture)
    }

    /// Advances the time offset, pushes uniforms, then renders the base.
    pub fn render(&mut self, use_camera_post_process: bool) {
        self.update_shader_uniforms();
        self.base.render(use_camera_post_process);
    }

    /// Base fields, the six parameters, and the `customType` discriminator.
    pub fn serialize(&self) -> TextureRecord {
        let mut record = self.base.serialize();
        self.parameters.write_record(&mut record);
        record.set_custom_type(NOISE_CUSTOM_TYPE);
        record
    }

    pub fn name(&self) -> &str {
        &self.base.descriptor().name
    }

    /// Accumulated animation offset bound to the `timeScale` uniform.
    pub fn time_offset(&self) -> [f64; 2] {
        self.time
    }

    pub fn scene(&self) -> &SceneHandle {
        &self.scene
    }

    pub fn set_scene(&mut self, scene: SceneHandle) {
        self.scene = scene;
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut B {
        &mut self.base
    }

    fn update_shader_uniforms(&mut self) {
        let Some(scene) = self.scene.as_ref() else {
            debug!(name = %self.name(), "no active scene; skipping uniform update");
            return;
        };
        let ratio = f64::from(scene.animation_ratio());
        let params = self.parameters;
        self.time[0] += ratio * f64::from(params.animation_speed_factor_x) * TIME_STEP;
        self.time[1] += ratio * f64::from(params.animation_speed_factor_y) * TIME_STEP;

        let time = [self.time[0] as f32, self.time[1] as f32];
        let uniforms = self.base.uniforms_mut();
        uniforms.set_float(BRIGHTNESS, params.brightness);
        uniforms.set_int(FIRST_OCTAVE, params.first_octave);
        uniforms.set_int(OCTAVES, params.octaves);
        uniforms.set_float(PERSISTENCE, params.persistence);
        uniforms.set_vector2(TIME_SCALE, time);
        trace!(ratio, time_x = time[0], time_y = time[1], "noise uniforms pushed");
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::clock::{FixedRatio, SceneClock};
    use crate::texture::{HeadlessFactory, HeadlessTexture};

    fn scene(ratio: f32) -> SceneHandle {
        Some(Rc::new(FixedRatio(ratio)) as Rc<dyn SceneClock>)
    }

    fn texture_without_scene() -> NoiseProceduralTexture<HeadlessTexture> {
        NoiseProceduralTexture::new("noise", None, None, None, None, &HeadlessFactory)
            .expect("construct")
    }

    #[test]
    fn defaults_match_documented_values() {
        let texture = texture_without_scene();
        assert_eq!(texture.parameters, NoiseParameters::default());
        assert_eq!(texture.parameters.brightness, 0.2);
        assert_eq!(texture.parameters.first_octave, 3);
        assert_eq!(texture.parameters.octaves, 8);
        assert_eq!(texture.parameters.persistence, 0.8);
        assert_eq!(texture.parameters.animation_speed_factor_x, 1.0);
        assert_eq!(texture.parameters.animation_speed_factor_y, 1.0);
        assert_eq!(texture.time_offset(), [0.0, 0.0]);
        assert_eq!(texture.base().descriptor().size, DEFAULT_TEXTURE_SIZE);
        assert_eq!(texture.base().descriptor().shader, NOISE_SHADER);
    }

    #[test]
    fn construction_pushes_uniforms_when_scene_present() {
        let texture =
            NoiseProceduralTexture::new("n", Some(64), scene(1.0), None, None, &HeadlessFactory)
                .unwrap();
        let uniforms = texture.base().uniforms();
        assert_eq!(uniforms.float("brightness"), Some(0.2));
        assert_eq!(uniforms.int("firstOctave"), Some(3));
        assert_eq!(uniforms.int("octaves"), Some(8));
        assert_eq!(uniforms.float("persistence"), Some(0.8));
        assert_eq!(texture.time_offset(), [0.001, 0.001]);
        assert_eq!(uniforms.vector2("timeScale"), Some([0.001_f64 as f32; 2]));
        assert_eq!(texture.base().render_count(), 0);
    }

    #[test]
    fn render_advances_time_per_axis() {
        let mut texture = texture_without_scene();
        texture.set_scene(scene(2.0));
        texture.parameters.animation_speed_factor_x = 1.0;
        texture.parameters.animation_speed_factor_y = 0.5;
        texture.render(false);
        let [x, y] = texture.time_offset();
        assert!((x - 0.002).abs() < 1e-9);
        assert!((y - 0.001).abs() < 1e-9);
        assert_eq!(texture.base().render_count(), 1);
    }

    #[test]
    fn render_without_scene_only_delegates() {
        let mut texture = texture_without_scene();
        texture.parameters.brightness = 0.9;
        texture.render(true);
        assert_eq!(texture.time_offset(), [0.0, 0.0]);
        assert_eq!(texture.parameters.brightness, 0.9);
        assert!(texture.base().uniforms().is_empty());
        assert_eq!(texture.base().render_count(), 1);
        assert_eq!(texture.base().last_camera_post_process(), Some(true));
    }

    #[test]
    fn apply_record_ignores_mistyped_fields() {
        let record =
            TextureRecord::from_json(r#"{"octaves": "many", "persistence": 0.5, "extra": 1}"#)
                .unwrap();
        let mut params = NoiseParameters::default();
        params.apply_record(&record);
        assert_eq!(params.octaves, 8);
        assert_eq!(params.persistence, 0.5);
    }

    #[test]
    fn parameters_deserialize_sparse_camel_case() {
        let params: NoiseParameters =
            serde_json::from_str(r#"{"firstOctave": 1, "animationSpeedFactorY": 3.0}"#).unwrap();
        assert_eq!(params.first_octave, 1);
        assert_eq!(params.animation_speed_factor_y, 3.0);
        assert_eq!(params.octaves, 8);
    }

    #[test]
    fn construction_failure_propagates() {
        let result = NoiseProceduralTexture::new("n", Some(0), None, None, None, &HeadlessFactory);
        assert!(matches!(result, Err(TextureError::InvalidSize { size: 0, .. })));
    }

    #[test]
    fn time_keeps_advancing_at_large_offsets() {
        let mut texture = texture_without_scene();
        texture.time = [40_000.0, 1.0e6];
        texture.set_scene(scene(1.0));
        texture.render(false);
        let [x, y] = texture.time_offset();
        assert!((x - 40_000.001).abs() < 1e-6);
        assert!((y - 1_000_000.001).abs() < 1e-6);
        let pushed = texture.base().uniforms().vector2("timeScale").unwrap();
        assert_eq!(pushed, [40_000.0_f32, 1.0e6_f32]);
    }

    #[test]
    fn initial_push_uses_supplied_parameters() {
        let parameters = NoiseParameters {
            brightness: 0.9,
            octaves: 2,
            animation_speed_factor_x: 0.0,
            animation_speed_factor_y: 0.0,
            ..NoiseParameters::default()
        };
        let texture = NoiseProceduralTexture::with_parameters(
            "still",
            None,
            scene(1.0),
            None,
            None,
            parameters,
            &HeadlessFactory,
        )
        .unwrap();
        assert_eq!(texture.parameters, parameters);
        assert_eq!(texture.time_offset(), [0.0, 0.0]);
        assert_eq!(texture.base().uniforms().float("brightness"), Some(0.9));
        assert_eq!(texture.base().uniforms().int("octaves"), Some(2));
    }

    #[test]
    fn non_finite_parameters_fall_back_to_defaults() {
        let mut texture = texture_without_scene();
        texture.parameters.brightness = f32::INFINITY;
        texture.parameters.persistence = f32::NAN;
        let record = texture.serialize();
        assert_eq!(record.get("brightness"), Some(&serde_json::Value::Null));
        let restored =
            NoiseProceduralTexture::parse(&record, None, "", &HeadlessFactory).unwrap();
        assert_eq!(restored.parameters.brightness, 0.2);
        assert_eq!(restored.parameters.persistence, 0.8);
    }
}
