//! Procedural texture plumbing for shader-driven noise.
//!
//! The crate does not run shaders. It owns the parameters a noise shader
//! consumes and pushes them through the seams a host engine provides:
//!
//! ```text
//!   host loop ──▶ FrameClock::begin_frame()
//!       │
//!       └─▶ NoiseProceduralTexture::render()
//!               ├─▶ advance time offset (SceneClock::animation_ratio)
//!               ├─▶ UniformSink  (brightness, octaves, timeScale, ...)
//!               └─▶ TextureBase::render()  ─▶ GPU work owned by the host
//! ```
//!
//! - `uniforms` defines the named-uniform sink and an in-memory table.
//! - `clock` exposes the per-frame animation ratio.
//! - `texture` describes the base texture the binder delegates to, plus a
//!   headless implementation for tests and GPU-less hosts.
//! - `record` is the flat key/value record textures serialize into.
//! - `noise` is the parameter binder itself.
//! - `registry` rebuilds textures from records by their `customType`.

mod clock;
mod noise;
mod record;
mod registry;
mod texture;
mod uniforms;

pub use clock::{FixedRatio, FrameClock, SceneClock, SceneHandle, DEFAULT_REFERENCE_FRAME};
pub use noise::{NoiseParameters, NoiseProceduralTexture, NOISE_CUSTOM_TYPE, NOISE_SHADER};
pub use record::{RecordError, TextureRecord};
pub use registry::{ParseFn, ProceduralTexture, RegistryError, TextureRegistry};
pub use texture::{
    FallbackTexture, HeadlessFactory, HeadlessTexture, TextureBase, TextureDescriptor,
    TextureError, TextureFactory, DEFAULT_TEXTURE_SIZE, MAX_TEXTURE_SIZE,
};
pub use uniforms::{UniformSink, UniformTable, UniformValue};
