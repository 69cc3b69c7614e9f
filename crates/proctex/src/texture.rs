use tracing::debug;

use crate::record::TextureRecord;
use crate::uniforms::{UniformSink, UniformTable};

/// Edge length used when a caller does not pick one.
pub const DEFAULT_TEXTURE_SIZE: u32 = 256;

/// Largest edge length the headless base accepts.
pub const MAX_TEXTURE_SIZE: u32 = 16384;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    #[error("texture '{name}' has invalid size {size}; expected 1..={max}", max = MAX_TEXTURE_SIZE)]
    InvalidSize { name: String, size: u32 },
    #[error("texture '{0}' does not name a shader")]
    EmptyShader(String),
    #[error("texture '{name}' could not be created: {reason}")]
    Backend { name: String, reason: String },
}

/// Construction arguments forwarded to the base texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub name: String,
    pub size: u32,
    /// Shader program the base compiles, e.g. `"noise"`.
    pub shader: String,
    pub generate_mip_maps: bool,
}

impl TextureDescriptor {
    pub fn new(
        name: impl Into<String>,
        size: u32,
        shader: impl Into<String>,
        generate_mip_maps: Option<bool>,
    ) -> Self {
        Self {
            name: name.into(),
            size,
            shader: shader.into(),
            generate_mip_maps: generate_mip_maps.unwrap_or(true),
        }
    }
}

/// Texture the host shows instead when the procedural one cannot be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackTexture {
    pub name: String,
}

impl FallbackTexture {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Host-owned procedural texture that shader parameters are bound into.
pub trait TextureBase {
    fn descriptor(&self) -> &TextureDescriptor;

    /// Uniform inputs of the texture's shader program.
    fn uniforms_mut(&mut self) -> &mut dyn UniformSink;

    /// Draws the shader into the texture.
    fn render(&mut self, use_camera_post_process: bool);

    /// Fields the base contributes to a serialized texture.
    fn serialize(&self) -> TextureRecord;
}

/// Creates base textures. Fallback handling, if any, belongs to the factory.
pub trait TextureFactory {
    type Texture: TextureBase;

    fn create(
        &self,
        descriptor: &TextureDescriptor,
        fallback: Option<&FallbackTexture>,
    ) -> Result<Self::Texture, TextureError>;
}

/// In-memory base texture that records what would have been sent to the GPU.
#[derive(Debug, Clone)]
pub struct HeadlessTexture {
    descriptor: TextureDescriptor,
    fallback: Option<FallbackTexture>,
    uniforms: UniformTable,
    render_count: u64,
    last_camera_post_process: Option<bool>,
}

impl HeadlessTexture {
    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    pub fn fallback(&self) -> Option<&FallbackTexture> {
        self.fallback.as_ref()
    }

    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// `use_camera_post_process` flag of the most recent render, if any.
    pub fn last_camera_post_process(&self) -> Option<bool> {
        self.last_camera_post_process
    }
}

impl TextureBase for HeadlessTexture {
    fn descriptor(&self) -> &TextureDescriptor {
        &self.descriptor
    }

    fn uniforms_mut(&mut self) -> &mut dyn UniformSink {
        &mut self.uniforms
    }

    fn render(&mut self, use_camera_post_process: bool) {
        self.render_count = self.render_count.saturating_add(1);
        self.last_camera_post_process = Some(use_camera_post_process);
    }

    fn serialize(&self) -> TextureRecord {
        let mut record = TextureRecord::new();
        record.insert("name", self.descriptor.name.clone());
        record.insert("_size", self.descriptor.size);
        record.insert("_generateMipMaps", self.descriptor.generate_mip_maps);
        record.insert("shader", self.descriptor.shader.clone());
        if let Some(fallback) = &self.fallback {
            record.insert("fallback", fallback.name.clone());
        }
        record
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessFactory;

impl TextureFactory for HeadlessFactory {
    type Texture = HeadlessTexture;

    fn create(
        &self,
        descriptor: &TextureDescriptor,
        fallback: Option<&FallbackTexture>,
    ) -> Result<HeadlessTexture, TextureError> {
        if descriptor.size == 0 || descriptor.size > MAX_TEXTURE_SIZE {
            return Err(TextureError::InvalidSize {
                name: descriptor.name.clone(),
                size: descriptor.size,
            });
        }
        if descriptor.shader.trim().is_empty() {
            return Err(TextureError::EmptyShader(descriptor.name.clone()));
        }
        debug!(
            name = %descriptor.name,
            size = descriptor.size,
            shader = %descriptor.shader,
            "created headless texture"
        );
        Ok(HeadlessTexture {
            descriptor: descriptor.clone(),
            fallback: fallback.cloned(),
            uniforms: UniformTable::new(),
            render_count: 0,
            last_camera_post_process: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_defaults_to_mip_maps() {
        let descriptor = TextureDescriptor::new("n", 64, "noise", None);
        assert!(descriptor.generate_mip_maps);
        let descriptor = TextureDescriptor::new("n", 64, "noise", Some(false));
        assert!(!descriptor.generate_mip_maps);
    }

    #[test]
    fn rejects_out_of_range_sizes() {
        let factory = HeadlessFactory;
        for size in [0, MAX_TEXTURE_SIZE + 1] {
            let err = factory
                .create(&TextureDescriptor::new("bad", size, "noise", None), None)
                .unwrap_err();
            assert_eq!(
                err,
                TextureError::InvalidSize {
                    name: "bad".into(),
                    size
                }
            );
        }
    }

    #[test]
    fn rejects_blank_shader() {
        let err = HeadlessFactory
            .create(&TextureDescriptor::new("blank", 32, "  ", None), None)
            .unwrap_err();
        assert_eq!(err, TextureError::EmptyShader("blank".into()));
    }

    #[test]
    fn render_is_counted() {
        let mut texture = HeadlessFactory
            .create(&TextureDescriptor::new("t", 32, "noise", None), None)
            .unwrap();
        assert_eq!(texture.last_camera_post_process(), None);
        texture.render(true);
        texture.render(false);
        assert_eq!(texture.render_count(), 2);
        assert_eq!(texture.last_camera_post_process(), Some(false));
    }

    #[test]
    fn serializes_base_fields() {
        let texture = HeadlessFactory
            .create(
                &TextureDescriptor::new("t", 128, "noise", Some(false)),
                Some(&FallbackTexture::new("checker")),
            )
            .unwrap();
        let record = texture.serialize();
        assert_eq!(record.str("name"), Some("t"));
        assert_eq!(record.u32("_size"), Some(128));
        assert_eq!(record.bool("_generateMipMaps"), Some(false));
        assert_eq!(record.str("shader"), Some("noise"));
        assert_eq!(record.str("fallback"), Some("checker"));
    }
}
