use std::any::Any;
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::clock::SceneHandle;
use crate::noise::{NoiseProceduralTexture, NOISE_CUSTOM_TYPE};
use crate::record::TextureRecord;
use crate::texture::{TextureBase, TextureError, TextureFactory};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("texture record has no customType")]
    MissingCustomType,
    #[error("no procedural texture registered for customType '{0}'")]
    UnknownCustomType(String),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Object-safe surface shared by every procedural texture kind.
pub trait ProceduralTexture {
    fn name(&self) -> &str;
    fn custom_type(&self) -> &'static str;
    fn render(&mut self, use_camera_post_process: bool);
    fn serialize(&self) -> TextureRecord;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<B: TextureBase + 'static> ProceduralTexture for NoiseProceduralTexture<B> {
    fn name(&self) -> &str {
        NoiseProceduralTexture::name(self)
    }

    fn custom_type(&self) -> &'static str {
        NOISE_CUSTOM_TYPE
    }

    fn render(&mut self, use_camera_post_process: bool) {
        NoiseProceduralTexture::render(self, use_camera_post_process);
    }

    fn serialize(&self) -> TextureRecord {
        NoiseProceduralTexture::serialize(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Rebuilds one texture kind from its record.
pub type ParseFn<F> =
    fn(&TextureRecord, SceneHandle, &str, &F) -> Result<Box<dyn ProceduralTexture>, TextureError>;

/// Maps `customType` discriminators to the parser for that texture kind.
pub struct TextureRegistry<F: TextureFactory> {
    factory: F,
    parsers: HashMap<String, ParseFn<F>>,
}

impl<F> TextureRegistry<F>
where
    F: TextureFactory,
    F::Texture: 'static,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            parsers: HashMap::new(),
        }
    }

    /// Registry that already knows the noise texture.
    pub fn with_builtin(factory: F) -> Self {
        let mut registry = Self::new(factory);
        registry.register(NOISE_CUSTOM_TYPE, parse_noise::<F>);
        registry
    }

    /// Adds or replaces the parser for `custom_type`.
    pub fn register(&mut self, custom_type: impl Into<String>, parser: ParseFn<F>) {
        self.parsers.insert(custom_type.into(), parser);
    }

    pub fn is_registered(&self, custom_type: &str) -> bool {
        self.parsers.contains_key(custom_type)
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn parse(
        &self,
        record: &TextureRecord,
        scene: SceneHandle,
        root_url: &str,
    ) -> Result<Box<dyn ProceduralTexture>, RegistryError> {
        let custom_type = record
            .custom_type()
            .ok_or(RegistryError::MissingCustomType)?;
        let Some(parser) = self.parsers.get(custom_type) else {
            warn!(custom_type, "unknown procedural texture kind");
            return Err(RegistryError::UnknownCustomType(custom_type.to_string()));
        };
        debug!(custom_type, "dispatching texture record");
        Ok(parser(record, scene, root_url, &self.factory)?)
    }
}

fn parse_noise<F>(
    record: &TextureRecord,
    scene: SceneHandle,
    root_url: &str,
    factory: &F,
) -> Result<Box<dyn ProceduralTexture>, TextureError>
where
    F: TextureFactory,
    F::Texture: 'static,
{
    let texture = NoiseProceduralTexture::parse(record, scene, root_url, factory)?;
    Ok(Box::new(texture))
}
