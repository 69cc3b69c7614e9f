//! Flat key/value records that textures serialize into and are rebuilt from.
//!
//! Readers are permissive: an absent key and a key holding the wrong JSON type
//! both read as `None`, so callers can fall back to their defaults.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the discriminator used to pick a texture kind when parsing.
pub(crate) const CUSTOM_TYPE_KEY: &str = "customType";

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to decode texture record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("texture record must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureRecord {
    fields: Map<String, Value>,
}

impl TextureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self, RecordError> {
        match serde_json::from_str::<Value>(input)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RecordError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn f32(&self, key: &str) -> Option<f32> {
        self.get(key)?.as_f64().map(|value| value as f32)
    }

    /// Reads an integer, accepting integral floats such as `8.0`.
    pub fn i32(&self, key: &str) -> Option<i32> {
        let value = self.get(key)?;
        if let Some(int) = value.as_i64() {
            return i32::try_from(int).ok();
        }
        let float = value.as_f64()?;
        if float.fract() == 0.0 && float >= i32::MIN as f64 && float <= i32::MAX as f64 {
            Some(float as i32)
        } else {
            None
        }
    }

    pub fn u32(&self, key: &str) -> Option<u32> {
        self.i32(key).and_then(|value| u32::try_from(value).ok())
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.as_bool()
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    pub fn custom_type(&self) -> Option<&str> {
        self.str(CUSTOM_TYPE_KEY)
    }

    pub fn set_custom_type(&mut self, custom_type: &str) {
        self.insert(CUSTOM_TYPE_KEY, custom_type);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
