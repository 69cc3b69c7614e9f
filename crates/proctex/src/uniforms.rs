use std::collections::BTreeMap;

/// A single value bound to a named shader uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vector2([f32; 2]),
}

/// Receives named uniform values for the next draw of a shader program.
///
/// How values reach the GPU (uniform buffers, push constants, GL uniform
/// locations) is up to the implementor.
pub trait UniformSink {
    fn set_float(&mut self, name: &str, value: f32);
    fn set_int(&mut self, name: &str, value: i32);
    fn set_vector2(&mut self, name: &str, value: [f32; 2]);
}

/// Ordered name -> value map that keeps the latest write for each uniform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformTable {
    values: BTreeMap<String, UniformValue>,
}

impl UniformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<UniformValue> {
        self.values.get(name).copied()
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.get(name)? {
            UniformValue::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        match self.get(name)? {
            UniformValue::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn vector2(&self, name: &str) -> Option<[f32; 2]> {
        match self.get(name)? {
            UniformValue::Vector2(value) => Some(value),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, UniformValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    fn set(&mut self, name: &str, value: UniformValue) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        } else {
            self.values.insert(name.to_string(), value);
        }
    }
}

impl UniformSink for UniformTable {
    fn set_float(&mut self, name: &str, value: f32) {
        self.set(name, UniformValue::Float(value));
    }

    fn set_int(&mut self, name: &str, value: i32) {
        self.set(name, UniformValue::Int(value));
    }

    fn set_vector2(&mut self, name: &str, value: [f32; 2]) {
        self.set(name, UniformValue::Vector2(value));
    }
}
