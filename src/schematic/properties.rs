//! Typed access to the per-block property bag.
//!
//! Block properties arrive as a loosely-typed key/value map whose value
//! shapes drifted across schema versions. Every accessor coerces
//! unconditionally (numeric widening, boolean-from-numeric, numbers inside
//! strings); a value that cannot coerce to the requested shape is a schema
//! error fatal to the owning block.

use ahash::AHashMap;
use glam::Vec2;
use serde_json::Value;
use thiserror::Error;

use crate::host::components::Color;

#[derive(Debug, Error, PartialEq)]
pub enum PropertyError {
    #[error("Missing required property '{0}'")]
    Missing(String),

    #[error("Property '{key}' is not a valid {expected}: {found}")]
    Type {
        key: String,
        expected: &'static str,
        found: String,
    },
}

/// Borrowed view over a block's property map with coercing accessors
pub struct PropertyBag<'a> {
    map: &'a AHashMap<String, Value>,
}

impl<'a> PropertyBag<'a> {
    pub fn new(map: &'a AHashMap<String, Value>) -> Self {
        Self { map }
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    fn type_error(key: &str, expected: &'static str, value: &Value) -> PropertyError {
        PropertyError::Type {
            key: key.to_string(),
            expected,
            found: value.to_string(),
        }
    }

    fn required(&self, key: &str) -> Result<&'a Value, PropertyError> {
        self.map
            .get(key)
            .ok_or_else(|| PropertyError::Missing(key.to_string()))
    }

    pub fn get_f32(&self, key: &str) -> Result<f32, PropertyError> {
        let value = self.required(key)?;
        coerce_f64(value)
            .map(|v| v as f32)
            .ok_or_else(|| Self::type_error(key, "number", value))
    }

    pub fn try_get_f32(&self, key: &str) -> Result<Option<f32>, PropertyError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(value) => coerce_f64(value)
                .map(|v| Some(v as f32))
                .ok_or_else(|| Self::type_error(key, "number", value)),
        }
    }

    pub fn get_i64(&self, key: &str) -> Result<i64, PropertyError> {
        let value = self.required(key)?;
        coerce_i64(value).ok_or_else(|| Self::type_error(key, "integer", value))
    }

    pub fn get_i32(&self, key: &str) -> Result<i32, PropertyError> {
        let value = self.required(key)?;
        coerce_i64(value)
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| Self::type_error(key, "integer", value))
    }

    pub fn try_get_i32(&self, key: &str) -> Result<Option<i32>, PropertyError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(value) => coerce_i64(value)
                .and_then(|v| i32::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| Self::type_error(key, "integer", value)),
        }
    }

    pub fn get_u8(&self, key: &str) -> Result<u8, PropertyError> {
        let value = self.required(key)?;
        coerce_i64(value)
            .and_then(|v| u8::try_from(v).ok())
            .ok_or_else(|| Self::type_error(key, "byte", value))
    }

    pub fn try_get_u8(&self, key: &str) -> Result<Option<u8>, PropertyError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(value) => coerce_i64(value)
                .and_then(|v| u8::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| Self::type_error(key, "byte", value)),
        }
    }

    pub fn get_u16(&self, key: &str) -> Result<u16, PropertyError> {
        let value = self.required(key)?;
        coerce_i64(value)
            .and_then(|v| u16::try_from(v).ok())
            .ok_or_else(|| Self::type_error(key, "16-bit unsigned integer", value))
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, PropertyError> {
        let value = self.required(key)?;
        coerce_bool(value).ok_or_else(|| Self::type_error(key, "boolean", value))
    }

    pub fn try_get_bool(&self, key: &str) -> Result<Option<bool>, PropertyError> {
        match self.map.get(key) {
            None => Ok(None),
            Some(value) => coerce_bool(value)
                .map(Some)
                .ok_or_else(|| Self::type_error(key, "boolean", value)),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<String, PropertyError> {
        let value = self.required(key)?;
        coerce_string(value).ok_or_else(|| Self::type_error(key, "string", value))
    }

    pub fn get_vec2(&self, key: &str) -> Result<Vec2, PropertyError> {
        let value = self.required(key)?;
        coerce_vec2(value).ok_or_else(|| Self::type_error(key, "2-vector", value))
    }

    pub fn get_color(&self, key: &str) -> Result<Color, PropertyError> {
        let value = self.required(key)?;
        coerce_string(value)
            .as_deref()
            .and_then(parse_color)
            .ok_or_else(|| Self::type_error(key, "color", value))
    }

    pub fn get_list(&self, key: &str) -> Result<&'a [Value], PropertyError> {
        let value = self.required(key)?;
        value
            .as_array()
            .map(|v| v.as_slice())
            .ok_or_else(|| Self::type_error(key, "list", value))
    }
}

/// Widen any numeric-ish value to f64
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Coerce to a signed integer; floats round to the nearest integer
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64().map(|f| f.round() as i64)
            }
        }
        Value::Bool(b) => Some(if *b { 1 } else { 0 }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        _ => None,
    }
}

/// Coerce to boolean; any non-zero numeric value is true
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            other => other.parse::<f64>().ok().map(|f| f != 0.0),
        },
        _ => None,
    }
}

pub fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn coerce_vec2(value: &Value) -> Option<Vec2> {
    match value {
        Value::Array(items) if items.len() == 2 => {
            let x = coerce_f64(&items[0])? as f32;
            let y = coerce_f64(&items[1])? as f32;
            Some(Vec2::new(x, y))
        }
        Value::Object(map) => {
            let x = coerce_f64(map.get("x")?)? as f32;
            let y = coerce_f64(map.get("y")?)? as f32;
            Some(Vec2::new(x, y))
        }
        Value::String(s) => {
            let parts: Vec<f32> = s
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .map(|p| p.parse().ok())
                .collect::<Option<_>>()?;
            if parts.len() == 2 {
                Some(Vec2::new(parts[0], parts[1]))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Parse a serialized color: `#RRGGBB`, `#RRGGBBAA`, or 3-4 separated
/// component floats in 0.0..=1.0 (alpha defaults to 1.0)
pub fn parse_color(text: &str) -> Option<Color> {
    let text = text.trim();

    if let Some(hex) = text.strip_prefix('#') {
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return match hex.len() {
            6 => Some(Color::new(
                byte(0)? as f32 / 255.0,
                byte(2)? as f32 / 255.0,
                byte(4)? as f32 / 255.0,
                1.0,
            )),
            8 => Some(Color::new(
                byte(0)? as f32 / 255.0,
                byte(2)? as f32 / 255.0,
                byte(4)? as f32 / 255.0,
                byte(6)? as f32 / 255.0,
            )),
            _ => None,
        };
    }

    let parts: Vec<f32> = text
        .split(|c: char| c == ',' || c == ':' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| p.parse().ok())
        .collect::<Option<_>>()?;
    match parts.len() {
        3 => Some(Color::new(parts[0], parts[1], parts[2], 1.0)),
        4 => Some(Color::new(parts[0], parts[1], parts[2], parts[3])),
        _ => None,
    }
}
