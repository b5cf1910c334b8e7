// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Sensor reading record and lenient JSON coercion

use crate::error::StoreError;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Field names of the JSON wire shape
pub const FIELD_RECORDED: &str = "recorded";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_SENSOR: &str = "sensor";
pub const FIELD_MEASUREMENT: &str = "measurement";
pub const FIELD_UNITS: &str = "units";
pub const FIELD_VALUE: &str = "value";

const SAMPLE_MIN_VALUE: f64 = 22.4;
const SAMPLE_MAX_VALUE: f64 = 32.1;

/// One sensor reading
///
/// A record has no identity of its own: once inserted it only exists as
/// backend content, and `select_all` always materializes fresh values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord {
    /// Unix timestamp in seconds
    #[serde(rename = "recorded")]
    pub recorded_at: i64,
    pub location: String,
    #[serde(rename = "sensor")]
    pub sensor_kind: String,
    pub measurement: String,
    pub units: String,
    pub value: f64,
}

impl SensorRecord {
    pub fn new(
        recorded_at: i64,
        location: impl Into<String>,
        sensor_kind: impl Into<String>,
        measurement: impl Into<String>,
        units: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            recorded_at,
            location: location.into(),
            sensor_kind: sensor_kind.into(),
            measurement: measurement.into(),
            units: units.into(),
            value,
        }
    }

    /// A synthetic temperature reading taken "now" in the den
    pub fn sample() -> Self {
        let raw: f64 = rand::thread_rng().gen_range(SAMPLE_MIN_VALUE..=SAMPLE_MAX_VALUE);
        Self::new(
            now_unix(),
            "den",
            "bmp280",
            "temperature",
            "C",
            (raw * 10.0).round() / 10.0,
        )
    }

    /// Build a record from individually optional columns.
    ///
    /// Missing columns get the same defaults as JSON coercion, so typed
    /// backend rows and JSON payloads decode identically.
    pub fn from_columns(
        recorded_at: Option<i64>,
        location: Option<String>,
        sensor_kind: Option<String>,
        measurement: Option<String>,
        units: Option<String>,
        value: Option<f64>,
    ) -> Self {
        Self {
            recorded_at: recorded_at.unwrap_or_else(now_unix),
            location: location.unwrap_or_default(),
            sensor_kind: sensor_kind.unwrap_or_default(),
            measurement: measurement.unwrap_or_default(),
            units: units.unwrap_or_default(),
            value: value.unwrap_or(0.0),
        }
    }

    /// Coerce an arbitrary JSON value into a record.
    ///
    /// Only a non-object input fails. Absent or mistyped fields fall back
    /// to defaults: `recorded` to the current time, strings to "", and
    /// `value` to 0.0. Numeric fields accept both integer and float JSON
    /// numbers.
    pub fn from_json_value(value: &Value) -> Result<Self, StoreError> {
        let fields = value.as_object().ok_or_else(|| {
            StoreError::MalformedInput(format!(
                "expected a JSON object, got {}",
                json_kind(value)
            ))
        })?;

        Ok(Self::from_columns(
            fields.get(FIELD_RECORDED).and_then(as_timestamp),
            string_field(fields, FIELD_LOCATION),
            string_field(fields, FIELD_SENSOR),
            string_field(fields, FIELD_MEASUREMENT),
            string_field(fields, FIELD_UNITS),
            fields.get(FIELD_VALUE).and_then(Value::as_f64),
        ))
    }

    /// Parse and coerce a JSON document
    pub fn from_json_str(input: &str) -> Result<Self, StoreError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| StoreError::MalformedInput(format!("invalid JSON: {}", e)))?;
        Self::from_json_value(&value)
    }

    /// Like [`SensorRecord::from_json_str`] but over raw bytes
    pub fn from_json_slice(input: &[u8]) -> Result<Self, StoreError> {
        let value: Value = serde_json::from_slice(input)
            .map_err(|e| StoreError::MalformedInput(format!("invalid JSON: {}", e)))?;
        Self::from_json_value(&value)
    }

    pub fn to_json(&self) -> Value {
        json!({
            FIELD_RECORDED: self.recorded_at,
            FIELD_LOCATION: self.location,
            FIELD_SENSOR: self.sensor_kind,
            FIELD_MEASUREMENT: self.measurement,
            FIELD_UNITS: self.units,
            FIELD_VALUE: self.value,
        })
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

fn as_timestamp(value: &Value) -> Option<i64> {
    // Float timestamps truncate toward zero; `as` saturates out-of-range values.
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|secs| secs as i64))
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_owned)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}
