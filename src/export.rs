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

// CSV projection of JSON-encoded records for reporting

use crate::error::StoreError;
use crate::record::{json_kind, SensorRecord};
use serde_json::{Map, Value};

/// Convert a sequence of JSON object strings to CSV text.
///
/// The header is the sorted key set of the *first* object only. Later rows
/// are projected onto it: missing keys give empty cells and extra keys are
/// dropped. Rows keep input order and are joined with `\n` without a
/// trailing newline. An empty input yields an empty string.
///
/// Fails with [`StoreError::MalformedInput`] if any element is not a JSON
/// object.
pub fn json_strings_to_csv<S: AsRef<str>>(rows: &[S]) -> Result<String, StoreError> {
    let objects = rows
        .iter()
        .enumerate()
        .map(|(index, row)| parse_object(index, row.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let Some(first) = objects.first() else {
        return Ok(String::new());
    };

    let mut header: Vec<&String> = first.keys().collect();
    header.sort();

    let mut lines = Vec::with_capacity(objects.len() + 1);
    lines.push(
        header
            .iter()
            .map(|key| key.as_str())
            .collect::<Vec<_>>()
            .join(","),
    );

    for object in &objects {
        let cells: Vec<String> = header
            .iter()
            .map(|key| object.get(key.as_str()).map(render_cell).unwrap_or_default())
            .collect();
        lines.push(cells.join(","));
    }

    Ok(lines.join("\n"))
}

/// Export records through their JSON encoding
pub fn records_to_csv(records: &[SensorRecord]) -> Result<String, StoreError> {
    let rows: Vec<String> = records.iter().map(SensorRecord::to_json_string).collect();
    json_strings_to_csv(&rows)
}

fn parse_object(index: usize, row: &str) -> Result<Map<String, Value>, StoreError> {
    match serde_json::from_str::<Value>(row) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::MalformedInput(format!(
            "row {} is {}, expected a JSON object",
            index,
            json_kind(&other)
        ))),
        Err(e) => Err(StoreError::MalformedInput(format!(
            "row {} is not valid JSON: {}",
            index, e
        ))),
    }
}

fn render_cell(value: &Value) -> String {
    match value {
        Value::String(s) => quote_if_needed(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        // Nested values are not re-parseable once flattened
        Value::Array(_) | Value::Object(_) => format!("\"{}\"", value),
    }
}

fn quote_if_needed(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_onto_first_row() {
        let csv = json_strings_to_csv(&[r#"{"a":1,"b":"x,y"}"#, r#"{"a":2}"#]).unwrap();
        assert_eq!(csv, "a,b\n1,\"x,y\"\n2,");
    }

    #[test]
    fn test_header_ignores_keys_of_later_rows() {
        let csv = json_strings_to_csv(&[r#"{"b":1}"#, r#"{"a":"only here","b":2,"c":3}"#]).unwrap();
        assert_eq!(csv, "b\n1\n2");
    }

    #[test]
    fn test_header_is_sorted() {
        let csv = json_strings_to_csv(&[r#"{"value":1.5,"location":"den","recorded":10}"#]).unwrap();
        assert_eq!(csv, "location,recorded,value\nden,10,1.5");
    }

    #[test]
    fn test_string_quoting() {
        assert_eq!(quote_if_needed("plain"), "plain");
        assert_eq!(quote_if_needed("a,b"), "\"a,b\"");
        assert_eq!(quote_if_needed("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(quote_if_needed("two\nlines"), "\"two\nlines\"");
        assert_eq!(quote_if_needed(""), "");
    }

    #[test]
    fn test_scalar_rendering() {
        let csv = json_strings_to_csv(&[r#"{"b":true,"f":22.3,"i":-4,"n":null}"#]).unwrap();
        assert_eq!(csv, "b,f,i,n\ntrue,22.3,-4,");
    }

    #[test]
    fn test_nested_values_are_wrapped_raw() {
        let csv = json_strings_to_csv(&[r#"{"tags":["a","b"],"meta":{"k":1}}"#]).unwrap();
        assert_eq!(csv, "meta,tags\n\"{\"k\":1}\",\"[\"a\",\"b\"]\"");
    }

    #[test]
    fn test_empty_input() {
        let rows: [&str; 0] = [];
        assert_eq!(json_strings_to_csv(&rows).unwrap(), "");
    }

    #[test]
    fn test_non_object_rows_fail() {
        for bad in ["[1]", "3", "\"text\"", "null", "{broken"] {
            let result = json_strings_to_csv(&[r#"{"a":1}"#, bad]);
            assert!(
                matches!(result, Err(StoreError::MalformedInput(_))),
                "expected failure for {}",
                bad
            );
        }
    }

    #[test]
    fn test_records_to_csv() {
        let records = vec![
            SensorRecord::new(1756655999, "den", "bmp280", "temperature", "C", 22.3),
            SensorRecord::new(1756656000, "den", "bmp280", "pressure", "hPa", 1013.0),
        ];
        let csv = records_to_csv(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "location,measurement,recorded,sensor,units,value");
        assert_eq!(lines[1], "den,temperature,1756655999,bmp280,C,22.3");
        assert_eq!(lines[2], "den,pressure,1756656000,bmp280,hPa,1013.0");
    }
}
