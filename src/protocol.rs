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

use serde::{Deserialize, Serialize};

pub const MSG_RUNNING: &str = "sensor-storage api server is running";
pub const MSG_LOGGED: &str = "Data logged successfully";
pub const MSG_PURGED: &str = "purged";
pub const ERR_INVALID_JSON: &str = "Invalid JSON";
pub const ERR_NO_DATA: &str = "No data available";

/// Content disposition of the CSV report download
pub const REPORT_DISPOSITION: &str = "attachment; filename=\"sensor_report.csv\"";

/// Body of a successful API call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of a failed API call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_response_shape() {
        let json = serde_json::to_value(MessageResponse::new(MSG_PURGED)).unwrap();
        assert_eq!(json, serde_json::json!({"message": "purged"}));
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(ErrorResponse::new(ERR_NO_DATA)).unwrap();
        assert_eq!(json, serde_json::json!({"error": "No data available"}));
    }
}
