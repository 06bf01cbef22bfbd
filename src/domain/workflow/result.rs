//! Driver and run result contracts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status reported by a driver for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    Success,
    Failed,
}

/// The contract every driver returns.
///
/// `status` is the sole signal the executor inspects to decide whether the
/// run continues; a timed-out or otherwise unhealthy driver call must surface
/// here as `Failed`, never as an uncaught fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverResult {
    pub status: DriverStatus,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub output: Map<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DriverResult {
    /// Create a successful result with the given output
    pub fn success(output: Map<String, Value>) -> Self {
        Self {
            status: DriverStatus::Success,
            output,
            error: None,
        }
    }

    /// Create a successful result with no output
    pub fn success_empty() -> Self {
        Self::success(Map::new())
    }

    /// Create a failed result with the driver-supplied reason
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: DriverStatus::Failed,
            output: Map::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == DriverStatus::Failed
    }

    /// The failure reason, defaulting when the driver supplied none
    pub fn error_message(&self) -> &str {
        self.error.as_deref().unwrap_or("driver reported failure")
    }
}

/// Terminal status of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

/// Structured result returned to the caller for every run.
///
/// A failed run names the offending step type and carries a human-readable
/// reason suitable for direct display; there is no partial-success state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub status: RunStatus,

    /// Accumulated run data on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Map<String, Value>>,

    /// `"<stepType> failed: <reason>"` on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Total execution time in milliseconds
    pub execution_time_ms: u64,
}

impl RunResult {
    /// Create a successful result carrying the final run data
    pub fn success(
        output: Map<String, Value>,
        started_at: DateTime<Utc>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            status: RunStatus::Success,
            output: Some(output),
            error: None,
            started_at,
            execution_time_ms,
        }
    }

    /// Create a failed result
    pub fn failure(
        error: impl Into<String>,
        started_at: DateTime<Utc>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            status: RunStatus::Failed,
            output: None,
            error: Some(error.into()),
            started_at,
            execution_time_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_driver_result_success() {
        let mut output = Map::new();
        output.insert("sent".to_string(), json!(true));

        let result = DriverResult::success(output);
        assert!(!result.is_failed());
        assert!(result.error.is_none());
        assert_eq!(result.output["sent"], json!(true));
    }

    #[test]
    fn test_driver_result_failed() {
        let result = DriverResult::failed("smtp timeout");
        assert!(result.is_failed());
        assert_eq!(result.error_message(), "smtp timeout");
    }

    #[test]
    fn test_driver_result_serialization() {
        let result = DriverResult::failed("smtp timeout");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"failed\""));
        assert!(json.contains("\"error\":\"smtp timeout\""));

        let parsed: DriverResult = serde_json::from_str(&json).unwrap();
        assert!(parsed.is_failed());
    }

    #[test]
    fn test_run_result_failure() {
        let result = RunResult::failure("emailSend failed: smtp timeout", Utc::now(), 12);
        assert!(!result.is_success());
        assert!(result.output.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("emailSend failed: smtp timeout")
        );
    }

    #[test]
    fn test_run_result_serialization() {
        let mut output = Map::new();
        output.insert("emailSend".to_string(), json!({"sent": true}));

        let result = RunResult::success(output, Utc::now(), 42);
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"status\":\"success\""));
        assert!(json.contains("\"emailSend\""));
    }
}
