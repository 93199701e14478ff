//! Offload wire protocol.
//!
//! RULE: the controller and the executor share no Rust values. Every
//! message crosses the boundary as a JSON string, tagged by `type` with
//! its payload under `data`.
//!
//!   controller → executor: calculate, shutdown
//!   executor → controller: performance (advisory), result | error (terminal)

use crate::{
    error::{LifeError, LifeResult},
    grid::WireGrid,
    types::{Generation, RequestId},
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ControllerMessage {
    Calculate(CalculateRequest),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    pub request_id: RequestId,
    pub grid:       WireGrid,
    /// Generation of `grid`; the result carries generation + 1.
    pub generation: Generation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ExecutorMessage {
    Result(CalculationResult),
    Performance(PerformanceReport),
    Error(ErrorReport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub request_id:  RequestId,
    pub grid:        WireGrid,
    pub generation:  Generation,
    pub performance: ResultPerformance,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPerformance {
    /// Milliseconds, two decimals.
    pub total_time:   f64,
    pub living_cells: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub request_id:      RequestId,
    pub total_time:      f64,
    /// Living cells in the successor grid.
    pub living_cells:    usize,
    /// Living cells in the input grid.
    pub cells_processed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// None when the executor could not read the request id.
    #[serde(default)]
    pub request_id: Option<RequestId>,
    pub message:    String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack:      Option<String>,
}

impl ExecutorMessage {
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Result(r)      => Some(r.request_id),
            Self::Performance(p) => Some(p.request_id),
            Self::Error(e)       => e.request_id,
        }
    }

    /// Result and error resolve a pending request; performance does not.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Performance(_))
    }
}

impl From<ErrorReport> for LifeError {
    fn from(report: ErrorReport) -> Self {
        LifeError::ExecutorRuntime { message: report.message, stack: report.stack }
    }
}

pub fn encode<T: Serialize>(message: &T) -> LifeResult<String> {
    Ok(serde_json::to_string(message)?)
}

pub fn decode<T: DeserializeOwned>(json: &str) -> LifeResult<T> {
    serde_json::from_str(json).map_err(|e| LifeError::Deserialization(e.to_string()))
}

/// Milliseconds rounded to two decimals.
pub fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn calculate_uses_tag_and_camel_case() {
        let msg = ControllerMessage::Calculate(CalculateRequest {
            request_id: 3,
            grid: WireGrid { width: 5, height: 4, living_cells: vec!["1,2".into()] },
            generation: 7,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({
            "type": "calculate",
            "data": {
                "requestId": 3,
                "grid": { "width": 5, "height": 4, "livingCells": ["1,2"] },
                "generation": 7
            }
        }));
    }

    #[test]
    fn error_without_stack_omits_field() {
        let msg = ExecutorMessage::Error(ErrorReport {
            request_id: Some(1),
            message: "boom".into(),
            stack: None,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({ "type": "error", "data": { "requestId": 1, "message": "boom" } }));
        assert!(msg.is_terminal());
    }

    #[test]
    fn performance_is_not_terminal() {
        let msg: ExecutorMessage = decode(
            r#"{"type":"performance","data":{"requestId":2,"totalTime":0.5,"livingCells":3,"cellsProcessed":3}}"#,
        ).unwrap();
        assert_eq!(msg.request_id(), Some(2));
        assert!(!msg.is_terminal());
    }

    #[test]
    fn unknown_type_is_a_deserialization_error() {
        let err = decode::<ExecutorMessage>(r#"{"type":"bogus","data":{}}"#).unwrap_err();
        assert!(matches!(err, LifeError::Deserialization(_)));
    }

    #[test]
    fn rounding_keeps_two_decimals() {
        assert_eq!(round_ms(1.23456), 1.23);
        assert_eq!(round_ms(0.005), 0.01);
    }
}
