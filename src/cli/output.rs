use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{ErrorCode, Result, SpError};

/// Envelope for all machine-readable (robot mode) responses.
#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    Error {
        code: ErrorCode,
        numeric_code: u16,
        message: String,
        suggestion: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        context: Option<serde_json::Value>,
        recoverable: bool,
        category: String,
    },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    RobotResponse {
        status: RobotStatus::Ok,
        timestamp: Utc::now(),
        version: crate::VERSION.to_string(),
        data,
    }
}

pub fn robot_error(err: &SpError) -> RobotResponse<serde_json::Value> {
    let structured = err.to_structured();
    RobotResponse {
        status: RobotStatus::Error {
            code: structured.code,
            numeric_code: structured.numeric_code,
            message: structured.message,
            suggestion: structured.suggestion,
            context: structured.context,
            recoverable: structured.recoverable,
            category: structured.category,
        },
        timestamp: Utc::now(),
        version: crate::VERSION.to_string(),
        data: serde_json::Value::Null,
    }
}

/// Pretty-print a robot payload to stdout.
pub fn emit_json<T: Serialize>(payload: &RobotResponse<T>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(payload)?);
    Ok(())
}
