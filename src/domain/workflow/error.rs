//! Workflow error types

use thiserror::Error;

use crate::domain::EngineError;

/// Errors that can occur while validating or executing a workflow
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WorkflowError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown step type: {0}")]
    UnknownStepType(String),

    #[error("{step_type} failed: {message}")]
    StepExecution { step_type: String, message: String },

    #[error("Invalid condition '{0}'")]
    InvalidCondition(String),

    #[error("Collection '{0}' not found in run data or is not an array")]
    MissingCollection(String),

    #[error("Step budget of {0} exceeded")]
    StepBudgetExceeded(usize),
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unknown_step_type(step_type: impl Into<String>) -> Self {
        Self::UnknownStepType(step_type.into())
    }

    pub fn step_execution(step_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StepExecution {
            step_type: step_type.into(),
            message: message.into(),
        }
    }

    pub fn invalid_condition(expression: impl Into<String>) -> Self {
        Self::InvalidCondition(expression.into())
    }

    pub fn missing_collection(name: impl Into<String>) -> Self {
        Self::MissingCollection(name.into())
    }
}

impl From<EngineError> for WorkflowError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::UnknownStepType { step_type } => Self::UnknownStepType(step_type),
            EngineError::Validation { message } => Self::Validation(message),
            other => Self::Validation(other.to_string()),
        }
    }
}
