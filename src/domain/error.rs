use thiserror::Error;

/// Core engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unknown step type: {step_type}")]
    UnknownStepType { step_type: String },

    #[error("Driver already registered for step type: {step_type}")]
    DriverConflict { step_type: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("No content providers available: {message}")]
    ProviderUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unknown_step_type(step_type: impl Into<String>) -> Self {
        Self::UnknownStepType {
            step_type: step_type.into(),
        }
    }

    pub fn driver_conflict(step_type: impl Into<String>) -> Self {
        Self::DriverConflict {
            step_type: step_type.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
