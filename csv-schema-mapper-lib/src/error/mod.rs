use thiserror::Error;

use crate::model::ModelError;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Column '{column}' not found ({context})")]
    MissingColumn { column: String, context: String },
    #[error("Malformed schema: {0}")]
    MalformedSchema(String),
    #[error("Language model call failed: {0}")]
    Model(#[from] ModelError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ProcessorError {
    pub(crate) fn missing_column(column: impl Into<String>, context: impl Into<String>) -> Self {
        ProcessorError::MissingColumn {
            column: column.into(),
            context: context.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingMessage {
    pub message: String,
    pub source: Option<String>,
}

impl ProcessingMessage {
    pub fn new(message: impl Into<String>, source: Option<String>) -> Self {
        Self {
            message: message.into(),
            source,
        }
    }
}

/// Warnings and errors collected while checking a schema against a CSV header.
#[derive(Debug, Default, Clone)]
pub struct ProcessingState {
    warnings: Vec<ProcessingMessage>,
    errors: Vec<ProcessingMessage>,
}

impl ProcessingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, message: impl Into<String>, source: Option<String>) {
        self.warnings.push(ProcessingMessage::new(message, source));
    }

    pub fn add_error(&mut self, message: impl Into<String>, source: Option<String>) {
        self.errors.push(ProcessingMessage::new(message, source));
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn get_warnings(&self) -> &[ProcessingMessage] {
        &self.warnings
    }

    pub fn get_errors(&self) -> &[ProcessingMessage] {
        &self.errors
    }
}

#[derive(Debug)]
pub enum ProcessingOutcome {
    Success,
    SuccessWithWarnings(Vec<ProcessingMessage>),
    Failure {
        errors: Vec<ProcessingMessage>,
        warnings: Vec<ProcessingMessage>,
    },
}

impl ProcessingOutcome {
    pub fn from_state(state: ProcessingState) -> Self {
        if state.errors.is_empty() && state.warnings.is_empty() {
            ProcessingOutcome::Success
        } else if state.has_errors() {
            ProcessingOutcome::Failure {
                errors: state.errors,
                warnings: state.warnings,
            }
        } else {
            ProcessingOutcome::SuccessWithWarnings(state.warnings)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_state() {
        let state = ProcessingState::new();
        assert!(matches!(
            ProcessingOutcome::from_state(state),
            ProcessingOutcome::Success
        ));

        let mut state = ProcessingState::new();
        state.add_warning("column 'x' missing", Some("DB_CI_NAME".into()));
        assert!(state.has_warnings());
        match ProcessingOutcome::from_state(state) {
            ProcessingOutcome::SuccessWithWarnings(warnings) => {
                assert_eq!(warnings.len(), 1);
                assert_eq!(warnings[0].source.as_deref(), Some("DB_CI_NAME"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }

        let mut state = ProcessingState::new();
        state.add_warning("w", None);
        state.add_error("e", Some("LOAD_BALANCER".into()));
        assert!(state.has_errors());
        match ProcessingOutcome::from_state(state) {
            ProcessingOutcome::Failure { errors, warnings } => {
                assert_eq!(errors[0].source.as_deref(), Some("LOAD_BALANCER"));
                assert_eq!(warnings.len(), 1);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
