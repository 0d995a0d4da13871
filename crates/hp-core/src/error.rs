use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct HoneyPotError {
    pub code: String,
    pub message: String,
}

impl HoneyPotError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn unknown_path(path: &str) -> Self {
        Self::new("UNKNOWN_PATH", format!("Variable not found in \"{}\".", path))
    }

    pub fn eval_failed(expression: &str, message: &str) -> Self {
        Self::new(
            "EVAL_FAILED",
            format!("Evaluation of \"{}\" failed: {}", expression, message),
        )
    }
}
