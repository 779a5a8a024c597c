use thiserror::Error;

/// Errors raised while rendering a single block
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Invalid {kind} block: {message}")]
    InvalidContent { kind: String, message: String },

    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    #[error("Component panicked: {0}")]
    Panicked(String),
}

impl RenderError {
    pub fn invalid(kind: &str, message: impl Into<String>) -> Self {
        RenderError::InvalidContent {
            kind: kind.to_string(),
            message: message.into(),
        }
    }
}
