use crate::errors::InlayError;

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Failed to connect to the X server: {message}")]
    ConnectionFailed { message: String },

    #[error("X request '{operation}' failed: {message}")]
    RequestFailed {
        operation: &'static str,
        message: String,
    },
}

impl InlayError for DisplayError {
    fn error_code(&self) -> &'static str {
        match self {
            DisplayError::ConnectionFailed { .. } => "DISPLAY_CONNECTION_FAILED",
            DisplayError::RequestFailed { .. } => "DISPLAY_REQUEST_FAILED",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("No overlay window exists; create one before drawing")]
    NotCreated,

    #[error(transparent)]
    Display(#[from] DisplayError),
}

impl InlayError for OverlayError {
    fn error_code(&self) -> &'static str {
        match self {
            OverlayError::NotCreated => "OVERLAY_NOT_CREATED",
            OverlayError::Display(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        matches!(self, OverlayError::NotCreated)
    }
}
