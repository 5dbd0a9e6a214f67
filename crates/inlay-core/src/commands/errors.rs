use crate::display::errors::OverlayError;
use crate::errors::InlayError;
use crate::render::errors::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Malformed command payload: {message}")]
    MalformedPayload { message: String },

    #[error("Unrecognized action '{action}'")]
    UnknownAction { action: String },

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Overlay(#[from] OverlayError),
}

impl InlayError for CommandError {
    fn error_code(&self) -> &'static str {
        match self {
            CommandError::MalformedPayload { .. } => "COMMAND_MALFORMED_PAYLOAD",
            CommandError::UnknownAction { .. } => "COMMAND_UNKNOWN_ACTION",
            CommandError::Render(e) => e.error_code(),
            CommandError::Overlay(e) => e.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            CommandError::MalformedPayload { .. } | CommandError::UnknownAction { .. } => true,
            CommandError::Render(e) => e.is_user_error(),
            CommandError::Overlay(e) => e.is_user_error(),
        }
    }
}
