use crate::errors::InlayError;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to load image '{path}': {message}")]
    LoadFailed { path: String, message: String },

    #[error("Image '{path}' has zero-sized dimensions")]
    EmptyImage { path: String },
}

impl InlayError for RenderError {
    fn error_code(&self) -> &'static str {
        match self {
            RenderError::LoadFailed { .. } => "RENDER_LOAD_FAILED",
            RenderError::EmptyImage { .. } => "RENDER_EMPTY_IMAGE",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let error = RenderError::LoadFailed {
            path: "/tmp/missing.png".to_string(),
            message: "No such file".to_string(),
        };
        assert_eq!(error.error_code(), "RENDER_LOAD_FAILED");
        assert!(error.is_user_error());
    }
}
