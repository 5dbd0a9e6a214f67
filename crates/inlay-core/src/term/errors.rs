use crate::errors::InlayError;

#[derive(Debug, thiserror::Error)]
pub enum TermError {
    #[error("TIOCGWINSZ ioctl failed: {message}")]
    WinsizeQueryFailed { message: String },
}

impl InlayError for TermError {
    fn error_code(&self) -> &'static str {
        match self {
            TermError::WinsizeQueryFailed { .. } => "TERM_WINSIZE_QUERY_FAILED",
        }
    }
}
