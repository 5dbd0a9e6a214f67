use crate::errors::InlayError;

#[derive(Debug, thiserror::Error)]
pub enum MuxError {
    #[error("Failed to execute tmux: {message}")]
    ExecFailed { message: String },

    #[error("tmux exited with status {status}: {stderr}")]
    CommandFailed { status: i32, stderr: String },

    #[error("tmux produced no parseable client pids")]
    NoClients,
}

impl InlayError for MuxError {
    fn error_code(&self) -> &'static str {
        match self {
            MuxError::ExecFailed { .. } => "MUX_EXEC_FAILED",
            MuxError::CommandFailed { .. } => "MUX_COMMAND_FAILED",
            MuxError::NoClients => "MUX_NO_CLIENTS",
        }
    }
}
