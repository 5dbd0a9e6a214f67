pub mod errors;
pub mod handler;
pub mod types;

pub use errors::CommandError;
pub use handler::{execute, handle_line, parse_command};
pub use types::Command;
