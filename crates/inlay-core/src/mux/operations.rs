//! Terminal multiplexer (tmux) client enumeration.
//!
//! When the process runs inside tmux, the pid that owns the visible terminal
//! window is not in our own ancestry — it is an ancestor of one of the tmux
//! *client* processes attached to the session. These operations surface those
//! client pids as correlation candidates.

use std::process::Command;

use tracing::{debug, warn};

use crate::mux::errors::MuxError;
use crate::process::types::Pid;

/// Whether the current process is attached to a tmux session.
pub fn is_active() -> bool {
    std::env::var("TMUX").map(|v| !v.is_empty()).unwrap_or(false)
}

/// Pids of the tmux client processes attached to the current session.
pub fn client_pids() -> Result<Vec<Pid>, MuxError> {
    let output = Command::new("tmux")
        .args(["list-clients", "-F", "#{client_pid}"])
        .output()
        .map_err(|e| MuxError::ExecFailed {
            message: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(MuxError::CommandFailed {
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let pids = parse_client_pids(&String::from_utf8_lossy(&output.stdout));
    if pids.is_empty() {
        return Err(MuxError::NoClients);
    }

    debug!(event = "core.mux.clients_enumerated", count = pids.len());
    Ok(pids)
}

/// The set of candidate terminal-hosting pids to correlate against windows:
/// the tmux client pids when tmux is active, otherwise the current pid.
///
/// A tmux query failure degrades to the current pid rather than erroring;
/// correlation quality suffers but startup never aborts.
pub fn candidate_pids() -> Vec<Pid> {
    if !is_active() {
        return vec![Pid::current()];
    }

    match client_pids() {
        Ok(pids) => pids,
        Err(e) => {
            warn!(
                event = "core.mux.client_query_failed_using_self",
                error = %e
            );
            vec![Pid::current()]
        }
    }
}

/// Parse `tmux list-clients -F '#{client_pid}'` output, one pid per line.
/// Unparseable lines are skipped.
fn parse_client_pids(stdout: &str) -> Vec<Pid> {
    stdout
        .lines()
        .filter_map(|line| line.trim().parse::<u32>().ok())
        .filter(|&pid| pid != 0)
        .map(Pid::from_raw)
        .collect()
}
