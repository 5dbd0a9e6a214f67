//! Process ancestry resolution backed by a sysinfo process snapshot.

use std::collections::HashSet;

use sysinfo::{ProcessesToUpdate, System};
use tracing::debug;

use crate::process::errors::ProcessError;
use crate::process::types::Pid;

/// Return the ordered ancestor chain of `pid`, immediate parent first,
/// ending at a process with no recorded parent.
///
/// The chain is computed from a fresh process snapshot on every call;
/// ancestry is never cached because a process can be reparented between
/// queries. The starting pid itself is not part of the chain.
pub fn ancestors(pid: Pid) -> Result<Vec<Pid>, ProcessError> {
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::All, true);

    if system.process(pid.to_sysinfo_pid()).is_none() {
        return Err(ProcessError::NotFound { pid: pid.as_u32() });
    }

    let chain = ancestor_chain(pid, |p| {
        system
            .process(p.to_sysinfo_pid())
            .and_then(|proc| proc.parent())
            .map(|parent| Pid::from_raw(parent.as_u32()))
    });

    debug!(
        event = "core.process.ancestors_resolved",
        pid = pid.as_u32(),
        chain_len = chain.len()
    );
    Ok(chain)
}

/// Walk parent links from `pid` outward using `parent_of`, stopping at the
/// first process with no recorded parent.
///
/// Guards against cycles in the reported parent relation (a revisited pid
/// terminates the walk) so a corrupt snapshot can never loop forever.
fn ancestor_chain<F>(pid: Pid, parent_of: F) -> Vec<Pid>
where
    F: Fn(Pid) -> Option<Pid>,
{
    let mut chain = Vec::new();
    let mut seen: HashSet<Pid> = HashSet::from([pid]);
    let mut current = pid;

    while let Some(parent) = parent_of(current) {
        if !seen.insert(parent) {
            break;
        }
        chain.push(parent);
        current = parent;
    }

    chain
}
