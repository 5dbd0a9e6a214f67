//! Terminal window correlation.
//!
//! The X server has no "window for pid" query. What it does have is a
//! parent/child window tree and, on well-behaved clients, a `_NET_WM_PID`
//! property naming the process that created each window. Correlation walks
//! the whole tree once, records pid → window for every window that exposes
//! an owner, and intersects that map with the ancestor chains of the
//! candidate terminal pids. The nearest matching ancestor wins.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tracing::{info, warn};

use crate::display::types::WindowId;
use crate::mux;
use crate::process;
use crate::process::types::Pid;

/// The subset of the window-server surface correlation consumes. The live
/// connection implements it; tests use synthetic trees.
pub trait WindowTree {
    /// Children of `window`, or `None` when the subtree query fails.
    fn child_windows(&self, window: WindowId) -> Option<Vec<WindowId>>;

    /// Owning pid recorded on the window, or `None` when unknown.
    fn window_pid(&self, window: WindowId) -> Option<Pid>;
}

/// A candidate terminal-hosting pid together with its ancestry chain,
/// immediate parent first.
#[derive(Debug, Clone)]
pub struct CandidateChain {
    pub pid: Pid,
    pub ancestors: Vec<Pid>,
}

/// The winning match for one correlation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorrelationOutcome {
    /// The candidate whose chain matched.
    pub candidate: Pid,
    /// The pid (candidate or ancestor) that owns the window.
    pub owner: Pid,
    /// The window that visually hosts the terminal.
    pub window: WindowId,
}

/// Result of one correlation pass over the window tree.
#[derive(Debug, Clone)]
pub struct Correlation {
    /// Every observed owning pid and its window, last-observed wins.
    pub pid_windows: HashMap<Pid, WindowId>,
    pub outcome: Option<CorrelationOutcome>,
}

/// Every window reachable from `root` by following children transitively,
/// in breadth-first discovery order. `root` itself is excluded.
///
/// An explicit worklist keeps the traversal flat; a subtree whose child
/// query fails is skipped, keeping the partial result.
pub fn enumerate_windows<T: WindowTree + ?Sized>(tree: &T, root: WindowId) -> Vec<WindowId> {
    let mut discovered = Vec::new();
    let mut queue = VecDeque::from([root]);

    while let Some(window) = queue.pop_front() {
        let Some(children) = tree.child_windows(window) else {
            continue;
        };
        for child in children {
            discovered.push(child);
            queue.push_back(child);
        }
    }

    discovered
}

/// Map every window's owning pid to the window, in enumeration order.
///
/// When several windows report the same owning pid the last one observed
/// wins. That is deliberate, documented policy (and pinned by a test), not
/// an accident of iteration order.
pub fn build_pid_window_map<T: WindowTree + ?Sized>(
    tree: &T,
    windows: &[WindowId],
) -> HashMap<Pid, WindowId> {
    let mut map = HashMap::new();
    for &window in windows {
        if let Some(pid) = tree.window_pid(window) {
            map.insert(pid, window);
        }
    }
    map
}

/// Find the window owned by the pid closest to `candidate` along its chain:
/// the candidate itself, then each ancestor from nearest to furthest.
fn nearest_owned_window(
    candidate: &CandidateChain,
    pid_windows: &HashMap<Pid, WindowId>,
) -> Option<CorrelationOutcome> {
    std::iter::once(candidate.pid)
        .chain(candidate.ancestors.iter().copied())
        .find_map(|owner| {
            pid_windows.get(&owner).map(|&window| CorrelationOutcome {
                candidate: candidate.pid,
                owner,
                window,
            })
        })
}

/// One correlation pass: enumerate the tree, build the pid → window map,
/// and match the candidate chains against it. The first candidate with a
/// match wins.
pub fn correlate<T: WindowTree + ?Sized>(
    tree: &T,
    root: WindowId,
    candidates: &[CandidateChain],
) -> Correlation {
    let windows = enumerate_windows(tree, root);
    let pid_windows = build_pid_window_map(tree, &windows);

    let outcome = candidates
        .iter()
        .find_map(|candidate| nearest_owned_window(candidate, &pid_windows));

    Correlation {
        pid_windows,
        outcome,
    }
}

/// Startup correlation: resolve the candidate set (tmux clients or self),
/// compute each candidate's ancestry, and run one pass over the live tree.
///
/// Runs once, synchronously, before the event loop starts. Finding no match
/// is degraded service, not an error: the overlay falls back to a configured
/// origin.
pub fn discover<T: WindowTree + ?Sized>(tree: &T, root: WindowId) -> Correlation {
    let candidates: Vec<CandidateChain> = mux::candidate_pids()
        .into_iter()
        .map(|pid| {
            let ancestors = match process::ancestors(pid) {
                Ok(chain) => chain,
                Err(e) => {
                    warn!(
                        event = "core.display.candidate_ancestry_failed",
                        pid = pid.as_u32(),
                        error = %e
                    );
                    Vec::new()
                }
            };
            CandidateChain { pid, ancestors }
        })
        .collect();

    let correlation = correlate(tree, root, &candidates);

    match &correlation.outcome {
        Some(outcome) => info!(
            event = "core.display.terminal_window_correlated",
            candidate = outcome.candidate.as_u32(),
            owner = outcome.owner.as_u32(),
            window = outcome.window
        ),
        None => warn!(
            event = "core.display.no_terminal_window_match",
            candidate_count = candidates.len(),
            window_count = correlation.pid_windows.len()
        ),
    }

    correlation
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Synthetic window tree: parent → children edges plus per-window owner
    /// pids, with selected subtrees marked as failing their child query.
    #[derive(Default)]
    struct FakeTree {
        children: HashMap<WindowId, Vec<WindowId>>,
        owners: HashMap<WindowId, u32>,
        broken: Vec<WindowId>,
    }

    impl FakeTree {
        fn with_edges(edges: &[(WindowId, &[WindowId])]) -> Self {
            let mut tree = Self::default();
            for &(parent, children) in edges {
                tree.children.insert(parent, children.to_vec());
            }
            tree
        }

        fn owned_by(mut self, window: WindowId, pid: u32) -> Self {
            self.owners.insert(window, pid);
            self
        }

        fn broken_at(mut self, window: WindowId) -> Self {
            self.broken.push(window);
            self
        }
    }

    impl WindowTree for FakeTree {
        fn child_windows(&self, window: WindowId) -> Option<Vec<WindowId>> {
            if self.broken.contains(&window) {
                return None;
            }
            Some(self.children.get(&window).cloned().unwrap_or_default())
        }

        fn window_pid(&self, window: WindowId) -> Option<Pid> {
            self.owners.get(&window).copied().map(Pid::from_raw)
        }
    }

    fn chain(pid: u32, ancestors: &[u32]) -> CandidateChain {
        CandidateChain {
            pid: Pid::from_raw(pid),
            ancestors: ancestors.iter().copied().map(Pid::from_raw).collect(),
        }
    }

    const ROOT: WindowId = 1;

    #[test]
    fn test_enumeration_excludes_root_includes_descendants() {
        let tree = FakeTree::with_edges(&[(ROOT, &[10, 20]), (10, &[11, 12]), (20, &[21])]);
        let windows = enumerate_windows(&tree, ROOT);

        assert!(!windows.contains(&ROOT));
        assert_eq!(windows, vec![10, 20, 11, 12, 21]);
    }

    #[test]
    fn test_enumeration_skips_failed_subtree() {
        let tree = FakeTree::with_edges(&[(ROOT, &[10, 20]), (10, &[11]), (20, &[21])])
            .broken_at(20);
        let windows = enumerate_windows(&tree, ROOT);

        // 20 itself was discovered before its child query failed; only its
        // descendants are lost
        assert_eq!(windows, vec![10, 20, 11]);
    }

    #[test]
    fn test_pid_window_map_skips_unknown_owners() {
        let tree = FakeTree::with_edges(&[(ROOT, &[10, 20])]).owned_by(10, 100);
        let windows = enumerate_windows(&tree, ROOT);
        let map = build_pid_window_map(&tree, &windows);

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Pid::from_raw(100)), Some(&10));
    }

    #[test]
    fn test_pid_window_map_last_write_wins() {
        // Two windows claiming the same owner pid: the later one in
        // enumeration order wins. Documented policy, not an accident.
        let tree = FakeTree::with_edges(&[(ROOT, &[10, 20])])
            .owned_by(10, 100)
            .owned_by(20, 100);
        let windows = enumerate_windows(&tree, ROOT);
        let map = build_pid_window_map(&tree, &windows);

        assert_eq!(map.get(&Pid::from_raw(100)), Some(&20));
    }

    #[test]
    fn test_nearest_matching_ancestor_wins() {
        let tree = FakeTree::with_edges(&[(ROOT, &[71, 72])])
            .owned_by(71, 3)
            .owned_by(72, 1);
        let correlation = correlate(&tree, ROOT, &[chain(5, &[4, 3, 2, 1])]);

        let outcome = correlation.outcome.expect("should match");
        assert_eq!(outcome.owner, Pid::from_raw(3));
        assert_eq!(outcome.window, 71);
    }

    #[test]
    fn test_candidate_owning_a_window_beats_its_ancestors() {
        let tree = FakeTree::with_edges(&[(ROOT, &[71, 72])])
            .owned_by(71, 5)
            .owned_by(72, 4);
        let correlation = correlate(&tree, ROOT, &[chain(5, &[4, 3])]);

        let outcome = correlation.outcome.expect("should match");
        assert_eq!(outcome.owner, Pid::from_raw(5));
        assert_eq!(outcome.window, 71);
    }

    #[test]
    fn test_first_candidate_with_match_wins() {
        let tree = FakeTree::with_edges(&[(ROOT, &[71])]).owned_by(71, 40);
        let correlation = correlate(
            &tree,
            ROOT,
            &[chain(9, &[8]), chain(50, &[40]), chain(60, &[40])],
        );

        let outcome = correlation.outcome.expect("should match");
        assert_eq!(outcome.candidate, Pid::from_raw(50));
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let tree = FakeTree::with_edges(&[(ROOT, &[71])]).owned_by(71, 999);
        let correlation = correlate(&tree, ROOT, &[chain(5, &[4, 3])]);

        assert!(correlation.outcome.is_none());
        assert_eq!(correlation.pid_windows.len(), 1);
    }

    #[test]
    fn test_empty_tree_yields_empty_map() {
        let tree = FakeTree::with_edges(&[(ROOT, &[])]);
        let correlation = correlate(&tree, ROOT, &[chain(5, &[4])]);

        assert!(correlation.pid_windows.is_empty());
        assert!(correlation.outcome.is_none());
    }
}
