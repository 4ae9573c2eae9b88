/// State file persistence: one JSON snapshot per ranking session.
///
/// Every command that changes the session holds an exclusive lock on a
/// `<state>.lock` file from load to save, so judges running side by side never
/// overwrite each other's decisions.
use fd_lock::RwLock;
use mergerank_core::{RankingSession, Snapshot};
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::bail;

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

fn open_lock(path: &Path) -> RwLock<File> {
    let lock_path = sibling(path, ".lock");
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .unwrap_or_else(|e| bail(format!("Failed to open lock file {}: {e}", lock_path.display())));
    RwLock::new(file)
}

/// Read the session as it was saved, checkouts included.
pub fn load_session(path: &Path) -> RankingSession<String> {
    let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
        bail(format!(
            "Failed to read state file {}: {e}. Run `mergerank start` first.",
            path.display()
        ))
    });
    let snapshot: Snapshot<String> = serde_json::from_str(&content)
        .unwrap_or_else(|e| bail(format!("State file {} is not valid: {e}", path.display())));
    RankingSession::resume(snapshot)
        .unwrap_or_else(|e| bail(format!("Cannot load session from {}: {e}", path.display())))
}

/// Write the session next to its final location, then rename over it.
fn save_session(path: &Path, session: &RankingSession<String>) {
    let json = serde_json::to_string_pretty(&session.snapshot())
        .unwrap_or_else(|e| bail(format!("Failed to serialize session: {e}")));

    let tmp = sibling(path, ".tmp");
    std::fs::write(&tmp, json).unwrap_or_else(|e| bail(format!("Failed to write {}: {e}", tmp.display())));
    std::fs::rename(&tmp, path).unwrap_or_else(|e| bail(format!("Failed to replace {}: {e}", path.display())));
    tracing::debug!(path = %path.display(), "saved session");
}

/// Save a brand new session. An existing state file is only replaced with `force`.
pub fn create_session(path: &Path, session: &RankingSession<String>, force: bool) {
    let mut lock = open_lock(path);
    let _guard = lock
        .write()
        .unwrap_or_else(|e| bail(format!("Failed to lock {}: {e}", path.display())));

    if path.exists() && !force {
        bail(format!(
            "State file {} already exists. Pass --force to start over.",
            path.display()
        ));
    }
    save_session(path, session);
}

/// Load the session, let `f` change it, and save it back under the state lock.
pub fn update_session<T>(path: &Path, f: impl FnOnce(&mut RankingSession<String>) -> T) -> T {
    let mut lock = open_lock(path);
    let _guard = lock
        .write()
        .unwrap_or_else(|e| bail(format!("Failed to lock {}: {e}", path.display())));

    let mut session = load_session(path);
    let out = f(&mut session);
    save_session(path, &session);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mergerank_core::{NextComparison, Side};
    use std::thread;
    use std::time::Duration;

    fn temp_state(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mergerank-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("state.json")
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_checkouts_survive_between_commands() {
        let path = temp_state("checkouts");
        let session = RankingSession::new(strings(&["a", "b"]), vec!["name".to_string()], None).unwrap();
        create_session(&path, &session, false);

        let mut dispatched = Vec::new();
        for _ in 0..2 {
            match update_session(&path, |s| s.next_comparison()) {
                NextComparison::Compare(c) => dispatched.push((c.path.to_string(), c.stolen)),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(dispatched, vec![(String::new(), false), (String::new(), true)]);

        let loaded = load_session(&path);
        assert_eq!(loaded.headers(), ["name".to_string()]);
        assert_eq!(loaded.progress().in_flight, 1);
        assert_eq!(loaded.stats().steals, 1);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_concurrent_decisions_are_both_kept() {
        let path = temp_state("concurrent");
        let session = RankingSession::new(strings(&["a", "b", "c", "d"]), Vec::new(), None).unwrap();
        create_session(&path, &session, false);

        let judges: Vec<_> = [("l", 1, 2), ("r", 3, 4)]
            .into_iter()
            .map(|(p, left, right)| {
                let path = path.clone();
                thread::spawn(move || {
                    update_session(&path, |s| {
                        // Stay inside the lock long enough for the other judge to load.
                        thread::sleep(Duration::from_millis(50));
                        s.submit_decision(p, left, right, "SORT", "l")
                    })
                })
            })
            .collect();
        for judge in judges {
            judge.join().unwrap().unwrap();
        }

        let loaded = load_session(&path);
        assert_eq!(loaded.stats().applied, 2);
        assert!(loaded.tree().root().child(Side::Left).unwrap().is_complete());
        assert!(loaded.tree().root().child(Side::Right).unwrap().is_complete());

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_force_replaces_existing_session() {
        let path = temp_state("force");
        let session = RankingSession::new(strings(&["a", "b"]), Vec::new(), Some(1)).unwrap();
        create_session(&path, &session, false);
        let session = RankingSession::new(strings(&["x", "y", "z"]), Vec::new(), None).unwrap();
        create_session(&path, &session, true);

        let loaded = load_session(&path);
        assert_eq!(loaded.progress().total_items, 3);
        assert_eq!(loaded.max_pass(), 3);

        std::fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
