use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::sandbox::RootDir;

/// In-process mutex per normalized root.
///
/// Serializes committing plans against the same root within one process.
/// Other processes are not coordinated. Entries nobody holds or waits on are
/// dropped on the next call, so the map stays as small as the set of roots
/// in use.
#[derive(Debug, Default)]
pub struct RootLocks {
    locks: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl RootLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `root`
    pub async fn lock(&self, root: &RootDir) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(root.path().to_path_buf())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
