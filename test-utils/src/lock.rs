//! Process-wide serialisation for tests.
//!
//! Some objects under test may only exist once per process. Tests constructing them hold the
//! guard returned by [`exclusive`] for their whole body so parallel test threads never overlap.

use std::sync::LazyLock;
use tokio::sync::{Mutex, MutexGuard};

static EXCLUSIVE: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Waits until no other test holds the lock and returns the guard.
pub async fn exclusive() -> MutexGuard<'static, ()> {
    EXCLUSIVE.lock().await
}
