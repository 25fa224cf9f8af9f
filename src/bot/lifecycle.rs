//! Connection state machine and the cache-ready gate.

use std::collections::HashMap;

use tokio::sync::watch;

use crate::error::AppError;

/// State of the gateway connection as seen by the lifecycle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Disconnected,
    Connecting,
    /// Handshake done; guild configuration is being reconciled and cached.
    CacheLoading,
    Ready,
    ShuttingDown,
}

impl LifecycleState {
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;

        matches!(
            (self, next),
            (_, Disconnected)
                | (Disconnected, Connecting)
                | (Connecting, CacheLoading)
                | (CacheLoading, Ready)
                | (Ready, ShuttingDown)
        )
    }
}

/// Holder of the current state; rejects transitions outside the state machine.
pub struct Lifecycle {
    tx: watch::Sender<LifecycleState>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LifecycleState::Disconnected);
        Self { tx }
    }

    pub fn state(&self) -> LifecycleState {
        *self.tx.borrow()
    }

    /// Moves to `next` if the state machine allows it.
    ///
    /// # Returns
    /// - `Ok(previous)` - Transition applied; a transition to the current state is a no-op
    /// - `Err(AppError::InvalidTransition)` - Transition not allowed from the current state
    pub fn transition(&self, next: LifecycleState) -> Result<LifecycleState, AppError> {
        let mut result = Ok(next);

        self.tx.send_if_modified(|state| {
            let previous = *state;
            if previous == next {
                result = Ok(previous);
                return false;
            }
            if !previous.can_transition_to(next) {
                result = Err(AppError::InvalidTransition {
                    from: previous,
                    to: next,
                });
                return false;
            }

            *state = next;
            result = Ok(previous);
            true
        });

        if let Ok(previous) = &result {
            if *previous != next {
                tracing::debug!("Connection state {:?} -> {:?}", previous, next);
            }
        }

        result
    }

    /// Walks the valid path into `CacheLoading` from wherever a handshake finds us.
    ///
    /// A handshake while already loading or ready means the connection dropped without a
    /// notification; that is treated as passing through `Disconnected`.
    pub fn enter_cache_loading(&self) -> Result<(), AppError> {
        use LifecycleState::*;

        let path: &[LifecycleState] = match self.state() {
            Connecting => &[CacheLoading],
            Disconnected => &[Connecting, CacheLoading],
            CacheLoading | Ready => &[Disconnected, Connecting, CacheLoading],
            ShuttingDown => {
                return Err(AppError::InvalidTransition {
                    from: ShuttingDown,
                    to: CacheLoading,
                })
            }
        };

        for state in path {
            self.transition(*state)?;
        }

        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.tx.subscribe()
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GateState {
    next_epoch: u64,
    /// Shards whose guilds are not cached yet, with the epoch of their latest load.
    pending: HashMap<u32, u64>,
}

impl GateState {
    fn is_open(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Gate held closed while the per-guild cache of any shard is being rebuilt.
///
/// The gate starts with every shard pending and opens once each of them finished a load.
/// Every close of a shard starts a new epoch for it; finishing names the epoch it loaded
/// for, so a load that completes after the same shard reconnected again does not count.
pub struct ReadyGate {
    tx: watch::Sender<GateState>,
}

impl ReadyGate {
    /// Gate waiting for the first load of shards `0..shard_count`.
    pub fn new(shard_count: u32) -> Self {
        let pending = (0..shard_count.max(1)).map(|shard| (shard, 0)).collect();
        let (tx, _) = watch::channel(GateState {
            next_epoch: 1,
            pending,
        });
        Self { tx }
    }

    /// Marks `shard_id` as loading, which closes the gate, and returns the new epoch.
    pub fn close(&self, shard_id: u32) -> u64 {
        let mut epoch = 0;
        self.tx.send_modify(|state| {
            epoch = state.next_epoch;
            state.next_epoch += 1;
            state.pending.insert(shard_id, epoch);
        });
        epoch
    }

    /// Records that `shard_id` finished loading for `epoch`.
    ///
    /// # Returns
    /// - `true` - The gate is open: no shard has a load outstanding
    /// - `false` - Another shard is still loading, or `epoch` was superseded by a newer close
    pub fn open(&self, shard_id: u32, epoch: u64) -> bool {
        self.tx.send_if_modified(|state| {
            if state.pending.get(&shard_id) != Some(&epoch) {
                return false;
            }
            state.pending.remove(&shard_id);
            state.is_open()
        });
        self.is_open()
    }

    pub fn is_open(&self) -> bool {
        self.tx.borrow().is_open()
    }

    /// Shards the gate is still waiting for, in ascending order.
    pub fn pending_shards(&self) -> Vec<u32> {
        let mut shards: Vec<u32> = self.tx.borrow().pending.keys().copied().collect();
        shards.sort_unstable();
        shards
    }

    /// Suspends until the gate is open.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|state| state.is_open()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    #[test]
    fn follows_connection_path() {
        let lifecycle = Lifecycle::new();

        lifecycle.transition(LifecycleState::Connecting).unwrap();
        lifecycle.transition(LifecycleState::CacheLoading).unwrap();
        lifecycle.transition(LifecycleState::Ready).unwrap();
        lifecycle.transition(LifecycleState::ShuttingDown).unwrap();
        lifecycle.transition(LifecycleState::Disconnected).unwrap();

        assert_eq!(lifecycle.state(), LifecycleState::Disconnected);
    }

    #[test]
    fn rejects_skipping_cache_loading() {
        let lifecycle = Lifecycle::new();
        lifecycle.transition(LifecycleState::Connecting).unwrap();

        let result = lifecycle.transition(LifecycleState::Ready);

        assert!(matches!(
            result,
            Err(AppError::InvalidTransition {
                from: LifecycleState::Connecting,
                to: LifecycleState::Ready
            })
        ));
        assert_eq!(lifecycle.state(), LifecycleState::Connecting);
    }

    #[test]
    fn any_state_can_disconnect() {
        for path in [
            vec![],
            vec![LifecycleState::Connecting],
            vec![LifecycleState::Connecting, LifecycleState::CacheLoading],
        ] {
            let lifecycle = Lifecycle::new();
            for state in path {
                lifecycle.transition(state).unwrap();
            }

            assert!(lifecycle.transition(LifecycleState::Disconnected).is_ok());
        }
    }

    #[test]
    fn re_handshake_passes_through_disconnected() {
        let lifecycle = Lifecycle::new();
        lifecycle.enter_cache_loading().unwrap();
        lifecycle.transition(LifecycleState::Ready).unwrap();

        lifecycle.enter_cache_loading().unwrap();

        assert_eq!(lifecycle.state(), LifecycleState::CacheLoading);
    }

    #[test]
    fn stale_epoch_cannot_open_gate() {
        let gate = ReadyGate::new(1);

        let first = gate.close(0);
        let second = gate.close(0);

        assert!(!gate.open(0, first));
        assert!(!gate.is_open());
        assert!(gate.open(0, second));
        assert!(gate.is_open());
    }

    #[test]
    fn waits_for_every_shard() {
        let gate = ReadyGate::new(2);
        assert_eq!(gate.pending_shards(), vec![0, 1]);

        let second = gate.close(1);
        assert!(!gate.open(1, second));
        assert_eq!(gate.pending_shards(), vec![0]);

        let first = gate.close(0);
        assert!(gate.open(0, first));
        assert!(gate.pending_shards().is_empty());
    }

    #[test]
    fn reconnecting_shard_closes_open_gate() {
        let gate = ReadyGate::new(2);
        let first = gate.close(0);
        let second = gate.close(1);
        gate.open(0, first);
        assert!(gate.open(1, second));

        let again = gate.close(1);

        assert!(!gate.is_open());
        assert!(!gate.open(1, second));
        assert!(gate.open(1, again));
    }

    #[tokio::test]
    async fn waiters_resume_once_gate_opens() {
        let gate = Arc::new(ReadyGate::new(1));
        let epoch = gate.close(0);

        let waiter = {
            let gate = gate.clone();
            tokio::spawn(async move { gate.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        gate.open(0, epoch);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
