//! Store - クライアント側の状態管理
//!
//! # 構成
//! - **Slice**: 1 種類のリソース一覧と、そのリクエストの状態 (loading / error)
//! - **AppState**: projects / userProjects / tasks / users の 4 スライス
//! - **Store**: AppState を共有し、変更を購読者へ通知する
//!
//! 状態遷移は必ず `Store::update` を通す。更新のたびに version が進むので、
//! ビューは `subscribe()` で受け取った receiver を待てば再描画できる。

mod app_state;
mod slice;

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

pub use self::app_state::{AppState, SliceKind};
pub use self::slice::{Slice, SliceControl, SliceError};

/// Shared handle to the application state.
///
/// Cheap to clone; every clone sees the same state.
#[derive(Clone)]
pub struct Store {
    state: Arc<Mutex<AppState>>,
    version: Arc<watch::Sender<u64>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(AppState::new())),
            version: Arc::new(tx),
        }
    }

    /// Read without cloning.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&*self.lock())
    }

    /// Point-in-time copy of the whole state.
    pub fn snapshot(&self) -> AppState {
        self.read(AppState::clone)
    }

    /// Apply one transition and notify subscribers.
    pub fn update<R>(&self, f: impl FnOnce(&mut AppState) -> R) -> R {
        let result = {
            let mut state = self.lock();
            f(&mut *state)
        };
        self.version.send_modify(|v| *v += 1);
        result
    }

    /// Receiver that is marked changed after every `update`.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    // poison されても中身をそのまま使う
    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("version", &self.version())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn update_bumps_version_and_wakes_subscribers() {
        let store = Store::new();
        let mut rx = store.subscribe();
        assert_eq!(store.version(), 0);

        let waiter = tokio::spawn(async move {
            rx.changed().await.unwrap();
            *rx.borrow_and_update()
        });

        store.update(|state| state.tasks.begin());
        let seen = waiter.await.unwrap();

        assert_eq!(seen, 1);
        assert!(store.read(|s| s.tasks.is_loading()));
    }

    #[test]
    fn clones_share_state() {
        let store = Store::new();
        let other = store.clone();
        other.update(|state| state.users.begin());

        let snapshot = store.snapshot();
        assert!(snapshot.users.is_loading());
        assert_eq!(store.version(), 1);
    }
}
