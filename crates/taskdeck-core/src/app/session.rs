//! DashboardSession - ダッシュボードの表示期間
//!
//! mount で 3 つの取得 (tasks / projects / users) を同時に投げ、
//! unmount (または drop) で未完了のものを中断する。
//! 中断されたリクエストは loading を戻すだけで、データには触れない。

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::actions::Dispatcher;
use super::dashboard::DashboardModel;
use crate::store::Store;

pub struct DashboardSession {
    dispatcher: Dispatcher,
    fetches: JoinSet<()>,
}

impl DashboardSession {
    /// Dispatch the three dashboard fetches concurrently. No ordering between them.
    pub fn mount(dispatcher: Dispatcher) -> Self {
        let mut fetches = JoinSet::new();

        let d = dispatcher.clone();
        fetches.spawn(async move {
            let _ = d.fetch_tasks().await;
        });
        let d = dispatcher.clone();
        fetches.spawn(async move {
            let _ = d.fetch_projects().await;
        });
        let d = dispatcher.clone();
        fetches.spawn(async move {
            let _ = d.fetch_users().await;
        });

        info!("dashboard mounted");
        Self {
            dispatcher,
            fetches,
        }
    }

    pub fn store(&self) -> &Store {
        self.dispatcher.store()
    }

    /// Current model. Loading while any mounted fetch has not been joined.
    pub fn model(&self, user_name: &str) -> DashboardModel {
        if !self.fetches.is_empty() {
            return DashboardModel::Loading;
        }
        DashboardModel::derive(&self.store().snapshot(), user_name)
    }

    /// Wait for every mounted fetch to finish.
    pub async fn settled(&mut self) {
        while let Some(joined) = self.fetches.join_next().await {
            log_join(joined);
        }
    }

    /// Call `render` on mount, on every store change, and once more after all
    /// fetches settle. Returns the final model.
    pub async fn watch(
        &mut self,
        user_name: &str,
        mut render: impl FnMut(&DashboardModel),
    ) -> DashboardModel {
        let store = self.store().clone();
        let mut changes = store.subscribe();
        render(&self.model(user_name));

        while !self.fetches.is_empty() {
            tokio::select! {
                joined = self.fetches.join_next() => {
                    if let Some(joined) = joined {
                        log_join(joined);
                    }
                }
                Ok(()) = changes.changed() => {
                    let state = store.snapshot();
                    render(&DashboardModel::derive(&state, user_name));
                }
            }
        }

        let model = self.model(user_name);
        render(&model);
        model
    }

    /// Abort outstanding fetches and wait until they are gone.
    pub async fn unmount(mut self) {
        self.fetches.abort_all();
        while let Some(joined) = self.fetches.join_next().await {
            log_join(joined);
        }
        info!("dashboard unmounted");
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    match joined {
        Ok(()) => {}
        Err(e) if e.is_cancelled() => debug!("dashboard fetch aborted"),
        Err(e) => warn!(error = %e, "dashboard fetch panicked"),
    }
}
