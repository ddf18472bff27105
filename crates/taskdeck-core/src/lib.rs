//! taskdeck-core
//!
//! Client core for the taskdeck project/task dashboard.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, project, task, user, state, errors）
//! - **ports**: 抽象化レイヤー（ProjectApi / TaskApi / UserApi, CredentialStore, Clock, IdGenerator）
//! - **impls**: 実装（HttpBackend, InMemoryBackend, FileCredentialStore）
//! - **store**: クライアント側の状態（Slice, AppState, Store）
//! - **app**: アクション・ダッシュボード・セッション・builder
//! - **config**: 設定（TOML + 環境変数）

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod store;
