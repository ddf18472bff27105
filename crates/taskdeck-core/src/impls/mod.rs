//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **HttpBackend**: reqwest による本番用 API クライアント
//! - **InMemoryBackend**: 開発・テスト用のサーバー代役（デモデータ付き）
//! - **FileCredentialStore / MemoryCredentials**: トークンの保存先

pub mod credentials;
pub mod http;
pub mod inmem_backend;

// 主要な型を再エクスポート
pub use self::credentials::{FileCredentialStore, MemoryCredentials};
pub use self::http::HttpBackend;
pub use self::inmem_backend::{Endpoint, InMemoryBackend};
