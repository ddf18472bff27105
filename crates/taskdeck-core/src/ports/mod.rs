//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部システム（REST API、ローカルのトークン保存先など）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - サーバーが source of truth（正本）
//! - クライアントはリクエスト 1 回ごとの結果を Store に反映するだけ

pub mod api;
pub mod clock;
pub mod credentials;
pub mod id_generator;

// 主要な trait を再エクスポート
pub use self::api::{Backend, ProjectApi, TaskApi, UserApi};
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::credentials::{CredentialError, CredentialStore};
pub use self::id_generator::{IdGenerator, UlidGenerator};
