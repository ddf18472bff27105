//! App - アプリケーション層
//!
//! このモジュールは、ports と store を組み合わせてクライアントの振る舞いを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: 設定・credentials・backend のワイヤリング
//! - **Operation**: アクションの一覧（型名・対象スライス・既定メッセージ）
//! - **Dispatcher**: アクションを pending → fulfilled/rejected で実行
//! - **dashboard**: 統計値と表示モデルの導出（純粋関数）
//! - **render**: 表示モデルのテキスト出力
//! - **DashboardSession**: mount で 3 つの取得を投げ、unmount で中断

pub mod actions;
pub mod builder;
pub mod dashboard;
pub mod operation;
pub mod render;
pub mod session;

// 主要な型を再エクスポート
pub use self::actions::Dispatcher;
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::dashboard::{
    DashboardModel, DashboardView, ProjectStats, TaskStats, active_project_percentage,
    admin_count, completion_percentage, project_stats, task_stats,
};
pub use self::operation::Operation;
pub use self::session::DashboardSession;
