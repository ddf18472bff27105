//! CredentialStore port - ベアラートークンの保管場所
//!
//! トークンはリクエストのたびに読み直します（ログイン/ログアウトが
//! 実行中のクライアントにもすぐ反映される）。

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to write credential to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove credential at {path}: {source}")]
    Remove {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// CredentialStore はローカルに保存されたトークンを提供
///
/// `token()` が `None` のときは未認証として Authorization ヘッダーを付けません。
pub trait CredentialStore: Send + Sync {
    fn token(&self) -> Option<String>;

    fn save(&self, token: &str) -> Result<(), CredentialError>;

    fn clear(&self) -> Result<(), CredentialError>;
}
