//! Errors - エラー型と分類
//!
//! API 呼び出しの失敗は 3 種類に分類されます。
//! スライスに記録されるときは「メッセージ + 分類」に畳み込まれますが、
//! 分類はログ用に保持します。

use thiserror::Error;

/// ErrorKind は失敗の分類
///
/// - Transport: 接続できない、タイムアウトなど（レスポンスなし）
/// - Status: 2xx 以外のレスポンス
/// - Decode: レスポンス本文が期待した形でない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Transport,
    Status,
    Decode,
}

/// ApiError は 1 回のリクエストの失敗
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(String),

    /// `message` はレスポンス本文の `message` フィールド（あれば）。
    #[error("server responded with status {status}")]
    Status { status: u16, message: Option<String> },

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        ApiError::Status {
            status,
            message: Some(message.into()),
        }
    }

    pub fn bare_status(status: u16) -> Self {
        ApiError::Status {
            status,
            message: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) | ApiError::InvalidUrl(_) => ErrorKind::Transport,
            ApiError::Status { .. } => ErrorKind::Status,
            ApiError::Decode(_) => ErrorKind::Decode,
        }
    }

    /// User-facing message: the server's `message` when it sent one, else `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}
