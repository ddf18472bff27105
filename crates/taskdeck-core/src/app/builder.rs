//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）: URL が不正なら build() で止める
//! - 差し替え可能な部品（credentials / backend）と既定値

use std::sync::Arc;

use crate::config::{ClientConfig, ConfigError};
use crate::domain::ApiError;
use crate::impls::{FileCredentialStore, HttpBackend, MemoryCredentials};
use crate::ports::{Backend, CredentialStore};
use crate::store::Store;

use super::actions::Dispatcher;
use super::session::DashboardSession;

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(ClientConfig::load(None)?)
///     .backend(Arc::new(InMemoryBackend::seeded()))
///     .build()?;
/// ```
///
/// # 既定値
/// - credentials: `config.token` があればそれを固定で使い、なければ token ファイル
/// - backend: `HttpBackend`（credentials を共有）
pub struct AppBuilder {
    config: ClientConfig,
    credentials: Option<Arc<dyn CredentialStore>>,
    backend: Option<Arc<dyn Backend>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to create HTTP backend: {0}")]
    Backend(#[source] ApiError),
}

impl AppBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            credentials: None,
            backend: None,
        }
    }

    /// Credential store to use instead of the default.
    pub fn credentials(mut self, credentials: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Backend to use instead of `HttpBackend`.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        self.config.validate()?;

        let credentials = match self.credentials {
            Some(credentials) => credentials,
            None => default_credentials(&self.config)?,
        };
        let backend = match self.backend {
            Some(backend) => backend,
            None => Arc::new(
                HttpBackend::new(&self.config, credentials.clone()).map_err(BuildError::Backend)?,
            ),
        };

        Ok(App {
            dispatcher: Dispatcher::new(Store::new(), backend),
            config: self.config,
            credentials,
        })
    }
}

fn default_credentials(config: &ClientConfig) -> Result<Arc<dyn CredentialStore>, ConfigError> {
    Ok(match &config.token {
        Some(token) => Arc::new(MemoryCredentials::with_token(token.clone())),
        None => Arc::new(FileCredentialStore::new(config.token_path()?)),
    })
}

/// App は構築済みのクライアント
pub struct App {
    pub config: ClientConfig,
    pub credentials: Arc<dyn CredentialStore>,
    dispatcher: Dispatcher,
}

impl App {
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn store(&self) -> &Store {
        self.dispatcher.store()
    }

    pub fn mount_dashboard(&self) -> DashboardSession {
        DashboardSession::mount(self.dispatcher.clone())
    }
}
