//! IdGenerator port - ID 生成の抽象化
//!
//! 本物のサーバーでは ID はサーバー側で採番されます。
//! この port はサーバーの代役（InMemoryBackend）が使います。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース

use crate::domain::{Id, IdMarker};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は新しいリソース ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数タスクから使える）
pub trait IdGenerator: Send + Sync {
    fn next_raw(&self) -> String;

    fn next_id<T: IdMarker>(&self) -> Id<T>
    where
        Self: Sized,
    {
        Id::new(self.next_raw())
    }
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// ULID の文字列表現は生成順にソートできます。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn next_raw(&self) -> String {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random()).to_string()
    }
}
