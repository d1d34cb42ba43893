//! イメージ在庫の確認
//!
//! 「見つからない」とそれ以外の失敗（デーモンに接続できない等）を区別します。
//! 前者だけがビルド / pull のきっかけになります。

use crate::error::BuildResult;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePresence {
    Found,
    NotFound,
}

/// ローカルのイメージ在庫
#[async_trait]
pub trait ImageInventory: Send + Sync {
    /// イメージが存在するか確認する
    ///
    /// 見つからない場合は `Ok(ImagePresence::NotFound)`。
    /// それ以外の失敗は `Err` で返す。
    async fn exists(&self, image: &str) -> BuildResult<ImagePresence>;
}
