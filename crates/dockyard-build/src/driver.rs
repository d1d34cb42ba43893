//! ビルドドライバの抽象化
//!
//! ドライバは名前で選択されます。どのドライバを使えるかは
//! `DriverRegistry` を呼び出し側が組み立てて `Dispatcher` に渡します。

use crate::error::{BuildError, BuildResult};
use crate::progress::ProgressSink;
use crate::request::BuildBatch;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// デフォルトのドライバ名
pub const DEFAULT_DRIVER: &str = "default";

/// ドライバ生成時のパラメータ
#[derive(Debug, Clone)]
pub struct DriverOptions {
    pub name: String,
    /// プロジェクトの作業ディレクトリ
    pub working_dir: PathBuf,
}

/// バッチを受け取り、ビルドと pull を実行するエンジン
#[async_trait]
pub trait BuildDriver: Send + Sync {
    fn name(&self) -> &str;

    /// バッチ全体を処理する。最初に失敗したリクエストのエラーを返す
    async fn build(&self, batch: &BuildBatch, progress: &dyn ProgressSink) -> BuildResult<()>;
}

/// ドライバのファクトリ
pub trait DriverFactory: Send + Sync {
    fn create(&self, options: &DriverOptions) -> BuildResult<Box<dyn BuildDriver>>;
}

impl<F> DriverFactory for F
where
    F: Fn(&DriverOptions) -> BuildResult<Box<dyn BuildDriver>> + Send + Sync,
{
    fn create(&self, options: &DriverOptions) -> BuildResult<Box<dyn BuildDriver>> {
        self(options)
    }
}

/// 名前からドライバのファクトリを引く登録表
#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: HashMap<String, Arc<dyn DriverFactory>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// ファクトリを登録（同名があれば置き換え）
    pub fn register(&mut self, name: impl Into<String>, factory: impl DriverFactory + 'static) {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    pub fn with(mut self, name: impl Into<String>, factory: impl DriverFactory + 'static) -> Self {
        self.register(name, factory);
        self
    }

    pub fn get(&self, name: &str) -> BuildResult<Arc<dyn DriverFactory>> {
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| BuildError::DriverNotFound(name.to_string()))
    }

    /// 登録済みのドライバ名（名前順）
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}
