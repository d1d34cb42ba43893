//! サービス定義

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// ビルド引数
///
/// 値が `None` のキーは「宣言のみ・値なし」を表します（compose の `KEY` 形式）。
pub type BuildArgs = BTreeMap<String, Option<String>>;

/// デフォルトの Dockerfile 名
pub const DEFAULT_DOCKERFILE: &str = "Dockerfile";

/// サービス定義
///
/// YAML形式：
/// ```yaml
/// services:
///   api:
///     image: myapp:latest
///     build:
///       context: ./api
///       dockerfile: Dockerfile.dev
///       args:
///         NODE_VERSION: "20"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    /// イメージ参照（例: `redis:7`）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// ビルド設定
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildConfig>,
}

impl Service {
    /// image と build のどちらかが指定されているか
    pub fn is_resolvable(&self) -> bool {
        self.image.is_some() || self.build.is_some()
    }
}

/// ビルド設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// ビルドコンテキストのパス（作業ディレクトリからの相対パス）
    pub context: PathBuf,
    /// Dockerfileのパス（コンテキストからの相対パス）
    /// 未指定の場合は `Dockerfile`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dockerfile: Option<PathBuf>,
    /// ビルド引数
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BuildArgs,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            context: PathBuf::from("."),
            dockerfile: None,
            args: BuildArgs::new(),
        }
    }
}

impl BuildConfig {
    /// Dockerfile名（未指定ならデフォルト）
    pub fn dockerfile_or_default(&self) -> PathBuf {
        self.dockerfile
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCKERFILE))
    }
}
