//! ビルドリクエストとバッチ

use dockyard_core::BuildArgs;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Dockerfile の入力元
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DockerfileSource {
    /// ファイルシステム上の Dockerfile
    Path(PathBuf),
    /// メモリ上の Dockerfile 内容（pull のみのリクエストで使用）
    Inline(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInputs {
    pub context_path: PathBuf,
    pub dockerfile: DockerfileSource,
}

/// ひとつのイメージに対するビルドリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub tags: Vec<String>,
    pub inputs: BuildInputs,
    pub build_args: BuildArgs,
    /// ベースイメージを常に pull するか
    pub pull: bool,
}

impl BuildRequest {
    /// 取得とタグ付けだけを行うリクエストか
    pub fn is_pull_only(&self) -> bool {
        self.pull && matches!(self.inputs.dockerfile, DockerfileSource::Inline(_))
    }

    pub fn inline_dockerfile(&self) -> Option<&str> {
        match &self.inputs.dockerfile {
            DockerfileSource::Inline(content) => Some(content),
            DockerfileSource::Path(_) => None,
        }
    }
}

/// プロジェクト1回分のリクエスト集合
///
/// キーはイメージ名（pull のみの場合はサービス名）。
/// ドライバにはバッチ全体が一度に渡されます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildBatch {
    requests: BTreeMap<String, BuildRequest>,
}

impl BuildBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// リクエストを追加。同じキーが既にあれば置き換えて古いものを返す
    pub fn insert(&mut self, key: impl Into<String>, request: BuildRequest) -> Option<BuildRequest> {
        self.requests.insert(key.into(), request)
    }

    pub fn get(&self, key: &str) -> Option<&BuildRequest> {
        self.requests.get(key)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.requests.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BuildRequest)> {
        self.requests.iter().map(|(k, v)| (k.as_str(), v))
    }
}
