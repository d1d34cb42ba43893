//! compose ファイル形式の型
//!
//! イメージ準備に必要なキー（`name`, `services.*.image`, `services.*.build`）
//! だけを読み取ります。それ以外のキーは無視されます。

use crate::model::{BuildArgs, BuildConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// compose ファイルのルート
#[derive(Debug, Clone, Deserialize)]
pub struct ComposeFile {
    /// プロジェクト名（トップレベル `name`）
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub services: BTreeMap<String, ComposeService>,
}

/// compose ファイル内のサービス
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeService {
    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub build: Option<ComposeBuild>,
}

/// `build` は文字列（コンテキストのみ）またはマッピングで指定できる
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ComposeBuild {
    Context(String),
    Config(ComposeBuildConfig),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeBuildConfig {
    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub dockerfile: Option<String>,

    #[serde(default)]
    pub args: Option<ComposeArgs>,
}

/// ビルド引数はマッピングまたは `KEY=value` のリストで指定できる
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ComposeArgs {
    Map(BTreeMap<String, Option<ArgValue>>),
    List(Vec<String>),
}

/// マッピング形式の値（YAML のスカラーをそのまま文字列化する）
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Number(serde_yaml::Number),
    Bool(bool),
}

impl ArgValue {
    fn into_string(self) -> String {
        match self {
            ArgValue::String(s) => s,
            ArgValue::Number(n) => n.to_string(),
            ArgValue::Bool(b) => b.to_string(),
        }
    }
}

impl ComposeArgs {
    /// どちらの形式でも `BuildArgs` に変換する
    ///
    /// リスト形式で `=` を含まない要素は値なし（`None`）になります。
    pub fn into_build_args(self) -> BuildArgs {
        match self {
            ComposeArgs::Map(map) => map
                .into_iter()
                .map(|(k, v)| (k, v.map(ArgValue::into_string)))
                .collect(),
            ComposeArgs::List(list) => list
                .into_iter()
                .map(|entry| match entry.split_once('=') {
                    Some((k, v)) => (k.to_string(), Some(v.to_string())),
                    None => (entry, None),
                })
                .collect(),
        }
    }
}

impl From<ComposeBuild> for BuildConfig {
    fn from(build: ComposeBuild) -> Self {
        match build {
            ComposeBuild::Context(context) => BuildConfig {
                context: PathBuf::from(context),
                ..Default::default()
            },
            ComposeBuild::Config(config) => BuildConfig {
                context: config
                    .context
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
                dockerfile: config
                    .dockerfile
                    .filter(|d| !d.is_empty())
                    .map(PathBuf::from),
                args: config
                    .args
                    .map(ComposeArgs::into_build_args)
                    .unwrap_or_default(),
            },
        }
    }
}
