//! プロジェクト定義

use super::service::Service;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// プロジェクト - 複数サービスからなるアプリケーション
///
/// サービスは名前順に保持され、イメージ準備の判定順序やエラー報告が
/// 実行ごとに変わらないようにしています。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// プロジェクト名（イメージ名 `<project>_<service>` の接頭辞）
    pub name: String,
    /// 作業ディレクトリ（ビルドコンテキストの基準）
    pub working_dir: PathBuf,
    /// このプロジェクトで定義されるサービス
    pub services: BTreeMap<String, Service>,
}

impl Project {
    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// ビルド設定を持つサービスの数
    pub fn buildable_count(&self) -> usize {
        self.services.values().filter(|s| s.build.is_some()).count()
    }
}
