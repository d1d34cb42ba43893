use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("YAMLパースエラー: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("無効なサービス名 '{name}': {reason}")]
    InvalidServiceName { name: String, reason: String },

    #[error(
        "プロジェクトファイルが見つかりません\n探索開始位置: {0}\nヒント: compose.yaml を含むディレクトリで実行するか、-f で指定してください"
    )]
    ProjectFileNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ProjectError>;
