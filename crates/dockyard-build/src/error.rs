use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid service {service:?}: must specify either image or build")]
    Configuration { service: String },

    #[error("failed to inspect image {image:?} for service {service:?}: {message}")]
    InventoryLookup {
        service: String,
        image: String,
        message: String,
    },

    #[error("{0}")]
    Dispatch(String),

    #[error("Build driver not found: {0}")]
    DriverNotFound(String),

    #[error("Build cancelled")]
    Cancelled,

    #[error("Dockerfile not found: {0}")]
    DockerfileNotFound(PathBuf),

    #[error("Build context directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("Docker connection error: {0}")]
    DockerConnection(#[from] bollard::errors::Error),

    #[error("Invalid build configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::Configuration { service } => {
                format!(
                    "サービス '{}' に image も build も指定されていません\n\
                     \n\
                     解決方法:\n\
                     1. 既存イメージを使う場合: image: \"name:tag\"\n\
                     2. ソースからビルドする場合: build: ./path",
                    service
                )
            }
            BuildError::InventoryLookup {
                service,
                image,
                message,
            } => {
                format!(
                    "イメージ {} の確認に失敗しました（サービス: {}）: {}\n\
                     \n\
                     Dockerが起動しているか確認してください。",
                    image, service, message
                )
            }
            BuildError::Dispatch(msg) => {
                format!(
                    "ビルドに失敗しました: {}\n\
                     \n\
                     Dockerfileの内容を確認してください。",
                    msg
                )
            }
            BuildError::DockerfileNotFound(path) => {
                format!(
                    "Dockerfileが見つかりません: {}\n\
                     \n\
                     解決方法:\n\
                     1. Dockerfileのパスを確認してください\n\
                     2. compose ファイルで明示的にパスを指定してください:\n\
                        build:\n\
                          dockerfile: path/to/Dockerfile",
                    path.display()
                )
            }
            BuildError::ContextNotFound(path) => {
                format!(
                    "ビルドコンテキストが見つかりません: {}\n\
                     \n\
                     compose ファイルで build.context のパスを確認してください。",
                    path.display()
                )
            }
            BuildError::Cancelled => "ビルドがキャンセルされました".to_string(),
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
