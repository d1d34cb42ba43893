//! dockyard のプロジェクトモデル
//!
//! compose 形式のプロジェクトファイルを発見・読み込みし、
//! サービス定義（image / build）をイメージ準備処理に渡せる形へ変換します。

pub mod compose;
pub mod discovery;
pub mod error;
pub mod loader;
pub mod model;

pub use discovery::{PROJECT_FILE_NAMES, find_project_file, find_project_file_from};
pub use error::{ProjectError, Result};
pub use loader::{load_project, normalize_project_name, parse_project};
pub use model::*;
