//! プロジェクトファイルの発見
//!
//! カレントディレクトリから上に向かって compose ファイルを探します。

use crate::error::{ProjectError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 探索するファイル名（優先順）
pub const PROJECT_FILE_NAMES: [&str; 4] = [
    "compose.yaml",
    "compose.yml",
    "docker-compose.yaml",
    "docker-compose.yml",
];

/// カレントディレクトリを起点にプロジェクトファイルを検出
#[tracing::instrument]
pub fn find_project_file() -> Result<PathBuf> {
    let start_dir = std::env::current_dir()?;
    find_project_file_from(&start_dir)
}

/// 指定ディレクトリを起点にプロジェクトファイルを検出
///
/// 各ディレクトリで `PROJECT_FILE_NAMES` を順に確認し、
/// 見つからなければ親ディレクトリへ移動します。
pub fn find_project_file_from(start_dir: &Path) -> Result<PathBuf> {
    let mut current = start_dir.to_path_buf();
    debug!(start_dir = %start_dir.display(), "Searching for project file");

    loop {
        for name in PROJECT_FILE_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                info!(project_file = %candidate.display(), "Found project file");
                return Ok(candidate);
            }
        }

        // 親ディレクトリへ
        if !current.pop() {
            break;
        }
    }

    warn!(start_dir = %start_dir.display(), "Project file not found");
    Err(ProjectError::ProjectFileNotFound(start_dir.to_path_buf()))
}
