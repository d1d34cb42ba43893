use colored::Colorize;
use dockyard_core::{Project, find_project_file, load_project};
use std::path::Path;

/// プロジェクトファイルを決定して読み込む
///
/// `-f` / `DOCKYARD_FILE` があればそれを使い、なければ上方向に探索します。
pub fn load(file: Option<&Path>, project_name: Option<&str>) -> anyhow::Result<Project> {
    let path = match file {
        Some(path) => path.to_path_buf(),
        None => find_project_file().map_err(|e| {
            eprintln!("{}", "✗ プロジェクトファイルが見つかりません".red().bold());
            eprintln!("  compose.yaml / docker-compose.yml を作成するか、-f で指定してください");
            anyhow::anyhow!(e)
        })?,
    };

    let project = load_project(&path, project_name)?;
    tracing::debug!(file = %path.display(), project = %project.name, "Loaded project");
    Ok(project)
}
